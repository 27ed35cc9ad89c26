//! Native entry point: prints the summary of the persisted calculator state
//! and writes both PDF reports.
//!
//! Usage: `metragem-native [OUT_DIR]`. Without `OUT_DIR` the configured
//! export folder is used, or the current directory if none is set.

#[cfg(not(target_arch = "wasm32"))]
use metragem::{AppConfig, Calculator, state::StateStorage};

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use metragem::state::{FileStorage, MemoryStorage};

    let mut storage = FileStorage::default_location();
    let config = storage
        .as_ref()
        .map(AppConfig::load_or_default)
        .unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    // First run: write the defaults out so they can be edited
    let fresh = storage
        .as_mut()
        .filter(|s| matches!(AppConfig::load(&**s), Ok(None)));
    if let Some(Err(e)) = fresh.map(|s| config.save(s)) {
        log::warn!("Could not write default configuration: {}", e);
    }

    let out_dir = std::env::args()
        .nth(1)
        .or_else(|| Some(config.preferences.export_folder.clone()).filter(|f| !f.is_empty()))
        .unwrap_or_else(|| ".".to_string());

    match storage {
        Some(storage) => {
            log::info!("Using state directory {:?}", storage.dir());
            run(&Calculator::new(storage, &config)?, &out_dir)
        }
        None => {
            log::warn!("No config directory available, starting from an empty state");
            run(&Calculator::new(MemoryStorage::new(), &config)?, &out_dir)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run<S: StateStorage>(
    calculator: &Calculator<S>,
    out_dir: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use metragem::clock;
    use metragem::listing::EMPTY_LISTING_MESSAGE;
    use metragem::report::{DirectorySink, PdfRenderer, ReportVariant};

    let state = calculator.state();
    let (area, value) = calculator.totals_text();
    println!(
        "{} espaços, {} peças | Área total: {} | Valor total: {}",
        state.groups.len(),
        state.pieces.len(),
        area,
        value
    );

    if !calculator.can_export() {
        println!("{}", EMPTY_LISTING_MESSAGE);
        return Ok(());
    }

    let today = clock::today();
    let mut sink = DirectorySink::new(out_dir);
    for variant in [ReportVariant::Client, ReportVariant::Technical] {
        calculator.export(variant, today, &PdfRenderer, &mut sink)?;
        println!("{}", sink.dir().join(variant.filename()).display());
    }
    Ok(())
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
