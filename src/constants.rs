//! Global constants for the Metragem application

/// Storage key holding the whole serialized application state.
pub const STATE_STORAGE_KEY: &str = "measurementCalculator";

/// Default annotation canvas width, used until the host reports its layout.
pub const DEFAULT_CANVAS_WIDTH: u32 = 600;

/// Default annotation canvas height.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 200;

/// Default pencil color (black).
pub const DEFAULT_STROKE_COLOR: [u8; 3] = [0, 0, 0];

/// Default pencil width in canvas pixels ("Médio").
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// Eraser strokes are this many times wider than the configured width.
pub const ERASER_WIDTH_FACTOR: f32 = 2.0;

/// Directory name under the user's config dir for config and state files.
pub const APP_DIR_NAME: &str = "metragem";

/// Output filename of the client quotation report.
pub const CLIENT_REPORT_FILENAME: &str = "orcamento-cliente.pdf";

/// Output filename of the technical draft report.
pub const TECHNICAL_REPORT_FILENAME: &str = "rascunho-tecnico.pdf";
