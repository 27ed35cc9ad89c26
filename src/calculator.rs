//! Application controller.
//!
//! [`Calculator`] wires the state store to the space manager, piece form,
//! annotation canvas, listing, summary and report export. Front ends (the
//! native binary, the WASM bindings) only talk to this type.

use time::Date;

use crate::config::AppConfig;
use crate::constants::DEFAULT_CANVAS_WIDTH;
use crate::drawing::{AnnotationCanvas, CanvasError, ClientPoint, DrawingChange, PointerEvent};
use crate::form::{FormError, PieceForm};
use crate::listing::{DELETE_CONFIRMATION, PieceQuery, Row};
use crate::model::Group;
use crate::report::{Document, DocumentRenderer, ReportError, ReportSink, ReportVariant, generate};
use crate::state::{Action, AppState, StateStorage, Store, SubscriptionId};
use crate::summary::Totals;
use crate::units::{CurrencyFormat, format_area};

/// The whole calculator: state plus every UI-side component.
pub struct Calculator<S: StateStorage> {
    store: Store<S>,
    form: PieceForm,
    canvas: AnnotationCanvas,
    query: PieceQuery,
    currency: CurrencyFormat,
}

impl<S: StateStorage> Calculator<S> {
    /// Open the persisted state and set up the components.
    ///
    /// The canvas shows the pending drawing from the stored state. If that
    /// state was in the middle of an edit, the form is restored from the
    /// edited piece too.
    pub fn new(storage: S, config: &AppConfig) -> Result<Self, CanvasError> {
        let store = Store::open_with_key(storage, config.preferences.storage_key.as_str());

        let mut canvas =
            AnnotationCanvas::new(DEFAULT_CANVAS_WIDTH, config.canvas.pixel_height())?;
        canvas.tools_mut().color = config.canvas.stroke_color();
        canvas.tools_mut().line_width = config.canvas.line_width();
        canvas.set_history_config(config.canvas.history());

        let mut calculator = Self {
            store,
            form: PieceForm::new(),
            canvas,
            query: PieceQuery::default(),
            currency: config.preferences.currency(),
        };
        calculator.restore_session();
        Ok(calculator)
    }

    fn restore_session(&mut self) {
        if let Some((_, piece)) = self.store.state().editing_piece() {
            self.form.load(piece);
        }
        let drawing = self.store.state().current_drawing.clone();
        self.load_canvas(drawing.as_deref());
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Register a callback for every state change.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    // ------------------------------------------------------------------
    // Spaces
    // ------------------------------------------------------------------

    /// Add a group from user input. The name is trimmed; blank names are
    /// ignored. Returns whether anything was dispatched.
    pub fn add_group(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.store.dispatch(Action::AddGroup(name.to_string()));
        true
    }

    pub fn select_group(&mut self, name: &str) {
        self.store.dispatch(Action::SetActiveGroup(name.to_string()));
    }

    pub fn groups(&self) -> &[Group] {
        &self.state().groups
    }

    // ------------------------------------------------------------------
    // Piece form
    // ------------------------------------------------------------------

    pub fn form(&self) -> &PieceForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PieceForm {
        &mut self.form
    }

    /// Submit the form as a create or update at time `now` (ms).
    ///
    /// On success the canvas and its history are cleared for the next piece.
    pub fn submit(&mut self, now: u64) -> Result<(), FormError> {
        let action = self.form.submit(self.store.state(), now)?;
        self.store.dispatch(action);
        self.canvas.clear();
        Ok(())
    }

    /// Load a piece into the form and canvas for editing.
    /// Returns false if `index` doesn't refer to a piece.
    pub fn start_edit(&mut self, index: usize) -> bool {
        if index >= self.state().pieces.len() {
            log::warn!("Cannot edit piece {}: out of range", index);
            return false;
        }
        self.store.dispatch(Action::SetEditing(Some(index)));
        self.restore_session();
        true
    }

    /// Leave edit mode without saving.
    pub fn cancel_edit(&mut self) {
        self.store.dispatch(Action::SetEditing(None));
        self.form.reset();
        self.canvas.clear();
    }

    // ------------------------------------------------------------------
    // Annotation canvas
    // ------------------------------------------------------------------

    pub fn canvas(&self) -> &AnnotationCanvas {
        &self.canvas
    }

    /// Tool settings and other direct canvas access.
    pub fn canvas_mut(&mut self) -> &mut AnnotationCanvas {
        &mut self.canvas
    }

    pub fn set_canvas_origin(&mut self, x: f32, y: f32) {
        self.canvas.set_origin(ClientPoint::new(x, y));
    }

    /// Follow the container width; the height stays fixed.
    pub fn resize_canvas(&mut self, width: u32) -> Result<(), CanvasError> {
        let height = self.canvas.height();
        self.canvas.resize(width, height)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), CanvasError> {
        let change = self.canvas.handle_pointer(event)?;
        self.report_drawing(change);
        Ok(())
    }

    pub fn undo_drawing(&mut self) -> Result<(), CanvasError> {
        let change = self.canvas.undo()?;
        self.report_drawing(change);
        Ok(())
    }

    pub fn redo_drawing(&mut self) -> Result<(), CanvasError> {
        let change = self.canvas.redo()?;
        self.report_drawing(change);
        Ok(())
    }

    pub fn clear_drawing(&mut self) {
        let change = self.canvas.clear();
        self.report_drawing(change);
    }

    fn report_drawing(&mut self, change: DrawingChange) {
        if let Some(action) = change.into_action() {
            self.store.dispatch(action);
        }
    }

    /// Show a stored drawing; an undecodable one is dropped with a warning.
    fn load_canvas(&mut self, drawing: Option<&str>) {
        if let Err(e) = self.canvas.load_drawing(drawing) {
            log::warn!("Could not load drawing into canvas: {}", e);
            let change = self.canvas.clear();
            self.report_drawing(change);
        }
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    pub fn query(&self) -> &PieceQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut PieceQuery {
        &mut self.query
    }

    /// Visible rows with the current sort and filter.
    pub fn rows(&self) -> Vec<Row<'_>> {
        self.query.apply(&self.state().pieces)
    }

    /// Delete a piece after `confirm` accepts the confirmation message.
    ///
    /// An edit in progress stays on the same piece: it is cancelled if that
    /// piece is deleted and follows it if an earlier piece is deleted.
    /// Returns whether the piece was deleted.
    pub fn delete_piece(&mut self, index: usize, confirm: impl FnOnce(&str) -> bool) -> bool {
        if index >= self.state().pieces.len() {
            log::warn!("Cannot delete piece {}: out of range", index);
            return false;
        }
        if !confirm(DELETE_CONFIRMATION) {
            log::debug!("Deletion of piece {} declined", index);
            return false;
        }

        let delete = Action::DeletePiece(index);
        let editing = self.state().editing_index;
        match editing {
            Some(edited) if edited == index => {
                self.store.dispatch_all([delete, Action::SetEditing(None)]);
                self.form.reset();
                self.canvas.clear();
            }
            Some(edited) if edited > index => {
                let drawing = self.state().current_drawing.clone();
                self.store.dispatch_all([
                    delete,
                    Action::SetEditing(Some(edited - 1)),
                    Action::SetDrawing(drawing),
                ]);
            }
            _ => self.store.dispatch(delete),
        }
        true
    }

    // ------------------------------------------------------------------
    // Summary and reports
    // ------------------------------------------------------------------

    pub fn totals(&self) -> Totals {
        Totals::of(&self.state().pieces)
    }

    /// Total area and value as displayed: `("0.38 m²", "R$ 200,00")`.
    pub fn totals_text(&self) -> (String, String) {
        let totals = self.totals();
        (format_area(totals.area), self.currency.format(totals.value))
    }

    /// Reports are only offered once there is at least one piece.
    pub fn can_export(&self) -> bool {
        !self.state().pieces.is_empty()
    }

    pub fn report(&self, variant: ReportVariant, date: Date) -> Document {
        generate(variant, &self.state().pieces, date, &self.currency)
    }

    /// Render a report and hand it to `sink` under its standard filename.
    pub fn export(
        &self,
        variant: ReportVariant,
        date: Date,
        renderer: &impl DocumentRenderer,
        sink: &mut impl ReportSink,
    ) -> Result<(), ReportError> {
        if !self.can_export() {
            return Err(ReportError::NothingToExport);
        }
        let bytes = renderer.render(&self.report(variant, date))?;
        sink.save(variant.filename(), &bytes)?;
        log::info!("📤 Exported {}", variant.filename());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_CANVAS_HEIGHT, STATE_STORAGE_KEY};
    use crate::drawing::Tool;
    use crate::listing::SortField;
    use crate::state::MemoryStorage;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn calculator() -> Calculator<MemoryStorage> {
        Calculator::new(MemoryStorage::new(), &AppConfig::default()).unwrap()
    }

    fn add_piece(calc: &mut Calculator<MemoryStorage>, quantity: &str, width: &str, now: u64) {
        calc.form_mut().set_quantity(quantity);
        calc.form_mut().set_width(width);
        calc.form_mut().set_height("15");
        calc.form_mut().set_unit_price("100");
        calc.submit(now).unwrap();
    }

    fn stroke(calc: &mut Calculator<MemoryStorage>, y: f32) {
        calc.handle_pointer(PointerEvent::Down(ClientPoint::new(10.0, y)))
            .unwrap();
        calc.handle_pointer(PointerEvent::Move(ClientPoint::new(100.0, y)))
            .unwrap();
        calc.handle_pointer(PointerEvent::Up).unwrap();
    }

    /// Collects sink output in memory.
    #[derive(Default)]
    struct MemorySink(HashMap<String, Vec<u8>>);

    impl ReportSink for MemorySink {
        fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
            self.0.insert(filename.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    /// Renders the text lines instead of a PDF.
    struct TextRenderer;

    impl DocumentRenderer for TextRenderer {
        fn render(&self, document: &Document) -> Result<Vec<u8>, ReportError> {
            Ok(document.texts().collect::<Vec<_>>().join("\n").into_bytes())
        }
    }

    #[test]
    fn test_group_names_are_trimmed() {
        let mut calc = calculator();
        assert!(!calc.add_group("   "));
        assert!(calc.add_group("  Cozinha "));
        assert_eq!(calc.groups()[0].name, "Cozinha");
        assert_eq!(calc.state().active_group, "Cozinha");
    }

    #[test]
    fn test_kitchen_scenario_totals() {
        let mut calc = calculator();
        calc.add_group("Kitchen");
        add_piece(&mut calc, "2", "125", 1);

        let piece = &calc.state().pieces[0];
        assert!((piece.area() - 0.375).abs() < 1e-9);
        assert!((piece.total_value() - 200.0).abs() < 1e-9);
        assert_eq!(
            calc.totals_text(),
            ("0.38 m²".to_string(), "R$ 200,00".to_string())
        );
        assert!(calc.can_export());
    }

    #[test]
    fn test_submit_without_group_changes_nothing() {
        let mut calc = calculator();
        calc.form_mut().set_width("10");
        calc.form_mut().set_height("10");
        assert_eq!(calc.submit(0), Err(FormError::NoActiveGroup));
        assert!(calc.state().pieces.is_empty());
    }

    #[test]
    fn test_drawing_flows_into_piece() {
        let mut calc = calculator();
        calc.add_group("Sala");
        stroke(&mut calc, 50.0);
        assert!(calc.state().current_drawing.is_some());

        add_piece(&mut calc, "1", "80", 1);
        assert!(calc.state().pieces[0].has_drawing());
        assert_eq!(calc.state().current_drawing, None);
        assert!(calc.canvas().history().is_empty());
    }

    #[test]
    fn test_undo_redo_reports_drawing() {
        let mut calc = calculator();
        stroke(&mut calc, 20.0);
        let first = calc.state().current_drawing.clone();
        stroke(&mut calc, 80.0);
        calc.undo_drawing().unwrap();
        assert_eq!(calc.state().current_drawing, first);
        calc.undo_drawing().unwrap();
        assert_eq!(calc.state().current_drawing, None);
        calc.redo_drawing().unwrap();
        assert_eq!(calc.state().current_drawing, None);
    }

    #[test]
    fn test_tool_change_survives_undo() {
        let mut calc = calculator();
        calc.canvas_mut().tools_mut().tool = Tool::Eraser;
        stroke(&mut calc, 20.0);
        calc.undo_drawing().unwrap();
        assert_eq!(calc.canvas().tools().tool, Tool::Eraser);
    }

    #[test]
    fn test_edit_keeps_id_and_drawing() {
        let mut calc = calculator();
        calc.add_group("Sala");
        stroke(&mut calc, 50.0);
        add_piece(&mut calc, "1", "80", 1);
        let id = calc.state().pieces[0].id().to_string();
        let drawing = calc.state().pieces[0].drawing().to_string();

        assert!(calc.start_edit(0));
        assert_eq!(calc.form().width(), "80");
        assert_eq!(calc.canvas().history().len(), 1);
        assert_eq!(calc.state().current_drawing.as_deref(), Some(drawing.as_str()));

        calc.form_mut().set_quantity("3");
        calc.submit(99).unwrap();
        let piece = &calc.state().pieces[0];
        assert_eq!(calc.state().pieces.len(), 1);
        assert_eq!(piece.id(), id);
        assert_eq!(piece.quantity(), 3);
        assert_eq!(piece.drawing(), drawing);
        assert!((piece.total_value() - 300.0).abs() < 1e-9);
        assert!(!calc.state().is_editing());
    }

    #[test]
    fn test_start_edit_out_of_range() {
        let mut calc = calculator();
        assert!(!calc.start_edit(0));
        assert!(!calc.state().is_editing());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "80", 1);

        let mut asked = String::new();
        assert!(!calc.delete_piece(0, |msg| {
            asked = msg.to_string();
            false
        }));
        assert_eq!(asked, DELETE_CONFIRMATION);
        assert_eq!(calc.state().pieces.len(), 1);

        assert!(calc.delete_piece(0, |_| true));
        assert!(calc.state().pieces.is_empty());
        assert!(!calc.can_export());
    }

    #[test]
    fn test_delete_keeps_edit_on_same_piece() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "10", 1);
        add_piece(&mut calc, "1", "20", 2);
        add_piece(&mut calc, "1", "30", 3);
        let edited_id = calc.state().pieces[2].id().to_string();

        calc.start_edit(2);
        stroke(&mut calc, 40.0);
        let in_progress = calc.state().current_drawing.clone();
        calc.delete_piece(0, |_| true);

        let (index, piece) = calc.state().editing_piece().unwrap();
        assert_eq!(index, 1);
        assert_eq!(piece.id(), edited_id);
        assert_eq!(calc.state().current_drawing, in_progress);
    }

    #[test]
    fn test_delete_while_editing_never_exposes_stale_index() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "10", 1);
        add_piece(&mut calc, "1", "20", 2);
        add_piece(&mut calc, "1", "30", 3);
        calc.start_edit(2);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        calc.subscribe(move |state| {
            sink.borrow_mut()
                .push((state.editing_index, state.pieces.len()))
        });
        calc.delete_piece(0, |_| true);
        calc.delete_piece(1, |_| true);

        assert_eq!(*seen.borrow(), vec![(Some(1), 2), (None, 1)]);
    }

    #[test]
    fn test_deleting_edited_piece_cancels_edit() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "10", 1);
        calc.start_edit(0);
        calc.delete_piece(0, |_| true);
        assert!(!calc.state().is_editing());
        assert_eq!(calc.form(), &PieceForm::default());
    }

    #[test]
    fn test_rows_address_store_indices() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "10", 1);
        add_piece(&mut calc, "1", "20", 2);
        // newest first: the first row is store index 1
        let first = calc.rows()[0].index;
        assert_eq!(first, 1);
        calc.delete_piece(first, |_| true);
        assert!((calc.state().pieces[0].width() - 0.1).abs() < 1e-12);

        calc.query_mut().sort_by(SortField::Area);
        assert_eq!(calc.rows().len(), 1);
    }

    #[test]
    fn test_export_both_reports() {
        let mut calc = calculator();
        let date = time::Date::from_calendar_date(2024, time::Month::March, 5).unwrap();
        let mut sink = MemorySink::default();
        assert!(matches!(
            calc.export(ReportVariant::Client, date, &TextRenderer, &mut sink),
            Err(ReportError::NothingToExport)
        ));

        calc.add_group("Cozinha");
        add_piece(&mut calc, "2", "125", 1);
        calc.export(ReportVariant::Client, date, &TextRenderer, &mut sink)
            .unwrap();
        calc.export(ReportVariant::Technical, date, &TextRenderer, &mut sink)
            .unwrap();

        let client = String::from_utf8(sink.0["orcamento-cliente.pdf"].clone()).unwrap();
        assert!(client.contains("Valor Total: R$ 200,00"));
        let technical = String::from_utf8(sink.0["rascunho-tecnico.pdf"].clone()).unwrap();
        assert!(technical.contains("Rascunho Técnico de Medidas"));
    }

    #[test]
    fn test_state_persists_across_sessions() {
        let mut calc = calculator();
        calc.add_group("Sala");
        add_piece(&mut calc, "1", "50", 1);
        calc.start_edit(0);

        let storage = calc.store().storage().clone();
        assert!(storage.get(STATE_STORAGE_KEY).is_some());
        let reopened = Calculator::new(storage, &AppConfig::default()).unwrap();
        assert_eq!(reopened.state().pieces.len(), 1);
        assert!(reopened.state().is_editing());
        assert_eq!(reopened.form().width(), "50");
    }

    #[test]
    fn test_pending_drawing_survives_reload() {
        let mut calc = calculator();
        calc.add_group("Sala");
        stroke(&mut calc, 50.0);
        let drawing = calc.state().current_drawing.clone();
        assert!(drawing.is_some());

        let storage = calc.store().storage().clone();
        let mut reopened = Calculator::new(storage, &AppConfig::default()).unwrap();
        assert_eq!(reopened.state().current_drawing, drawing);
        assert_eq!(reopened.canvas().history().len(), 1);
        let px = reopened.canvas().pixmap().pixel(50, 50).unwrap();
        assert_ne!(px.red(), 255);

        reopened.undo_drawing().unwrap();
        assert_eq!(reopened.state().current_drawing, None);

        add_piece(&mut reopened, "1", "10", 5);
        assert!(!reopened.state().pieces[0].has_drawing());
    }

    #[test]
    fn test_undo_on_blank_canvas_drops_stale_drawing() {
        let mut calc = calculator();
        calc.add_group("Sala");
        calc.store.dispatch(Action::SetDrawing(Some("stale".to_string())));
        assert!(calc.canvas().history().is_empty());

        calc.undo_drawing().unwrap();
        assert_eq!(calc.state().current_drawing, None);
    }

    #[test]
    fn test_undecodable_pending_drawing_is_dropped() {
        let mut store = Store::open(MemoryStorage::new());
        store.dispatch(Action::SetDrawing(Some("not an image".to_string())));

        let calc = Calculator::new(store.storage().clone(), &AppConfig::default()).unwrap();
        assert_eq!(calc.state().current_drawing, None);
        assert!(calc.canvas().history().is_empty());
    }

    #[test]
    fn test_zero_canvas_height_uses_default() {
        let mut config = AppConfig::default();
        config.canvas.height = 0;
        let calc = Calculator::new(MemoryStorage::new(), &config).unwrap();
        assert_eq!(calc.canvas().height(), DEFAULT_CANVAS_HEIGHT);
    }

    #[test]
    fn test_config_applies_to_canvas() {
        let mut config = AppConfig::default();
        config.canvas.height = 120;
        config.canvas.default_color = "#ff0000".to_string();
        config.preferences.currency_symbol = "US$".to_string();
        let calc = Calculator::new(MemoryStorage::new(), &config).unwrap();
        assert_eq!(calc.canvas().height(), 120);
        assert_eq!(calc.canvas().tools().color.to_hex(), "#ff0000");
        assert_eq!(calc.totals_text().1, "US$ 0,00");
    }
}
