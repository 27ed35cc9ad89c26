//! Piece entry form.
//!
//! Holds the raw text of every field and turns it into a create or update
//! [`Action`] on submit. Dimensions accept two units: text containing a
//! decimal mark (`.` or `,`) is read as meters, plain integers as
//! centimeters. `"125"` and `"1.25"` both mean 1.25 m, while `"1"` is 1 cm
//! and `"1.0"` is 1 m.

use crate::model::{Piece, PieceDraft, new_id};
use crate::state::{Action, AppState};

/// Submission errors, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// No group is selected
    #[error("Por favor, selecione um espaço")]
    NoActiveGroup,

    /// Width or height can't be parsed
    #[error("Dimensões inválidas. Use números ou números com ponto decimal.")]
    InvalidDimensions,
}

/// Leading decimal number of `text`, like JavaScript's `parseFloat`.
///
/// Leading whitespace is skipped and trailing garbage ignored: `"12abc"`
/// is 12, `"abc"` is None.
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // exponent only counts when digits follow
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parse dimension text into meters.
///
/// The first `,` becomes `.` and the text is trimmed. With a `.` the value
/// is meters, otherwise centimeters. Returns None when there is no number.
pub fn parse_dimension(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let sanitized = text.replacen(',', ".", 1);
    let sanitized = sanitized.trim();
    let value = parse_number_prefix(sanitized)?;
    if sanitized.contains('.') {
        Some(value)
    } else {
        Some(value / 100.0)
    }
}

/// Quantity text to a count of at least 1, like `parseInt` then clamp.
pub fn parse_quantity(text: &str) -> u32 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = count_digits(digits.as_bytes());
    if negative || len == 0 {
        return 1;
    }
    digits[..len].parse::<u32>().unwrap_or(u32::MAX).max(1)
}

/// Unit price text to a non-negative amount, 0 when unparseable.
///
/// Prices are read the way they are written in Brazil: when the text has a
/// comma, it is the decimal separator and dots group thousands
/// (`"1.234,56"`). Without a comma a dot is the decimal point.
pub fn parse_unit_price(text: &str) -> f64 {
    let normalized = if text.contains(',') {
        text.replace('.', "").replacen(',', ".", 1)
    } else {
        text.to_string()
    };
    let value = parse_number_prefix(&normalized).unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Show stored meters as form text that parses back to the same value.
///
/// Whole centimeters are shown as centimeter text (`1.25` → `"125"`);
/// anything finer keeps the meter value with its decimal point.
pub fn format_dimension_input(meters: f64) -> String {
    let cm = meters * 100.0;
    let whole = cm.round();
    if (cm - whole).abs() < 1e-9 {
        format!("{:.0}", whole)
    } else {
        format!("{}", meters)
    }
}

/// Raw field values of the piece form.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceForm {
    quantity: u32,
    width: String,
    height: String,
    unit_price: String,
    details: String,
    error: Option<FormError>,
}

impl Default for PieceForm {
    fn default() -> Self {
        Self {
            quantity: 1,
            width: String::new(),
            height: String::new(),
            unit_price: String::new(),
            details: String::new(),
            error: None,
        }
    }
}

impl PieceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn width(&self) -> &str {
        &self.width
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn unit_price(&self) -> &str {
        &self.unit_price
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// The error from the last failed submission.
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Quantity input changed; clamped to at least 1 right away.
    pub fn set_quantity(&mut self, text: &str) {
        self.quantity = parse_quantity(text);
    }

    pub fn set_width(&mut self, text: impl Into<String>) {
        self.width = text.into();
    }

    pub fn set_height(&mut self, text: impl Into<String>) {
        self.height = text.into();
    }

    pub fn set_unit_price(&mut self, text: impl Into<String>) {
        self.unit_price = text.into();
    }

    pub fn set_details(&mut self, text: impl Into<String>) {
        self.details = text.into();
    }

    /// Populate every field from a stored piece.
    pub fn load(&mut self, piece: &Piece) {
        self.quantity = piece.quantity().max(1);
        self.width = format_dimension_input(piece.width());
        self.height = format_dimension_input(piece.height());
        self.unit_price = format!("{}", piece.unit_price());
        self.details = piece.details().to_string();
        self.error = None;
    }

    /// Back to the empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Heading of the form.
    pub fn title(state: &AppState) -> &'static str {
        if state.is_editing() {
            "Editar Peça"
        } else {
            "Adicionar Peça"
        }
    }

    /// Text of the submit button.
    pub fn submit_label(state: &AppState) -> &'static str {
        if state.is_editing() {
            "Salvar Alterações"
        } else {
            "Adicionar Peça"
        }
    }

    /// Validate the fields and build the piece.
    ///
    /// In edit mode the result is an update that keeps the piece's id and
    /// creation time; otherwise a new piece created at `now`. The form is
    /// reset on success and keeps its fields plus the error on failure.
    pub fn submit(&mut self, state: &AppState, now: u64) -> Result<Action, FormError> {
        let result = self.build(state, now);
        match &result {
            Ok(action) => {
                log::debug!("📝 Form submitted: {}", action.name());
                self.reset();
            }
            Err(e) => {
                log::debug!("Form rejected: {}", e);
                self.error = Some(e.clone());
            }
        }
        result
    }

    fn build(&self, state: &AppState, now: u64) -> Result<Action, FormError> {
        let group = state.active_group().ok_or(FormError::NoActiveGroup)?;

        let width = parse_dimension(&self.width).filter(|w| valid_dimension(*w));
        let height = parse_dimension(&self.height).filter(|h| valid_dimension(*h));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(FormError::InvalidDimensions);
        };

        let draft = PieceDraft {
            group: group.to_string(),
            quantity: self.quantity.max(1),
            width,
            height,
            unit_price: parse_unit_price(&self.unit_price),
            details: self.details.clone(),
            drawing: state.current_drawing.clone().unwrap_or_default(),
        };

        Ok(match state.editing_piece() {
            Some((index, existing)) => Action::UpdatePiece {
                index,
                piece: Piece::new(existing.id(), draft, existing.created_at()),
            },
            None => Action::AddPiece(Piece::new(new_id(), draft, now)),
        })
    }
}

fn valid_dimension(meters: f64) -> bool {
    meters.is_finite() && meters > 0.0
}
