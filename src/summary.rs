//! Aggregate totals over pieces.

use crate::model::Piece;

/// Total area and value of a set of pieces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    /// Sum of piece areas in square meters
    pub area: f64,
    /// Sum of piece total values
    pub value: f64,
    /// Number of piece records (not quantities)
    pub count: usize,
}

impl Totals {
    pub fn of<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> Self {
        pieces.into_iter().fold(Self::default(), |acc, piece| Self {
            area: acc.area + piece.area(),
            value: acc.value + piece.total_value(),
            count: acc.count + 1,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
