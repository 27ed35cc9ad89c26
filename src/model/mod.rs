//! Data models for the Metragem calculator.

mod group;
mod piece;

pub use group::Group;
pub use piece::{Piece, PieceDraft};

/// Generate a fresh unique identifier for a group or piece.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
