//! Piece data model.
//!
//! A piece is one fabricated or installed item. Its `area` and
//! `total_value` are derived when the piece is built and stored alongside
//! the inputs, so fields are only reachable through accessors and a piece
//! is changed by building a replacement.

use serde::{Deserialize, Serialize};

/// User-supplied fields of a piece, before the derived values are computed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieceDraft {
    /// Name of the group the piece belongs to
    pub group: String,
    /// Number of identical items
    pub quantity: u32,
    /// Width in meters
    pub width: f64,
    /// Height in meters
    pub height: f64,
    /// Price of a single item
    pub unit_price: f64,
    /// Free-text notes ("furo de pia; polido")
    pub details: String,
    /// Serialized annotation image, empty when there is none
    pub drawing: String,
}

/// A stored piece record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    id: String,
    group: String,
    quantity: u32,
    width: f64,
    height: f64,
    unit_price: f64,
    #[serde(default)]
    details: String,
    area: f64,
    total_value: f64,
    #[serde(default)]
    drawing: String,
    created_at: u64,
}

impl Piece {
    /// Build a piece from a draft, computing `area` and `total_value`.
    pub fn new(id: impl Into<String>, draft: PieceDraft, created_at: u64) -> Self {
        let quantity = f64::from(draft.quantity);
        Self {
            id: id.into(),
            area: draft.width * draft.height * quantity,
            total_value: draft.unit_price * quantity,
            group: draft.group,
            quantity: draft.quantity,
            width: draft.width,
            height: draft.height,
            unit_price: draft.unit_price,
            details: draft.details,
            drawing: draft.drawing,
            created_at,
        }
    }

    /// Copy of the user-supplied fields, e.g. to populate an edit form.
    pub fn draft(&self) -> PieceDraft {
        PieceDraft {
            group: self.group.clone(),
            quantity: self.quantity,
            width: self.width,
            height: self.height,
            unit_price: self.unit_price,
            details: self.details.clone(),
            drawing: self.drawing.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Width in meters.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in meters.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Area in square meters, `width × height × quantity`.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Total price, `unit_price × quantity`.
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Serialized annotation image; empty when the piece has no drawing.
    pub fn drawing(&self) -> &str {
        &self.drawing
    }

    pub fn has_drawing(&self) -> bool {
        !self.drawing.is_empty()
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}
