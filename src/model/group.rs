//! Group (space/room) data model.

use serde::{Deserialize, Serialize};

/// A named space the user is measuring pieces for, e.g. "Cozinha".
///
/// Pieces reference groups by `name`, not by `id`. Groups are never renamed
/// or removed, so the name link can't dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: String,
    /// Display name, unique within the application state
    pub name: String,
}

impl Group {
    /// Create a group with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            name: name.into(),
        }
    }
}
