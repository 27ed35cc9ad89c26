//! The application state snapshot and its persisted JSON shape.

use serde::{Deserialize, Serialize};

use crate::model::{Group, Piece};

/// Complete application state.
///
/// This is also the persisted document: field names are camelCase,
/// "not editing" is stored as `editingIndex: -1` and an absent drawing as
/// `currentDrawing: null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// All pieces, in insertion order
    #[serde(default)]
    pub pieces: Vec<Piece>,

    /// All groups, in insertion order
    #[serde(default)]
    pub groups: Vec<Group>,

    /// Name of the selected group, empty when none is selected
    #[serde(default)]
    pub active_group: String,

    /// Index into `pieces` of the piece being edited
    #[serde(default, with = "editing_index")]
    pub editing_index: Option<usize>,

    /// Annotation image for the piece being created or edited
    #[serde(default)]
    pub current_drawing: Option<String>,
}

impl AppState {
    /// Deserialize a persisted state.
    ///
    /// An `editingIndex` that doesn't point into `pieces` is dropped so the
    /// returned state always satisfies the editing invariant.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut state: Self = serde_json::from_str(json)?;
        if state
            .editing_index
            .is_some_and(|index| index >= state.pieces.len())
        {
            log::warn!(
                "Persisted editing index {:?} is out of range, ignoring",
                state.editing_index
            );
            state.editing_index = None;
        }
        Ok(state)
    }

    /// Serialize to the persisted JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The selected group name, if any.
    pub fn active_group(&self) -> Option<&str> {
        (!self.active_group.is_empty()).then_some(self.active_group.as_str())
    }

    /// Whether a group with exactly this name exists.
    pub fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    pub fn is_editing(&self) -> bool {
        self.editing_index.is_some()
    }

    /// The piece being edited together with its index.
    pub fn editing_piece(&self) -> Option<(usize, &Piece)> {
        let index = self.editing_index?;
        self.pieces.get(index).map(|piece| (index, piece))
    }
}

/// Serde adapter mapping `Option<usize>` to the `-1` sentinel.
mod editing_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
