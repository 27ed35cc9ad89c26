//! State transitions.
//!
//! Every change to the application state is an [`Action`] applied by
//! [`reduce`], which never mutates its input and always returns a complete
//! new state.

use super::AppState;
use crate::model::{Group, Piece};

/// A state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Add a group by name and select it; no-op if the name already exists
    AddGroup(String),
    /// Select a group by name (no existence check)
    SetActiveGroup(String),
    /// Append a piece and leave edit mode
    AddPiece(Piece),
    /// Replace the piece at `index` and leave edit mode
    UpdatePiece {
        /// Position of the piece to replace
        index: usize,
        /// The replacement
        piece: Piece,
    },
    /// Remove the piece at the given index
    DeletePiece(usize),
    /// Enter edit mode for a piece (loading its drawing), or leave it with `None`
    SetEditing(Option<usize>),
    /// Replace the in-progress annotation image
    SetDrawing(Option<String>),
}

impl Action {
    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddGroup(_) => "AddGroup",
            Action::SetActiveGroup(_) => "SetActiveGroup",
            Action::AddPiece(_) => "AddPiece",
            Action::UpdatePiece { .. } => "UpdatePiece",
            Action::DeletePiece(_) => "DeletePiece",
            Action::SetEditing(_) => "SetEditing",
            Action::SetDrawing(_) => "SetDrawing",
        }
    }
}

/// Apply an action to a state, producing the next state.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    log::debug!("🔁 Action: {}", action.name());

    match action {
        Action::AddGroup(name) => {
            if state.has_group(&name) {
                log::debug!("Group '{}' already exists", name);
                return state.clone();
            }
            let mut groups = state.groups.clone();
            groups.push(Group::new(name.clone()));
            AppState {
                groups,
                active_group: name,
                ..state.clone()
            }
        }
        Action::SetActiveGroup(name) => AppState {
            active_group: name,
            ..state.clone()
        },
        Action::AddPiece(piece) => {
            let mut pieces = state.pieces.clone();
            pieces.push(piece);
            AppState {
                pieces,
                editing_index: None,
                current_drawing: None,
                ..state.clone()
            }
        }
        Action::UpdatePiece { index, piece } => {
            if index >= state.pieces.len() {
                log::warn!(
                    "UpdatePiece index {} out of range ({} pieces)",
                    index,
                    state.pieces.len()
                );
            }
            let pieces = state
                .pieces
                .iter()
                .enumerate()
                .map(|(i, p)| if i == index { piece.clone() } else { p.clone() })
                .collect();
            AppState {
                pieces,
                editing_index: None,
                current_drawing: None,
                ..state.clone()
            }
        }
        Action::DeletePiece(index) => {
            let pieces = state
                .pieces
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, p)| p.clone())
                .collect();
            AppState {
                pieces,
                ..state.clone()
            }
        }
        Action::SetEditing(Some(index)) => match state.pieces.get(index) {
            Some(piece) => AppState {
                editing_index: Some(index),
                current_drawing: piece.has_drawing().then(|| piece.drawing().to_string()),
                ..state.clone()
            },
            None => {
                log::warn!(
                    "SetEditing index {} out of range ({} pieces)",
                    index,
                    state.pieces.len()
                );
                state.clone()
            }
        },
        Action::SetEditing(None) => AppState {
            editing_index: None,
            current_drawing: None,
            ..state.clone()
        },
        Action::SetDrawing(drawing) => AppState {
            current_drawing: drawing,
            ..state.clone()
        },
    }
}
