//! Application state management modules.

mod action;
mod app_state;
mod storage;
mod store;

pub use action::{Action, reduce};
pub use app_state::AppState;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, StateStorage, StorageError};
pub use store::{Store, SubscriptionId};
