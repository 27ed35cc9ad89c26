//! Metragem - measurement and quotation calculator
//!
//! Users define named spaces ("groups"), record pieces with quantity,
//! dimensions, unit price, notes and a freehand annotation drawing, and get
//! area and cost totals plus client and technical PDF reports. All state is
//! persisted locally as a single JSON document.

pub mod calculator;
pub mod clock;
pub mod config;
pub mod constants;
pub mod drawing;
pub mod form;
pub mod listing;
pub mod model;
pub mod report;
pub mod state;
pub mod summary;
pub mod units;

pub use calculator::Calculator;
pub use config::AppConfig;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
