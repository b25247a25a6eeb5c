//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, the assessment store and telemetry shared across the app.

pub mod constants;
pub mod store;
pub mod telemetry;

pub use constants::*;
pub use store::*;
pub use telemetry::*;
