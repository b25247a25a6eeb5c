//! Core Module - Business Logic
//!
//! Route catalog, environmental synthesis, risk scoring, manual entry and
//! the engine that ties them to the assessment store.

pub mod catalog;
pub mod engine;
pub mod manual;
pub mod risk_score;
pub mod synthesizer;

pub use catalog::*;
pub use engine::*;
pub use manual::*;
pub use risk_score::*;
pub use synthesizer::*;
