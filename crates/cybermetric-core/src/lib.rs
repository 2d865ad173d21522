//! cybermetric-core: Core evaluation engine, answer extraction, and scoring.
//!
//! This crate defines the data model, the model-client trait, and the
//! retry-and-extract evaluation loop that the rest of the CyberMetric
//! harness builds on.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod prompt;
pub mod report;
pub mod results;
pub mod traits;

pub use error::ConfigError;
pub use model::{Answer, Answers, Dataset, QuestionRecord};
