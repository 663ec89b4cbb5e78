//! YAML wire/boundary support for treatment histories.
//!
//! This crate provides the **wire model** and **format/translation helpers** for a patient's
//! treatment history stored as YAML:
//! - strict parsing into validated `treatline-core` entries
//! - rendering of entries back to YAML
//!
//! The wire model is internal. Callers only ever see `treatline_core::TreatmentHistoryEntry`.

pub mod history;

pub use history::TreatmentHistoryYaml;

use treatline_core::EngineError;

/// Errors returned by the `treatline-records` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid treatment history: {0}")]
    Engine(#[from] EngineError),
}

/// Type alias for Results that can fail with a [`RecordsError`].
pub type RecordsResult<T> = Result<T, RecordsError>;
