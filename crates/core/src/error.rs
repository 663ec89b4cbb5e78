/// Errors raised by the engine.
///
/// Only structurally invalid input is an error. Missing dates, types or stop reasons are data
/// uncertainty and are reported as ambiguous values in the returned results instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("a treatment criterion needs target treatments or a category")]
    AmbiguousCriterion,
    #[error("a treatment history entry needs at least one treatment")]
    EmptyEntry,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown name: {0}")]
    UnknownName(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
