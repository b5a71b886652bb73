use thiserror::Error;

#[derive(Error, Debug)]
pub enum BitgaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Formula error: {0}")]
    Formula(String),

    #[error("Engine has already completed its run")]
    AlreadyRun,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Failure to evaluate the objective for a single phenotype.
///
/// These never abort a run; the affected individual is carried with an
/// undefined fitness and ranked behind every evaluated individual.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("objective is not finite at x = {x}: {value}")]
    NonFinite { x: f64, value: f64 },

    #[error("division by zero at x = {x}")]
    DivisionByZero { x: f64 },

    #[error("{function}({arg}) is outside the function's domain")]
    Domain { function: &'static str, arg: f64 },
}

pub type Result<T> = std::result::Result<T, BitgaError>;
