//! Error types

use thiserror::Error;

/// Failure of an analysis run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The routine has no blocks to analyze.
    #[error("routine '{routine}' has no blocks")]
    EmptyRoutine { routine: String },

    /// A terminator or the entry refers to a block that does not exist.
    #[error("routine '{routine}' refers to unknown block {block}")]
    UnknownBlock { routine: String, block: usize },

    /// A parameter or variable name is not an identifier.
    #[error("routine '{routine}' uses invalid variable name '{name}'")]
    InvalidName { routine: String, name: String },

    /// The worklist did not reach a fixed point within the visit bound.
    #[error("routine '{routine}' did not reach a fixed point after {visits} block visits")]
    FixedPointDivergence { routine: String, visits: usize },
}

/// Failure to load an [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failure of a JSON entry point.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid routine JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
