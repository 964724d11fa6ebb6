//! Error types for compose-gen

use thiserror::Error;

/// Result type for compose-gen operations
pub type Result<T> = std::result::Result<T, ComposeError>;

/// compose-gen error types
///
/// Every variant is terminal: the CLI prints it on one line and exits
/// with a nonzero status.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("{0}")]
    InvalidOption(String),

    #[error("only one of {0} and {1} may be used at a time")]
    ConflictingOptions(&'static str, &'static str),

    #[error("unable to get current user: {0}")]
    Identity(String),

    #[error("unable to open file for writing: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for ComposeError {
    fn from(err: serde_yaml::Error) -> Self {
        ComposeError::Yaml(err.to_string())
    }
}
