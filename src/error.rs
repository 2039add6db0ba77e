//! Errors surfaced by the parse and marshal operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Kind;

/// Errors during configuration loading or marshalling.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `.env` file could not be read or contains a malformed line.
    #[error("failed to load config file {path}: {source}")]
    SourceLoad {
        path: PathBuf,
        source: dotenvy::Error,
    },

    /// CLI arguments were rejected. Unknown flags never end up here.
    #[error("failed to parse config flags: {0}")]
    FlagParse(#[source] clap::Error),

    /// A merged value could not be converted to the field's kind.
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: Kind,
    },

    /// The merged mapping does not fit the destination type.
    #[error("failed to decode configuration: {0}")]
    Decode(#[source] serde_json::Error),

    /// The schema's validator rejected the decoded configuration.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// A value handed to the marshaller could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    Encode(#[source] serde_json::Error),
}
