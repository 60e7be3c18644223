//! Error types for the clustering engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors surfaced by the engine.
///
/// Malformed data (missing or out-of-range geolocations, unknown keys) is
/// never an error; it is excluded or resolves to `None`. These variants cover
/// contract violations at the call site.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// A query was issued against an index that has never been loaded.
    #[error("cluster index has not been loaded")]
    NotLoaded,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}
