//! Error types for option payload conversion.

use thiserror::Error;

/// Errors when converting option values to or from plain JSON.
///
/// The resolution path itself never fails: missing fields resolve to null,
/// unknown artifacts resolve to the empty annotation. Errors only arise at
/// the JSON boundary.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("unresolved reference \"{key}\" at {path}")]
    UnresolvedRef { path: String, key: String },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}
