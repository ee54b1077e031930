use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading one of the static configuration tables.
///
/// These are fatal at startup: the core cannot resolve localities or
/// classify weather without valid tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("region '{name}' has inverted bounds (min exceeds max)")]
    InvalidBounds { name: String },
}
