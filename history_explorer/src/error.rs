//! Crate error type.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// External capability an operation needs but the host did not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Camera,
    PrimaryWindow,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Camera => f.write_str("3d camera"),
            Surface::PrimaryWindow => f.write_str("primary window"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("required surface missing: {0}")]
    MissingSurface(Surface),

    #[error("failed to read catalog {}: {source}", path.display())]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("duplicate catalog id {0:?}")]
    DuplicateId(String),

    #[error("invalid catalog record {id:?}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),
}

pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;
