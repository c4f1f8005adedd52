use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("invalid instrument id: {0:?}")]
    InvalidInstrumentId(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("search page returned status {status}: {message}")]
    NavigationStatus { status: u16, message: String },

    #[error("no link matching {0:?} on the current page")]
    MissingControl(String),

    #[error("details request failed: {0}")]
    EndpointHttp(String),

    #[error("details endpoint returned status {status}: {message}")]
    EndpointStatus { status: u16, message: String },

    #[error("cannot map details of {id}: {reason}")]
    Mapping { id: String, reason: String },

    #[error("details of {id} have no {key} indicator")]
    MissingIndicator { id: String, key: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("cannot parse {path}: {reason}")]
    ArtifactParse { path: String, reason: String },
}

impl CatalogError {
    /// Navigation failures abort the run; everything the fetcher raises is per-id.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            CatalogError::Navigation(_)
                | CatalogError::NavigationStatus { .. }
                | CatalogError::MissingControl(_)
        )
    }
}
