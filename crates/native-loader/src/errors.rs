use std::path::PathBuf;
use thiserror::Error;

/// Boxed platform error kept as the `source` of load failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid library identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    #[error("library {identifier} not found on the system search path or as bundled resource {resource}")]
    ResourceNotFound { identifier: String, resource: String },

    #[error("failed to extract bundled resource {resource}: {source}")]
    Extraction {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load native library {target}: {source}")]
    Load {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid loader config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl LoaderError {
    /// True when neither the system search path nor the bundled resources had the library.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::ResourceNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
