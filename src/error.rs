//! Error types for Windows node configuration derivation

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required cluster resource (rendered worker MachineConfig, kubelet CA) is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// The rendered Ignition payload is malformed or failed validation
    #[error("Failed to parse ignition: {0}")]
    ParseError(String),

    /// An expected systemd unit or unit section is missing
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Reading or writing a local file failed
    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether retrying the same operation may succeed without new cluster state.
    ///
    /// NotFound, ParseError and MissingField describe the supplied data itself;
    /// callers must re-fetch resources before trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::IoError { .. } | Error::KubeError(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
