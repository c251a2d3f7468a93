//! Build pipeline errors.

use std::path::PathBuf;

use acorn_platform::PlatformError;
use thiserror::Error;

use crate::pipeline::BuildAction;

/// Errors that can occur while building or programming a SoC.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot {action}: no successful build in this pipeline")]
    NotBuilt { action: BuildAction },

    #[error("{action} was already invoked on this pipeline")]
    AlreadyInvoked { action: BuildAction },

    #[error("{tool} failed: {detail}")]
    Toolchain { tool: String, detail: String },

    #[error("expected artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing SoC description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("programmer: {0}")]
    Platform(#[from] PlatformError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BuildError>;
