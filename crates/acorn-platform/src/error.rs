//! Error types for board and platform operations.

use std::path::PathBuf;

/// Errors that can occur while describing or driving a board.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing board files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Board file not found.
    #[error("board file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Variant name not in the board table.
    #[error("unknown board variant '{name}' (expected one of: cle-215+, cle-215, cle-101)")]
    UnknownVariant {
        /// The rejected name.
        name: String,
    },

    /// Two pin groups share the same `(name, index)` key.
    #[error("duplicate resource {name}:{index}")]
    DuplicateResource {
        /// Group name.
        name: String,
        /// Group index.
        index: u32,
    },

    /// A requested pin group does not exist on this board.
    #[error("resource {name}{} not available on this board", index.map(|i| format!(":{i}")).unwrap_or_default())]
    MissingResource {
        /// Group name.
        name: String,
        /// Group index, if a specific one was requested.
        index: Option<u32>,
    },

    /// A pin group was requested twice in the same run.
    #[error("resource {name}:{index} already claimed")]
    ResourceAlreadyClaimed {
        /// Group name.
        name: String,
        /// Group index.
        index: u32,
    },

    /// Validation error in a board definition.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },

    /// An external tool exited unsuccessfully.
    #[error("`{program}` failed: {status}")]
    CommandFailed {
        /// Program name.
        program: String,
        /// Exit status or spawn error.
        status: String,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
