//! Error kinds for the core, matching the taxonomy a certifying checker
//! needs to report distinct exit codes for distinct failure classes.

use std::path::PathBuf;

use thiserror::Error;

/// An error produced while resolving, analyzing or emitting obligations.
#[derive(Debug, Error)]
pub enum CertError {
    /// A malformed AIG, malformed mapping number, or incomplete mapping block.
    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Inputs/latches not reencoded, or a required justice literal is absent.
    #[error("structure error in {path}: {message}")]
    Structure { path: PathBuf, message: String },

    /// A user-pinned quantifier cap is incompatible with the witness, or a
    /// justice representation cannot be handled under the selected profile.
    #[error("unsupported configuration: {message}")]
    UnsupportedConfiguration { message: String },

    /// A shared-signal mapping refers to a literal that is not an
    /// input/latch of the named side, or duplicates a model-side entry.
    #[error("mapping error: {message}")]
    Mapping { message: String },

    /// The file could not be opened, read or written.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CertError {
    /// The process exit code this error kind is reported with, per the
    /// core's external-interface contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            CertError::Parse { .. } => 1,
            CertError::Structure { .. } => 2,
            CertError::Mapping { .. } => 3,
            CertError::UnsupportedConfiguration { .. } => 4,
            CertError::Io { .. } => 5,
        }
    }
}

/// The result type used throughout the core.
pub type Result<T> = std::result::Result<T, CertError>;
