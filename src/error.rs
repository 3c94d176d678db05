//! Error types for the bootstrap sequence
//!
//! Everything except [`BootstrapError::InvalidName`] is a soft failure: the loader
//! folds it into a `false` result and a log record instead of handing it to callers.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of one step of the bootstrap sequence
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The logical library name cannot be mapped to a file name
    #[error("invalid library name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// No bundled resource matches the platform file name
    #[error("unable to find native library resource: {0}")]
    ResourceNotFound(String),

    /// The resource could not be copied to a temp file
    #[error("failed to extract {resource} into {}", .dir.display())]
    Extraction {
        resource: String,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The native layer refused to initialize
    #[error(transparent)]
    Native(#[from] NativeError),
}

/// Failure reported by the native subsystem boundary
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("no library path registered under {0:?}")]
    PathNotRegistered(String),

    #[error("could not link native library {}", .path.display())]
    Link {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("native library has no symbol {symbol:?}")]
    MissingSymbol {
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("native open returned a negative value: {0}")]
    NegativeStatus(i32),

    #[error("native binding panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
