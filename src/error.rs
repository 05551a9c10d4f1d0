//! Error types for the ID list manager.
//!
//! Every condition that would leave the ID space in an untrustworthy state is
//! an [`Error`] with [`Severity::Fatal`]. The library never terminates the
//! process itself; the outermost caller decides what a fatal error means in
//! its context (the `logid` binary exits, a long-running service might only
//! refuse the request).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// How a caller should treat an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The ID space can no longer be trusted; stop.
    Fatal,
    /// Worth reporting, but the ID lists themselves are intact.
    Advisory,
}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The primary ID list could not be read.
    #[error("cannot read ID list file {path:?}: {source} (maybe need to create an empty file first? safety feature)")]
    ListFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A list file was read but its content is not a valid list.
    #[error("invalid list file {path:?}: {source}")]
    InvalidListFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The allocator configuration file could not be read.
    #[error("cannot read config file {path:?}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON (de)serialization of in-memory data failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Creating, writing or closing a list file failed.
    #[error("cannot write list file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid ID range: min={min} is greater than max={max}")]
    InvalidRange { min: u32, max: u32 },

    /// No free ID left inside the requested interval.
    #[error("no new ID possible: min={min}, max={max}, used={used}")]
    RangeExhausted { min: u32, max: u32, used: usize },

    #[error("{0:?} is an unknown ID search method (expected random, upward or downward)")]
    UnknownSearchMethod(String),

    /// A printf-style format string could not be scanned.
    #[error("malformed format string {format:?} at byte {position}")]
    MalformedFormat { format: String, position: usize },

    /// The diagnostic writer refused our text.
    #[error("diagnostic output failed: {0}")]
    Diagnostic(#[from] io::Error),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::UnknownSearchMethod(_) | Error::MalformedFormat { .. } | Error::Diagnostic(_) => {
                Severity::Advisory
            }
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub(crate) fn malformed_format(format: &str, position: usize) -> Self {
        Error::MalformedFormat {
            format: format.to_string(),
            position,
        }
    }
}
