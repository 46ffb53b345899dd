//! Error types for conversion and retrieval.
//!
//! Every failure in this crate is fatal to the run. The variants are grouped
//! so that the binary can tell a transport failure apart from a vendor
//! protocol change or a corrupted archive when it reports the error.

use thiserror::Error;

/// Coarse classification of a [`ConvertError`], used for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Protocol,
    Archive,
    Row,
    Serialization,
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Archive => "archive",
            ErrorCategory::Row => "row",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::Io => "io",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    // ------------------------------ Transport ------------------------------
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP request failed with status: {status}")]
    Status { status: reqwest::StatusCode },

    // ------------------------------ Protocol -------------------------------
    #[error("Response did not carry a Content-Disposition header")]
    MissingContentDisposition,

    #[error("The Content-Disposition value did not match the expected format: {value:?}")]
    MalformedContentDisposition { value: String },

    // ------------------------------- Archive -------------------------------
    #[error("Archive contains no entries")]
    EmptyArchive,

    #[error("Archive members do not share a single top-level directory ({first:?} vs {other:?})")]
    NoCommonDirectory { first: String, other: String },

    #[error("Archive member not found: {name}")]
    MissingMember { name: String },

    #[error("Unsupported compression method {method} for archive member {name}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("CRC-32 mismatch for archive member {name}: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    // --------------------------------- Rows --------------------------------
    #[error("{file}, line {line}: {reason}")]
    Row {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    // ---------------------------- Serialization ----------------------------
    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    // ---------------------------------- IO ---------------------------------
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::Transport(_) | ConvertError::Status { .. } => ErrorCategory::Transport,
            ConvertError::MissingContentDisposition
            | ConvertError::MalformedContentDisposition { .. } => ErrorCategory::Protocol,
            ConvertError::EmptyArchive
            | ConvertError::NoCommonDirectory { .. }
            | ConvertError::MissingMember { .. }
            | ConvertError::UnsupportedCompression { .. }
            | ConvertError::CrcMismatch { .. }
            | ConvertError::CorruptArchive(_) => ErrorCategory::Archive,
            ConvertError::Row { .. } | ConvertError::Csv { .. } => ErrorCategory::Row,
            ConvertError::Serialization(_) => ErrorCategory::Serialization,
            ConvertError::Io(_) => ErrorCategory::Io,
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        ConvertError::CorruptArchive(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
