// src/error.rs

//! Error types shared by the index client, the XML-RPC layer and the CLI

use thiserror::Error;

/// Errors produced by the cache model, the remote index and snapshot handling
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was empty or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A local lookup was attempted without a package name
    #[error("Package name not supplied")]
    EmptyPackageName,

    /// A default release was supplied for a different version than requested
    #[error("Release version '{requested}' doesn't match the supplied default '{supplied}'")]
    VersionMismatch { requested: String, supplied: String },

    /// The remote index answered with an empty result
    #[error("Nothing found: {0}")]
    NothingFound(String),

    /// The requested operation is not exposed by the index
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The remote procedure returned an XML-RPC fault
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// HTTP transport failure
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Malformed XML-RPC document, snapshot or configuration
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// Failure while constructing a client
    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Whether this error only signals an empty remote result
    pub fn is_nothing_found(&self) -> bool {
        matches!(self, Error::NothingFound(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(format!("Invalid snapshot: {err}"))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ParseError(format!("Invalid configuration: {err}"))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
