//! Error types for the key-value store client

use std::io;
use thiserror::Error;

/// Errors that can occur when interacting with the remote store
#[derive(Error, Debug)]
pub enum Error {
    /// No endpoint was available at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// A non-raw `get` received a body that is not valid JSON.
    /// The stored text can still be read with a raw-mode `get`.
    #[error("Value for key `{key}` is not valid JSON; retry in raw mode to read the stored text")]
    Decode {
        /// The key whose stored text failed to decode
        key: String,
    },

    /// The value passed to `set` could not be serialized
    #[error("Failed to serialize value: {0}")]
    Encode(#[from] serde_json::Error),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a status the operation does not accept
    #[error("Unexpected status {status} from {context}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// The operation that observed the status
        context: String,
    },

    /// The server answered with a body the client cannot interpret
    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the key carried by a [`Error::Decode`], if any.
    pub fn decode_key(&self) -> Option<&str> {
        match self {
            Error::Decode { key } => Some(key),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
