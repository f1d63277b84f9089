//! Error types for the Beacon client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused to create, join or reconnect to the room
    #[error("Server rejected '{event}': {reason}")]
    Rejected { event: &'static str, reason: String },

    /// A controller needs a room code to join
    #[error("A room code is required to join as controller")]
    MissingRoomCode,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Frame from the server could not be understood
    #[error("Unexpected frame from server: {0}")]
    Protocol(String),
}

/// Errors raised while reading a prompt line
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    NotANumber(String),
}
