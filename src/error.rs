//! Error types for the relay
//!
//! Defines application-level errors plus the per-concern errors raised by the
//! codec, the handshake, routing, the file store and outbound queues.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Anything that ends a connection handler or stops the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken framing (fatal for the connection)
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Handshake failed before registration
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// File store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Channel send error (fatal - dispatcher is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),
}

/// Wire framing errors
///
/// Every variant terminates the connection that produced it.
#[derive(Debug, Error)]
pub enum FramingError {
    /// Stream closed before a complete header or payload
    #[error("connection closed mid-frame")]
    Closed,

    /// Header carries a kind outside 1..=5
    #[error("unknown message kind {0}")]
    UnknownKind(u32),

    /// Declared payload length exceeds the configured maximum
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// Length-prefixed fields do not parse
    #[error("malformed fields: {0}")]
    MalformedFields(String),

    /// Text payload is not UTF-8
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Underlying transport failure
    #[error("IO error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for FramingError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => FramingError::Closed,
            _ => FramingError::Io(err),
        }
    }
}

impl From<std::string::FromUtf8Error> for FramingError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        FramingError::InvalidUtf8
    }
}

/// Registration handshake errors
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Client sent nothing but whitespace
    #[error("empty name")]
    EmptyName,

    /// Name is not UTF-8 or contains whitespace, `,` or `|`
    #[error("invalid name")]
    InvalidName,

    /// Another registered connection already uses this name
    #[error("name '{0}' is already taken")]
    NameTaken(String),

    /// Connection is past the handshake already
    #[error("connection is already registered")]
    AlreadyRegistered,

    /// Connection closed before sending a name
    #[error("connection closed during handshake")]
    Closed,
}

/// Private routing errors
///
/// Recoverable: reported back to the sender as a control message.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No registered connection has this name
    #[error("{0} tidak ditemukan")]
    TargetNotFound(String),
}

/// File store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// File name has no usable final path component
    #[error("invalid file name '{0}'")]
    InvalidName(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound queue errors
///
/// Occurs when queueing a frame for a connection fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The connection's writer has gone away
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection is not draining its queue
    #[error("Channel full")]
    ChannelFull,
}
