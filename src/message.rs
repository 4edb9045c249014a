//! Message protocol definitions
//!
//! Typed messages layered on top of frames: `ClientMessage` is decoded from an
//! inbound frame, `ServerMessage` renders to an outbound frame.

use crate::codec::{pack_fields, unpack_fields, Frame};
use crate::error::{FramingError, RoutingError};
use crate::types::MessageKind;

/// Control prefix for the online user list
pub const USER_LIST_PREFIX: &str = "[USER_LIST] ";
/// Control prefix for errors
pub const ERROR_PREFIX: &str = "[ERROR] ";
/// Control prefix for informational notices
pub const INFO_PREFIX: &str = "[INFO] ";
/// Body of the `[INFO]` notice sent right before the server goes away
pub const SHUTDOWN_NOTICE: &str = "Server shutdown";

/// Client → Server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Public chat line
    PublicText { body: String },
    /// Private line; `body` is empty when the client sent only a target
    PrivateText { target: String, body: String },
    /// File for everyone
    PublicFile { name: String, data: Vec<u8> },
    /// File for one user
    PrivateFile {
        target: String,
        name: String,
        data: Vec<u8>,
    },
    /// A kind clients must not send (control)
    Unexpected(MessageKind),
}

impl ClientMessage {
    /// Decode a frame read from a client
    pub fn from_frame(frame: Frame) -> Result<Self, FramingError> {
        match frame.kind {
            MessageKind::PublicText => Ok(Self::PublicText {
                body: String::from_utf8(frame.payload)?,
            }),
            MessageKind::PrivateText => {
                let text = String::from_utf8(frame.payload)?;
                let (target, body) = split_target(&text);
                Ok(Self::PrivateText {
                    target: target.to_string(),
                    body: body.to_string(),
                })
            }
            MessageKind::PublicFile => {
                let fields = unpack_fields(&frame.payload, 2)?;
                Ok(Self::PublicFile {
                    name: field_text(fields[0])?,
                    data: fields[1].to_vec(),
                })
            }
            MessageKind::PrivateFile => {
                let fields = unpack_fields(&frame.payload, 3)?;
                Ok(Self::PrivateFile {
                    target: field_text(fields[0])?,
                    name: field_text(fields[1])?,
                    data: fields[2].to_vec(),
                })
            }
            MessageKind::Control => Ok(Self::Unexpected(MessageKind::Control)),
        }
    }

    /// Encode as a client would send it
    pub fn to_frame(&self) -> Frame {
        match self {
            Self::PublicText { body } => Frame::new(MessageKind::PublicText, body.as_bytes()),
            Self::PrivateText { target, body } => Frame::new(
                MessageKind::PrivateText,
                format!("{} {}", target, body).into_bytes(),
            ),
            Self::PublicFile { name, data } => Frame::new(
                MessageKind::PublicFile,
                pack_fields(&[name.as_bytes(), data.as_slice()]),
            ),
            Self::PrivateFile { target, name, data } => Frame::new(
                MessageKind::PrivateFile,
                pack_fields(&[target.as_bytes(), name.as_bytes(), data.as_slice()]),
            ),
            Self::Unexpected(kind) => Frame::new(*kind, Vec::new()),
        }
    }
}

/// Split `"<target> <body>"` once on the first whitespace run
fn split_target(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

fn field_text(field: &[u8]) -> Result<String, FramingError> {
    Ok(String::from_utf8(field.to_vec())?)
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Rendered public line `"<timestamp>|<sender>|<body>"`
    Public { line: String },
    /// Rendered private line, same layout as public
    Private { line: String },
    /// Forwarded public file
    PublicFile {
        from: String,
        name: String,
        data: Vec<u8>,
    },
    /// Forwarded private file
    PrivateFile {
        from: String,
        name: String,
        data: Vec<u8>,
    },
    /// Comma-separated online names
    UserList(Vec<String>),
    /// Error notice for one client
    Error(String),
    /// Informational notice
    Info(String),
}

impl ServerMessage {
    pub fn to_frame(&self) -> Frame {
        match self {
            Self::Public { line } => Frame::new(MessageKind::PublicText, line.as_bytes()),
            Self::Private { line } => Frame::new(MessageKind::PrivateText, line.as_bytes()),
            Self::PublicFile { from, name, data } => Frame::new(
                MessageKind::PublicFile,
                pack_fields(&[from.as_bytes(), name.as_bytes(), data.as_slice()]),
            ),
            Self::PrivateFile { from, name, data } => Frame::new(
                MessageKind::PrivateFile,
                pack_fields(&[from.as_bytes(), name.as_bytes(), data.as_slice()]),
            ),
            Self::UserList(names) => {
                Frame::control(format!("{}{}", USER_LIST_PREFIX, names.join(",")))
            }
            Self::Error(text) => Frame::control(format!("{}{}", ERROR_PREFIX, text)),
            Self::Info(text) => Frame::control(format!("{}{}", INFO_PREFIX, text)),
        }
    }
}

/// Render a chat line as delivered to clients
pub fn render_line(timestamp: &str, sender: &str, body: &str) -> String {
    format!("{}|{}|{}", timestamp, sender, body)
}

pub fn joined_notice(name: &str) -> String {
    format!("{} Bergabung dalam obrolan", name)
}

pub fn left_notice(name: &str) -> String {
    format!("{} Meninggalkan obrolan", name)
}

pub fn file_sent_notice(name: &str) -> String {
    format!("{} berhasil terkirim", name)
}

pub fn private_file_sent_notice(name: &str, target: &str) -> String {
    format!("{} berhasil terkirim ke {}", name, target)
}

/// Convert RoutingError to ServerMessage for client notification
impl From<RoutingError> for ServerMessage {
    fn from(err: RoutingError) -> Self {
        ServerMessage::Error(err.to_string())
    }
}
