//! Basic type definitions for the relay
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `MessageKind`: the frame kind carried in every header

use uuid::Uuid;

use crate::error::FramingError;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe connection identification.
/// Implements Hash and Eq for use as map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame kind (first header word)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKind {
    /// Public chat text
    PublicText = 1,
    /// Private chat text
    PrivateText = 2,
    /// File for everyone
    PublicFile = 3,
    /// File for one user
    PrivateFile = 4,
    /// Server -> client control line (`[USER_LIST]`, `[ERROR]`, `[INFO]`)
    Control = 5,
}

impl MessageKind {
    /// Wire value of this kind
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for MessageKind {
    type Error = FramingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::PublicText),
            2 => Ok(Self::PrivateText),
            3 => Ok(Self::PublicFile),
            4 => Ok(Self::PrivateFile),
            5 => Ok(Self::Control),
            other => Err(FramingError::UnknownKind(other)),
        }
    }
}
