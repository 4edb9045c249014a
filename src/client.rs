//! Client struct definition
//!
//! Represents a registered connection: its id, display name and the sending
//! end of its outbound frame queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::codec::Frame;
use crate::error::SendError;
use crate::types::ClientId;

/// Frames queued for a connection's writer task
pub type Outbound = Arc<Frame>;

/// Registered client information
///
/// The socket itself stays with the connection handler; this only holds
/// the queue feeding that connection's writer.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Display name chosen during the handshake
    pub name: String,
    /// Server → Client frame queue
    pub sender: mpsc::Sender<Outbound>,
}

impl Client {
    /// Create a new client with the given ID, name and queue
    pub fn new(id: ClientId, name: String, sender: mpsc::Sender<Outbound>) -> Self {
        Self { id, name, sender }
    }

    /// Queue a frame for this client without waiting
    ///
    /// A full queue means the peer stopped draining; callers treat both
    /// errors as a dead connection.
    pub fn send(&self, frame: Outbound) -> Result<(), SendError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
