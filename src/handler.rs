//! TCP connection handler
//!
//! Handles individual client connections: the raw name handshake, the framed
//! read loop, and the writer task draining the connection's outbound queue.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::client::{Client, Outbound};
use crate::codec::{read_frame, write_frame, DEFAULT_MAX_FRAME_BYTES};
use crate::dispatcher::Command;
use crate::error::{AppError, HandshakeError};
use crate::message::{ClientMessage, ServerMessage};
use crate::store::FileStore;
use crate::types::ClientId;

/// Raw signal asking the client for its display name
pub const NICK_SIGNAL: &[u8] = b"NICK";

/// Largest name read during the handshake
pub const MAX_NAME_BYTES: usize = 1024;

/// Per-connection settings shared by every handler
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub store: FileStore,
    pub max_frame_bytes: usize,
    pub queue_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            store: FileStore::default(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            queue_capacity: 64,
        }
    }
}

/// Handle a new TCP connection
///
/// Performs the name handshake, registers with the dispatcher, and runs the
/// read and write sides until either ends.
pub async fn handle_connection(
    mut stream: TcpStream,
    cmd_tx: mpsc::Sender<Command>,
    config: Arc<ConnectionConfig>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    let name = read_name(&mut stream).await?;
    let client_id = ClientId::new();

    let (reader, mut writer) = stream.into_split();

    // Create queue for server -> client frames. The dispatcher holds the only
    // sender, so evicting the client ends the writer task.
    let (msg_tx, mut msg_rx) = mpsc::channel::<Outbound>(config.queue_capacity);

    let (reply_tx, reply_rx) = oneshot::channel();
    cmd_tx
        .send(Command::Register {
            client: Client::new(client_id, name.clone(), msg_tx),
            reply: reply_tx,
        })
        .await
        .map_err(|_| AppError::ChannelSend)?;

    match reply_rx.await.map_err(|_| AppError::ChannelSend)? {
        Ok(()) => {}
        Err(HandshakeError::NameTaken(taken)) => {
            let notice = ServerMessage::Error(format!("Nama {} sudah digunakan", taken));
            let _ = write_frame(&mut writer, &notice.to_frame()).await;
            return Err(HandshakeError::NameTaken(taken).into());
        }
        Err(e) => return Err(e.into()),
    }

    info!("Client {} joined from {} as '{}'", client_id, peer_addr, name);

    let session = Session {
        client_id,
        name: name.clone(),
        cmd_tx: cmd_tx.clone(),
        config,
    };

    // Spawn read task (socket -> Command)
    let mut read_task = tokio::spawn(async move {
        if let Err(e) = session.read_loop(reader).await {
            debug!("Read loop for '{}' ended: {}", session.name, e);
        }
    });

    // Spawn write task (queue -> socket)
    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = msg_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &frame).await {
                debug!("Write failed, ending write task: {}", e);
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
            write_task.abort();
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    let _ = cmd_tx.send(Command::Unregister { client_id }).await;

    info!("Client {} ('{}') disconnected", client_id, name);

    Ok(())
}

/// Send the raw `NICK` signal and read the raw name reply
async fn read_name(stream: &mut TcpStream) -> Result<String, HandshakeError> {
    stream
        .write_all(NICK_SIGNAL)
        .await
        .map_err(|_| HandshakeError::Closed)?;

    let mut buf = vec![0u8; MAX_NAME_BYTES];
    let n = stream
        .read(&mut buf)
        .await
        .map_err(|_| HandshakeError::Closed)?;
    if n == 0 {
        return Err(HandshakeError::Closed);
    }
    buf.truncate(n);

    parse_name(buf)
}

/// Validate the raw name bytes
pub fn parse_name(raw: Vec<u8>) -> Result<String, HandshakeError> {
    let name = String::from_utf8(raw).map_err(|_| HandshakeError::InvalidName)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HandshakeError::EmptyName);
    }
    // Whitespace splits PM targets, `,` joins the user list, `|` separates chat line fields
    if name.chars().any(|c| c.is_whitespace() || c == ',' || c == '|') {
        return Err(HandshakeError::InvalidName);
    }
    Ok(name.to_string())
}

/// State owned by a registered connection's read task
struct Session {
    client_id: ClientId,
    name: String,
    cmd_tx: mpsc::Sender<Command>,
    config: Arc<ConnectionConfig>,
}

impl Session {
    /// Decode frames until the stream breaks
    async fn read_loop(&self, mut reader: OwnedReadHalf) -> Result<(), AppError> {
        loop {
            let frame = read_frame(&mut reader, self.config.max_frame_bytes).await?;
            let msg = ClientMessage::from_frame(frame)?;
            self.handle_message(msg).await?;
        }
    }

    async fn handle_message(&self, msg: ClientMessage) -> Result<(), AppError> {
        match msg {
            ClientMessage::PublicText { body } => {
                self.dispatch(Command::Broadcast {
                    sender: self.name.clone(),
                    body,
                })
                .await
            }
            ClientMessage::PrivateText { target, body } => {
                if target.is_empty() || body.is_empty() {
                    return self
                        .reply(ServerMessage::Error(
                            "Format pesan privat: <target> <pesan>".to_string(),
                        ))
                        .await;
                }
                self.dispatch(Command::Private {
                    client_id: self.client_id,
                    target,
                    body,
                })
                .await
            }
            ClientMessage::PublicFile { name, data } => {
                let Some(name) = self.persist(&name, &data).await? else {
                    return Ok(());
                };
                self.dispatch(Command::PublicFile {
                    client_id: self.client_id,
                    name,
                    data,
                })
                .await
            }
            ClientMessage::PrivateFile { target, name, data } => {
                let Some(name) = self.persist(&name, &data).await? else {
                    return Ok(());
                };
                self.dispatch(Command::PrivateFile {
                    client_id: self.client_id,
                    target,
                    name,
                    data,
                })
                .await
            }
            ClientMessage::Unexpected(kind) => {
                warn!("Ignoring {:?} frame from '{}'", kind, self.name);
                Ok(())
            }
        }
    }

    /// Save an inbound file and return the name it was stored under
    ///
    /// On failure the sender is told and `None` is returned so nothing is
    /// forwarded.
    async fn persist(&self, name: &str, data: &[u8]) -> Result<Option<String>, AppError> {
        match self.config.store.save(name, data).await {
            Ok(path) => {
                info!(
                    "File {} from '{}' saved to {}",
                    name,
                    self.name,
                    path.display()
                );
                // Forward under the name actually on disk
                let stored = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| name.to_string());
                Ok(Some(stored))
            }
            Err(e) => {
                error!("Failed to save file {} from '{}': {}", name, self.name, e);
                self.reply(ServerMessage::Error(format!("Gagal menyimpan {}", name)))
                    .await?;
                Ok(None)
            }
        }
    }

    async fn dispatch(&self, cmd: Command) -> Result<(), AppError> {
        self.cmd_tx.send(cmd).await.map_err(|_| AppError::ChannelSend)
    }

    /// Send a notice to this connection only, through the dispatcher
    async fn reply(&self, msg: ServerMessage) -> Result<(), AppError> {
        self.dispatch(Command::Notice {
            client_id: self.client_id,
            msg,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_trims() {
        assert_eq!(parse_name(b"  alice\r\n".to_vec()).unwrap(), "alice");
    }

    #[test]
    fn test_parse_name_rejects_blank() {
        assert!(matches!(
            parse_name(b" \n".to_vec()),
            Err(HandshakeError::EmptyName)
        ));
    }

    #[test]
    fn test_parse_name_rejects_separators() {
        for raw in ["bob smith", "bob,carol", "a|b", "tab\there"] {
            assert!(
                matches!(parse_name(raw.as_bytes().to_vec()), Err(HandshakeError::InvalidName)),
                "{:?} should be rejected",
                raw
            );
        }
        assert_eq!(parse_name(b"bob_smith-2".to_vec()).unwrap(), "bob_smith-2");
    }

    #[test]
    fn test_parse_name_rejects_invalid_utf8() {
        assert!(matches!(
            parse_name(vec![0xc3, 0x28]),
            Err(HandshakeError::InvalidName)
        ));
    }
}
