//! Dispatcher actor implementation
//!
//! The single task that owns the client registry and drains the command
//! queue. Every public message is fanned out here, in dequeue order, which
//! gives one total order for all public traffic.
//!
//! The loop does not watch the shutdown flag: it runs until every command
//! sender is dropped, and on `/exit` the process is terminated after the
//! grace period while it is still draining.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::client::{Client, Outbound};
use crate::error::{HandshakeError, RoutingError, SendError};
use crate::message::{
    file_sent_notice, joined_notice, left_notice, private_file_sent_notice, render_line,
    ServerMessage, SHUTDOWN_NOTICE,
};
use crate::registry::ClientRegistry;
use crate::time::Clock;
use crate::types::ClientId;

/// Sender identity used for server notices and operator messages
pub const ADMIN_NAME: &str = "SERVER";

/// Commands sent from handlers and the admin console to the dispatcher
#[derive(Debug)]
pub enum Command {
    /// Handshake completed, add to the registry
    Register {
        client: Client,
        reply: oneshot::Sender<Result<(), HandshakeError>>,
    },
    /// Connection closed
    Unregister {
        client_id: ClientId,
    },
    /// Public chat line
    Broadcast {
        sender: String,
        body: String,
    },
    /// Private chat line
    Private {
        client_id: ClientId,
        target: String,
        body: String,
    },
    /// File for everyone (already persisted)
    PublicFile {
        client_id: ClientId,
        name: String,
        data: Vec<u8>,
    },
    /// File for one user (already persisted)
    PrivateFile {
        client_id: ClientId,
        target: String,
        name: String,
        data: Vec<u8>,
    },
    /// Control notice for one connection (format errors, store failures)
    Notice {
        client_id: ClientId,
        msg: ServerMessage,
    },
    /// Names currently online
    ListUsers {
        reply: oneshot::Sender<Vec<String>>,
    },
    /// Queue the shutdown notice for everyone; replies with the recipient count
    Shutdown {
        reply: oneshot::Sender<usize>,
    },
}

/// The dispatcher actor
pub struct Dispatcher {
    /// Registered connections, in registration order
    registry: ClientRegistry,
    /// Command receiver channel
    receiver: mpsc::Receiver<Command>,
    /// Source of delivery timestamps
    clock: Arc<dyn Clock>,
    /// Names evicted during the current round, announced after it
    departed: Vec<String>,
}

impl Dispatcher {
    /// Create a new Dispatcher with the given command receiver
    pub fn new(receiver: mpsc::Receiver<Command>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: ClientRegistry::new(),
            receiver,
            clock,
            departed: Vec::new(),
        }
    }

    /// Run the dispatcher loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("Dispatcher started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
            self.announce_departures();
        }

        info!("Dispatcher shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Register { client, reply } => {
                self.handle_register(client, reply);
            }
            Command::Unregister { client_id } => {
                self.handle_unregister(client_id);
            }
            Command::Broadcast { sender, body } => {
                self.broadcast(&sender, &body);
            }
            Command::Private {
                client_id,
                target,
                body,
            } => {
                self.handle_private(client_id, target, body);
            }
            Command::PublicFile {
                client_id,
                name,
                data,
            } => {
                self.handle_public_file(client_id, name, data);
            }
            Command::PrivateFile {
                client_id,
                target,
                name,
                data,
            } => {
                self.handle_private_file(client_id, target, name, data);
            }
            Command::Notice { client_id, msg } => {
                self.send_to(client_id, frame(msg));
            }
            Command::ListUsers { reply } => {
                let _ = reply.send(self.registry.names());
            }
            Command::Shutdown { reply } => {
                let recipients = self.registry.len();
                info!("Sending shutdown notice to {} clients", recipients);
                self.fan_out(frame(ServerMessage::Info(SHUTDOWN_NOTICE.to_string())));
                let _ = reply.send(recipients);
            }
        }
    }

    /// Handle a completed handshake
    fn handle_register(
        &mut self,
        client: Client,
        reply: oneshot::Sender<Result<(), HandshakeError>>,
    ) {
        let name = client.name.clone();
        let client_id = client.id;

        if let Err(e) = self.registry.register(client) {
            warn!("Rejected registration of {} as '{}': {}", client_id, name, e);
            let _ = reply.send(Err(e));
            return;
        }

        info!("Client {} registered as '{}'", client_id, name);
        let _ = reply.send(Ok(()));

        self.broadcast(ADMIN_NAME, &joined_notice(&name));
        self.push_user_list();
        debug!("Total clients: {}", self.registry.len());
    }

    /// Handle connection close (idempotent)
    fn handle_unregister(&mut self, client_id: ClientId) {
        if let Some(client) = self.registry.unregister(client_id) {
            info!("Client {} ('{}') unregistered", client_id, client.name);
            self.departed.push(client.name);
        }
    }

    /// Stamp, render and deliver a public line to everyone
    fn broadcast(&mut self, sender: &str, body: &str) {
        let line = render_line(&self.clock.timestamp(), sender, body);
        debug!("Broadcast: {}", line);
        self.fan_out(frame(ServerMessage::Public { line }));
    }

    /// Handle private chat routing
    fn handle_private(&mut self, client_id: ClientId, target: String, body: String) {
        let Some(sender_name) = self.registry.get(client_id).map(|c| c.name.clone()) else {
            return;
        };

        let Some(target_id) = self.registry.find_by_name(&target).map(|c| c.id) else {
            debug!("Private message from '{}' to unknown '{}'", sender_name, target);
            self.send_to(client_id, frame(RoutingError::TargetNotFound(target).into()));
            return;
        };

        let line = render_line(&self.clock.timestamp(), &sender_name, &body);
        self.deliver_pair(client_id, target_id, frame(ServerMessage::Private { line }));
    }

    /// Handle a public file: forward to everyone, acknowledge to the sender
    fn handle_public_file(&mut self, client_id: ClientId, name: String, data: Vec<u8>) {
        let Some(sender_name) = self.registry.get(client_id).map(|c| c.name.clone()) else {
            return;
        };

        info!("Forwarding file '{}' ({} bytes) from '{}'", name, data.len(), sender_name);
        self.fan_out(frame(ServerMessage::PublicFile {
            from: sender_name,
            name: name.clone(),
            data,
        }));
        self.send_to(client_id, frame(ServerMessage::Info(file_sent_notice(&name))));
    }

    /// Handle a private file
    fn handle_private_file(
        &mut self,
        client_id: ClientId,
        target: String,
        name: String,
        data: Vec<u8>,
    ) {
        let Some(sender_name) = self.registry.get(client_id).map(|c| c.name.clone()) else {
            return;
        };

        let Some(target_id) = self.registry.find_by_name(&target).map(|c| c.id) else {
            self.send_to(client_id, frame(RoutingError::TargetNotFound(target).into()));
            return;
        };

        info!(
            "Forwarding file '{}' ({} bytes) from '{}' to '{}'",
            name,
            data.len(),
            sender_name,
            target
        );
        let forward = frame(ServerMessage::PrivateFile {
            from: sender_name,
            name: name.clone(),
            data,
        });
        self.deliver_pair(client_id, target_id, forward);
        self.send_to(
            client_id,
            frame(ServerMessage::Info(private_file_sent_notice(&name, &target))),
        );
    }

    /// Deliver to the target, then echo to the sender
    fn deliver_pair(&mut self, sender_id: ClientId, target_id: ClientId, frame: Outbound) {
        self.send_to(target_id, frame.clone());
        // A message to yourself arrives once, not as a second echo
        if target_id != sender_id {
            self.send_to(sender_id, frame);
        }
    }

    /// Push `[USER_LIST]` to every registered connection
    fn push_user_list(&mut self) {
        let names = self.registry.names();
        self.fan_out(frame(ServerMessage::UserList(names)));
    }

    /// Queue a frame for every registered connection in registration order
    ///
    /// A failed connection is evicted after the round; the rest still receive
    /// the frame.
    fn fan_out(&mut self, frame: Outbound) {
        let failed: Vec<(ClientId, SendError)> = self
            .registry
            .iter()
            .filter_map(|c| c.send(frame.clone()).err().map(|e| (c.id, e)))
            .collect();

        for (client_id, err) in failed {
            self.evict(client_id, err);
        }
    }

    /// Queue a frame for one connection
    fn send_to(&mut self, client_id: ClientId, frame: Outbound) {
        let Some(client) = self.registry.get(client_id) else {
            return;
        };
        if let Err(err) = client.send(frame) {
            self.evict(client_id, err);
        }
    }

    /// Drop a connection whose queue is closed or full
    fn evict(&mut self, client_id: ClientId, err: SendError) {
        if let Some(client) = self.registry.unregister(client_id) {
            warn!("Evicting '{}' ({}): {}", client.name, client_id, err);
            self.departed.push(client.name);
        }
    }

    /// Announce everyone who left during the last round
    ///
    /// Announcing can evict further connections, so loop until settled.
    fn announce_departures(&mut self) {
        while !self.departed.is_empty() {
            let names = std::mem::take(&mut self.departed);
            for name in &names {
                self.broadcast(ADMIN_NAME, &left_notice(name));
            }
            self.push_user_list();
        }
    }
}

fn frame(msg: ServerMessage) -> Outbound {
    Arc::new(msg.to_frame())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::codec::{unpack_fields, Frame};
    use crate::time::FixedClock;
    use crate::types::MessageKind;

    const TS: &str = "2024-01-01 09:30:00";

    fn spawn_dispatcher() -> mpsc::Sender<Command> {
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        let dispatcher = Dispatcher::new(cmd_rx, Arc::new(FixedClock::new(TS)));
        tokio::spawn(dispatcher.run());
        cmd_tx
    }

    async fn join(cmd_tx: &mpsc::Sender<Command>, name: &str) -> (ClientId, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(512);
        let id = ClientId::new();
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(Command::Register {
                client: Client::new(id, name.to_string(), tx),
                reply: reply_tx,
            })
            .await
            .unwrap();
        reply_rx.await.unwrap().unwrap();
        (id, rx)
    }

    /// Round-trips a ListUsers; every earlier command has been processed after it
    async fn users(cmd_tx: &mpsc::Sender<Command>) -> Vec<String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx.send(Command::ListUsers { reply: reply_tx }).await.unwrap();
        reply_rx.await.unwrap()
    }

    fn drain(rx: &mut mpsc::Receiver<Outbound>) -> Vec<Outbound> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    fn texts(frames: &[Outbound], kind: MessageKind) -> Vec<String> {
        frames
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.text().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_register_announces_join_and_user_list() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;

        let alice = drain(&mut alice_rx);
        assert_eq!(
            texts(&alice, MessageKind::PublicText),
            vec![
                format!("{}|SERVER|alice Bergabung dalam obrolan", TS),
                format!("{}|SERVER|bob Bergabung dalam obrolan", TS),
            ]
        );
        assert_eq!(
            texts(&alice, MessageKind::Control),
            vec!["[USER_LIST] alice", "[USER_LIST] alice,bob"]
        );

        let bob = drain(&mut bob_rx);
        assert_eq!(texts(&bob, MessageKind::Control), vec!["[USER_LIST] alice,bob"]);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_name() {
        let cmd_tx = spawn_dispatcher();
        let _alice = join(&cmd_tx, "alice").await;

        let (tx, _rx) = mpsc::channel(8);
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(Command::Register {
                client: Client::new(ClientId::new(), "alice".to_string(), tx),
                reply: reply_tx,
            })
            .await
            .unwrap();

        assert!(matches!(
            reply_rx.await.unwrap(),
            Err(HandshakeError::NameTaken(_))
        ));
        assert_eq!(users(&cmd_tx).await, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_public_messages_totally_ordered() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        let (_, mut carol_rx) = join(&cmd_tx, "carol").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drain(&mut carol_rx);

        let mut producers = Vec::new();
        for sender in ["alice", "bob", "carol"] {
            let cmd_tx = cmd_tx.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..50 {
                    cmd_tx
                        .send(Command::Broadcast {
                            sender: sender.to_string(),
                            body: format!("msg {}", i),
                        })
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        users(&cmd_tx).await;

        let alice = texts(&drain(&mut alice_rx), MessageKind::PublicText);
        let bob = texts(&drain(&mut bob_rx), MessageKind::PublicText);
        let carol = texts(&drain(&mut carol_rx), MessageKind::PublicText);

        assert_eq!(alice.len(), 150);
        assert_eq!(alice, bob);
        assert_eq!(alice, carol);
    }

    #[tokio::test]
    async fn test_fan_out_isolates_broken_connection() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        let (_, carol_rx) = join(&cmd_tx, "carol").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drop(carol_rx);

        cmd_tx
            .send(Command::Broadcast {
                sender: "alice".to_string(),
                body: "hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(users(&cmd_tx).await, vec!["alice", "bob"]);

        for rx in [&mut alice_rx, &mut bob_rx] {
            let frames = drain(rx);
            assert_eq!(
                texts(&frames, MessageKind::PublicText),
                vec![
                    format!("{}|alice|hello", TS),
                    format!("{}|SERVER|carol Meninggalkan obrolan", TS),
                ]
            );
            assert_eq!(texts(&frames, MessageKind::Control), vec!["[USER_LIST] alice,bob"]);
        }
    }

    #[tokio::test]
    async fn test_full_queue_is_evicted() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;

        // Two free slots: join notice + user list fill them on registration
        let (tx, _slow_rx) = mpsc::channel(2);
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(Command::Register {
                client: Client::new(ClientId::new(), "slow".to_string(), tx),
                reply: reply_tx,
            })
            .await
            .unwrap();
        reply_rx.await.unwrap().unwrap();

        cmd_tx
            .send(Command::Broadcast {
                sender: "alice".to_string(),
                body: "ping".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(users(&cmd_tx).await, vec!["alice"]);
        let frames = drain(&mut alice_rx);
        assert!(texts(&frames, MessageKind::PublicText)
            .contains(&format!("{}|SERVER|slow Meninggalkan obrolan", TS)));
    }

    #[tokio::test]
    async fn test_unregister_twice_announces_once() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (bob_id, _bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);

        cmd_tx.send(Command::Unregister { client_id: bob_id }).await.unwrap();
        cmd_tx.send(Command::Unregister { client_id: bob_id }).await.unwrap();

        assert_eq!(users(&cmd_tx).await, vec!["alice"]);
        let frames = drain(&mut alice_rx);
        assert_eq!(
            texts(&frames, MessageKind::PublicText),
            vec![format!("{}|SERVER|bob Meninggalkan obrolan", TS)]
        );
        assert_eq!(texts(&frames, MessageKind::Control), vec!["[USER_LIST] alice"]);
    }

    #[tokio::test]
    async fn test_private_message_round_trip() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        let (_, mut carol_rx) = join(&cmd_tx, "carol").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drain(&mut carol_rx);

        cmd_tx
            .send(Command::Private {
                client_id: alice_id,
                target: "bob".to_string(),
                body: "just us".to_string(),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let expected = vec![format!("{}|alice|just us", TS)];
        let alice = drain(&mut alice_rx);
        let bob = drain(&mut bob_rx);
        assert_eq!(texts(&alice, MessageKind::PrivateText), expected);
        assert_eq!(texts(&bob, MessageKind::PrivateText), expected);
        assert_eq!(alice.len(), 1);
        assert_eq!(bob.len(), 1);
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[tokio::test]
    async fn test_private_message_to_self_delivered_once() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);

        cmd_tx
            .send(Command::Private {
                client_id: alice_id,
                target: "alice".to_string(),
                body: "note to self".to_string(),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let frames = drain(&mut alice_rx);
        assert_eq!(
            texts(&frames, MessageKind::PrivateText),
            vec![format!("{}|alice|note to self", TS)]
        );
        assert_eq!(frames.len(), 1);
    }

    #[tokio::test]
    async fn test_notice_goes_to_one_client() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        cmd_tx
            .send(Command::Notice {
                client_id: alice_id,
                msg: ServerMessage::Error("Gagal menyimpan x".to_string()),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(*frames[0], Frame::control("[ERROR] Gagal menyimpan x"));
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_notice_to_full_queue_evicts() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;

        // Join notice + user list fill both slots
        let (tx, _slow_rx) = mpsc::channel(2);
        let slow_id = ClientId::new();
        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(Command::Register {
                client: Client::new(slow_id, "slow".to_string(), tx),
                reply: reply_tx,
            })
            .await
            .unwrap();
        reply_rx.await.unwrap().unwrap();

        cmd_tx
            .send(Command::Notice {
                client_id: slow_id,
                msg: ServerMessage::Error("Format pesan privat: <target> <pesan>".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(users(&cmd_tx).await, vec!["alice"]);
        let frames = drain(&mut alice_rx);
        assert!(texts(&frames, MessageKind::PublicText)
            .contains(&format!("{}|SERVER|slow Meninggalkan obrolan", TS)));
    }

    #[tokio::test]
    async fn test_private_message_unknown_target() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        cmd_tx
            .send(Command::Private {
                client_id: alice_id,
                target: "dave".to_string(),
                body: "hello?".to_string(),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let alice = drain(&mut alice_rx);
        assert_eq!(alice.len(), 1);
        assert_eq!(
            texts(&alice, MessageKind::Control),
            vec!["[ERROR] dave tidak ditemukan"]
        );
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_public_file_forward_and_ack() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        cmd_tx
            .send(Command::PublicFile {
                client_id: alice_id,
                name: "report.txt".to_string(),
                data: b"B|B".to_vec(),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let alice = drain(&mut alice_rx);
        let bob = drain(&mut bob_rx);
        for frames in [&alice, &bob] {
            let files: Vec<&Outbound> =
                frames.iter().filter(|f| f.kind == MessageKind::PublicFile).collect();
            assert_eq!(files.len(), 1);
            let fields = unpack_fields(&files[0].payload, 3).unwrap();
            assert_eq!(fields, vec![&b"alice"[..], &b"report.txt"[..], &b"B|B"[..]]);
        }
        assert_eq!(
            texts(&alice, MessageKind::Control),
            vec!["[INFO] report.txt berhasil terkirim"]
        );
        assert!(texts(&bob, MessageKind::Control).is_empty());
    }

    #[tokio::test]
    async fn test_private_file_routing() {
        let cmd_tx = spawn_dispatcher();
        let (alice_id, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        let (_, mut carol_rx) = join(&cmd_tx, "carol").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drain(&mut carol_rx);

        cmd_tx
            .send(Command::PrivateFile {
                client_id: alice_id,
                target: "bob".to_string(),
                name: "notes.md".to_string(),
                data: b"# notes".to_vec(),
            })
            .await
            .unwrap();
        cmd_tx
            .send(Command::PrivateFile {
                client_id: alice_id,
                target: "zed".to_string(),
                name: "lost.md".to_string(),
                data: Vec::new(),
            })
            .await
            .unwrap();
        users(&cmd_tx).await;

        let expected = ServerMessage::PrivateFile {
            from: "alice".to_string(),
            name: "notes.md".to_string(),
            data: b"# notes".to_vec(),
        }
        .to_frame();

        let alice = drain(&mut alice_rx);
        let bob = drain(&mut bob_rx);
        assert_eq!(bob.len(), 1);
        assert_eq!(*bob[0], expected);
        assert_eq!(*alice[0], expected);
        assert_eq!(
            texts(&alice, MessageKind::Control),
            vec![
                "[INFO] notes.md berhasil terkirim ke bob",
                "[ERROR] zed tidak ditemukan",
            ]
        );
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_notifies_everyone() {
        let cmd_tx = spawn_dispatcher();
        let (_, mut alice_rx) = join(&cmd_tx, "alice").await;
        let (_, mut bob_rx) = join(&cmd_tx, "bob").await;
        users(&cmd_tx).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx.send(Command::Shutdown { reply: reply_tx }).await.unwrap();
        assert_eq!(reply_rx.await.unwrap(), 2);

        for rx in [&mut alice_rx, &mut bob_rx] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 1);
            assert_eq!(*frames[0], Frame::control("[INFO] Server shutdown"));
        }
    }
}
