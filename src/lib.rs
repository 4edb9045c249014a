//! Framed TCP Chat Relay Library
//!
//! A chat relay built on tokio: clients connect over TCP, pick a display
//! name, and exchange public lines, private lines and files.
//!
//! # Features
//! - 8-byte header framing (kind + length), length-prefixed file fields
//! - Name handshake with unique display names
//! - Public broadcast with one total order across all senders
//! - Private messages and private files routed by name
//! - Received files persisted under `received_files/`
//! - Operator console (`/users`, `/exit`, broadcast)
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Dispatcher` is the central actor owning the client registry
//! - Each connection has a `handler` read task and a writer task
//! - No locks needed - all registry access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::io::BufReader;
//! use tokio::net::TcpListener;
//! use relay_chat::{serve, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(config.bind_addr()).await.unwrap();
//!     serve(listener, config, BufReader::new(tokio::io::stdin())).await.unwrap();
//! }
//! ```

pub mod admin;
pub mod client;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod listener;
pub mod logger;
pub mod message;
pub mod registry;
pub mod shutdown;
pub mod store;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use admin::{AdminCommand, AdminConsole};
pub use client::{Client, Outbound};
pub use codec::{pack_fields, read_frame, unpack_fields, write_frame, Frame};
pub use config::Config;
pub use dispatcher::{Command, Dispatcher, ADMIN_NAME};
pub use error::{AppError, FramingError, HandshakeError, RoutingError, SendError, StoreError};
pub use handler::{handle_connection, ConnectionConfig};
pub use listener::{run, serve};
pub use message::{ClientMessage, ServerMessage};
pub use registry::ClientRegistry;
pub use shutdown::Shutdown;
pub use store::FileStore;
pub use time::{Clock, FixedClock, SystemClock};
pub use types::{ClientId, MessageKind};
