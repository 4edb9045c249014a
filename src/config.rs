//! Server configuration
//!
//! Parsed from the command line with clap; every option has a default so the
//! server starts with no arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::codec::DEFAULT_MAX_FRAME_BYTES;
use crate::error::AppError;
use crate::handler::{ConnectionConfig, MAX_NAME_BYTES};
use crate::store::{FileStore, DEFAULT_STORAGE_DIR};

/// Largest allowed `max_frame_bytes`
///
/// Relayed frames grow by the sender name plus framing (a length prefix for
/// files, the timestamp and `|` separators for chat lines), and must still
/// fit the `u32` length header.
pub const MAX_FRAME_LIMIT: usize = u32::MAX as usize - 2 * MAX_NAME_BYTES;

#[derive(Parser, Debug, Clone)]
#[command(name = "relay_chat")]
#[command(about = "Framed TCP chat relay with private messages and file forwarding", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = 65432)]
    pub port: u16,

    /// Directory where received files are stored
    #[arg(long, default_value = DEFAULT_STORAGE_DIR)]
    pub storage_dir: PathBuf,

    /// Log file appended next to stdout output
    #[arg(long, default_value = "server.log")]
    pub log_file: PathBuf,

    /// Seconds to wait for the shutdown notice to flush before exiting
    #[arg(long, default_value_t = 5)]
    pub grace_secs: u64,

    /// Capacity of the dispatcher command queue
    #[arg(long, default_value_t = 256)]
    pub queue_capacity: usize,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = 64)]
    pub client_queue_capacity: usize,

    /// Largest accepted frame payload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,
}

impl Config {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.queue_capacity == 0 {
            return Err(AppError::Config("queue capacity must be positive".to_string()));
        }
        if self.client_queue_capacity == 0 {
            return Err(AppError::Config(
                "client queue capacity must be positive".to_string(),
            ));
        }
        if self.max_frame_bytes > MAX_FRAME_LIMIT {
            return Err(AppError::Config(format!(
                "max frame size cannot exceed {} bytes",
                MAX_FRAME_LIMIT
            )));
        }
        Ok(())
    }

    /// Settings handed to every connection handler
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            store: FileStore::new(self.storage_dir.clone()),
            max_frame_bytes: self.max_frame_bytes,
            queue_capacity: self.client_queue_capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["relay_chat"])
    }
}
