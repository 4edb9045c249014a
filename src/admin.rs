//! Admin console
//!
//! Reads operator commands line by line from the control input:
//! `/users` lists who is online, `/exit` shuts the server down and anything
//! else is broadcast as `SERVER`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::dispatcher::{Command, ADMIN_NAME};
use crate::error::AppError;
use crate::shutdown::{self, Shutdown};

/// Printed to the operator on startup
pub const BANNER: &str = "Daftar Perintah:\n/users\n/exit\n";

/// One parsed operator line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Users,
    Exit,
    Broadcast(String),
}

impl AdminCommand {
    /// Parse a line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            None
        } else if line.starts_with("/users") {
            Some(Self::Users)
        } else if line.starts_with("/exit") {
            Some(Self::Exit)
        } else {
            Some(Self::Broadcast(line.to_string()))
        }
    }
}

/// Operator-facing rendering of the online list
pub fn format_user_list(names: &[String]) -> String {
    if names.is_empty() {
        "Daftar user online:\nTidak ada user online".to_string()
    } else {
        format!("Daftar user online:\n{}", names.join("\n"))
    }
}

pub struct AdminConsole {
    cmd_tx: mpsc::Sender<Command>,
    shutdown: Shutdown,
}

impl AdminConsole {
    pub fn new(cmd_tx: mpsc::Sender<Command>, shutdown: Shutdown) -> Self {
        Self { cmd_tx, shutdown }
    }

    /// Read commands until `/exit`, end of input or a read error
    ///
    /// Every way out of the loop ends in shutdown.
    pub async fn run<R>(self, input: R)
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{}", BANNER);
        let mut lines = input.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(command) = AdminCommand::parse(&line) else {
                        continue;
                    };
                    match self.execute(command).await {
                        Ok(true) => continue,
                        Ok(false) => break,
                        Err(e) => {
                            error!("Admin command failed: {}", e);
                            break;
                        }
                    }
                }
                Ok(None) => {
                    info!("Admin input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read admin input: {}", e);
                    break;
                }
            }
        }

        shutdown::initiate(&self.cmd_tx, &self.shutdown).await;
    }

    /// Run one command; `Ok(false)` ends the console
    async fn execute(&self, command: AdminCommand) -> Result<bool, AppError> {
        match command {
            AdminCommand::Users => {
                let (reply_tx, reply_rx) = oneshot::channel();
                self.cmd_tx
                    .send(Command::ListUsers { reply: reply_tx })
                    .await
                    .map_err(|_| AppError::ChannelSend)?;
                let names = reply_rx.await.map_err(|_| AppError::ChannelSend)?;
                println!("{}", format_user_list(&names));
                Ok(true)
            }
            AdminCommand::Exit => Ok(false),
            AdminCommand::Broadcast(body) => {
                info!("Operator broadcast: {}", body);
                self.cmd_tx
                    .send(Command::Broadcast {
                        sender: ADMIN_NAME.to_string(),
                        body,
                    })
                    .await
                    .map_err(|_| AppError::ChannelSend)?;
                Ok(true)
            }
        }
    }
}
