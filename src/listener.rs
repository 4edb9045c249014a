//! Listener and server wiring
//!
//! Binds the socket, starts the dispatcher and the admin console, and spawns
//! one handler task per accepted connection until shutdown.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::admin::AdminConsole;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::shutdown::Shutdown;
use crate::time::SystemClock;

/// Bind to the configured address and serve with stdin as the admin console
pub async fn run(config: Config) -> Result<(), AppError> {
    config.validate()?;
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve(listener, config, BufReader::new(tokio::io::stdin())).await
}

/// Serve on an already bound listener
///
/// Returns once shutdown was triggered and the grace period has elapsed.
pub async fn serve<R>(listener: TcpListener, config: Config, admin_input: R) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    config.validate()?;
    info!("Relay listening on {}", listener.local_addr()?);

    // Create dispatcher channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(config.queue_capacity);
    let dispatcher = Dispatcher::new(cmd_rx, Arc::new(SystemClock));
    tokio::spawn(dispatcher.run());

    let shutdown = Shutdown::new();
    let console = AdminConsole::new(cmd_tx.clone(), shutdown.clone());
    tokio::spawn(console.run(admin_input));

    let connection_config = Arc::new(config.connection_config());

    // Connection accept loop
    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                info!("Listener stopped accepting connections");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let cmd_tx = cmd_tx.clone();
                    let connection_config = connection_config.clone();

                    // Spawn handler task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, cmd_tx, connection_config).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
        }
    }

    drop(listener);
    tokio::time::sleep(config.grace_period()).await;
    info!("Grace period elapsed, terminating");
    Ok(())
}
