//! Logging setup: stdout plus an append-only log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// The filter comes from `RUST_LOG` when set, e.g. `RUST_LOG=debug` or
/// `RUST_LOG=relay_chat=trace`, and falls back to `default_level` for this
/// crate otherwise.
pub fn setup_logger(log_file: &Path, default_level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!(
                    "{}={}",
                    env!("CARGO_PKG_NAME").replace('-', "_"),
                    default_level
                ))
            }),
        )
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();

    Ok(())
}
