//! Profile service binary.
//!
//! Reads newline-delimited JSON requests from stdin and writes one reply
//! line per request to stdout. Logs go to stderr (and `LOG_DIR` when set).
//!
//! ```bash
//! echo '{"admin":"register","accountId":"alice"}' | cargo run -p profile-service
//! ```
mod protocol;

use anyhow::Result;
use runtime::{Event, Topic};
use service_bootstrap::{ServiceBuilder, ServiceConfig, logging};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::Dispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!(store = %config.store, content_dir = ?config.content_dir, "Starting profile service");
    let setup = ServiceBuilder::new(config).build()?;

    // Stand-in for live client connections: gift notifications are logged.
    let mut gifts = setup.runtime.subscribe(Topic::Gift);
    tokio::spawn(async move {
        loop {
            match gifts.recv().await {
                Ok(Event::Gift(gift)) => tracing::info!(recipient = %gift.recipient, "gift notification"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "gift listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let dispatcher = Dispatcher::new(setup.runtime.handle(), setup.friends.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = dispatcher.handle_line(&line).await;
        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
