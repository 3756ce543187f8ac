//! Windowed shipping loop.
//!
//! Reads newline-delimited JSON events, groups them into windows, and
//! ships each window with a synchronous send-and-await-ack. The core
//! client deliberately owns no retry policy — after any send or ack
//! failure the connection is presumed corrupt, so this layer shuts it
//! down, redials, and resends the unconfirmed window, up to the
//! configured attempt budget.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use lumber_core::{Client, LumberError};
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

use crate::config::ShipConfig;

// ── ShipStats ────────────────────────────────────────────────────

/// Totals for one shipper run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipStats {
    /// Windows fully acknowledged by the server.
    pub batches: u64,
    /// Events confirmed across all windows.
    pub events: u64,
    /// Malformed input lines dropped.
    pub skipped: u64,
}

// ── Shipper ──────────────────────────────────────────────────────

/// Ships line-delimited JSON events in acknowledged windows.
///
/// The loop stops at end of input, or at the next line boundary after
/// [`stop`](Self::stop_handle) flips the running flag; either way the
/// current partial window is flushed first.
pub struct Shipper {
    config: ShipConfig,
    running: Arc<AtomicBool>,
}

impl Shipper {
    pub fn new(config: ShipConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A cloneable handle that can be used to stop the run loop from
    /// another task (store `false`).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run the shipping loop over `input` until end of input or stop.
    pub async fn run<R: AsyncRead + Unpin>(&self, input: R) -> Result<ShipStats, LumberError> {
        let window_size = self.config.effective_window();
        let mut lines = FramedRead::new(input, LinesCodec::new());
        let mut window: Vec<Value> = Vec::with_capacity(window_size);
        let mut client: Option<Client<TcpStream>> = None;
        let mut stats = ShipStats::default();

        while self.running.load(Ordering::SeqCst) {
            let line = match lines.next().await {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    return Err(LumberError::Connection(io::Error::new(
                        io::ErrorKind::InvalidData,
                        e,
                    )));
                }
                None => break,
            };

            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                Ok(event) => window.push(event),
                Err(e) => {
                    warn!(error = %e, "skipping malformed event");
                    stats.skipped += 1;
                    continue;
                }
            }

            if window.len() >= window_size {
                let acked = self.ship_window(&mut client, &window).await?;
                stats.batches += 1;
                stats.events += u64::from(acked);
                window.clear();
            }
        }

        // Flush the partial window left by EOF or stop.
        if !window.is_empty() {
            let acked = self.ship_window(&mut client, &window).await?;
            stats.batches += 1;
            stats.events += u64::from(acked);
        }

        if let Some(mut conn) = client.take() {
            let _ = conn.shutdown().await;
        }
        Ok(stats)
    }

    /// Ship one window, redialing and resending on failure.
    async fn ship_window(
        &self,
        client: &mut Option<Client<TcpStream>>,
        window: &[Value],
    ) -> Result<u32, LumberError> {
        let mut attempt = 0u32;
        loop {
            let mut conn = match client.take() {
                Some(conn) => conn,
                None => self.connect().await?,
            };

            match conn.send_sync(window).await {
                Ok(acked) => {
                    debug!(events = acked, "window acked");
                    *client = Some(conn);
                    return Ok(acked);
                }
                Err(err) => {
                    // Connection state is undefined after a failed
                    // send/ack exchange; close it and start over.
                    let _ = conn.shutdown().await;
                    attempt += 1;
                    if attempt > self.config.network.redial_attempts {
                        return Err(err);
                    }
                    warn!(attempt, error = %err, "window failed; redialing");
                }
            }
        }
    }

    async fn connect(&self) -> Result<Client<TcpStream>, LumberError> {
        info!(address = %self.config.network.address, "dialing lumberjack server");
        Client::dial(&self.config.network.address, self.config.to_client_config()).await
    }
}

// ── Tests ────────────────────────────────────────────────────────
