//! Lumberjack v2 client.
//!
//! One [`Client`] exclusively owns one stream connection and a reusable
//! write buffer. Every operation takes `&mut self` and runs to
//! completion, so interleaved sends on a single connection are
//! unrepresentable; frames always hit the wire in the order described
//! by [`frame`](crate::frame).
//!
//! A timeout or protocol violation leaves the stream position undefined
//! with respect to frame boundaries — the connection must be shut down
//! and redialed, which is the caller's job. The client itself never
//! retries.

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

use crate::compress::write_compressed;
use crate::config::ClientConfig;
use crate::encoder::{EventEncoder, JsonEncoder};
use crate::error::LumberError;
use crate::frame::{self, ACK_FRAME_SIZE};

// ── Client ───────────────────────────────────────────────────────

/// A lumberjack v2 client over any async byte stream.
///
/// `S` is the connection (TCP in production, mock streams in tests);
/// `Enc` renders events to payload bytes and defaults to
/// [`JsonEncoder`].
#[derive(Debug)]
pub struct Client<S, Enc = JsonEncoder> {
    conn: S,
    wb: BytesMut,
    config: ClientConfig,
    encoder: Enc,
}

impl<S, Enc> Client<S, Enc>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established connection, using a custom encoder.
    ///
    /// Fails on invalid configuration; nothing is written.
    pub fn with_encoder(conn: S, config: ClientConfig, encoder: Enc) -> Result<Self, LumberError> {
        config.validate()?;
        Ok(Self {
            conn,
            wb: BytesMut::new(),
            config,
            encoder,
        })
    }

    /// Send a batch and block until the server acknowledges all of it.
    ///
    /// Returns the number of events confirmed.
    pub async fn send_sync<E>(&mut self, batch: &[E]) -> Result<u32, LumberError>
    where
        Enc: EventEncoder<E>,
    {
        self.send(batch).await?;
        self.await_ack(batch.len() as u32).await
    }

    /// Send a batch without waiting for acknowledgement.
    ///
    /// Assembles the full wire message — window frame, then one data
    /// frame per event, optionally through the zlib wrapper — and
    /// drains it to the connection under the write deadline. An empty
    /// batch writes nothing and succeeds.
    pub async fn send<E>(&mut self, batch: &[E]) -> Result<(), LumberError>
    where
        Enc: EventEncoder<E>,
    {
        if batch.is_empty() {
            return Ok(());
        }

        let Self {
            wb, config, encoder, ..
        } = self;

        wb.clear();
        frame::put_window_size(wb, batch.len() as u32);

        if config.compression > 0 {
            write_compressed(wb, config.compression, |out| {
                write_events(out, batch, &*encoder)
            })?;
        } else {
            write_events(&mut wb.writer(), batch, &*encoder)?;
        }

        trace!(
            events = batch.len(),
            bytes = self.wb.len(),
            compression = self.config.compression,
            "flushing batch"
        );
        self.flush_buffer().await
    }

    /// Read the next acknowledgement frame.
    ///
    /// Servers may acknowledge sub-windows; callers must keep reading
    /// until the last send's window size is matched (see
    /// [`await_ack`](Self::await_ack)).
    pub async fn receive_ack(&mut self) -> Result<u32, LumberError> {
        let mut msg = [0u8; ACK_FRAME_SIZE];
        io_deadline(self.config.timeout, self.conn.read_exact(&mut msg)).await?;
        frame::decode_ack(&msg)
    }

    /// Read acknowledgements until `count` events are confirmed.
    ///
    /// On failure the error carries the last acknowledged sequence, so
    /// callers can see how much of the batch the server confirmed. A
    /// cumulative sequence beyond `count` is a protocol violation and
    /// is never clamped away. `count == 0` succeeds without reading.
    pub async fn await_ack(&mut self, count: u32) -> Result<u32, LumberError> {
        let mut ack_seq = 0u32;

        while ack_seq < count {
            ack_seq = match self.receive_ack().await {
                Ok(seq) => seq,
                Err(source) => {
                    return Err(LumberError::AckInterrupted {
                        acked: ack_seq,
                        source: Box::new(source),
                    });
                }
            };
            trace!(acked = ack_seq, expected = count, "ack progress");
        }

        if ack_seq > count {
            return Err(LumberError::AckOverrun {
                acked: ack_seq,
                expected: count,
            });
        }
        Ok(ack_seq)
    }

    /// Shut down the write half of the underlying connection.
    pub async fn shutdown(&mut self) -> Result<(), LumberError> {
        self.conn.shutdown().await?;
        Ok(())
    }

    /// Drain the assembled write buffer under the write deadline.
    ///
    /// The stream may accept fewer bytes than offered per call; this
    /// keeps writing the remainder until the buffer is fully on the
    /// wire or an error ends the attempt.
    async fn flush_buffer(&mut self) -> Result<(), LumberError> {
        let Self { conn, wb, config, .. } = self;
        io_deadline(config.timeout, async {
            conn.write_all(&wb[..]).await?;
            conn.flush().await
        })
        .await
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established connection with the default JSON encoder.
    pub fn new(conn: S, config: ClientConfig) -> Result<Self, LumberError> {
        Self::with_encoder(conn, config, JsonEncoder)
    }

    /// Connect using a caller-supplied dial capability.
    ///
    /// The configuration is validated before `dial` runs, so a bad
    /// config never opens a connection.
    pub async fn dial_with<D, Fut>(
        dial: D,
        address: &str,
        config: ClientConfig,
    ) -> Result<Self, LumberError>
    where
        D: FnOnce(&str) -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        config.validate()?;
        let conn = dial(address).await?;
        Self::new(conn, config)
    }
}

impl Client<TcpStream> {
    /// Dial a lumberjack server over TCP.
    ///
    /// The connect itself is bounded by the configured timeout.
    pub async fn dial(address: impl ToSocketAddrs, config: ClientConfig) -> Result<Self, LumberError> {
        config.validate()?;
        let stream = io_deadline(config.timeout, TcpStream::connect(address)).await?;
        Self::new(stream, config)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Emit one data frame per event, in batch order.
///
/// The sequence number is the event's zero-based index within this
/// batch, not a global counter.
fn write_events<W, E, Enc>(out: &mut W, batch: &[E], encoder: &Enc) -> Result<(), LumberError>
where
    W: Write + ?Sized,
    Enc: EventEncoder<E>,
{
    for (seq, event) in batch.iter().enumerate() {
        let payload = encoder.encode(event)?;
        frame::write_data_frame(out, seq as u32, &payload)?;
    }
    Ok(())
}

/// Run one I/O operation under the configured deadline.
///
/// A zero duration disables the deadline.
async fn io_deadline<T>(
    limit: Duration,
    op: impl Future<Output = io::Result<T>>,
) -> Result<T, LumberError> {
    if limit.is_zero() {
        return Ok(op.await?);
    }
    match tokio::time::timeout(limit, op).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(LumberError::Timeout(limit)),
    }
}

// ── Tests ────────────────────────────────────────────────────────
