//! Lumberjack v2 frame encoding and decoding.
//!
//! Every frame starts with a two-byte header: the protocol version
//! followed by a frame code. Multi-byte integers are big-endian.
//!
//! ## Wire format
//!
//! **Window size** (6 bytes):
//! ```text
//! version:    u8 = '2'
//! code:       u8 = 'W'
//! count:      u32
//! ```
//!
//! **Compressed** (6 byte header + payload):
//! ```text
//! version:    u8 = '2'
//! code:       u8 = 'C'
//! payload_len: u32
//! payload:    [u8] (zlib stream of data frames)
//! ```
//!
//! **JSON data** (10 byte header + payload):
//! ```text
//! version:    u8 = '2'
//! code:       u8 = 'J'
//! seq:        u32  (zero-based index within the batch)
//! payload_len: u32
//! payload:    [u8]
//! ```
//!
//! **Ack** (6 bytes, server → client):
//! ```text
//! version:    u8 = '2'
//! code:       u8 = 'A'
//! seq:        u32  (cumulative)
//! ```
//!
//! There is no end-of-batch sentinel; the server counts data frames
//! against the window size.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};

use crate::error::LumberError;

// ── Constants ────────────────────────────────────────────────────

/// Protocol version byte carried by every frame header.
pub const PROTOCOL_VERSION: u8 = b'2';

/// Size of an ACK frame on the wire.
pub const ACK_FRAME_SIZE: usize = 6;

// ── FrameKind ────────────────────────────────────────────────────

/// Frame codes understood by the v2 protocol.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Declares how many data frames follow in this send.
    WindowSize = b'W',
    /// Wraps a zlib-compressed run of data frames.
    Compressed = b'C',
    /// One serialized event.
    JsonData = b'J',
    /// Cumulative acknowledgement (inbound only).
    Ack = b'A',
}

impl FrameKind {
    /// The two-byte `[version, code]` header for this frame kind.
    pub const fn header(self) -> [u8; 2] {
        [PROTOCOL_VERSION, self as u8]
    }
}

// ── Encoding ─────────────────────────────────────────────────────

/// Append a window-size frame declaring `count` data frames.
pub fn put_window_size(buf: &mut BytesMut, count: u32) {
    buf.put_slice(&FrameKind::WindowSize.header());
    buf.put_u32(count);
}

/// Write one data frame: header, zero-based sequence, payload length,
/// then the payload verbatim.
///
/// Generic over [`Write`] so the same path feeds both the plain write
/// buffer and the zlib stream.
pub fn write_data_frame<W: Write + ?Sized>(
    out: &mut W,
    seq: u32,
    payload: &[u8],
) -> io::Result<()> {
    out.write_all(&FrameKind::JsonData.header())?;
    out.write_all(&seq.to_be_bytes())?;
    out.write_all(&(payload.len() as u32).to_be_bytes())?;
    out.write_all(payload)
}

// ── Decoding ─────────────────────────────────────────────────────

/// Decode a 6-byte ACK frame into its cumulative sequence number.
///
/// A wrong version or code byte means the stream is no longer aligned
/// on frame boundaries and is reported as a protocol violation, not a
/// transport error.
pub fn decode_ack(frame: &[u8; ACK_FRAME_SIZE]) -> Result<u32, LumberError> {
    if frame[0] != PROTOCOL_VERSION || frame[1] != FrameKind::Ack as u8 {
        return Err(LumberError::InvalidAckHeader {
            version: frame[0],
            code: frame[1],
        });
    }
    Ok(u32::from_be_bytes(frame[2..6].try_into().unwrap()))
}

// ── Tests ────────────────────────────────────────────────────────
