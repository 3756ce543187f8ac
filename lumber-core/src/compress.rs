//! Compressed wrapper frame.
//!
//! Data frames for a batch can be shipped as a single zlib stream
//! wrapped in a `'C'` frame. The frame's length field must equal the
//! exact compressed byte count, which is only known after the encoder
//! finishes — so the length is reserved up front and patched once the
//! stream is closed.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::error::LumberError;
use crate::frame::FrameKind;

/// Append a compressed frame to `buf`.
///
/// Writes the `'C'` header and a 4-byte length placeholder, runs
/// `fill` against the zlib encoder so it can emit data frames into the
/// stream, finishes the encoder, then backpatches the placeholder with
/// the true compressed size.
///
/// `level` must already be validated to lie in 1..=9.
pub fn write_compressed<F>(buf: &mut BytesMut, level: u32, fill: F) -> Result<(), LumberError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), LumberError>,
{
    buf.put_slice(&FrameKind::Compressed.header());
    let len_at = buf.len();
    buf.put_u32(0); // placeholder, patched below
    let payload_at = buf.len();

    let mut encoder = ZlibEncoder::new(buf.writer(), Compression::new(level));
    fill(&mut encoder)?;
    let buf = encoder.finish()?.into_inner();

    let payload_len = (buf.len() - payload_at) as u32;
    buf[len_at..len_at + 4].copy_from_slice(&payload_len.to_be_bytes());
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────
