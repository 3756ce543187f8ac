//! # lumber-core
//!
//! Client library for the lumberjack v2 wire protocol: ship ordered
//! batches of structured events to a compatible server over a
//! persistent byte stream, with delivery confirmed by a windowed,
//! cumulative acknowledgement scheme.
//!
//! This crate contains:
//! - **Frame codec**: `FrameKind`, window/data-frame encoding, ACK decoding
//! - **Compressor**: the zlib wrapper frame with length backpatching
//! - **Encoder**: the pluggable `EventEncoder` capability and its
//!   `serde_json` default
//! - **Client**: `Client` — owns the connection, sends batches, and
//!   reconciles acknowledgements
//! - **Config**: `ClientConfig`, validated before any network activity
//! - **Error**: `LumberError` — typed, `thiserror`-based error hierarchy
//!
//! A client instance is strictly sequential: one batch in flight at a
//! time, and after a timeout or protocol violation the connection must
//! be closed and redialed by the caller. Retry and reconnect policy
//! belong to the layer above this crate.

pub mod client;
pub mod compress;
pub mod config;
pub mod encoder;
pub mod error;
pub mod frame;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use client::Client;
pub use config::{ClientConfig, MAX_COMPRESSION_LEVEL};
pub use encoder::{EncoderFn, EventEncoder, JsonEncoder, encoder_fn};
pub use error::LumberError;
pub use frame::{ACK_FRAME_SIZE, FrameKind, PROTOCOL_VERSION};
