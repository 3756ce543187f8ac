//! Event-encoder capability.
//!
//! The client never interprets events; it only needs each one rendered
//! to bytes. Callers inject the strategy — the JSON default, a closure
//! via [`encoder_fn`], or their own implementation.

use serde::Serialize;

use crate::error::LumberError;

/// Renders one event to its wire payload.
///
/// Failure aborts the whole send before any byte is transmitted.
pub trait EventEncoder<E> {
    fn encode(&self, event: &E) -> Result<Vec<u8>, LumberError>;
}

// ── JsonEncoder ──────────────────────────────────────────────────

/// The default encoder: `serde_json` for any `Serialize` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl<E: Serialize> EventEncoder<E> for JsonEncoder {
    fn encode(&self, event: &E) -> Result<Vec<u8>, LumberError> {
        Ok(serde_json::to_vec(event)?)
    }
}

// ── EncoderFn ────────────────────────────────────────────────────

/// Adapter turning a closure into an [`EventEncoder`].
#[derive(Debug, Clone, Copy)]
pub struct EncoderFn<F>(F);

/// Wrap a `Fn(&E) -> Result<Vec<u8>, LumberError>` as an encoder.
pub fn encoder_fn<F>(f: F) -> EncoderFn<F> {
    EncoderFn(f)
}

impl<E, F> EventEncoder<E> for EncoderFn<F>
where
    F: Fn(&E) -> Result<Vec<u8>, LumberError>,
{
    fn encode(&self, event: &E) -> Result<Vec<u8>, LumberError> {
        (self.0)(event)
    }
}
