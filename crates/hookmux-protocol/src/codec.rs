//! Decoding of callback bodies into envelopes.
//!
//! Bodies are JSON objects. Only the envelope fields are read; everything
//! else in the body is ignored here and left to the handler.

use thiserror::Error;

use crate::envelope::Envelope;

/// Maximum accepted callback body size (1 MiB).
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Errors that can occur while decoding a callback body.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body exceeds the configured limit.
    #[error("Body size {size} exceeds maximum {limit}")]
    BodyTooLarge {
        /// Actual body size.
        size: usize,
        /// Limit it was checked against.
        limit: usize,
    },

    /// Body is empty.
    #[error("Empty callback body")]
    Empty,

    /// JSON decoding error.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decode a callback body using [`MAX_BODY_SIZE`].
///
/// # Errors
///
/// Returns an error if the body is empty, too large, or not a JSON object.
pub fn decode(body: &[u8]) -> Result<Envelope, ProtocolError> {
    decode_with_limit(body, MAX_BODY_SIZE)
}

/// Decode a callback body, rejecting bodies larger than `limit` bytes.
///
/// # Errors
///
/// Returns an error if the body is empty, too large, or not a JSON object.
pub fn decode_with_limit(body: &[u8], limit: usize) -> Result<Envelope, ProtocolError> {
    if body.len() > limit {
        return Err(ProtocolError::BodyTooLarge {
            size: body.len(),
            limit,
        });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::Empty);
    }

    Ok(serde_json::from_slice(body)?)
}
