//! Decoded inbound callbacks.

use bytes::Bytes;
use hookmux_protocol::{codec, Envelope, ProtocolError, EVENT_MSG_TYPE};
use serde::de::DeserializeOwned;

/// A decoded callback as seen by handlers.
///
/// The envelope carries the discriminators the router needs; the payload
/// is the untouched body for handlers to decode as they see fit.
#[derive(Debug, Clone)]
pub struct Request {
    envelope: Envelope,
    payload: Bytes,
}

impl Request {
    /// Create a request from an already decoded envelope.
    #[must_use]
    pub fn new(envelope: Envelope, payload: impl Into<Bytes>) -> Self {
        Self {
            envelope,
            payload: payload.into(),
        }
    }

    /// Decode a request from a raw callback body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is empty, too large, or malformed.
    pub fn from_body(body: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        Self::from_body_with_limit(body, codec::MAX_BODY_SIZE)
    }

    /// Decode a request from a raw callback body with a custom size limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is empty, larger than `limit`, or malformed.
    pub fn from_body_with_limit(
        body: impl Into<Bytes>,
        limit: usize,
    ) -> Result<Self, ProtocolError> {
        let payload = body.into();
        let envelope = codec::decode_with_limit(&payload, limit)?;
        Ok(Self { envelope, payload })
    }

    /// The message discriminator.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.envelope.msg_type
    }

    /// The event sub-discriminator. Empty for ordinary messages.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.envelope.event
    }

    /// Whether the request is routed through the event table.
    #[must_use]
    pub fn is_event(&self) -> bool {
        self.envelope.msg_type == EVENT_MSG_TYPE
    }

    /// The routing header.
    #[must_use]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The raw callback body.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Decode the raw body into a handler-specific type.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not match `T`.
    pub fn payload_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
