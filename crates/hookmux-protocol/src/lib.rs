//! # hookmux-protocol
//!
//! Inbound callback envelope for the hookmux dispatch router.
//!
//! A webhook callback body carries a routing header next to its payload.
//! This crate extracts only that header, the [`Envelope`], and leaves the
//! rest of the body opaque for whichever handler ends up serving it.
//!
//! ## Discriminators
//!
//! - `MsgType` selects an ordinary message handler
//! - `MsgType == "event"` switches routing to the `Event` field
//!
//! ## Example
//!
//! ```rust
//! use hookmux_protocol::{codec, EVENT_MSG_TYPE};
//!
//! let body = br#"{"MsgType":"event","Event":"subscribe","FromUserName":"u1"}"#;
//! let envelope = codec::decode(body).unwrap();
//!
//! assert_eq!(envelope.msg_type, EVENT_MSG_TYPE);
//! assert_eq!(envelope.event, "subscribe");
//! ```

pub mod codec;
pub mod envelope;
pub mod types;

pub use codec::{decode, decode_with_limit, ProtocolError, MAX_BODY_SIZE};
pub use envelope::Envelope;
pub use types::{event_type, msg_type, EVENT_MSG_TYPE};
