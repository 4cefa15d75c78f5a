//! Discriminator values used by the callback protocol.

/// The `MsgType` value that marks a callback as an event.
///
/// Event callbacks are routed by their `Event` field instead of `MsgType`.
pub const EVENT_MSG_TYPE: &str = "event";

/// Common ordinary message types.
pub mod msg_type {
    pub const TEXT: &str = "text";
    pub const IMAGE: &str = "image";
    pub const VOICE: &str = "voice";
    pub const VIDEO: &str = "video";
    pub const SHORT_VIDEO: &str = "shortvideo";
    pub const LOCATION: &str = "location";
    pub const LINK: &str = "link";
}

/// Common event types carried in the `Event` field.
pub mod event_type {
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    pub const SCAN: &str = "SCAN";
    pub const LOCATION: &str = "LOCATION";
    pub const CLICK: &str = "CLICK";
    pub const VIEW: &str = "VIEW";
}
