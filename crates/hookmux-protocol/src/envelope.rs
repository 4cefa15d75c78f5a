//! The routing header of an inbound callback.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::EVENT_MSG_TYPE;

/// Routing header shared by every callback body.
///
/// Missing or `null` fields decode to their empty value so that a partially
/// filled body still yields an envelope; the router treats an empty
/// discriminator as "no match".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Envelope {
    /// Receiving account.
    #[serde(deserialize_with = "null_as_default")]
    pub to_user_name: String,
    /// Sending account.
    #[serde(deserialize_with = "null_as_default")]
    pub from_user_name: String,
    /// Unix timestamp of the callback, in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub create_time: i64,
    /// Message discriminator.
    #[serde(deserialize_with = "null_as_default")]
    pub msg_type: String,
    /// Event sub-discriminator, only meaningful when `msg_type` is `"event"`.
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub event: String,
    /// Platform message id. Events carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    /// Create an envelope for an ordinary message.
    #[must_use]
    pub fn message(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            ..Self::default()
        }
    }

    /// Create an envelope for an event.
    #[must_use]
    pub fn event(event: impl Into<String>) -> Self {
        Self {
            msg_type: EVENT_MSG_TYPE.to_string(),
            event: event.into(),
            ..Self::default()
        }
    }

    /// Set the sender.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from_user_name = from.into();
        self
    }

    /// Set the receiver.
    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to_user_name = to.into();
        self
    }

    /// Whether this callback is an event.
    #[must_use]
    pub fn is_event(&self) -> bool {
        self.msg_type == EVENT_MSG_TYPE
    }
}
