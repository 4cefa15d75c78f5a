//! The handler capability.

use std::sync::Arc;

use crate::reply::Reply;
use crate::request::Request;

/// Behavior invoked for a matched callback.
///
/// A handler may perform arbitrary side effects and write zero or more
/// bytes to the reply. Writing nothing is a valid answer: the webhook host
/// sends an empty body, which the platform reads as "no reply".
///
/// Any `Fn(&Request, &mut Reply)` closure is a handler.
pub trait MessageHandler: Send + Sync {
    /// Serve one callback.
    fn serve_message(&self, request: &Request, reply: &mut Reply);
}

/// A handler shared between routing table entries.
pub type SharedHandler = Arc<dyn MessageHandler>;

impl<F> MessageHandler for F
where
    F: Fn(&Request, &mut Reply) + Send + Sync,
{
    fn serve_message(&self, request: &Request, reply: &mut Reply) {
        self(request, reply);
    }
}
