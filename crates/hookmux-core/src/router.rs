//! Message and event dispatch router.
//!
//! The router owns two routing tables, one keyed by message type and one
//! keyed by event type, plus an optional fallback handler for each. All
//! four live behind a single reader/writer lock: registration takes it
//! exclusively, dispatch only long enough to clone the resolved handler out.
//! Handlers always run after the lock is released.

use crate::handler::{MessageHandler, SharedHandler};
use crate::reply::Reply;
use crate::request::Request;
use hookmux_protocol::EVENT_MSG_TYPE;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Router errors.
///
/// These only occur at registration time and indicate a malformed routing
/// table, never a problem with an inbound callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Message type used as a registration key was empty.
    #[error("Invalid message type: must not be empty")]
    EmptyMsgType,

    /// Event type used as a registration key was empty.
    #[error("Invalid event type: must not be empty")]
    EmptyEventType,
}

/// What happened to a dispatched callback.
///
/// Neither variant is an error. `Unmatched` means no handler and no default
/// applied, so the reply was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler or default handler was invoked.
    Handled,
    /// Nothing matched; the reply is empty.
    Unmatched,
}

impl DispatchOutcome {
    /// Whether a handler was invoked.
    #[must_use]
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }

    /// Label used for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::Unmatched => "unmatched",
        }
    }
}

/// Routing state guarded as a whole.
#[derive(Default)]
struct Routes {
    message_handlers: HashMap<String, SharedHandler>,
    event_handlers: HashMap<String, SharedHandler>,
    default_message_handler: Option<SharedHandler>,
    default_event_handler: Option<SharedHandler>,
}

/// The callback dispatch router.
///
/// Create one per service and share it (typically through an `Arc`) with
/// every request worker. Handlers may be registered at any time, including
/// while dispatches are in flight.
///
/// The router is itself a [`MessageHandler`], so routers can be nested.
pub struct Router {
    routes: RwLock<Routes>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        info!("Creating dispatch router");
        Self {
            routes: RwLock::new(Routes::default()),
        }
    }

    // A handler never runs under the lock, so a poisoned lock can only come
    // from a panic between a completed map operation and guard drop.
    fn read(&self) -> RwLockReadGuard<'_, Routes> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Routes> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler for a message type, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if `msg_type` is empty. The table is left unchanged.
    pub fn try_handle_message(
        &self,
        msg_type: &str,
        handler: SharedHandler,
    ) -> Result<(), RouterError> {
        if msg_type.is_empty() {
            return Err(RouterError::EmptyMsgType);
        }

        let replaced = self
            .write()
            .message_handlers
            .insert(msg_type.to_string(), handler)
            .is_some();

        debug!(msg_type = %msg_type, replaced, "Registered message handler");
        Ok(())
    }

    /// Register a handler for an event type, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if `event_type` is empty. The table is left unchanged.
    pub fn try_handle_event(
        &self,
        event_type: &str,
        handler: SharedHandler,
    ) -> Result<(), RouterError> {
        if event_type.is_empty() {
            return Err(RouterError::EmptyEventType);
        }

        let replaced = self
            .write()
            .event_handlers
            .insert(event_type.to_string(), handler)
            .is_some();

        debug!(event_type = %event_type, replaced, "Registered event handler");
        Ok(())
    }

    /// Register a handler for a message type.
    ///
    /// # Panics
    ///
    /// Panics if `msg_type` is empty. Routing tables are built from code,
    /// so an empty key is a programming error.
    pub fn handle_message<H>(&self, msg_type: &str, handler: H)
    where
        H: MessageHandler + 'static,
    {
        if let Err(err) = self.try_handle_message(msg_type, Arc::new(handler)) {
            panic!("hookmux: {err}");
        }
    }

    /// Register a closure for a message type.
    ///
    /// # Panics
    ///
    /// Panics if `msg_type` is empty.
    pub fn handle_message_fn<F>(&self, msg_type: &str, handler: F)
    where
        F: Fn(&Request, &mut Reply) + Send + Sync + 'static,
    {
        self.handle_message(msg_type, handler);
    }

    /// Register a handler for an event type.
    ///
    /// # Panics
    ///
    /// Panics if `event_type` is empty.
    pub fn handle_event<H>(&self, event_type: &str, handler: H)
    where
        H: MessageHandler + 'static,
    {
        if let Err(err) = self.try_handle_event(event_type, Arc::new(handler)) {
            panic!("hookmux: {err}");
        }
    }

    /// Register a closure for an event type.
    ///
    /// # Panics
    ///
    /// Panics if `event_type` is empty.
    pub fn handle_event_fn<F>(&self, event_type: &str, handler: F)
    where
        F: Fn(&Request, &mut Reply) + Send + Sync + 'static,
    {
        self.handle_event(event_type, handler);
    }

    /// Set the handler for message types with no registered handler.
    pub fn handle_default_message<H>(&self, handler: H)
    where
        H: MessageHandler + 'static,
    {
        self.write().default_message_handler = Some(Arc::new(handler));
        debug!("Registered default message handler");
    }

    /// Set a closure for message types with no registered handler.
    pub fn handle_default_message_fn<F>(&self, handler: F)
    where
        F: Fn(&Request, &mut Reply) + Send + Sync + 'static,
    {
        self.handle_default_message(handler);
    }

    /// Set the handler for event types with no registered handler.
    pub fn handle_default_event<H>(&self, handler: H)
    where
        H: MessageHandler + 'static,
    {
        self.write().default_event_handler = Some(Arc::new(handler));
        debug!("Registered default event handler");
    }

    /// Set a closure for event types with no registered handler.
    pub fn handle_default_event_fn<F>(&self, handler: F)
    where
        F: Fn(&Request, &mut Reply) + Send + Sync + 'static,
    {
        self.handle_default_event(handler);
    }

    /// Resolve the handler for a message type, falling back to the default.
    ///
    /// An empty message type never resolves, not even to the default.
    #[must_use]
    pub fn message_handler(&self, msg_type: &str) -> Option<SharedHandler> {
        if msg_type.is_empty() {
            return None;
        }

        let routes = self.read();
        routes
            .message_handlers
            .get(msg_type)
            .or(routes.default_message_handler.as_ref())
            .cloned()
    }

    /// Resolve the handler for an event type, falling back to the default.
    ///
    /// An empty event type never resolves, not even to the default.
    #[must_use]
    pub fn event_handler(&self, event_type: &str) -> Option<SharedHandler> {
        if event_type.is_empty() {
            return None;
        }

        let routes = self.read();
        routes
            .event_handlers
            .get(event_type)
            .or(routes.default_event_handler.as_ref())
            .cloned()
    }

    /// Route a callback to its handler.
    ///
    /// Events (`MsgType == "event"`) are looked up by their `Event` field in
    /// the event table, everything else by `MsgType` in the message table.
    /// When nothing matches the reply is left empty, which the host protocol
    /// treats as "no reply".
    pub fn dispatch(&self, request: &Request, reply: &mut Reply) -> DispatchOutcome {
        let msg_type = request.msg_type();
        let handler = if msg_type == EVENT_MSG_TYPE {
            self.event_handler(request.event())
        } else {
            self.message_handler(msg_type)
        };

        match handler {
            Some(handler) => {
                trace!(msg_type = %msg_type, event = %request.event(), "Dispatching");
                handler.serve_message(request, reply);
                DispatchOutcome::Handled
            }
            None => {
                debug!(
                    msg_type = %msg_type,
                    event = %request.event(),
                    "No handler matched, replying empty"
                );
                DispatchOutcome::Unmatched
            }
        }
    }

    /// Get router statistics.
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        let routes = self.read();
        RouterStats {
            message_handlers: routes.message_handlers.len(),
            event_handlers: routes.event_handlers.len(),
            default_message_handler: routes.default_message_handler.is_some(),
            default_event_handler: routes.default_event_handler.is_some(),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHandler for Router {
    fn serve_message(&self, request: &Request, reply: &mut Reply) {
        self.dispatch(request, reply);
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("stats", &self.stats()).finish()
    }
}

/// Router statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    /// Number of registered message types.
    pub message_handlers: usize,
    /// Number of registered event types.
    pub event_handlers: usize,
    /// Whether a default message handler is set.
    pub default_message_handler: bool,
    /// Whether a default event handler is set.
    pub default_event_handler: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookmux_protocol::{event_type, msg_type, Envelope};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(msg_type: &str) -> Request {
        Request::new(Envelope::message(msg_type), "")
    }

    fn event(event: &str) -> Request {
        Request::new(Envelope::event(event), "")
    }

    fn run(router: &Router, request: &Request) -> (DispatchOutcome, Vec<u8>) {
        let mut reply = Reply::new();
        let outcome = router.dispatch(request, &mut reply);
        (outcome, reply.as_bytes().to_vec())
    }

    fn reply_with(tag: &'static str) -> impl Fn(&Request, &mut Reply) + Send + Sync {
        move |_req, reply| reply.write_str(tag)
    }

    #[test]
    fn test_router_scenario() {
        let router = Router::new();
        router.handle_message_fn(msg_type::TEXT, reply_with("A"));
        router.handle_event_fn(event_type::SUBSCRIBE, reply_with("B"));
        router.handle_default_message_fn(reply_with("C"));

        assert_eq!(run(&router, &message("text")), (DispatchOutcome::Handled, b"A".to_vec()));
        assert_eq!(run(&router, &message("image")), (DispatchOutcome::Handled, b"C".to_vec()));
        assert_eq!(run(&router, &event("subscribe")), (DispatchOutcome::Handled, b"B".to_vec()));
        assert_eq!(run(&router, &event("click")), (DispatchOutcome::Unmatched, Vec::new()));
    }

    #[test]
    fn test_router_invokes_exactly_registered_handler() {
        let router = Router::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        router.handle_message_fn("location", move |req, _reply| {
            assert_eq!(req.msg_type(), "location");
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let (outcome, body) = run(&router, &message("location"));
        assert!(outcome.is_handled());
        assert!(body.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_router_last_registration_wins() {
        let router = Router::new();
        router.handle_message_fn("text", reply_with("old"));
        router.handle_message_fn("text", reply_with("new"));

        assert_eq!(run(&router, &message("text")).1, b"new");
        assert_eq!(router.stats().message_handlers, 1);

        router.handle_default_event_fn(reply_with("d1"));
        router.handle_default_event_fn(reply_with("d2"));
        assert_eq!(run(&router, &event("VIEW")).1, b"d2");
    }

    #[test]
    fn test_router_unmatched_is_silent() {
        let router = Router::new();
        assert_eq!(run(&router, &message("text")), (DispatchOutcome::Unmatched, Vec::new()));
        assert_eq!(run(&router, &event("subscribe")), (DispatchOutcome::Unmatched, Vec::new()));
    }

    #[test]
    fn test_router_default_event_handler() {
        let router = Router::new();
        router.handle_event_fn("subscribe", reply_with("sub"));
        router.handle_default_event_fn(reply_with("fallback"));

        assert_eq!(run(&router, &event("subscribe")).1, b"sub");
        assert_eq!(run(&router, &event("SCAN")).1, b"fallback");
        // Event default never serves ordinary messages.
        assert_eq!(run(&router, &message("text")).0, DispatchOutcome::Unmatched);
    }

    #[test]
    fn test_router_tables_are_independent() {
        let router = Router::new();
        router.handle_message_fn("location", reply_with("message"));
        assert!(router.event_handler("location").is_none());
        assert_eq!(run(&router, &event("location")).0, DispatchOutcome::Unmatched);

        router.handle_event_fn("location", reply_with("event"));
        assert_eq!(run(&router, &message("location")).1, b"message");
        assert_eq!(run(&router, &event("location")).1, b"event");
    }

    #[test]
    fn test_router_event_key_in_message_table_is_inert() {
        let router = Router::new();
        router.handle_message_fn(EVENT_MSG_TYPE, reply_with("never"));

        assert_eq!(run(&router, &event("subscribe")), (DispatchOutcome::Unmatched, Vec::new()));
    }

    #[test]
    fn test_router_empty_discriminator_skips_defaults() {
        let router = Router::new();
        router.handle_default_message_fn(reply_with("msg-default"));
        router.handle_default_event_fn(reply_with("event-default"));

        assert_eq!(run(&router, &message("")), (DispatchOutcome::Unmatched, Vec::new()));
        assert_eq!(run(&router, &event("")), (DispatchOutcome::Unmatched, Vec::new()));
    }

    #[test]
    fn test_router_rejects_empty_keys() {
        let router = Router::new();
        let handler: SharedHandler = Arc::new(reply_with("x"));

        assert_eq!(
            router.try_handle_message("", Arc::clone(&handler)),
            Err(RouterError::EmptyMsgType)
        );
        assert_eq!(
            router.try_handle_event("", handler),
            Err(RouterError::EmptyEventType)
        );
        assert_eq!(router.stats().message_handlers, 0);
        assert_eq!(router.stats().event_handlers, 0);
    }

    #[test]
    #[should_panic(expected = "Invalid message type")]
    fn test_router_handle_message_empty_panics() {
        Router::new().handle_message_fn("", reply_with("x"));
    }

    #[test]
    fn test_router_handle_event_empty_panics_without_mutation() {
        let router = Router::new();
        router.handle_event_fn("CLICK", reply_with("click"));

        let result = catch_unwind(AssertUnwindSafe(|| {
            router.handle_event_fn("", reply_with("x"));
        }));
        assert!(result.is_err());

        assert_eq!(router.stats().event_handlers, 1);
        assert_eq!(run(&router, &event("CLICK")).1, b"click");
    }

    #[test]
    fn test_router_shared_handler() {
        let router = Router::new();
        let shared: SharedHandler = Arc::new(reply_with("shared"));
        router.try_handle_message("voice", Arc::clone(&shared)).unwrap();
        router.try_handle_event("LOCATION", shared).unwrap();

        assert_eq!(run(&router, &message("voice")).1, b"shared");
        assert_eq!(run(&router, &event("LOCATION")).1, b"shared");
    }

    #[test]
    fn test_router_nesting() {
        let inner = Router::new();
        inner.handle_event_fn("subscribe", reply_with("inner"));

        let outer = Router::new();
        outer.handle_default_event(inner);

        assert_eq!(run(&outer, &event("subscribe")).1, b"inner");
        assert_eq!(run(&outer, &event("unsubscribe")).0, DispatchOutcome::Handled);
    }

    #[test]
    fn test_router_handler_runs_outside_lock() {
        let router = Arc::new(Router::new());
        let inner = Arc::clone(&router);
        router.handle_message_fn("text", move |_req, reply| {
            // Registering from inside a handler would deadlock if the lock
            // were still held.
            inner.handle_message_fn("image", |_req: &Request, _reply: &mut Reply| {});
            reply.write_str("ok");
        });

        assert_eq!(run(&router, &message("text")).1, b"ok");
        assert_eq!(router.stats().message_handlers, 2);
    }

    #[test]
    fn test_router_stats() {
        let router = Router::new();
        router.handle_message_fn("text", reply_with("t"));
        router.handle_message_fn("image", reply_with("i"));
        router.handle_event_fn("subscribe", reply_with("s"));
        router.handle_default_message_fn(reply_with("d"));

        assert_eq!(
            router.stats(),
            RouterStats {
                message_handlers: 2,
                event_handlers: 1,
                default_message_handler: true,
                default_event_handler: false,
            }
        );
    }

    #[test]
    fn test_router_concurrent_dispatch() {
        let router = Router::new();
        let keys: Vec<String> = (0..10).map(|i| format!("type-{}", i)).collect();
        for key in &keys {
            let tag = key.clone();
            router.handle_message_fn(key, move |_req, reply| reply.write_str(&tag));
        }

        std::thread::scope(|s| {
            for worker in 0..8 {
                let router = &router;
                let keys = &keys;
                s.spawn(move || {
                    for i in 0..125 {
                        let key = &keys[(worker * 125 + i) % keys.len()];
                        let (outcome, body) = run(router, &message(key));
                        assert!(outcome.is_handled());
                        assert_eq!(body, key.as_bytes());
                    }
                });
            }
        });
    }

    #[test]
    fn test_router_concurrent_register_and_dispatch() {
        let router = Router::new();
        let keys: Vec<String> = (0..10).map(|i| format!("evt-{}", i)).collect();
        for key in &keys {
            let tag = format!("v0:{}", key);
            router.handle_event_fn(key, move |_req, reply| reply.write_str(&tag));
        }

        std::thread::scope(|s| {
            let router = &router;
            let keys = &keys;

            s.spawn(move || {
                for round in 1..=50 {
                    for key in keys {
                        let tag = format!("v{}:{}", round, key);
                        router.handle_event_fn(key, move |_req, reply| reply.write_str(&tag));
                    }
                }
            });

            for worker in 0..4 {
                s.spawn(move || {
                    for i in 0..250 {
                        let key = &keys[(worker + i) % keys.len()];
                        let (outcome, body) = run(router, &event(key));
                        assert!(outcome.is_handled());

                        let body = String::from_utf8(body).unwrap();
                        let (version, served) = body.split_once(':').unwrap();
                        assert!(version.starts_with('v'));
                        assert_eq!(served, key);
                    }
                });
            }
        });

        assert_eq!(router.stats().event_handlers, keys.len());
        for key in &keys {
            assert_eq!(run(&router, &event(key)).1, format!("v50:{}", key).into_bytes());
        }
    }
}
