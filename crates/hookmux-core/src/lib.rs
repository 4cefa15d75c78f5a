//! # hookmux-core
//!
//! Message and event dispatch for inbound webhook callbacks.
//!
//! This crate provides the building blocks:
//!
//! - **Router** - Two routing tables (messages, events) with fallback defaults
//! - **MessageHandler** - The single capability every handler implements
//! - **Request** - A decoded callback: envelope plus raw payload
//! - **Reply** - The output sink a handler writes its answer into
//!
//! ## Architecture
//!
//! ```text
//!                          ┌──────────────────┐
//!                     ┌───▶│  message table   │──▶ handler / default
//! ┌─────────────┐     │    └──────────────────┘
//! │   Request   │──▶ Router
//! └─────────────┘     │    ┌──────────────────┐
//!                     └───▶│   event table    │──▶ handler / default
//!     MsgType == "event"   └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hookmux_core::{Reply, Request, Router};
//! use hookmux_protocol::Envelope;
//!
//! let router = Router::new();
//! router.handle_message_fn("text", |_req, reply| reply.write_str("got it"));
//!
//! let request = Request::new(Envelope::message("text"), "{}");
//! let mut reply = Reply::new();
//! router.dispatch(&request, &mut reply);
//!
//! assert_eq!(reply.as_bytes(), b"got it");
//! ```

pub mod handler;
pub mod reply;
pub mod request;
pub mod router;

pub use handler::{MessageHandler, SharedHandler};
pub use hookmux_protocol::EVENT_MSG_TYPE;
pub use reply::Reply;
pub use request::Request;
pub use router::{DispatchOutcome, Router, RouterError, RouterStats};
