//! HTTP handlers for the hookmux server.
//!
//! This module decodes inbound callbacks and hands them to the dispatch router.

use crate::config::{Config, RepliesConfig};
use crate::metrics;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use hookmux_core::{Reply, Request, Router as HookRouter};
use hookmux_protocol::{event_type, msg_type};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Shared server state.
pub struct AppState {
    /// The dispatch router.
    pub router: HookRouter,
    /// Server configuration.
    pub config: Config,
}

impl AppState {
    /// Create app state with the built-in handlers from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_router(build_router(&config.replies), config)
    }

    /// Create app state around a caller-built router.
    #[must_use]
    pub fn with_router(router: HookRouter, config: Config) -> Self {
        Self { router, config }
    }
}

#[derive(Deserialize)]
struct TextPayload {
    #[serde(rename = "Content", default)]
    content: String,
}

/// Build a router with the built-in handlers enabled in `replies`.
#[must_use]
pub fn build_router(replies: &RepliesConfig) -> HookRouter {
    let router = HookRouter::new();

    if replies.echo_text {
        router.handle_message_fn(msg_type::TEXT, |request, reply| {
            match request.payload_json::<TextPayload>() {
                Ok(text) => write_text_reply(request, &text.content, reply),
                Err(e) => debug!(error = %e, "Text payload without content"),
            }
        });
    }

    if let Some(welcome) = replies.subscribe_welcome.clone() {
        router.handle_event_fn(event_type::SUBSCRIBE, move |request, reply| {
            write_text_reply(request, &welcome, reply);
        });
    }

    if replies.log_unhandled {
        router.handle_default_message_fn(|request, _reply| {
            debug!(
                msg_type = %request.msg_type(),
                from = %request.envelope().from_user_name,
                "Unhandled message"
            );
        });
        router.handle_default_event_fn(|request, _reply| {
            debug!(
                event = %request.event(),
                from = %request.envelope().from_user_name,
                "Unhandled event"
            );
        });
    }

    router
}

/// Write a passive text reply addressed back to the sender.
fn write_text_reply(request: &Request, content: &str, reply: &mut Reply) {
    let envelope = request.envelope();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let body = serde_json::json!({
        "ToUserName": envelope.from_user_name,
        "FromUserName": envelope.to_user_name,
        "CreateTime": now,
        "MsgType": msg_type::TEXT,
        "Content": content,
    });

    if let Err(e) = serde_json::to_writer(reply, &body) {
        warn!(error = %e, "Failed to encode text reply");
    }
}

/// Build the HTTP application.
pub fn app(state: Arc<AppState>) -> Router {
    let callback_path = state.config.webhook.callback_path.clone();
    let body_limit = state.config.webhook.max_body_size;

    Router::new()
        .route(&callback_path, post(callback_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the HTTP server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(state: Arc<AppState>) -> Result<()> {
    let config = &state.config;

    // Start metrics server if enabled
    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            error!("Failed to start metrics server: {}", e);
        }
    }

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!("hookmux listening on {}", addr);
    info!(
        "Callback endpoint: http://{}{}",
        addr, config.webhook.callback_path
    );

    axum::serve(listener, app(Arc::clone(&state))).await?;

    Ok(())
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": state.router.stats(),
    }))
}

/// Webhook callback handler.
///
/// Always answers `200` for a decodable body, with whatever the matched
/// handler wrote. An empty body means "no reply".
async fn callback_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    metrics::record_callback(body.len());

    let request = match Request::from_body_with_limit(body, state.config.webhook.max_body_size) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected callback body");
            metrics::record_error("decode");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let kind = if request.is_event() { "event" } else { "message" };
    let start = Instant::now();
    let mut reply = Reply::new();
    let outcome = state.router.dispatch(&request, &mut reply);

    metrics::record_latency(start.elapsed().as_secs_f64());
    metrics::record_dispatch(kind, outcome.as_str());
    debug!(
        msg_type = %request.msg_type(),
        event = %request.event(),
        outcome = outcome.as_str(),
        reply_bytes = reply.len(),
        "Callback served"
    );

    (StatusCode::OK, reply.into_bytes()).into_response()
}
