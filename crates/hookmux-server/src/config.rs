//! Server configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (HOOKMUX_*)
//! - TOML configuration file

use anyhow::{bail, Context, Result};
use hookmux_protocol::MAX_BODY_SIZE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Webhook endpoint configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Built-in reply handlers.
    #[serde(default)]
    pub replies: RepliesConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Webhook endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Path the platform posts callbacks to.
    #[serde(default = "default_callback_path")]
    pub callback_path: String,

    /// Maximum callback body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

/// Built-in handlers registered at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepliesConfig {
    /// Echo text messages back to the sender.
    #[serde(default)]
    pub echo_text: bool,

    /// Text sent back on `subscribe` events.
    #[serde(default)]
    pub subscribe_welcome: Option<String>,

    /// Register default handlers that log unhandled callbacks.
    ///
    /// Unknown types then count as handled rather than unmatched.
    #[serde(default)]
    pub log_unhandled: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics export.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_host() -> String {
    std::env::var("HOOKMUX_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn default_port() -> u16 {
    std::env::var("HOOKMUX_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

fn default_true() -> bool {
    true
}

fn default_callback_path() -> String {
    "/callback".to_string()
}

fn default_max_body_size() -> usize {
    MAX_BODY_SIZE
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook: WebhookConfig::default(),
            replies: RepliesConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            callback_path: default_callback_path(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            echo_text: false,
            subscribe_welcome: None,
            log_unhandled: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// `HOOKMUX_CONFIG` takes precedence over the default search paths.
    ///
    /// The result is always validated, including the defaults fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("HOOKMUX_CONFIG") {
            return Self::from_file(shellexpand::tilde(&path).as_ref());
        }

        let config_paths = [
            "hookmux.toml",
            "/etc/hookmux/hookmux.toml",
            "~/.config/hookmux/hookmux.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        let config = Self::default();
        config.validate().context("Invalid default configuration")?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values that would otherwise fail at server startup.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !self.webhook.callback_path.starts_with('/') {
            bail!(
                "webhook.callback_path must start with '/': {}",
                self.webhook.callback_path
            );
        }
        if self.webhook.callback_path == "/health" {
            bail!("webhook.callback_path conflicts with /health");
        }
        if self.webhook.max_body_size == 0 {
            bail!("webhook.max_body_size must be greater than zero");
        }
        Ok(())
    }

    /// Get the socket address to bind to.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address: {}:{}", self.host, self.port))
    }
}
