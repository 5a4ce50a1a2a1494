//! Service configuration, read from the environment.

use crate::outbound::DEFAULT_API_BASE_URL;
use crate::storage::DEFAULT_CAPACITY;
use crate::webhook::{DEFAULT_WEBHOOK_PATH, WebhookSettings};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// wCRM API base URL, without trailing slash
    pub api_base_url: String,

    /// wCRM API key; outbound sends fail while unset
    pub api_key: Option<String>,

    /// Timeout for outbound API requests
    pub http_timeout: Duration,

    /// Webhook path segment, also the default scope key
    pub webhook_path: String,

    /// Whether inbound deliveries are recorded in the history store
    pub store_messages: bool,

    /// History capacity passed to every append
    pub max_stored_messages: usize,

    /// Externally visible base URL, used to report the webhook URL
    pub public_url: Option<String>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            http_timeout: Duration::from_secs(30),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            store_messages: true,
            max_stored_messages: DEFAULT_CAPACITY,
            public_url: None,
        }
    }

    /// Loads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(host) = lookup("APP_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("APP_PORT") {
            config.port = port
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?;
        }
        if let Some(url) = lookup("WCRM_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        config.api_key = lookup("WCRM_API_KEY").filter(|key| !key.trim().is_empty());
        if let Some(secs) = lookup("WCRM_HTTP_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .context("WCRM_HTTP_TIMEOUT_SECS must be a whole number of seconds")?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("WCRM_WEBHOOK_PATH") {
            config.webhook_path = path.trim_matches('/').to_string();
        }
        if let Some(raw) = lookup("WCRM_STORE_MESSAGES") {
            config.store_messages = parse_bool(&raw)
                .with_context(|| format!("WCRM_STORE_MESSAGES must be a boolean, got '{raw}'"))?;
        }
        if let Some(max) = lookup("WCRM_MAX_STORED_MESSAGES") {
            config.max_stored_messages = max
                .parse::<usize>()
                .context("WCRM_MAX_STORED_MESSAGES must be a non-negative integer")?;
        }
        config.public_url = lookup("WCRM_PUBLIC_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string());

        config.validate()?;
        Ok(config)
    }

    /// Set the bind host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the webhook path
    pub fn webhook_path(mut self, path: &str) -> Self {
        self.webhook_path = path.trim_matches('/').to_string();
        self
    }

    /// Enable or disable history recording
    pub fn store_messages(mut self, enabled: bool) -> Self {
        self.store_messages = enabled;
        self
    }

    /// Set history capacity
    pub fn max_stored_messages(mut self, max: usize) -> Self {
        self.max_stored_messages = max;
        self
    }

    /// Set the public base URL
    pub fn public_url(mut self, url: &str) -> Self {
        self.public_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.webhook_path.is_empty() {
            anyhow::bail!("webhook path cannot be empty");
        }
        if self.webhook_path.contains('/') {
            anyhow::bail!("webhook path must be a single path segment");
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!("API base URL must start with http:// or https://");
        }
        if self.http_timeout.is_zero() {
            anyhow::bail!("HTTP timeout must be > 0");
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings {
            path: self.webhook_path.clone(),
            store_messages: self.store_messages,
            max_stored_messages: self.max_stored_messages,
            public_base_url: self.public_url.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
