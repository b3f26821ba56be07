use std::net::SocketAddr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "rulecheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set — cannot call the text-generation API without it")]
    MissingApiKey,

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Runtime configuration, read once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the external text-generation API.
    pub api_key: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// Base URL of the API (overridable for tests).
    pub base_url: String,
    /// Per-call timeout for outbound generation requests.
    pub timeout_secs: u64,
    /// Cap on simultaneous outbound generation calls per request.
    pub max_concurrent_checks: usize,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_CONCURRENT: usize = 4;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// Fails fast with `MissingApiKey` rather than letting the first
    /// evaluation discover the gap mid-request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Tests use this with a map instead of mutating process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = parse_var(&lookup, "RULECHECK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let max_concurrent_checks =
            parse_var(&lookup, "RULECHECK_MAX_CONCURRENT", DEFAULT_MAX_CONCURRENT)?;

        let bind_raw =
            lookup("RULECHECK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: "RULECHECK_BIND_ADDR".into(),
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout_secs,
            max_concurrent_checks,
            bind_addr,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: var.into(),
            value: raw,
        }),
    }
}
