//! Connection settings with environment variable support.
//!
//! Every setting can be overridden from the environment; command-line
//! flags take precedence over both. Run options (`--format`,
//! `--max-concurrent-jobs`) read their variables through the CLI parser.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `FLAKY_DETECTOR_CONNECT_TIMEOUT` | Connection timeout in seconds | `10` |
//! | `FLAKY_DETECTOR_TIMEOUT` | Per-request timeout in seconds | `60` |
//! | `FLAKY_DETECTOR_INSECURE` | Accept invalid TLS certificates | `false` |
//! | `FLAKY_DETECTOR_USER` | User for HTTP basic auth | unset |
//! | `FLAKY_DETECTOR_TOKEN` | API token for HTTP basic auth | unset |
//!
//! # Example
//!
//! ```bash
//! export FLAKY_DETECTOR_USER="ci-bot"
//! export FLAKY_DETECTOR_TOKEN="11aa22bb33cc"
//! flaky-detector https://jenkins.example.com report.html nightly-integration
//! ```

use std::env;
use std::sync::OnceLock;

use crate::jenkins::Credentials;

// ============================================================================
// Default Values
// ============================================================================

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_CONNECT_TIMEOUT: &str = "FLAKY_DETECTOR_CONNECT_TIMEOUT";
pub const ENV_REQUEST_TIMEOUT: &str = "FLAKY_DETECTOR_TIMEOUT";
pub const ENV_INSECURE: &str = "FLAKY_DETECTOR_INSECURE";
pub const ENV_USER: &str = "FLAKY_DETECTOR_USER";
pub const ENV_TOKEN: &str = "FLAKY_DETECTOR_TOKEN";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http: HttpSettings,
}

/// Settings for talking to the CI server
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
    /// Whole-request timeout (seconds)
    pub request_timeout: u64,
    pub accept_invalid_certs: bool,
    pub user: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http: HttpSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            http: HttpSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl HttpSettings {
    pub fn from_env() -> Self {
        Self {
            connect_timeout: parse_env(ENV_CONNECT_TIMEOUT).unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            request_timeout: parse_env(ENV_REQUEST_TIMEOUT).unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            accept_invalid_certs: env::var(ENV_INSECURE)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),
            user: non_empty_env(ENV_USER),
            token: non_empty_env(ENV_TOKEN),
        }
    }

    pub fn defaults() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_invalid_certs: false,
            user: None,
            token: None,
        }
    }

    /// Basic auth credentials, only when both user and token are set
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => Some(Credentials {
                user: user.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parse a boolean flag value ("1", "true", "yes", "on" and their negations)
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
