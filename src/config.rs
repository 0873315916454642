use crate::smtp::{AcceptAllFilters, MailboxFilterFactory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Environment variable overriding `max_message_size`
pub const MAX_MESSAGE_SIZE_ENV: &str = "SMTPD_MAX_MESSAGE_SIZE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// SMTP hostname (e.g., mail.example.com)
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Largest message accepted, in bytes. 0 means unlimited.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: u64,
    /// Listening endpoints
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
}

/// A listening endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    pub listen: String,
    /// Whether MAIL FROM requires an authenticated session (submission ports)
    #[serde(default)]
    pub require_auth: bool,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, listen: impl Into<String>, require_auth: bool) -> Self {
        Self {
            name: name.into(),
            listen: listen.into(),
            require_auth,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            max_message_size: default_max_message_size(),
            endpoints: default_endpoints(),
        }
    }
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_max_message_size() -> u64 {
    10 * 1024 * 1024
}

fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("mx", "0.0.0.0:25", false),
        EndpointConfig::new("submission", "0.0.0.0:587", true),
    ]
}

impl ServerConfig {
    /// Load configuration from file, falling back to defaults when it does
    /// not exist. Environment variables override file values.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).await?;
            Self::from_toml_str(&content)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        if let Ok(value) = std::env::var(MAX_MESSAGE_SIZE_ENV) {
            config.max_message_size = match value.trim().parse() {
                Ok(size) => size,
                Err(_) => {
                    return Err(ConfigError::InvalidEnv {
                        name: MAX_MESSAGE_SIZE_ENV,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

/// Read-only policy shared by every session of the process.
#[derive(Clone)]
pub struct ServerPolicy {
    /// 0 means unlimited
    pub max_message_size: u64,
    pub filters: Arc<dyn MailboxFilterFactory>,
}

impl ServerPolicy {
    pub fn new(max_message_size: u64, filters: Arc<dyn MailboxFilterFactory>) -> Self {
        Self {
            max_message_size,
            filters,
        }
    }

    pub fn from_config(config: &ServerConfig, filters: Arc<dyn MailboxFilterFactory>) -> Self {
        Self::new(config.max_message_size, filters)
    }

    pub fn exceeds_limit(&self, declared_size: u64) -> bool {
        self.max_message_size > 0 && declared_size > self.max_message_size
    }

    /// EHLO keyword advertising the limit (RFC 1870).
    pub fn size_extension(&self) -> String {
        if self.max_message_size == 0 {
            "SIZE".to_string()
        } else {
            format!("SIZE {}", self.max_message_size)
        }
    }
}

impl Default for ServerPolicy {
    fn default() -> Self {
        Self::new(default_max_message_size(), Arc::new(AcceptAllFilters))
    }
}

impl fmt::Debug for ServerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerPolicy")
            .field("max_message_size", &self.max_message_size)
            .finish_non_exhaustive()
    }
}
