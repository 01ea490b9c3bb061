//! Client configuration
//!
//! Configuration is an explicit value handed to the dispatcher and to the
//! collaborators; nothing in this crate reads it from globals mid-call.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::Protocol;

/// Default probe timeout in seconds
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test networks by default
    Development,
    /// Main networks by default
    #[default]
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Self::Development,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment environment
    pub environment: Environment,
    /// Base URL of the chain query API
    pub api_url: String,
    /// API key passed through to the query API
    pub api_key: Option<String>,
    /// Upper bound on a single capability probe
    #[serde(with = "duration_secs")]
    pub probe_timeout: Duration,
    /// JSON-RPC endpoints for EVM protocols, used by the contract reader
    pub rpc_urls: HashMap<Protocol, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api_url: "https://api.omniwallet.io/v1".to_string(),
            api_key: None,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            rpc_urls: HashMap::new(),
        }
    }
}

impl Config {
    /// Build a configuration from `OMNI_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(environment) = std::env::var("OMNI_ENV") {
            config.environment = Environment::parse(&environment);
        }
        if let Ok(url) = std::env::var("OMNI_API_URL") {
            config.api_url = url;
        }
        config.api_key = std::env::var("OMNI_API_KEY").ok().filter(|k| !k.is_empty());
        config.probe_timeout = std::env::var("OMNI_PROBE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.probe_timeout);

        for protocol in Protocol::EVM {
            let key = format!("OMNI_RPC_{}", protocol.as_str().to_ascii_uppercase());
            if let Ok(url) = std::env::var(key) {
                config.rpc_urls.insert(protocol, url);
            }
        }

        config
    }

    /// Network selection when the caller does not say: testnet in development
    pub fn default_testnet(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Resolve an optional testnet flag against the environment default
    pub fn resolve_testnet(&self, testnet: Option<bool>) -> bool {
        testnet.unwrap_or_else(|| self.default_testnet())
    }

    pub fn with_rpc_url(mut self, protocol: Protocol, url: impl Into<String>) -> Self {
        self.rpc_urls.insert(protocol, url.into());
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
