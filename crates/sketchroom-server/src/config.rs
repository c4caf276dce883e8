//! Relay configuration, read from `SKETCHROOM_*` environment variables.
//!
//! A `.env` file in the working directory is loaded first when present.

use axum::http::HeaderValue;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const ENV_PREFIX: &str = "SKETCHROOM_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid listen address {0}")]
    InvalidAddress(String),
    #[error("invalid CORS origin {0:?}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Frames buffered per room before slow peers start lagging.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// How long an empty room keeps its shapes. Zero drops it on last leave.
    #[serde(default)]
    pub room_idle_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// HS256 secret. Without it every connection is admitted.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Comma separated allow-list. Without it any origin is accepted.
    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_channel_capacity() -> usize {
    256
}

fn default_sweep_interval_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            channel_capacity: default_channel_capacity(),
            room_idle_ttl_secs: 0,
            sweep_interval_secs: default_sweep_interval_secs(),
            jwt_secret: None,
            cors_origins: None,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded {}", path.display());
        }
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Load from explicit `(key, value)` pairs, keys carrying the prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    pub fn server_address(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn room_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.room_idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let Some(origins) = &self.cors_origins else {
            return Ok(CorsLayer::permissive());
        };
        let origins = origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidCorsOrigin(o.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any))
    }
}
