//! # Application State
//!
//! Shared state available to all HTTP request handlers, created once at startup and shared
//! via `Arc` across concurrent requests.
//!
//! ## Components
//!
//! - **Table config**: the server-wide default `InMemoryTableConfig`. Requests may overlay
//!   their own keys on top of it; the shared copy is never mutated.
//! - **Converter**: the `TraitConverter` used to plan enforcers below rewritten nodes.
//!   Stateless, so a single instance serves every request.
//! - **Server config**: listen address.

use aggx_core::config::{InMemoryTableConfig, SHUFFLE_BY_PARTIAL_KEY_ENABLED};
use aggx_core::convert::{ExchangeConverter, TraitConverter};
use std::env;
use std::sync::Arc;

pub const LISTEN_ADDR_ENV: &str = "AGGX_LISTEN_ADDR";
pub const PARTIAL_KEY_ENV: &str = "AGGX_SHUFFLE_BY_PARTIAL_KEY_ENABLED";

/// Server-level configuration.
pub struct ServerConfig {
    pub listen_addr: String,
    /// Defaults applied to every request before its own overrides.
    pub table_config: InMemoryTableConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            table_config: InMemoryTableConfig::new(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overridden by `AGGX_LISTEN_ADDR` and `AGGX_SHUFFLE_BY_PARTIAL_KEY_ENABLED`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = env::var(LISTEN_ADDR_ENV) {
            config.listen_addr = addr;
        }
        if let Ok(enabled) = env::var(PARTIAL_KEY_ENV) {
            config
                .table_config
                .set(SHUFFLE_BY_PARTIAL_KEY_ENABLED.key, enabled);
        }
        config
    }
}

/// Shared application state, accessible by all request handlers via Axum's State extractor.
pub struct AppState {
    pub converter: Arc<dyn TraitConverter>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            converter: Arc::new(ExchangeConverter),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
