//! BACpipes Server Configuration
//!
//! Bind address, optional preload file and reading store settings. Loaded
//! from a TOML file and then overridden from the command line.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use bacpipes_common::{BacpipesError, Result};
use bacpipes_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON array of readings preloaded into the in-memory store.
    pub data_file: Option<PathBuf>,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_file: None,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    /// Load from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BacpipesError::Configuration(e.to_string()))
    }

    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], self.port)))
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_data_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.data_file = path;
        }
        self
    }

    /// Point the store at PostgreSQL, keeping the pool settings.
    pub fn with_database_url(mut self, url: &str) -> Result<Self> {
        let parsed = StoreConfig::from_url(url)?;
        self.store.database_url = parsed.database_url;
        Ok(self)
    }

    pub fn uses_database(&self) -> bool {
        self.store.database_url.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
