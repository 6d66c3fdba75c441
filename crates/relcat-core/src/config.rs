//! Connection configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! host = "db.internal"
//! port = 3306
//! username = "relcat"
//! password = "secret"
//!
//! [pool]
//! min_connections = 1
//! max_connections = 10
//! ```

use crate::{RelcatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where and how to reach a database server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Database selected on connect. Table operations always name their
    /// database explicitly, so this is optional.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            database: None,
            pool: PoolConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a MySQL configuration
    pub fn new_mysql(host: &str, port: u16, username: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: Some(username.to_string()),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ConnectionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RelcatError::Configuration("host must not be empty".into()));
        }
        self.pool.validate()
    }

    /// `mysql://user@host:port/db` form, safe for logs (the password is
    /// never included)
    pub fn connection_string(&self) -> String {
        let mut s = String::from("mysql://");
        if let Some(user) = &self.username {
            s.push_str(user);
            s.push('@');
        }
        s.push_str(&format!("{}:{}", self.host, self.port));
        if let Some(db) = &self.database {
            s.push('/');
            s.push_str(db);
        }
        s
    }
}

/// Pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_min_connections")]
    pub min_connections: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_min_connections() -> usize {
    1
}

fn default_max_connections() -> usize {
    10
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
        }
    }
}

impl PoolConfig {
    pub fn new(min_connections: usize, max_connections: usize) -> Self {
        Self {
            min_connections,
            max_connections,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(RelcatError::Configuration(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(RelcatError::Configuration(format!(
                "min_connections ({}) cannot exceed max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}
