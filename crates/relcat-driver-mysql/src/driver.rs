//! MySQL driver implementation

use mysql_async::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};
use relcat_core::{ConnectionConfig, RelcatError, Result};

use crate::MySqlPool;

/// MySQL database driver
pub struct MySqlDriver;

impl MySqlDriver {
    /// Create a new MySQL driver instance
    pub fn new() -> Self {
        tracing::debug!("MySQL driver initialized");
        Self
    }

    pub fn name(&self) -> &'static str {
        "mysql"
    }

    /// Open a connection pool and verify the server is reachable.
    ///
    /// Must be called from within a tokio runtime; the pool spawns its
    /// housekeeping tasks on it.
    #[tracing::instrument(skip(self, config), fields(host = %config.host, port = config.port))]
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<MySqlPool> {
        let opts = build_opts(config)?;
        let pool = Pool::new(opts);

        // acquire and release one connection
        let conn = pool.get_conn().await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect to MySQL database");
            RelcatError::Connection(format!("Failed to connect to MySQL: {}", e))
        })?;
        drop(conn);

        tracing::info!(
            driver = self.name(),
            url = %config.connection_string(),
            "MySQL connection pool created"
        );
        Ok(MySqlPool::new(pool))
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a [`ConnectionConfig`] into mysql_async options
pub(crate) fn build_opts(config: &ConnectionConfig) -> Result<Opts> {
    config.validate()?;

    let mut opts_builder = OptsBuilder::from_opts(Opts::default())
        .ip_or_hostname(config.host.as_str())
        .tcp_port(config.port);

    if let Some(db) = &config.database {
        opts_builder = opts_builder.db_name(Some(db.as_str()));
    }
    if let Some(u) = &config.username {
        opts_builder = opts_builder.user(Some(u.as_str()));
    }
    if let Some(p) = &config.password {
        opts_builder = opts_builder.pass(Some(p.as_str()));
    }

    let (min, max) = (config.pool.min_connections, config.pool.max_connections);
    let constraints = PoolConstraints::new(min, max).ok_or_else(|| {
        RelcatError::Configuration(format!(
            "Failed to configure MySQL pool constraints (min={}, max={})",
            min, max
        ))
    })?;
    let pool_opts = PoolOpts::default().with_constraints(constraints);
    opts_builder = opts_builder.pool_opts(pool_opts);

    Ok(opts_builder.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relcat_core::PoolConfig;

    #[test]
    fn test_driver_identity() {
        let driver = MySqlDriver::default();
        assert_eq!(driver.name(), "mysql");
    }

    #[test]
    fn test_build_opts_from_config() {
        let config = ConnectionConfig::new_mysql("db.internal", 3307, "relcat")
            .with_password("secret")
            .with_database("inventory");
        let opts = build_opts(&config).unwrap();

        assert_eq!(opts.ip_or_hostname(), "db.internal");
        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.user(), Some("relcat"));
        assert_eq!(opts.pass(), Some("secret"));
        assert_eq!(opts.db_name(), Some("inventory"));
    }

    #[test]
    fn test_build_opts_rejects_bad_pool() {
        let config = ConnectionConfig::new_mysql("localhost", 3306, "root")
            .with_pool(PoolConfig::new(5, 2));
        let err = build_opts(&config).unwrap_err();
        assert!(matches!(err, RelcatError::Configuration(_)));
    }
}
