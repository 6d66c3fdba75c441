//! Core test fixtures for running table operations against MySQL.
//!
//! Every test gets a [`TestDatabase`]: a fresh pool, a
//! [`MySqlTableOperations`] on top of it, and a database of its own. The
//! server is a testcontainers-managed MySQL unless
//! `RELCAT_TEST_MANUAL_CONTAINERS` is set, in which case the connection comes
//! from the TOML file named by `RELCAT_TEST_CONFIG` (or `root@127.0.0.1:3307`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use relcat_driver_tests::fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_list_tables() {
//!     let db = TestDatabase::create("list").await.unwrap();
//!     let tables = db.ops.list_tables(&db.name).await.unwrap();
//!     assert!(tables.is_empty());
//!     db.cleanup().await.unwrap();
//! }
//! ```

use anyhow::{Context, Result};
use relcat_core::{ConnectionConfig, ConnectionProvider, Table};
use relcat_driver_mysql::{MySqlDriver, MySqlPool, MySqlTableOperations, quote_ident};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::test_containers::mysql_container;

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Check if tests should use manually managed containers.
///
/// Set RELCAT_TEST_MANUAL_CONTAINERS=1 to use an already running server.
fn use_manual_containers() -> bool {
    env::var("RELCAT_TEST_MANUAL_CONTAINERS")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(false)
}

/// Connection settings for the test server
pub async fn test_config() -> Result<ConnectionConfig> {
    if use_manual_containers() {
        return match env::var("RELCAT_TEST_CONFIG") {
            Ok(path) => ConnectionConfig::from_file(&path)
                .with_context(|| format!("failed to load test config from {}", path)),
            Err(_) => Ok(ConnectionConfig::new_mysql("127.0.0.1", 3307, "root")
                .with_password("test_password")),
        };
    }

    let info = mysql_container()
        .await
        .context("failed to start MySQL container - is Docker running?")?;
    let mut config = ConnectionConfig::new_mysql(&info.host, info.port, &info.username);
    config.password = info.password;
    Ok(config)
}

/// Open a pool against the test server, retrying while it comes up
pub async fn test_pool() -> Result<MySqlPool> {
    initialize_logging();

    let config = test_config().await?;
    let driver = MySqlDriver::new();
    let max_attempts = 5;

    for attempt in 1..=max_attempts {
        match driver.connect(&config).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < max_attempts => {
                let delay = Duration::from_secs(2u64.pow(attempt.min(4)));
                tracing::warn!(
                    attempt = attempt,
                    delay_secs = delay.as_secs(),
                    "MySQL connection failed, retrying: {}",
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to connect to MySQL after {} attempts: {}",
                    max_attempts,
                    e
                ));
            }
        }
    }
    unreachable!("the final attempt always returns")
}

/// A database owned by one test
pub struct TestDatabase {
    /// Database name, unique within the test process
    pub name: String,
    /// Operations under test
    pub ops: MySqlTableOperations,
    pool: MySqlPool,
}

impl TestDatabase {
    /// Create a fresh database named after `prefix`
    pub async fn create(prefix: &str) -> Result<Self> {
        let pool = test_pool().await?;
        let name = format!(
            "relcat_{}_{}_{}",
            prefix,
            std::process::id(),
            DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        create_database(&pool, &name).await?;

        let ops = MySqlTableOperations::new(Arc::new(pool.clone()));
        Ok(Self { name, ops, pool })
    }

    /// Create a second database on the same server. It is not part of
    /// [`Self::cleanup`]; callers drop it with [`drop_database`].
    pub async fn sibling(&self, suffix: &str) -> Result<String> {
        let name = format!("{}_{}", self.name, suffix);
        create_database(&self.pool, &name).await?;
        Ok(name)
    }

    /// Pool backing [`Self::ops`]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Drop the database and close the pool
    pub async fn cleanup(self) -> Result<()> {
        drop_database(&self.pool, &self.name).await?;
        self.pool
            .disconnect()
            .await
            .context("failed to close pool")
    }
}

/// `CREATE DATABASE`, replacing any leftover from an earlier run
pub async fn create_database(pool: &MySqlPool, name: &str) -> Result<()> {
    let conn = pool.acquire().await?;
    conn.execute(&format!("DROP DATABASE IF EXISTS {}", quote_ident(name)), &[])
        .await?;
    conn.execute(&format!("CREATE DATABASE {}", quote_ident(name)), &[])
        .await?;
    // MySQL 8 caches TABLES statistics such as AUTO_INCREMENT
    if let Err(e) = conn
        .execute("SET GLOBAL information_schema_stats_expiry = 0", &[])
        .await
    {
        tracing::warn!(error = %e, "could not disable information_schema stats caching");
    }
    tracing::debug!(database = %name, "test database created");
    Ok(())
}

/// `DROP DATABASE IF EXISTS`
pub async fn drop_database(pool: &MySqlPool, name: &str) -> Result<()> {
    let conn = pool.acquire().await?;
    conn.execute(&format!("DROP DATABASE IF EXISTS {}", quote_ident(name)), &[])
        .await?;
    Ok(())
}

/// Compare a loaded table against the definition it was created from.
///
/// Properties of `expected` must be present with the same value; `actual`
/// may carry more (the server always reports its engine). Indexes are
/// compared without regard to order.
pub fn assert_table_matches(expected: &Table, actual: &Table) {
    use pretty_assertions::assert_eq;

    assert_eq!(expected.name(), actual.name(), "table name");
    assert_eq!(expected.comment(), actual.comment(), "table comment");
    assert_eq!(
        expected.columns().len(),
        actual.columns().len(),
        "column count of {}",
        expected.name()
    );
    for (want, got) in expected.columns().iter().zip(actual.columns()) {
        assert_eq!(want.name(), got.name(), "column order");
        assert_eq!(want.data_type(), got.data_type(), "type of {}", want.name());
        assert_eq!(want.nullable(), got.nullable(), "nullability of {}", want.name());
        assert_eq!(want.comment(), got.comment(), "comment of {}", want.name());
        assert_eq!(
            want.auto_increment(),
            got.auto_increment(),
            "auto increment of {}",
            want.name()
        );
    }

    for (key, value) in expected.properties() {
        assert_eq!(Some(value.as_str()), actual.property(key), "property {}", key);
    }

    let mut want = expected.indexes().to_vec();
    let mut got = actual.indexes().to_vec();
    want.sort_by(|a, b| a.name.cmp(&b.name));
    got.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(want, got, "indexes of {}", expected.name());
}

/// Initialize logging for tests if not already initialized
fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("relcat_driver_mysql=debug".parse().unwrap())
                    .add_directive("relcat_driver_tests=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_containers_flag_defaults_off() {
        if env::var("RELCAT_TEST_MANUAL_CONTAINERS").is_err() {
            assert!(!use_manual_containers());
        }
    }
}
