//! Docker container management for integration tests.
//!
//! The MySQL container is started lazily by the first test that asks for it
//! and cached for the rest of the process. It is removed when the test
//! process exits.

use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::mysql::Mysql;

/// Information about a running test container
#[derive(Clone, Debug)]
pub struct ContainerInfo {
    /// Host address (typically 127.0.0.1)
    pub host: String,
    /// Port number (randomly assigned by testcontainers)
    pub port: u16,
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: Option<String>,
}

struct MysqlContainer {
    #[allow(dead_code)]
    inner: ContainerAsync<Mysql>,
    info: ContainerInfo,
}

/// Global MySQL container instance
static MYSQL_CONTAINER: Lazy<Arc<Mutex<Option<MysqlContainer>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

/// Get or start the MySQL test container
pub async fn mysql_container() -> anyhow::Result<ContainerInfo> {
    {
        let guard = MYSQL_CONTAINER
            .lock()
            .map_err(|e| anyhow::anyhow!("failed to lock mysql container: {}", e))?;

        if let Some(ref container) = *guard {
            return Ok(container.info.clone());
        }
    }

    tracing::info!("starting MySQL test container");

    let container = Mysql::default()
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start mysql container: {}", e))?;

    let host_port = container
        .get_host_port_ipv4(3306)
        .await
        .map_err(|e| anyhow::anyhow!("failed to get mysql port: {}", e))?;

    // testcontainers-modules MySQL defaults: root user with empty password
    let info = ContainerInfo {
        host: "127.0.0.1".to_string(),
        port: host_port,
        username: "root".to_string(),
        password: None,
    };

    tracing::info!(port = host_port, "MySQL test container started");

    let mut guard = MYSQL_CONTAINER
        .lock()
        .map_err(|e| anyhow::anyhow!("failed to lock mysql container: {}", e))?;

    // another test may have won the race while this one was starting
    if let Some(ref existing) = *guard {
        return Ok(existing.info.clone());
    }
    *guard = Some(MysqlContainer {
        inner: container,
        info: info.clone(),
    });

    Ok(info)
}
