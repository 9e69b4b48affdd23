//! High-level client API.

use crate::connection::{Connection, ConnectionConfig};
use crate::error::ClientError;
use rcon_protocol::RequestIds;

/// High-level client for RCON servers.
///
/// [`Client::send`] opens a fresh connection per command, so any number of
/// tasks can share one client without coordinating. Callers sending many
/// commands in a row should hold a [`Connection`] from [`Client::connect`]
/// instead and skip the per-command login.
#[derive(Debug, Clone)]
pub struct Client {
    config: ConnectionConfig,
    ids: RequestIds,
}

impl Client {
    /// Creates a new client with the given configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            ids: RequestIds::new(),
        }
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Opens an authenticated connection for reuse.
    pub async fn connect(&self) -> Result<Connection, ClientError> {
        Connection::connect(&self.config, self.ids.clone()).await
    }

    /// Connects, sends one command and disconnects.
    ///
    /// The connection is closed whether or not the command succeeded.
    pub async fn send(&self, command: &str) -> Result<String, ClientError> {
        let conn = self.connect().await?;
        let result = conn.send_command(command).await;
        let _ = conn.close().await;
        result
    }
}
