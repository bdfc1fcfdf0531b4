//! High-level RouterOS API client

use crate::config::DeviceConfig;
use crate::error::{ClientError, Result};

use super::connection::Connection;
use super::reply::{Record, Sentence, fatal_message, parse_reply, trap_message};

/// Authenticated session with one RouterOS device.
///
/// Construction performs the connect and login handshake, so every client in
/// existence is ready for commands. The session is exclusively owned: one
/// command is in flight at a time (`&mut self`), and the socket is closed
/// when the client is dropped or [`close`](Self::close)d — whichever comes
/// first.
pub struct RouterOsClient {
    conn: Connection,
    poisoned: bool,
}

impl RouterOsClient {
    /// Connects and authenticates against the device in `config`.
    ///
    /// # Errors
    ///
    /// `Config` for an invalid configuration, `Connection`/`Timeout` when the
    /// socket cannot be opened, `Authentication` when the device rejects the
    /// handshake. The socket never survives a failed construction.
    pub async fn connect(config: &DeviceConfig) -> Result<Self> {
        config.validate().map_err(ClientError::Config)?;
        let mut conn = Connection::open(config).await?;
        if let Err(e) = conn.login(&config.username, &config.password).await {
            tracing::debug!("Login failed for {}: {}", config.addr(), e);
            let _ = conn.close().await;
            return Err(e);
        }
        Ok(Self {
            conn,
            poisoned: false,
        })
    }

    /// Runs one command and parses the `!re` sentences into records.
    ///
    /// `attributes` become `=key=value` words after the command word.
    ///
    /// # Errors
    ///
    /// `Device` when the reply carries a `!trap` (session stays usable),
    /// `FatalDevice` on `!fatal` (session is poisoned), `Connection`/
    /// `Timeout` on transport failure (likewise poisoned).
    pub async fn execute(
        &mut self,
        command: &str,
        attributes: &[(&str, &str)],
    ) -> Result<Vec<Record>> {
        let mut words: Vec<String> = Vec::with_capacity(1 + attributes.len());
        words.push(command.to_string());
        for (key, value) in attributes {
            words.push(format!("={key}={value}"));
        }
        let sentences = self.execute_raw(words).await?;
        Ok(parse_reply(&sentences))
    }

    /// Runs one pre-built sentence and returns the raw reply sentences.
    ///
    /// For callers that need reply material outside `!re` records (e.g.
    /// `=ret=` values from action commands).
    pub async fn execute_raw(&mut self, words: Vec<String>) -> Result<Vec<Sentence>> {
        if self.poisoned {
            return Err(ClientError::closed(
                "connection unusable after fatal error",
            ));
        }

        let sentences = match self.conn.exchange(&words).await {
            Ok(sentences) => sentences,
            Err(e) => {
                if e.is_connection_fatal() {
                    self.poisoned = true;
                }
                return Err(e);
            }
        };

        if let Some(message) = fatal_message(&sentences) {
            tracing::warn!("Device reported fatal error: {}", message);
            self.poisoned = true;
            let _ = self.conn.close().await;
            return Err(ClientError::FatalDevice { message });
        }
        if let Some(message) = trap_message(&sentences) {
            tracing::debug!("Device trap: {}", message);
            return Err(ClientError::Device { message });
        }
        Ok(sentences)
    }

    /// Interface inventory (`/interface/print`).
    pub async fn interfaces(&mut self) -> Result<Vec<Record>> {
        self.execute("/interface/print", &[]).await
    }

    /// DHCP server leases (`/ip/dhcp-server/lease/print`).
    pub async fn dhcp_leases(&mut self) -> Result<Vec<Record>> {
        self.execute("/ip/dhcp-server/lease/print", &[]).await
    }

    /// DHCP server networks (`/ip/dhcp-server/network/print`).
    pub async fn dhcp_networks(&mut self) -> Result<Vec<Record>> {
        self.execute("/ip/dhcp-server/network/print", &[]).await
    }

    /// IP address assignments (`/ip/address/print`).
    pub async fn ip_addresses(&mut self) -> Result<Vec<Record>> {
        self.execute("/ip/address/print", &[]).await
    }

    /// ARP table (`/ip/arp/print`).
    pub async fn arp_table(&mut self) -> Result<Vec<Record>> {
        self.execute("/ip/arp/print", &[]).await
    }

    /// Gracefully shuts the session down.
    ///
    /// Dropping the client closes the socket as well; this variant flushes
    /// the TCP/TLS shutdown sequence first.
    pub async fn close(mut self) -> Result<()> {
        self.conn.close().await
    }
}
