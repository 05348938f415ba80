//! Server configuration.

use std::net::SocketAddr;

/// Configuration for the rookery server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub listen_addr: SocketAddr,
    /// Maximum length of one inbound JSON line, in bytes. Oversized lines
    /// close the connection rather than buffer without bound.
    pub max_command_bytes: usize,
}

impl ServerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_command_bytes == 0 {
            return Err(ConfigError {
                reason: "max_command_bytes must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8080).into(),
            max_command_bytes: 64 * 1024,
        }
    }
}

/// An invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct ConfigError {
    /// Which value is invalid and why.
    pub reason: String,
}
