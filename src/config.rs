//! Relay configuration

use std::net::{Ipv4Addr, SocketAddr};

/// Default listen port, on all interfaces
pub const DEFAULT_PORT: u16 = 9000;

/// Default WebSocket endpoint path
pub const DEFAULT_PATH: &str = "/ws";

/// Channel buffer size for server commands
pub const COMMAND_BUFFER_SIZE: usize = 256;

/// Runtime settings for the relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the TCP listener binds to
    pub bind_addr: SocketAddr,
    /// Request path accepted for the WebSocket upgrade
    pub path: String,
    /// Capacity of the handler → actor command channel
    pub command_buffer: usize,
}

impl RelayConfig {
    /// Build a config listening on `addr` with default path and buffer
    pub fn with_addr(addr: &str) -> Result<Self, std::net::AddrParseError> {
        Ok(Self {
            bind_addr: addr.parse()?,
            ..Self::default()
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            command_buffer: COMMAND_BUFFER_SIZE,
        }
    }
}
