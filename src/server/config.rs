//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Streaming server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Bounded wait used while polling for a connection or a stop request
    pub accept_poll_interval: Duration,

    /// How long `stop()` waits for the serve loop before reclaiming it
    pub stop_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Size of the buffer used to drain inbound client bytes
    pub drain_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3010".parse().unwrap(),
            accept_poll_interval: Duration::from_millis(250),
            stop_timeout: Duration::from_secs(4),
            tcp_nodelay: true, // Important for low latency
            drain_buffer_size: 256,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the accept poll interval
    pub fn accept_poll_interval(mut self, interval: Duration) -> Self {
        self.accept_poll_interval = interval;
        self
    }

    /// Set the stop timeout
    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Disable TCP_NODELAY
    pub fn disable_nodelay(mut self) -> Self {
        self.tcp_nodelay = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 3010);
        assert_eq!(config.accept_poll_interval, Duration::from_millis(250));
        assert_eq!(config.stop_timeout, Duration::from_secs(4));
        assert!(config.tcp_nodelay);
        assert_eq!(config.drain_buffer_size, 256);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:3011".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 3011);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:3010".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .accept_poll_interval(Duration::from_millis(50))
            .stop_timeout(Duration::from_secs(1))
            .disable_nodelay();

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.accept_poll_interval, Duration::from_millis(50));
        assert_eq!(config.stop_timeout, Duration::from_secs(1));
        assert!(!config.tcp_nodelay);
    }
}
