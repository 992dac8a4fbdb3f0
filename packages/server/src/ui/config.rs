//! Server bootstrap configuration.

/// Default chat port.
pub const DEFAULT_PORT: u16 = 12345;

/// Bootstrap settings consumed by [`Server::bind`](super::Server::bind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Chat port; 0 picks an ephemeral port
    pub port: u16,
    /// Optional upper bound on inbound line length in bytes
    pub max_line_length: Option<usize>,
    /// Serve the admin HTTP API on this port when set
    pub admin_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_line_length: None,
            admin_port: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn admin_addr(&self) -> Option<String> {
        self.admin_port
            .map(|port| format!("{}:{}", self.host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_binds_loopback() {
        // テスト項目: デフォルト設定ではループバックの既定ポートに bind する
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作) / then (期待する結果):
        assert_eq!(config.bind_addr(), "127.0.0.1:12345");
        assert_eq!(config.admin_addr(), None);
    }

    #[test]
    fn test_admin_addr_shares_host() {
        // テスト項目: 管理用 API はチャットと同じホストに bind する
        // given (前提条件):
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 4000,
            max_line_length: Some(1024),
            admin_port: Some(4001),
        };

        // when (操作) / then (期待する結果):
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
        assert_eq!(config.admin_addr(), Some("0.0.0.0:4001".to_string()));
    }
}
