//! Server configuration.

use anyhow::{bail, Result};
use objrpc::RpcConfig;

/// Path of the health check route.
pub const HEALTH_PATH: &str = "/health";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    /// Port to listen on (0 = auto-assign).
    pub port: u16,
    /// Route answering RPC calls.
    pub rpc_path: String,
    /// Route serving the browser client script.
    pub client_path: String,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            rpc_path: RpcConfig::DEFAULT_RPC_PATH.to_string(),
            client_path: RpcConfig::DEFAULT_CLIENT_PATH.to_string(),
            body_limit: RpcConfig::DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Check that the routes are well-formed and distinct.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.rpc_path, &self.client_path] {
            if !path.starts_with('/') {
                bail!("Route '{}' must start with '/'", path);
            }
            if path == HEALTH_PATH {
                bail!("Route '{}' is reserved for health checks", path);
            }
        }
        if self.rpc_path == self.client_path {
            bail!(
                "RPC and client routes must differ, both are '{}'",
                self.rpc_path
            );
        }
        if self.body_limit == 0 {
            bail!("Body limit must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.rpc_path, "/api");
        assert_eq!(config.client_path, "/api/client.js");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_routes() {
        let relative = ServerConfig {
            rpc_path: "api".to_string(),
            ..Default::default()
        };
        assert!(relative.validate().is_err());

        let health = ServerConfig {
            client_path: HEALTH_PATH.to_string(),
            ..Default::default()
        };
        assert!(health.validate().is_err());

        let same = ServerConfig {
            client_path: "/api".to_string(),
            ..Default::default()
        };
        assert!(same.validate().is_err());
    }
}
