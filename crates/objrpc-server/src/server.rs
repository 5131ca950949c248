//! HTTP server implementation using Axum.

use crate::config::{ServerConfig, HEALTH_PATH};
use crate::handler::{handle_client, handle_health, handle_rpc};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use objrpc::Endpoint;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router for `endpoint`.
///
/// Routes must not collide; see [`ServerConfig::validate`].
pub fn build_router(endpoint: Endpoint, config: &ServerConfig) -> Router {
    // Configure CORS for browser clients on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(HEALTH_PATH, get(handle_health))
        .route(&config.rpc_path, get(handle_rpc).post(handle_rpc))
        .route(&config.client_path, get(handle_client))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(endpoint))
}

/// Start the RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(endpoint: Endpoint, config: ServerConfig) -> anyhow::Result<SocketAddr> {
    config.validate()?;

    let function_count = endpoint.registry().len();
    let app = build_router(endpoint, &config);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(
        "Server listening on {} ({} functions at {})",
        actual_addr, function_count, config.rpc_path
    );

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::Demo;

    #[tokio::test]
    async fn test_server_starts() {
        let endpoint = Endpoint::new(Demo::default()).unwrap();
        let addr = start_server(endpoint, ServerConfig::default()).await.unwrap();
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_server_rejects_invalid_config() {
        let endpoint = Endpoint::new(Demo::default()).unwrap();
        let config = ServerConfig {
            rpc_path: HEALTH_PATH.to_string(),
            ..Default::default()
        };
        assert!(start_server(endpoint, config).await.is_err());
    }
}
