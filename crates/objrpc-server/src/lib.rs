//! objrpc-server - HTTP transport for objrpc endpoints.
//!
//! Serves one [`objrpc::Endpoint`] over axum:
//! - `GET|POST <rpc_path>`: RPC calls, `func` and `param` as form fields
//! - `GET <client_path>`: the browser client script
//! - `GET /health`: liveness probe

pub mod config;
pub mod demo;
pub mod handler;
pub mod server;

pub use config::ServerConfig;
pub use server::{build_router, start_server};
