//! objrpc demo server.
//!
//! Serves the demo receiver over HTTP and prints the bound port to stdout so
//! a parent process can find it.

use anyhow::Result;
use clap::Parser;
use objrpc::{Endpoint, RpcConfig};
use objrpc_server::demo::Demo;
use objrpc_server::{start_server, ServerConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "objrpc-server")]
#[command(about = "JSON-over-HTTP RPC server for the objrpc demo receiver")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Route answering RPC calls
    #[arg(long, default_value = RpcConfig::DEFAULT_RPC_PATH)]
    rpc_path: String,

    /// Route serving the client script
    #[arg(long, default_value = RpcConfig::DEFAULT_CLIENT_PATH)]
    client_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting objrpc server");

    let endpoint = Endpoint::new(Demo::default())?;
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        rpc_path: args.rpc_path,
        client_path: args.client_path,
        ..Default::default()
    };
    let rpc_path = config.rpc_path.clone();

    let addr = start_server(endpoint, config).await?;

    // Parent processes read the port from this line.
    println!("RPC_PORT={}", addr.port());

    info!("RPC endpoint running on http://{}{}", addr, rpc_path);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
