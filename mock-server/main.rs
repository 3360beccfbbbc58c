use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;

use wbids::config;
use wbids::logging::{init_logging, DEFAULT_FILTER};
use wbids::mock::MockBackend;
use wbids::mock_server;

/// Serves simulated WBIDS data on the backend's HTTP routes.
#[derive(Parser)]
#[command(name = "wbids-mock-backend", version)]
struct Args {
    /// Port to bind (default: $WBIDS_MOCK_PORT or 5000)
    #[arg(long)]
    port: Option<u16>,

    /// Bind on all interfaces instead of loopback only
    #[arg(long)]
    public: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging(DEFAULT_FILTER);

    let args = Args::parse();
    let host = if args.public {
        Ipv4Addr::UNSPECIFIED
    } else {
        Ipv4Addr::LOCALHOST
    };
    let addr = SocketAddr::from((host, args.port.unwrap_or_else(config::mock_port)));
    let listener = TcpListener::bind(addr).with_context(|| format!("cannot bind {addr}"))?;

    let backend = Arc::new(MockBackend::new());
    tokio::select! {
        result = mock_server::serve(listener, backend) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("mock backend stopped"),
    }
    Ok(())
}
