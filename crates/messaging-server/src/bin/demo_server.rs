//! A minimal runnable binary wiring a [`ServerState`](messaging_server::ServerState)
//! to a real listener: single-node cluster state, no cross-node transport,
//! no metrics sink.

use std::net::SocketAddr;
use std::sync::Arc;

use messaging_server::{ServerConfig, ServerState};
use sub_registry::{LocalClusterState, NoopMonitoring, NoopTransport};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cluster = LocalClusterState::new("node-1");
    let transport = Arc::new(NoopTransport);
    let monitoring = Arc::new(NoopMonitoring);
    let state = ServerState::new(cluster, transport, monitoring);

    let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    messaging_server::serve(ServerConfig { bind_addr }, state).await
}
