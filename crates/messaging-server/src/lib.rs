//! A small JSON-over-WebSocket transport that drives a
//! [`sub_registry::SubscriptionRegistry`] per topic.
//!
//! The wire protocol of individual actions is deliberately external to the
//! registry: this crate supplies one, but the registry is parameterised over
//! which action codes it emits and never constructs a wire message itself.
//! It exists to demonstrate the subscribe/unsubscribe/fanout contract end to
//! end, not to be a complete production gateway: authentication,
//! config-file loading, and process supervision stay out of scope.
//!
//! One `axum::Router`, one `/ws` upgrade route, one task per connection.

#![warn(missing_docs)]

pub mod connection;
pub mod protocol;
pub mod registries;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sub_registry::{ClusterStateBridge, ClusterTransport, Monitoring};

pub use connection::WsConnection;
pub use protocol::{ActionCode, WireMessage};
pub use registries::RegistrySet;

/// Runtime configuration for the server's axum app. Registries take all of
/// their configuration through constructor parameters rather than a
/// file-loading layer, and this mirrors that at the transport layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        }
    }
}

/// Shared application state handed to every connection.
#[derive(Clone, Debug)]
pub struct ServerState {
    registries: Arc<RegistrySet>,
}

impl ServerState {
    /// Builds the seven per-topic registries sharing `cluster`, `transport`,
    /// and `monitoring`.
    pub fn new(
        cluster: Arc<dyn ClusterStateBridge>,
        transport: Arc<dyn ClusterTransport<WireMessage>>,
        monitoring: Arc<dyn Monitoring<WireMessage>>,
    ) -> Self {
        Self {
            registries: Arc::new(RegistrySet::new(cluster, transport, monitoring)),
        }
    }

    /// The registries this state wraps, for callers that want to drive the
    /// registry directly (e.g. from a server-initiated broadcast, not a
    /// client request).
    pub fn registries(&self) -> &Arc<RegistrySet> {
        &self.registries
    }
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    /// The connecting client's user identity. No authentication is
    /// performed here; a production front end would populate this from a
    /// verified session instead of a query parameter.
    #[serde(default = "anonymous_user")]
    user: String,
}

fn anonymous_user() -> String {
    "anonymous".to_string()
}

async fn ws_handler(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| ws::main_websocket(socket, query.user, state.registries))
}

/// The axum router for this server: a single `/ws` upgrade route.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Binds `config.bind_addr` and serves `router(state)` until the process is
/// signalled to stop. Top-level glue, so failures are reported through
/// `anyhow`: libraries use `thiserror`, top-level glue uses `anyhow`.
pub async fn serve(config: ServerConfig, state: ServerState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    messaging_log::log_info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
