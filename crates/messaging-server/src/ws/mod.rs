//! The WebSocket connection loop: reads inbound requests, dispatches them to
//! a [`RegistrySet`], and ships outbound frames (acks, protocol replies, and
//! fanned-out broadcasts) through [`WsConnection`]'s background writer.
//!
//! A single task owns the socket and `tokio::select!`s between inbound
//! frames and an outbound channel, so a
//! [`SubscriptionRegistry`](sub_registry::SubscriptionRegistry) fanning a
//! message out to this connection from an unrelated call stack never has to
//! reach into a socket it does not own.

mod error;
mod subscribe;
mod unsubscribe;

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use tokio::sync::mpsc;

pub use error::WsError;

use crate::connection::WsConnection;
use crate::protocol::{ActionCode, WireMessage};
use crate::registries::RegistrySet;

/// Per-connection state threaded through request dispatch.
pub(crate) struct WsContext {
    pub(crate) conn: WsConnection,
    pub(crate) registries: Arc<RegistrySet>,
}

fn dispatch(context: &mut WsContext, request: &WireMessage) -> Result<(), WsError> {
    match request.action {
        ActionCode::Subscribe => subscribe::handle(context, request),
        ActionCode::Unsubscribe => unsubscribe::handle(context, request),
        _ => Err(WsError::InvalidRequest),
    }
}

/// Drives one accepted WebSocket connection end to end: a single task reads
/// inbound frames and drains the outbound channel the registry's fanout
/// writes into, in whichever order they become ready.
pub(crate) async fn main_websocket(mut socket: WebSocket, user: String, registries: Arc<RegistrySet>) {
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<WsMessage>();

    let conn = WsConnection::new(user, outbound_tx);
    let mut context = WsContext {
        conn: conn.clone(),
        registries,
    };

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(message) = outbound else {
                    break;
                };
                if socket.send(message).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                let Some(Ok(message)) = inbound else {
                    break;
                };
                let WsMessage::Text(text) = message else {
                    continue;
                };

                let request: WireMessage = match serde_json::from_str(&text) {
                    Ok(request) => request,
                    Err(err) => {
                        messaging_log::log_warn!("could not parse inbound websocket message: {}", err);
                        context.conn.send_message(&WireMessage::error_reply(
                            WsError::ParseError.code(),
                            &WsError::ParseError.to_string(),
                            None,
                        ));
                        continue;
                    }
                };

                if let Err(err) = dispatch(&mut context, &request) {
                    messaging_log::log_warn!("request rejected: {}", err);
                    context.conn.send_message(&WireMessage::error_reply(
                        err.code(),
                        &err.to_string(),
                        request.correlation_id.clone(),
                    ));
                }
            }
        }
    }

    conn.notify_closed();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sub_registry::{LocalClusterState, NoopMonitoring, NoopTransport};

    fn registries() -> Arc<RegistrySet> {
        Arc::new(RegistrySet::new(
            LocalClusterState::new(Arc::from("node-a")),
            Arc::new(NoopTransport),
            Arc::new(NoopMonitoring),
        ))
    }

    #[test]
    fn dispatch_rejects_unknown_action() {
        let conn = WsConnection::new("alice".to_string(), mpsc::unbounded_channel().0);
        let mut context = WsContext {
            conn,
            registries: registries(),
        };
        let request = WireMessage {
            topic: "event".to_string(),
            action: ActionCode::Ack,
            name: Some("room/1".to_string()),
            original_action: None,
            names: None,
            correlation_id: None,
            data: None,
        };
        assert!(matches!(
            dispatch(&mut context, &request),
            Err(WsError::InvalidRequest)
        ));
    }
}
