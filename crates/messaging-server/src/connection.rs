//! [`sub_registry::Connection`] implemented over an axum WebSocket, split
//! into a cheap, cloneable handle and a background writer fed through an
//! unbounded channel so fanout deliveries never block on socket I/O while a
//! registry's internal lock is held.

use std::sync::Arc;

use axum::extract::ws::Message as WsMessage;
use parking_lot::Mutex;
use sub_registry::connection::CloseHook;
use sub_registry::Connection;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::WireMessage;

struct Inner {
    id: Uuid,
    user: String,
    outbound: mpsc::UnboundedSender<WsMessage>,
    close_hooks: Mutex<Vec<CloseHook<WsConnection>>>,
}

/// A connection handle backed by a real axum `WebSocket`'s writer half.
#[derive(Clone)]
pub struct WsConnection {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection")
            .field("id", &self.inner.id)
            .field("user", &self.inner.user)
            .finish()
    }
}

impl WsConnection {
    /// A new connection handle with a fresh id, writing through `outbound`.
    pub fn new(user: String, outbound: mpsc::UnboundedSender<WsMessage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                user,
                outbound,
                close_hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Runs and clears every registered close hook, in registration order.
    /// Called once the owning socket's read/write loop has exited.
    pub fn notify_closed(&self) {
        let hooks = std::mem::take(&mut *self.inner.close_hooks.lock());
        for hook in hooks {
            hook.call(self.clone());
        }
    }
}

impl Connection for WsConnection {
    type Id = Uuid;
    type Message = WireMessage;

    fn id(&self) -> Uuid {
        self.inner.id
    }

    fn user(&self) -> &str {
        &self.inner.user
    }

    fn get_message(&self, message: &WireMessage) -> Arc<[u8]> {
        serde_json::to_vec(message)
            .unwrap_or_else(|err| {
                messaging_log::log_error!("could not serialize wire message: {}", err);
                Vec::new()
            })
            .into()
    }

    fn send_built_message(&self, bytes: Arc<[u8]>, _allow_batch: bool) {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if self.inner.outbound.send(WsMessage::Text(text.into())).is_err() {
            messaging_log::log_debug!(
                user = %self.inner.user,
                "dropped outbound message, writer already gone"
            );
        }
    }

    fn send_ack_message(&self, message: &WireMessage) {
        self.send_message(message);
    }

    fn on_close(&self, hook: CloseHook<Self>) {
        self.inner.close_hooks.lock().push(hook);
    }

    fn remove_on_close(&self, hook: &CloseHook<Self>) {
        self.inner.close_hooks.lock().retain(|h| h != hook);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::protocol::ActionCode;

    fn connection() -> (WsConnection, mpsc::UnboundedReceiver<WsMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (WsConnection::new("alice".to_string(), tx), rx)
    }

    #[test]
    fn get_message_round_trips_through_json() {
        let (conn, _rx) = connection();
        let message = WireMessage::subscribe_request("event", "room/1", None);
        let bytes = conn.get_message(&message);
        let decoded: WireMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded.name.as_deref(), Some("room/1"));
        assert_eq!(decoded.action, ActionCode::Subscribe);
    }

    #[test]
    fn send_built_message_writes_to_outbound_channel() {
        let (conn, mut rx) = connection();
        conn.send_built_message(Arc::from(b"hello".as_slice()), true);
        match rx.try_recv().unwrap() {
            WsMessage::Text(text) => assert_eq!(&*text, "hello"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn notify_closed_runs_every_registered_hook_once() {
        let (conn, _rx) = connection();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        conn.on_close(CloseHook::new(move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
        }));

        conn.notify_closed();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        conn.notify_closed();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "hooks are cleared after running once");
    }
}
