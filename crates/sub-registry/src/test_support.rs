//! In-memory [`Connection`]/[`ProtocolMessage`] fixtures shared by this
//! crate's unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::connection::{CloseHook, Connection, ProtocolMessage};

/// The action-code type carried by [`TestMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestAction {
    /// A client subscribe request.
    Subscribe,
    /// A client unsubscribe request.
    Unsubscribe,
    /// An ack reply.
    Ack,
    /// A duplicate-subscribe reply.
    MultipleSubscriptions,
    /// An unsubscribe-of-unknown-name reply.
    NotSubscribed,
}

/// A minimal message fixture carrying just enough to exercise the registry's
/// protocol-reply paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMessage {
    /// The action code this message carries.
    pub action: TestAction,
    /// The subscription name this message is about.
    pub name: String,
    /// On a `MultipleSubscriptions`/`NotSubscribed` reply, the action of the
    /// request that provoked it.
    pub original_action: Option<TestAction>,
}

impl TestMessage {
    /// A subscribe request for `name`.
    pub fn subscribe(name: &str) -> Self {
        Self {
            action: TestAction::Subscribe,
            name: name.to_string(),
            original_action: None,
        }
    }

    /// An unsubscribe request for `name`.
    pub fn unsubscribe(name: &str) -> Self {
        Self {
            action: TestAction::Unsubscribe,
            name: name.to_string(),
            original_action: None,
        }
    }
}

impl ProtocolMessage for TestMessage {
    type Action = TestAction;

    fn action(&self) -> TestAction {
        self.action
    }

    fn ack(&self) -> Self {
        Self {
            action: TestAction::Ack,
            name: self.name.clone(),
            original_action: None,
        }
    }

    fn multiple_subscriptions(&self, action: TestAction, name: &str) -> Self {
        Self {
            action,
            name: name.to_string(),
            original_action: Some(self.action),
        }
    }

    fn not_subscribed(&self, action: TestAction, name: &str) -> Self {
        Self {
            action,
            name: name.to_string(),
            original_action: Some(self.action),
        }
    }
}

struct Inner {
    id: u64,
    user: String,
    delivered: Mutex<Vec<Arc<[u8]>>>,
    acks: Mutex<Vec<TestMessage>>,
    close_hooks: Mutex<Vec<CloseHook<TestConnection>>>,
}

/// A connection fixture backed by shared, inspectable logs instead of a real
/// socket. Cloning shares the same underlying logs and close-hook slot, the
/// way a real connection handle clones to share one socket.
#[derive(Clone)]
pub struct TestConnection {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TestConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestConnection")
            .field("id", &self.inner.id)
            .field("user", &self.inner.user)
            .finish()
    }
}

impl TestConnection {
    /// A connection fixture with the given stable id and user name.
    pub fn new(id: u64, user: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                user: user.to_string(),
                delivered: Mutex::new(Vec::new()),
                acks: Mutex::new(Vec::new()),
                close_hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Every payload delivered via `send_built_message` (fanout deliveries
    /// and protocol replies sent through the default `send_message`), as
    /// UTF-8 text.
    pub fn delivered_texts(&self) -> Vec<String> {
        self.inner
            .delivered
            .lock()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// Every message sent via `send_ack_message`.
    pub fn acks(&self) -> Vec<TestMessage> {
        self.inner.acks.lock().clone()
    }

    /// Whether at least one close hook is currently registered.
    pub fn has_close_hook(&self) -> bool {
        !self.inner.close_hooks.lock().is_empty()
    }

    /// Simulates this connection closing: invokes and clears every
    /// registered close hook, in registration order.
    pub fn close(&self) {
        let hooks = std::mem::take(&mut *self.inner.close_hooks.lock());
        for hook in hooks {
            hook.call(self.clone());
        }
    }
}

impl Connection for TestConnection {
    type Id = u64;
    type Message = TestMessage;

    fn id(&self) -> u64 {
        self.inner.id
    }

    fn user(&self) -> &str {
        &self.inner.user
    }

    fn get_message(&self, message: &TestMessage) -> Arc<[u8]> {
        format!("{:?}:{}", message.action, message.name)
            .into_bytes()
            .into()
    }

    fn send_built_message(&self, bytes: Arc<[u8]>, _allow_batch: bool) {
        self.inner.delivered.lock().push(bytes);
    }

    fn send_ack_message(&self, message: &TestMessage) {
        self.inner.acks.lock().push(message.clone());
    }

    fn on_close(&self, hook: CloseHook<Self>) {
        self.inner.close_hooks.lock().push(hook);
    }

    fn remove_on_close(&self, hook: &CloseHook<Self>) {
        self.inner.close_hooks.lock().retain(|h| h != hook);
    }
}
