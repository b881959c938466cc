//! Connection collaborator interface.
//!
//! The registry holds non-owning handles to connections; it never owns the
//! socket or its write side. `Connection::Id` is the map key the registry
//! uses internally — implementations typically back it with the connection's
//! own identity (an `Arc` pointer, a session id, ...).

use std::sync::Arc;

/// A client connection, as seen by the registry.
///
/// This is the transport-agnostic collaborator interface:
/// `getMessage`, `sendBuiltMessage`, `sendMessage`, `sendAckMessage`,
/// `onClose`/`removeOnClose`, and a `user` identity. The wire format itself
/// is external to the registry.
pub trait Connection: Clone + Send + Sync + 'static {
    /// Stable identity used as the map key in both indexes.
    type Id: Clone + Eq + std::hash::Hash + Ord + Send + Sync + 'static;

    /// The domain message type this connection's protocol carries.
    type Message: ProtocolMessage + Send + Sync + 'static;

    /// This connection's stable identity.
    fn id(&self) -> Self::Id;

    /// The authenticated user on this connection, for logging.
    fn user(&self) -> &str;

    /// Renders `message` into wire bytes. Must be a pure function of
    /// `message`'s identity so the fanout can call it once and share the
    /// result across subscribers.
    fn get_message(&self, message: &Self::Message) -> Arc<[u8]>;

    /// Writes already-rendered bytes to this connection.
    fn send_built_message(&self, bytes: Arc<[u8]>, allow_batch: bool);

    /// Writes a domain message to this connection, rendering it first.
    fn send_message(&self, message: &Self::Message) {
        let bytes = self.get_message(message);
        self.send_built_message(bytes, false);
    }

    /// Sends an ack-shaped reply to this connection.
    fn send_ack_message(&self, message: &Self::Message);

    /// Registers `hook` to run once, when this connection closes.
    ///
    /// A single physical connection is tracked independently by one
    /// registry instance per topic it holds subscriptions in, and each such
    /// registry calls this once for its own first subscription on the
    /// connection — so implementations must support several simultaneously
    /// registered hooks (one per registry), not just one, the way a
    /// connection's own close event naturally supports multiple listeners.
    fn on_close(&self, hook: CloseHook<Self>);

    /// Deregisters a previously registered close hook (identity-compared),
    /// leaving any other registered hooks untouched. The registry only
    /// calls this when a connection loses its last subscription *in that
    /// registry* via explicit unsubscribe — never from inside the close
    /// hook itself, since the connection is already closing by then.
    fn remove_on_close(&self, hook: &CloseHook<Self>);
}

/// A callback bound once at registry construction time and compared by
/// identity, so a registry can remove exactly the hook it installed without
/// needing a separate handle type.
#[derive(Clone)]
pub struct CloseHook<C>(Arc<dyn Fn(C) + Send + Sync>);

impl<C> CloseHook<C> {
    /// Wraps `f` as a close hook.
    pub fn new(f: impl Fn(C) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the hook with the connection that closed.
    pub fn call(&self, conn: C) {
        (self.0)(conn)
    }
}

impl<C> PartialEq for CloseHook<C> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<C> Eq for CloseHook<C> {}

impl<C> std::fmt::Debug for CloseHook<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CloseHook").field(&Arc::as_ptr(&self.0)).finish()
    }
}

/// Constructs the protocol reply messages the registry must be able to send
/// without knowing the concrete wire format.
///
/// `Action` is the caller's action-code type, stored verbatim in an
/// [`ActionSet`](crate::topic::ActionSet) and echoed back here.
pub trait ProtocolMessage: Clone {
    /// The caller's action-code type (an enum, integer, or string).
    type Action: Clone + Send + Sync + 'static;

    /// The action code this (inbound) message carries.
    fn action(&self) -> Self::Action;

    /// An echo of this message suitable for `send_ack_message`.
    fn ack(&self) -> Self;

    /// A `MULTIPLE_SUBSCRIPTIONS` reply echoing `originalAction`, this
    /// registry's topic label, and the offending `name`.
    fn multiple_subscriptions(&self, action: Self::Action, name: &str) -> Self;

    /// A `NOT_SUBSCRIBED` reply echoing `originalAction`, this registry's
    /// topic label, and the offending `name`.
    fn not_subscribed(&self, action: Self::Action, name: &str) -> Self;
}
