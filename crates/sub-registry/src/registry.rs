//! `SubscriptionRegistry`: the per-topic registry tying together the name
//! index, connection index, cluster bridge, fanout, and lifecycle listener.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::{Mutex, RwLock};

use crate::cluster::{ClusterStateBridge, ServerId};
use crate::connection::{CloseHook, Connection, ProtocolMessage};
use crate::error::Error;
use crate::listener::LifecycleListener;
use crate::monitoring::Monitoring;
use crate::name_index::Subscription;
use crate::topic::{ActionSet, ActionSlot, Topic};
use crate::transport::ClusterTransport;

use messaging_log::{log_debug, log_error, log_warn};

type Action<C> = <<C as Connection>::Message as ProtocolMessage>::Action;

struct ConnectionEntry<C: Connection> {
    conn: C,
    names: IndexSet<Arc<str>>,
}

struct RegistryState<C: Connection> {
    names: HashMap<Arc<str>, Subscription<C>>,
    connections: HashMap<C::Id, ConnectionEntry<C>>,
}

impl<C: Connection> RegistryState<C> {
    fn new() -> Self {
        Self {
            names: HashMap::new(),
            connections: HashMap::new(),
        }
    }
}

/// The per-topic local subscription registry.
///
/// One instance exists per [`Topic`]. All operations are synchronous and
/// serialize through the `actions` and `state` locks below, so a
/// multi-threaded runtime never needs per-call locking at the call site.
pub struct SubscriptionRegistry<C: Connection> {
    topic: Topic,
    actions: RwLock<ActionSet<Action<C>>>,
    state: Mutex<RegistryState<C>>,
    cluster: Arc<dyn ClusterStateBridge>,
    transport: Arc<dyn ClusterTransport<C::Message>>,
    monitoring: Arc<dyn Monitoring<C::Message>>,
    listener: RwLock<Option<Arc<dyn LifecycleListener<C>>>>,
    close_hook: CloseHook<C>,
}

impl<C: Connection> std::fmt::Debug for SubscriptionRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl<C: Connection> SubscriptionRegistry<C> {
    /// Creates a new registry for `topic`, with the four action codes in
    /// `actions` bound initially.
    ///
    /// Uses `Arc::new_cyclic` so the close hook installed on connections can
    /// call back into this registry through a `Weak` reference without the
    /// registry owning the connections it tracks, bound once at
    /// construction as a method handle.
    pub fn new(
        topic: Topic,
        actions: ActionSet<Action<C>>,
        cluster: Arc<dyn ClusterStateBridge>,
        transport: Arc<dyn ClusterTransport<C::Message>>,
        monitoring: Arc<dyn Monitoring<C::Message>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| {
            let weak = weak.clone();
            Self {
                topic,
                actions: RwLock::new(actions),
                state: Mutex::new(RegistryState::new()),
                cluster,
                transport,
                monitoring,
                listener: RwLock::new(None),
                close_hook: CloseHook::new(move |conn: C| {
                    if let Some(registry) = weak.upgrade() {
                        registry.on_socket_close(conn);
                    }
                }),
            }
        })
    }

    /// The topic this registry instance covers.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Rebinds one of the four action-code slots. Rejects unknown slot
    /// names rather than inserting them.
    pub fn set_action(&self, slot_name: &str, value: Action<C>) -> Result<(), Error> {
        let slot = ActionSlot::from_name(slot_name)?;
        self.actions.write().set(slot, value);
        Ok(())
    }

    /// Installs the optional lifecycle listener. Wires the cluster bridge's
    /// 0↔k edges to the listener's `on_first_subscription_made` /
    /// `on_last_subscription_removed` callbacks.
    pub fn set_subscription_listener(&self, listener: Arc<dyn LifecycleListener<C>>) {
        let first = listener.clone();
        self.cluster
            .on_add(Arc::new(move |name| first.on_first_subscription_made(name)));
        let last = listener.clone();
        self.cluster
            .on_remove(Arc::new(move |name| last.on_last_subscription_removed(name)));
        *self.listener.write() = Some(listener);
    }

    /// Resolves once the cluster bridge's initial state sync has completed
    /// (`whenReady`). A bridge backed by real cluster gossip would
    /// await its own readiness signal here instead of polling.
    pub async fn when_ready(&self) {
        while !self.cluster.is_ready() {
            tokio::task::yield_now().await;
        }
    }

    /// Subscribes `conn` to `name`.
    pub fn subscribe(&self, name: &str, request: &C::Message, conn: C, silent: bool) {
        let name_arc: Arc<str> = Arc::from(name);
        let mut state = self.state.lock();

        let sub = state
            .names
            .entry(name_arc.clone())
            .or_insert_with(|| Subscription::new(name_arc.clone()));

        if sub.contains(&conn.id()) {
            log_warn!(user = conn.user(), name = %name, "duplicate subscription");
            drop(state);
            let action = self.actions.read().multiple_subscriptions.clone();
            conn.send_message(&request.multiple_subscriptions(action, name));
            return;
        }

        sub.insert(conn.id());

        let is_first_for_conn = !state.connections.contains_key(&conn.id());
        state
            .connections
            .entry(conn.id())
            .or_insert_with(|| ConnectionEntry {
                conn: conn.clone(),
                names: IndexSet::new(),
            })
            .names
            .insert(name_arc.clone());
        drop(state);

        if is_first_for_conn {
            conn.on_close(self.close_hook.clone());
        }

        self.cluster.add(name);

        if let Some(listener) = self.listener.read().as_ref() {
            listener.on_subscription_made(name, &conn);
        }

        if !silent {
            conn.send_ack_message(&request.ack());
            log_debug!(user = conn.user(), name = %name, "subscribed");
        }
    }

    /// Unsubscribes `conn` from `name`.
    pub fn unsubscribe(&self, name: &str, request: &C::Message, conn: C, silent: bool) {
        let mut state = self.state.lock();

        let removed = state
            .names
            .get_mut(name)
            .map(|sub| sub.remove(&conn.id()))
            .unwrap_or(false);

        if !removed {
            drop(state);
            log_warn!(user = conn.user(), name = %name, "unsubscribe of unknown name");
            if !silent {
                let action = self.actions.read().not_subscribed.clone();
                conn.send_message(&request.not_subscribed(action, name));
            }
            return;
        }

        if state
            .names
            .get(name)
            .map(Subscription::is_empty)
            .unwrap_or(false)
        {
            state.names.remove(name);
        }

        let was_last_for_conn = if let Some(entry) = state.connections.get_mut(&conn.id()) {
            entry.names.shift_remove(name);
            let last = entry.names.is_empty();
            if last {
                state.connections.remove(&conn.id());
            }
            last
        } else {
            false
        };
        drop(state);

        if was_last_for_conn {
            conn.remove_on_close(&self.close_hook);
        }

        if let Some(listener) = self.listener.read().as_ref() {
            listener.on_subscription_removed(name, &conn);
        }
        self.cluster.remove(name);

        if !silent {
            conn.send_ack_message(&request.ack());
            log_debug!(user = conn.user(), name = %name, "unsubscribed");
        }
    }

    /// Subscribes `conn` to every name in `names`. Per-name
    /// subscribes are silent; exactly one ack is sent for the whole call
    /// when `silent` is false. Per-name protocol replies
    /// (`MULTIPLE_SUBSCRIPTIONS`) are still emitted individually.
    pub fn subscribe_bulk<S: AsRef<str>>(
        &self,
        names: &[S],
        request: &C::Message,
        conn: C,
        silent: bool,
    ) {
        for name in names {
            self.subscribe(name.as_ref(), request, conn.clone(), true);
        }
        if !silent {
            conn.send_ack_message(&request.ack());
        }
    }

    /// Unsubscribes `conn` from every name in `names`, symmetric
    /// to [`subscribe_bulk`](Self::subscribe_bulk).
    pub fn unsubscribe_bulk<S: AsRef<str>>(
        &self,
        names: &[S],
        request: &C::Message,
        conn: C,
        silent: bool,
    ) {
        for name in names {
            self.unsubscribe(name.as_ref(), request, conn.clone(), true);
        }
        if !silent {
            conn.send_ack_message(&request.ack());
        }
    }

    /// Called when `conn` closes. Removes every subscription it held,
    /// running the same post-removal bookkeeping `unsubscribe` does for
    /// each one.
    fn on_socket_close(&self, conn: C) {
        let mut state = self.state.lock();
        let Some(entry) = state.connections.remove(&conn.id()) else {
            log_error!(
                user = conn.user(),
                "a socket has an illegal registered close callback"
            );
            return;
        };

        // Snapshot: `entry.names` is already a private owned copy, so the
        // removal loop below cannot observe its own mutation.
        let held_names: Vec<Arc<str>> = entry.names.into_iter().collect();

        for name in &held_names {
            if let Some(sub) = state.names.get_mut(name.as_ref()) {
                sub.remove(&conn.id());
                if sub.is_empty() {
                    state.names.remove(name.as_ref());
                }
            }
        }
        drop(state);

        for name in &held_names {
            if let Some(listener) = self.listener.read().as_ref() {
                listener.on_subscription_removed(name, &conn);
            }
            self.cluster.remove(name);
        }
    }

    /// Delivers `message` to every current local subscriber of `name` except
    /// `sender`, forwarding to the cluster transport first when the message
    /// originated locally.
    ///
    /// `no_delay` is accepted for protocol compatibility; its semantics
    /// (bypassing write-layer coalescing) belong to the connection, not the
    /// registry.
    pub fn send_to_subscribers(
        &self,
        name: &str,
        message: &C::Message,
        no_delay: bool,
        sender: Option<&C::Id>,
        suppress_remote: bool,
    ) {
        let _ = no_delay;

        if sender.is_some() && !suppress_remote {
            self.transport.send(message);
        }

        let state = self.state.lock();
        let Some(sub) = state.names.get(name) else {
            return;
        };

        self.monitoring.on_broadcast(message, sub.len());

        let mut ids = sub.iter();
        let Some(first_id) = ids.next() else {
            return;
        };
        let Some(first_conn) = state.connections.get(first_id).map(|e| &e.conn) else {
            return;
        };
        let bytes = first_conn.get_message(message);

        for id in sub.iter() {
            if sender == Some(id) {
                continue;
            }
            if let Some(entry) = state.connections.get(id) {
                entry.conn.send_built_message(bytes.clone(), true);
            }
        }
    }

    /// The connections currently holding a local subscription to `name`.
    pub fn get_local_subscribers(&self, name: &str) -> Vec<C> {
        let state = self.state.lock();
        state
            .names
            .get(name)
            .map(|sub| {
                sub.iter()
                    .filter_map(|id| state.connections.get(id).map(|e| e.conn.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `name` currently has at least one local subscriber.
    pub fn has_local_subscribers(&self, name: &str) -> bool {
        self.state
            .lock()
            .names
            .get(name)
            .map(|sub| !sub.is_empty())
            .unwrap_or(false)
    }

    /// Server identifiers currently holding at least one subscriber for
    /// `name`, anywhere in the cluster.
    pub fn get_all_servers(&self, name: &str) -> Vec<ServerId> {
        self.cluster.get_all_servers(name)
    }

    /// [`get_all_servers`](Self::get_all_servers) minus this node's own id.
    pub fn get_all_remote_servers(&self, name: &str) -> Vec<ServerId> {
        let local = self.cluster.local_server_id();
        self.cluster
            .get_all_servers(name)
            .into_iter()
            .filter(|id| *id != local)
            .collect()
    }

    /// All names with at least one local subscriber.
    pub fn get_names(&self) -> Vec<Arc<str>> {
        self.state.lock().names.keys().cloned().collect()
    }

    /// Whether `name` currently has at least one local subscriber. An alias
    /// of [`has_local_subscribers`](Self::has_local_subscribers) under the
    /// name callers outside this crate expect.
    pub fn has_name(&self, name: &str) -> bool {
        self.has_local_subscribers(name)
    }
}
