//! `ClusterStateBridge`: mirrors local subscription presence into a
//! cluster-wide state registry.
//!
//! The registry calls `add`/`remove` once per local subscribe/unsubscribe;
//! the bridge is responsible for refcounting so that the cluster-wide
//! `on_add`/`on_remove` edges fire only on the 0↔k transition, never once per
//! local subscriber.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// A cluster node identifier.
pub type ServerId = Arc<str>;

/// The contract the registry relies on. Implementations mirror
/// presence into whatever transport actually gossips cluster state; that
/// transport is out of scope here.
pub trait ClusterStateBridge: Send + Sync {
    /// This node's own identifier, used by `get_all_remote_servers`.
    fn local_server_id(&self) -> ServerId;

    /// Increments the local reference count for `name`. Emits a cluster-wide
    /// add edge only on this node's 0→1 transition.
    fn add(&self, name: &str);

    /// Decrements the local reference count for `name`. Emits a cluster-wide
    /// remove edge only on this node's 1→0 transition.
    fn remove(&self, name: &str);

    /// Whether any node in the cluster (including this one) currently holds
    /// at least one subscriber for `name`.
    fn has(&self, name: &str) -> bool;

    /// All names with at least one subscriber anywhere in the cluster.
    fn get_all(&self) -> Vec<Arc<str>>;

    /// Server identifiers currently holding at least one subscriber for
    /// `name`, anywhere in the cluster.
    fn get_all_servers(&self, name: &str) -> Vec<ServerId>;

    /// Registers a callback for the cluster-wide 0→k transition.
    fn on_add(&self, callback: Arc<dyn Fn(&str) + Send + Sync>);

    /// Registers a callback for the cluster-wide k→0 transition.
    fn on_remove(&self, callback: Arc<dyn Fn(&str) + Send + Sync>);

    /// Whether the initial cluster state has finished synchronising.
    fn is_ready(&self) -> bool;
}

struct Refcount {
    local: usize,
    servers: HashMap<ServerId, usize>,
}

/// A reference `ClusterStateBridge` for a single-node deployment (or as the
/// in-process half of a multi-node one): it refcounts local subscribers per
/// name and fires `on_add`/`on_remove` only on the 0-to-1 and 1-to-0 edges,
/// so a cluster-wide add/remove announcement goes out once per name no
/// matter how many local connections share it.
pub struct LocalClusterState {
    local_server_id: ServerId,
    counts: RwLock<HashMap<Arc<str>, Refcount>>,
    on_add: Mutex<Vec<Arc<dyn Fn(&str) + Send + Sync>>>,
    on_remove: Mutex<Vec<Arc<dyn Fn(&str) + Send + Sync>>>,
}

impl std::fmt::Debug for LocalClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalClusterState")
            .field("local_server_id", &self.local_server_id)
            .field("tracked_names", &self.counts.read().len())
            .finish()
    }
}

impl LocalClusterState {
    /// Creates a bridge for a single node named `local_server_id`.
    pub fn new(local_server_id: impl Into<ServerId>) -> Arc<Self> {
        Arc::new(Self {
            local_server_id: local_server_id.into(),
            counts: RwLock::new(HashMap::new()),
            on_add: Mutex::new(Vec::new()),
            on_remove: Mutex::new(Vec::new()),
        })
    }
}

impl ClusterStateBridge for LocalClusterState {
    fn local_server_id(&self) -> ServerId {
        self.local_server_id.clone()
    }

    fn add(&self, name: &str) {
        let mut counts = self.counts.write();
        let entry = counts
            .entry(Arc::from(name))
            .or_insert_with(|| Refcount {
                local: 0,
                servers: HashMap::new(),
            });
        entry.local += 1;
        let server_count = entry.servers.entry(self.local_server_id.clone()).or_insert(0);
        *server_count += 1;
        let is_edge = entry.local == 1;
        drop(counts);

        if is_edge {
            for cb in self.on_add.lock().iter() {
                cb(name);
            }
        }
    }

    fn remove(&self, name: &str) {
        let mut counts = self.counts.write();
        let Some(entry) = counts.get_mut(name) else {
            return;
        };
        entry.local = entry.local.saturating_sub(1);
        if let Some(server_count) = entry.servers.get_mut(&self.local_server_id) {
            *server_count = server_count.saturating_sub(1);
            if *server_count == 0 {
                entry.servers.remove(&self.local_server_id);
            }
        }
        let is_edge = entry.local == 0;
        if is_edge {
            counts.remove(name);
        }
        drop(counts);

        if is_edge {
            for cb in self.on_remove.lock().iter() {
                cb(name);
            }
        }
    }

    fn has(&self, name: &str) -> bool {
        self.counts
            .read()
            .get(name)
            .map(|entry| !entry.servers.is_empty())
            .unwrap_or(false)
    }

    fn get_all(&self) -> Vec<Arc<str>> {
        self.counts
            .read()
            .iter()
            .filter(|(_, entry)| !entry.servers.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn get_all_servers(&self, name: &str) -> Vec<ServerId> {
        self.counts
            .read()
            .get(name)
            .map(|entry| entry.servers.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn on_add(&self, callback: Arc<dyn Fn(&str) + Send + Sync>) {
        self.on_add.lock().push(callback);
    }

    fn on_remove(&self, callback: Arc<dyn Fn(&str) + Send + Sync>) {
        self.on_remove.lock().push(callback);
    }

    fn is_ready(&self) -> bool {
        // A single in-process node has no external state to synchronise.
        true
    }
}
