//! `LifecycleListener`: the optional upstream observer.

/// A single optional listener installed post-construction on a registry.
///
/// On installation the cluster-wide callbacks
/// (`on_first_subscription_made`/`on_last_subscription_removed`) are wired to
/// the [`ClusterStateBridge`](crate::cluster::ClusterStateBridge)'s
/// `on_add`/`on_remove` edges by the registry itself.
pub trait LifecycleListener<C>: Send + Sync {
    /// Called for every local subscribe (including from a bulk call).
    fn on_subscription_made(&self, name: &str, conn: &C);

    /// Called for every local unsubscribe, including close-driven removal.
    fn on_subscription_removed(&self, name: &str, conn: &C);

    /// Called on the cluster-wide 0→k transition for `name`.
    fn on_first_subscription_made(&self, name: &str);

    /// Called on the cluster-wide k→0 transition for `name`.
    fn on_last_subscription_removed(&self, name: &str);
}
