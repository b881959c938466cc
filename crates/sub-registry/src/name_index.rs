//! `NameIndex`: subscription name → set of local connections.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::connection::Connection;

/// One subscription target: a name plus the connections currently holding
/// it. Created on first local subscribe, destroyed when `sockets` becomes
/// empty (invariant 1 / 5).
pub struct Subscription<C: Connection> {
    name: Arc<str>,
    sockets: IndexSet<C::Id>,
}

impl<C: Connection> std::fmt::Debug for Subscription<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("subscriber_count", &self.sockets.len())
            .finish()
    }
}

impl<C: Connection> Subscription<C> {
    /// A fresh subscription with no subscribers yet.
    pub fn new(name: Arc<str>) -> Self {
        Self {
            name,
            sockets: IndexSet::new(),
        }
    }

    /// The subscription name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Whether `id` currently holds this subscription.
    pub fn contains(&self, id: &C::Id) -> bool {
        self.sockets.contains(id)
    }

    /// Inserts `id`. Returns `true` if it was newly inserted.
    pub fn insert(&mut self, id: C::Id) -> bool {
        self.sockets.insert(id)
    }

    /// Removes `id`. Returns `true` if it was present.
    pub fn remove(&mut self, id: &C::Id) -> bool {
        self.sockets.shift_remove(id)
    }

    /// Whether no connection currently holds this subscription.
    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Number of connections currently holding this subscription.
    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    /// Iterates subscriber ids in the stable (insertion) order the fanout
    /// relies on.
    pub fn iter(&self) -> impl Iterator<Item = &C::Id> {
        self.sockets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestConnection;

    #[test]
    fn empty_on_creation() {
        let sub = Subscription::<TestConnection>::new(Arc::from("room/1"));
        assert!(sub.is_empty());
        assert_eq!(sub.len(), 0);
    }

    #[test]
    fn insert_then_remove_round_trips_to_empty() {
        let mut sub = Subscription::<TestConnection>::new(Arc::from("room/1"));
        assert!(sub.insert(1));
        assert!(!sub.insert(1), "second insert of the same id is a no-op");
        assert_eq!(sub.len(), 1);
        assert!(sub.remove(&1));
        assert!(sub.is_empty());
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut sub = Subscription::<TestConnection>::new(Arc::from("room/1"));
        sub.insert(3);
        sub.insert(1);
        sub.insert(2);
        assert_eq!(sub.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
    }
}
