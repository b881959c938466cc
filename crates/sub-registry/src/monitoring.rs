//! `Monitoring`: the process-global broadcast observer.

/// Reports every fanout to a process-global monitoring collaborator. Must be
/// safe to call concurrently from multiple registries.
pub trait Monitoring<M>: Send + Sync {
    /// Called once per `send_to_subscribers` call that finds a local
    /// subscription, with the number of local subscribers it fanned out to.
    fn on_broadcast(&self, message: &M, subscriber_count: usize);
}

/// A [`Monitoring`] implementation that does nothing, for registries that
/// don't need one wired up (tests, or topics with no metrics requirement).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitoring;

impl<M> Monitoring<M> for NoopMonitoring {
    fn on_broadcast(&self, _message: &M, _subscriber_count: usize) {}
}
