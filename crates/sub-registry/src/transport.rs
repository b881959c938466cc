//! `ClusterTransport`: forwards a locally originated broadcast to the rest of
//! the cluster.

/// The cross-node transport the fanout forwards through when a broadcast
/// originates locally. A `None` sender in `send_to_subscribers` means the
/// message arrived *from* this transport, so it must not be forwarded again.
pub trait ClusterTransport<M>: Send + Sync {
    /// Forwards `message` to the rest of the cluster.
    fn send(&self, message: &M);
}

/// A [`ClusterTransport`] that forwards nowhere, for single-node
/// deployments and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

impl<M> ClusterTransport<M> for NoopTransport {
    fn send(&self, _message: &M) {}
}
