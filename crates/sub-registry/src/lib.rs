//! Per-topic local subscription registry: tracks which local connections
//! are subscribed to which names, mirrors presence into a cluster-wide
//! bridge, and fans out messages to current local subscribers.
//!
//! A [`registry::SubscriptionRegistry`] is instantiated once per
//! [`topic::Topic`] by the surrounding server. It owns no transport and
//! constructs no wire messages itself: those are supplied through the
//! [`connection::Connection`] and [`connection::ProtocolMessage`]
//! collaborator traits, so this crate stays agnostic to the protocol it is
//! plugged into.

#![warn(missing_docs)]

pub mod cluster;
pub mod connection;
pub mod error;
pub mod listener;
pub mod monitoring;
pub mod name_index;
pub mod registry;
pub mod topic;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use cluster::{ClusterStateBridge, LocalClusterState, ServerId};
pub use connection::{CloseHook, Connection, ProtocolMessage};
pub use error::Error;
pub use listener::LifecycleListener;
pub use monitoring::{Monitoring, NoopMonitoring};
pub use name_index::Subscription;
pub use registry::SubscriptionRegistry;
pub use topic::{ActionSet, ActionSlot, Topic};
pub use transport::{ClusterTransport, NoopTransport};
