//! Bundles one [`SubscriptionRegistry`] per [`Topic`] behind a single handle
//! a connection handler can route requests through.

use std::sync::Arc;

use sub_registry::{ClusterStateBridge, ClusterTransport, Monitoring, SubscriptionRegistry, Topic};

use crate::connection::WsConnection;
use crate::protocol::{default_actions, WireMessage};

/// All seven per-topic registries this server stands up, sharing one
/// cluster-state bridge, transport, and monitoring collaborator.
pub struct RegistrySet {
    record: Arc<SubscriptionRegistry<WsConnection>>,
    event: Arc<SubscriptionRegistry<WsConnection>>,
    rpc: Arc<SubscriptionRegistry<WsConnection>>,
    presence: Arc<SubscriptionRegistry<WsConnection>>,
    monitoring: Arc<SubscriptionRegistry<WsConnection>>,
    record_listen_patterns: Arc<SubscriptionRegistry<WsConnection>>,
    event_listen_patterns: Arc<SubscriptionRegistry<WsConnection>>,
}

impl RegistrySet {
    /// Builds one registry per topic, all sharing `cluster`, `transport`,
    /// and `monitoring`.
    pub fn new(
        cluster: Arc<dyn ClusterStateBridge>,
        transport: Arc<dyn ClusterTransport<WireMessage>>,
        monitoring: Arc<dyn Monitoring<WireMessage>>,
    ) -> Self {
        let build = |topic: Topic| {
            SubscriptionRegistry::new(
                topic,
                default_actions(),
                cluster.clone(),
                transport.clone(),
                monitoring.clone(),
            )
        };
        Self {
            record: build(Topic::Record),
            event: build(Topic::Event),
            rpc: build(Topic::Rpc),
            presence: build(Topic::Presence),
            monitoring: build(Topic::Monitoring),
            record_listen_patterns: build(Topic::RecordListenPatterns),
            event_listen_patterns: build(Topic::EventListenPatterns),
        }
    }

    /// The registry instance for `topic`.
    pub fn get(&self, topic: Topic) -> &Arc<SubscriptionRegistry<WsConnection>> {
        match topic {
            Topic::Record => &self.record,
            Topic::Event => &self.event,
            Topic::Rpc => &self.rpc,
            Topic::Presence => &self.presence,
            Topic::Monitoring => &self.monitoring,
            Topic::RecordListenPatterns => &self.record_listen_patterns,
            Topic::EventListenPatterns => &self.event_listen_patterns,
        }
    }
}

impl std::fmt::Debug for RegistrySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySet").finish_non_exhaustive()
    }
}
