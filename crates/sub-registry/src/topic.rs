//! Topic-to-action-code binding.
//!
//! A [`SubscriptionRegistry`](crate::registry::SubscriptionRegistry) is
//! instantiated once per [`Topic`]. Each instance records four canonical
//! action codes in an [`ActionSet`]; `set_action` lets a higher-level
//! subsystem (e.g. a LISTEN handler reusing the same registry machinery)
//! rebind any of them at runtime rather than hard-coding one protocol.

use crate::error::Error;

/// The logical subscription target families this registry family covers.
///
/// `RecordListenPatterns` / `EventListenPatterns` share the same registry
/// machinery as `Record` / `Event` but bind a different action namespace
/// (the LISTEN protocol).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Named records.
    Record,
    /// Named events.
    Event,
    /// RPC providers.
    Rpc,
    /// Presence subscribers.
    Presence,
    /// Monitoring/metrics subscribers.
    Monitoring,
    /// LISTEN patterns over record names.
    RecordListenPatterns,
    /// LISTEN patterns over event names.
    EventListenPatterns,
}

/// One of the four action-code slots a registry exposes for rebinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSlot {
    /// The code sent by a client to subscribe.
    Subscribe,
    /// The code sent by a client to unsubscribe.
    Unsubscribe,
    /// The reply code for a duplicate subscribe.
    MultipleSubscriptions,
    /// The reply code for an unsubscribe of an unknown/unsubscribed name.
    NotSubscribed,
}

impl ActionSlot {
    /// Parses one of the four canonical (case-insensitive) slot names.
    ///
    /// Unknown names are rejected rather than silently accepted.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.to_ascii_uppercase().as_str() {
            "SUBSCRIBE" => Ok(Self::Subscribe),
            "UNSUBSCRIBE" => Ok(Self::Unsubscribe),
            "MULTIPLE_SUBSCRIPTIONS" => Ok(Self::MultipleSubscriptions),
            "NOT_SUBSCRIBED" => Ok(Self::NotSubscribed),
            other => Err(Error::UnknownActionSlot(other.to_string())),
        }
    }
}

/// The four action codes a registry instance emits, in the caller's own
/// action-code type `A` (an enum, integer, or string — the registry never
/// interprets it, only stores and echoes it).
#[derive(Debug, Clone)]
pub struct ActionSet<A> {
    /// Code a client sends to subscribe.
    pub subscribe: A,
    /// Code a client sends to unsubscribe.
    pub unsubscribe: A,
    /// Reply code for a duplicate subscribe.
    pub multiple_subscriptions: A,
    /// Reply code for an unsubscribe of an unknown/unsubscribed name.
    pub not_subscribed: A,
}

impl<A: Clone> ActionSet<A> {
    /// Rebinds one of the four slots to `value`.
    pub fn set(&mut self, slot: ActionSlot, value: A) {
        match slot {
            ActionSlot::Subscribe => self.subscribe = value,
            ActionSlot::Unsubscribe => self.unsubscribe = value,
            ActionSlot::MultipleSubscriptions => self.multiple_subscriptions = value,
            ActionSlot::NotSubscribed => self.not_subscribed = value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_names_case_insensitively() {
        assert_eq!(
            ActionSlot::from_name("subscribe").unwrap(),
            ActionSlot::Subscribe
        );
        assert_eq!(
            ActionSlot::from_name("NOT_SUBSCRIBED").unwrap(),
            ActionSlot::NotSubscribed
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(ActionSlot::from_name("DELETE").is_err());
        assert!(ActionSlot::from_name("").is_err());
    }

    #[test]
    fn set_rebinds_only_the_named_slot() {
        let mut actions = ActionSet {
            subscribe: 1,
            unsubscribe: 2,
            multiple_subscriptions: 3,
            not_subscribed: 4,
        };
        actions.set(ActionSlot::Unsubscribe, 20);
        assert_eq!(actions.unsubscribe, 20);
        assert_eq!(actions.subscribe, 1);
        assert_eq!(actions.multiple_subscriptions, 3);
        assert_eq!(actions.not_subscribed, 4);
    }
}
