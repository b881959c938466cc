//! Errors
//!
//! Per the registry's error-handling policy, these are the only failures that
//! ever escape the public API surface. Client protocol errors (duplicate
//! subscribe, unsubscribe of an unknown name) are *not* represented here —
//! they are reported to the offending connection as protocol reply messages
//! and never returned from `subscribe`/`unsubscribe`.

use thiserror::Error;

/// Errors returned by the registry's own API (construction-time misuse and
/// bridge failures), as distinct from client protocol errors.
#[derive(Debug, Error)]
pub enum Error {
    /// `set_action` was given a name that isn't one of the four canonical
    /// action slots (`SUBSCRIBE`, `UNSUBSCRIBE`, `MULTIPLE_SUBSCRIPTIONS`,
    /// `NOT_SUBSCRIBED`).
    #[error("unknown action slot `{0}`")]
    UnknownActionSlot(String),

    /// The cluster-state bridge reported a failure. Fatal to the bridge call
    /// that produced it, not to the registry: the registry logs it and makes
    /// no attempt to reconcile divergent state.
    #[error("cluster state bridge error: {0}")]
    Cluster(String),
}
