//! Handles an inbound `SUBSCRIBE` request.

use super::{WsContext, WsError};
use crate::protocol::{parse_topic, WireMessage};

/// Subscribes this connection to `request.name` (or, when `request.names` is
/// present, every name in it via `subscribe_bulk`) on `request.topic`.
///
/// The registry itself sends the ack or protocol reply (`ACK`,
/// `MULTIPLE_SUBSCRIPTIONS`) directly to the connection; this handler only
/// reports malformed requests.
pub(crate) fn handle(context: &mut WsContext, request: &WireMessage) -> Result<(), WsError> {
    let topic = parse_topic(&request.topic)?;
    let registry = context.registries.get(topic);

    if let Some(names) = request.names.as_deref() {
        registry.subscribe_bulk(names, request, context.conn.clone(), false);
        return Ok(());
    }

    let name = request.name.as_deref().ok_or(WsError::InvalidParams)?;
    registry.subscribe(name, request, context.conn.clone(), false);
    Ok(())
}
