//! Handles an inbound `UNSUBSCRIBE` request.

use super::{WsContext, WsError};
use crate::protocol::{parse_topic, WireMessage};

/// Unsubscribes this connection from `request.name` (or, when
/// `request.names` is present, every name in it via `unsubscribe_bulk`) on
/// `request.topic`, symmetric to [`subscribe::handle`](super::subscribe::handle).
pub(crate) fn handle(context: &mut WsContext, request: &WireMessage) -> Result<(), WsError> {
    let topic = parse_topic(&request.topic)?;
    let registry = context.registries.get(topic);

    if let Some(names) = request.names.as_deref() {
        registry.unsubscribe_bulk(names, request, context.conn.clone(), false);
        return Ok(());
    }

    let name = request.name.as_deref().ok_or(WsError::InvalidParams)?;
    registry.unsubscribe(name, request, context.conn.clone(), false);
    Ok(())
}
