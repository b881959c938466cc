//! JSON-RPC-style error codes for protocol-level failures.

/// Protocol-level failures surfaced to the client as an error reply.
///
/// Source: <https://www.jsonrpc.org/specification#error_object>
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WsError {
    /// Invalid JSON was received by the server.
    #[error("parse error")]
    ParseError,
    /// The topic label, action, or name on the request was malformed or
    /// unrecognised.
    #[error("invalid params")]
    InvalidParams,
    /// A subscribe request reused a topic/name pair this connection had no
    /// way to resolve (e.g. an unknown topic label).
    #[error("invalid request")]
    InvalidRequest,
}

impl WsError {
    /// The JSON-RPC-style numeric code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::InvalidParams => -32602,
        }
    }
}
