use std::fmt::Display;

use alloy::{sol_types, transports};

/// Error raised while reducing an event or while delivering events to
/// the reducers.
///
/// Missing entities are not errors: a reducer that can not find a required
/// entity reports [`crate::types::Outcome::Skipped`] instead. Everything in
/// here indicates either broken upstream data (arithmetic domain errors)
/// or a delivery failure, and should not be ignored.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("division by zero computing {0}")]
    DivisionByZero(&'static str),

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("event decoding failed: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("block out of order: expected {0}, got {1}")]
    BlockOutOfOrder(u64, u64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl<E: Display> From<transports::RpcError<E>> for IndexerError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found"))
                {
                    Self::InvalidRequest(msg)
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<sol_types::Error> for IndexerError {
    fn from(value: sol_types::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<envy::Error> for IndexerError {
    fn from(value: envy::Error) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}
