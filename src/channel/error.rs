use thiserror::Error;

use crate::common::types::ProcessId;

/// Failure of the request/acknowledgement transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Channel disconnected")]
    Disconnected,

    #[error("No acknowledgement route for P{0}")]
    NoRoute(ProcessId),

    #[error("Timed out waiting for acknowledgement")]
    Timeout,
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
