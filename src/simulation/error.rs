use thiserror::Error;

use crate::common::config::ConfigError;
use crate::memory::error::InvariantViolation;

/// Error type for a simulation run. Only these stop the coordinator loop;
/// protocol and transport errors are handled per request.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Memory model corrupted: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimulationError>;
