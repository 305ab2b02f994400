//! Error types for the grass simulation.

use thiserror::Error;

use crate::integrators::IntegrationError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// The adaptive solver could not produce a finite state for one joint.
    /// Recovered locally: the joint holds its last good state for the tick.
    #[error("integration failed for joint {joint} of blade {blade}: {source}")]
    Integration {
        blade: usize,
        joint: usize,
        source: IntegrationError,
    },

    /// Rejected at construction; the object is never created in this state.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Non-finite input rejected at the `step`/`set_time` boundary, before
    /// any node state is mutated.
    #[error("out-of-range input: {0}")]
    OutOfRange(String),
}
