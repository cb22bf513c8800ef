//! Error types for the slothsim circuit simulator.
//!
//! This module provides a unified error type [`CircuitError`] that covers
//! all error conditions that can occur while building a circuit topology
//! and while solving it sample by sample.

use thiserror::Error;

use crate::circuit::NodeId;

/// Result type alias using [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Unified error type for all slothsim operations.
#[derive(Error, Debug)]
pub enum CircuitError {
    // ============ Build/Access Errors ============
    /// A builder method was called after `lock()`, or a component accessor
    /// was called before `lock()`.
    #[error("lock state violation: {message}")]
    LockStateViolation { message: String },

    /// A node was allocated as a forced voltage, virtual ground, or current
    /// sink more than once in incompatible ways.
    #[error("node allocation conflict on node {node}: {message}")]
    NodeAllocationConflict { node: NodeId, message: String },

    /// An amplifier or comparator was added whose output feeds an earlier
    /// active device's input, or a linear amplifier was added after a
    /// comparator.
    #[error("active device ordering violation: {message}")]
    ActiveDeviceOrdering { message: String },

    /// A node index does not refer to any node in the circuit.
    #[error("node index {index} is out of range (circuit has {count} nodes)")]
    NodeIndexOutOfRange { index: usize, count: usize },

    /// A component index does not refer to any component of its kind.
    #[error("{kind} index {index} is out of range (circuit has {count})")]
    ComponentIndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    // ============ Simulation Errors ============
    /// A numeric argument was outside its legal range.
    #[error("range error: {message}")]
    RangeError { message: String },

    /// The solver exhausted its retry limit without reaching the error
    /// tolerance or halting.
    #[error("solver failed to converge at sample {sample} after {iterations} iterations (rms current error {rms_nano_amps:.3e} nA)")]
    ConvergenceFailure {
        sample: u64,
        iterations: usize,
        rms_nano_amps: f64,
    },

    // ============ I/O Errors ============
    /// Error writing audio output.
    #[cfg(feature = "cli")]
    #[error("audio output error: {message}")]
    AudioOutputError { message: String },
}

impl CircuitError {
    /// Create a lock-state error for a builder method called after `lock()`.
    pub fn locked(operation: &str) -> Self {
        Self::LockStateViolation {
            message: format!(
                "{operation}: the circuit is locked; no nodes or components can be added"
            ),
        }
    }

    /// Create a lock-state error for an accessor called before `lock()`.
    pub fn unlocked(operation: &str) -> Self {
        Self::LockStateViolation {
            message: format!("{operation}: the circuit must be locked first"),
        }
    }

    /// Create a node allocation conflict error.
    pub fn conflict(node: NodeId, message: impl Into<String>) -> Self {
        Self::NodeAllocationConflict {
            node,
            message: message.into(),
        }
    }

    /// Create an active device ordering error.
    pub fn ordering(message: impl Into<String>) -> Self {
        Self::ActiveDeviceOrdering {
            message: message.into(),
        }
    }

    /// Create a range error.
    pub fn range(message: impl Into<String>) -> Self {
        Self::RangeError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_operation() {
        let err = CircuitError::locked("add_resistor");
        assert!(err.to_string().contains("add_resistor"));

        let err = CircuitError::unlocked("resistor");
        assert!(err.to_string().contains("must be locked"));
    }

    #[test]
    fn conflict_names_the_node() {
        let err = CircuitError::conflict(NodeId(3), "already a current sink");
        assert!(err.to_string().contains("N3"));
    }
}
