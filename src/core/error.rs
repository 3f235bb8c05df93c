//! Error handling logic

use thiserror::Error;

/// Failures raised while building or simulating circuits.
///
/// Every operation in the crate is deterministic given its seed, so none of
/// these are retried internally. They are surfaced to the caller as-is.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum QsimError {
    /// Malformed gate construction input (unknown axis name, non-finite angle).
    #[error("Invalid gate parameter: {message}")]
    InvalidGateParameter {
        /// What was wrong with the parameter.
        message: String,
    },

    /// A gate or measurement references a qubit the circuit does not have.
    #[error("Qubit index {qubit} is out of range for a {num_qubits}-qubit register")]
    QubitIndexOutOfRange {
        /// The offending qubit index.
        qubit: usize,
        /// Declared width of the register.
        num_qubits: usize,
    },

    /// A matrix or state vector does not have the size its targets imply,
    /// or a gate lists the same target twice.
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch {
        /// Description of the expected and actual sizes.
        message: String,
    },

    /// Probabilities do not sum to one. Always an implementation bug in gate
    /// application or a malformed caller-supplied state.
    #[error("State is not normalized: sum(|c_i|^2) = {norm_sqr}")]
    UnnormalizedState {
        /// The squared norm that was observed.
        norm_sqr: f64,
    },

    /// The teleportation protocol reached a state that correct simulation
    /// cannot produce (bad classical bits, out-of-order step, fidelity out of range).
    #[error("Protocol invariant violated: {message}")]
    ProtocolInvariantViolation {
        /// Which invariant failed.
        message: String,
    },

    /// Simulator configuration is unusable (zero shots, too many qubits, bad JSON).
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        message: String,
    },
}

impl QsimError {
    pub(crate) fn invalid_gate(message: impl Into<String>) -> Self {
        QsimError::InvalidGateParameter { message: message.into() }
    }

    pub(crate) fn dimension(message: impl Into<String>) -> Self {
        QsimError::DimensionMismatch { message: message.into() }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        QsimError::ProtocolInvariantViolation { message: message.into() }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        QsimError::InvalidConfiguration { message: message.into() }
    }
}

/// Result alias used throughout the crate.
pub type QsimResult<T> = Result<T, QsimError>;
