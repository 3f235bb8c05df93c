//! Numerical tolerances and limits shared by the simulator.

/// Tolerances used when checking simulator invariants.
pub mod tolerances {
    /// Allowed drift of the squared norm after a gate or a collapse.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Allowed drift of the probability sum before sampling.
    pub const PROBABILITY_TOLERANCE: f64 = 1e-6;
    /// Amplitudes with squared magnitude below this are treated as zero.
    pub const AMPLITUDE_EPSILON: f64 = 1e-12;
}

/// Widest register the simulator will allocate (2^24 amplitudes, 256 MiB).
pub const MAX_QUBITS: usize = 24;
