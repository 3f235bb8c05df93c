// src/validation/mod.rs

//! Invariant checks and state comparisons.

use crate::core::{QsimError, QsimResult, StateVector, NORM_TOLERANCE};
use num_complex::Complex64;
use num_traits::Zero;

/// Checks that the squared norm is 1 within `tolerance` (default 1e-9).
///
/// # Errors
/// `UnnormalizedState` carrying the observed squared norm.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> QsimResult<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sqr = state.norm_sqr();
    if (norm_sqr - 1.0).abs() > effective_tolerance {
        Err(QsimError::UnnormalizedState { norm_sqr })
    } else {
        Ok(())
    }
}

/// Inner product `⟨a|b⟩`.
///
/// # Errors
/// `DimensionMismatch` when the states have different widths.
pub fn inner_product(a: &StateVector, b: &StateVector) -> QsimResult<Complex64> {
    if a.dim() != b.dim() {
        return Err(QsimError::dimension(format!(
            "cannot compare a {}-qubit state with a {}-qubit state",
            a.num_qubits(),
            b.num_qubits()
        )));
    }
    Ok(a
        .amplitudes()
        .iter()
        .zip(b.amplitudes())
        .fold(Complex64::zero(), |acc, (x, y)| acc + x.conj() * y))
}

/// Fidelity `|⟨a|b⟩|²` between two pure states, in `[0, 1]`.
pub fn state_fidelity(a: &StateVector, b: &StateVector) -> QsimResult<f64> {
    Ok(inner_product(a, b)?.norm_sqr())
}

/// Fidelity `⟨ψ|ρ|ψ⟩` between a pure single-qubit state and a 2x2 density matrix.
///
/// # Errors
/// `DimensionMismatch` when `psi` is not a single-qubit state.
pub fn fidelity_with_density_matrix(psi: &StateVector, rho: &[[Complex64; 2]; 2]) -> QsimResult<f64> {
    if psi.num_qubits() != 1 {
        return Err(QsimError::dimension(format!(
            "density-matrix fidelity needs a 1-qubit reference, got {} qubits",
            psi.num_qubits()
        )));
    }
    let amps = psi.amplitudes();
    let mut value = Complex64::zero();
    for (r, row) in rho.iter().enumerate() {
        for (c, entry) in row.iter().enumerate() {
            value += amps[r].conj() * entry * amps[c];
        }
    }
    Ok(value.re)
}

/// `true` when the states differ at most by a global phase.
pub fn equal_up_to_global_phase(a: &StateVector, b: &StateVector, tolerance: f64) -> bool {
    state_fidelity(a, b)
        .map(|f| (1.0 - f).abs() <= tolerance)
        .unwrap_or(false)
}
