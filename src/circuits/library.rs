// src/circuits/library.rs

//! Ready-made lesson circuits.
//!
//! ```text
//! |Φ⁺⟩ = (|00⟩ + |11⟩) / √2    H(0), CNOT(0,1)
//! |Φ⁻⟩ = (|00⟩ - |11⟩) / √2    H(0), CNOT(0,1), Z(0)
//! |Ψ⁺⟩ = (|01⟩ + |10⟩) / √2    X(1), H(0), CNOT(0,1)
//! |Ψ⁻⟩ = (|01⟩ - |10⟩) / √2    X(1), H(0), CNOT(0,1), Z(0)
//! ```
//!
//! The Deutsch circuit decides with a single oracle query whether a
//! one-bit function is constant (qubit 0 reads `0`) or balanced (reads `1`).

use super::{Circuit, CircuitBuilder};
use crate::core::QsimResult;
use crate::gates::Gate;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// The four maximally entangled two-qubit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BellState {
    /// |Φ⁺⟩ = (|00⟩ + |11⟩) / √2
    PhiPlus,
    /// |Φ⁻⟩ = (|00⟩ - |11⟩) / √2
    PhiMinus,
    /// |Ψ⁺⟩ = (|01⟩ + |10⟩) / √2
    PsiPlus,
    /// |Ψ⁻⟩ = (|01⟩ - |10⟩) / √2
    PsiMinus,
}

impl BellState {
    pub const ALL: [BellState; 4] = [
        BellState::PhiPlus,
        BellState::PhiMinus,
        BellState::PsiPlus,
        BellState::PsiMinus,
    ];

    /// Expected amplitudes over `|00⟩, |01⟩, |10⟩, |11⟩`.
    pub fn amplitudes(self) -> [Complex64; 4] {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let o = Complex64::new(0.0, 0.0);
        match self {
            BellState::PhiPlus => [s, o, o, s],
            BellState::PhiMinus => [s, o, o, -s],
            BellState::PsiPlus => [o, s, s, o],
            BellState::PsiMinus => [o, s, -s, o],
        }
    }

    /// Labels that can be observed when both qubits are measured.
    pub fn support(self) -> [&'static str; 2] {
        match self {
            BellState::PhiPlus | BellState::PhiMinus => ["00", "11"],
            BellState::PsiPlus | BellState::PsiMinus => ["01", "10"],
        }
    }
}

impl fmt::Display for BellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BellState::PhiPlus => "|Φ+⟩",
            BellState::PhiMinus => "|Φ-⟩",
            BellState::PsiPlus => "|Ψ+⟩",
            BellState::PsiMinus => "|Ψ-⟩",
        };
        f.write_str(name)
    }
}

/// Two-qubit circuit preparing `variant` from `|00⟩`, measuring both qubits.
pub fn bell_state(variant: BellState) -> QsimResult<Circuit> {
    let builder = CircuitBuilder::new(2);
    let builder = match variant {
        BellState::PsiPlus | BellState::PsiMinus => builder.x(1),
        BellState::PhiPlus | BellState::PhiMinus => builder,
    };
    let builder = builder.h(0).cnot(0, 1);
    let builder = match variant {
        BellState::PhiMinus | BellState::PsiMinus => builder.z(0),
        BellState::PhiPlus | BellState::PsiPlus => builder,
    };
    builder.measure(0).measure(1).build()
}

/// The four one-bit boolean functions a Deutsch oracle can hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OracleKind {
    /// f(x) = 0
    Constant0,
    /// f(x) = 1
    Constant1,
    /// f(x) = x
    BalancedIdentity,
    /// f(x) = 1 - x
    BalancedNegation,
}

impl OracleKind {
    pub const ALL: [OracleKind; 4] = [
        OracleKind::Constant0,
        OracleKind::Constant1,
        OracleKind::BalancedIdentity,
        OracleKind::BalancedNegation,
    ];

    /// Classical truth table of the hidden function.
    pub fn evaluate(self, x: bool) -> bool {
        match self {
            OracleKind::Constant0 => false,
            OracleKind::Constant1 => true,
            OracleKind::BalancedIdentity => x,
            OracleKind::BalancedNegation => !x,
        }
    }

    pub fn is_constant(self) -> bool {
        matches!(self, OracleKind::Constant0 | OracleKind::Constant1)
    }

    /// Bit the Deutsch circuit reads on qubit 0 for this oracle.
    pub fn expected_outcome(self) -> &'static str {
        if self.is_constant() { "0" } else { "1" }
    }

    /// `U_f |x⟩|y⟩ = |x⟩|y ⊕ f(x)⟩` with query qubit 0 and ancilla qubit 1.
    pub fn oracle_gates(self) -> Vec<Gate> {
        match self {
            // Keeps a slot in the circuit so every variant has an oracle stage.
            OracleKind::Constant0 => vec![Gate::identity(vec![1])],
            OracleKind::Constant1 => vec![Gate::x(1)],
            OracleKind::BalancedIdentity => vec![Gate::cnot(0, 1)],
            OracleKind::BalancedNegation => vec![Gate::cnot(0, 1), Gate::x(1)],
        }
    }
}

/// Deutsch's algorithm around the oracle `kind`, measuring only qubit 0.
pub fn deutsch_oracle(kind: OracleKind) -> QsimResult<Circuit> {
    CircuitBuilder::new(2)
        .x(1)
        .h(0)
        .h(1)
        .add_gates(kind.oracle_gates())
        .h(0)
        .measure(0)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulator;

    #[test]
    fn bell_circuits_prepare_expected_amplitudes() -> QsimResult<()> {
        for variant in BellState::ALL {
            let state = Simulator::new().statevector(&bell_state(variant)?)?;
            for (actual, expected) in state.amplitudes().iter().zip(variant.amplitudes()) {
                assert!((actual - expected).norm() < 1e-12, "{variant}: {actual} vs {expected}");
            }
        }
        Ok(())
    }

    #[test]
    fn oracle_truth_tables() {
        assert!(!OracleKind::Constant0.evaluate(true));
        assert!(OracleKind::Constant1.evaluate(false));
        assert!(OracleKind::BalancedIdentity.evaluate(true));
        assert!(OracleKind::BalancedNegation.evaluate(false));
        assert!(!OracleKind::BalancedNegation.evaluate(true));
    }

    #[test]
    fn deutsch_measures_only_query_qubit() -> QsimResult<()> {
        let circuit = deutsch_oracle(OracleKind::Constant0)?;
        assert_eq!(circuit.measured_qubits(), vec![0]);
        assert_eq!(circuit.num_qubits(), 2);
        Ok(())
    }

    #[test]
    fn deutsch_query_qubit_is_deterministic() -> QsimResult<()> {
        for kind in OracleKind::ALL {
            let state = Simulator::new().statevector(&deutsch_oracle(kind)?)?;
            let p_one = state.marginal_probabilities(&[0])?[1];
            let expected = if kind.is_constant() { 0.0 } else { 1.0 };
            assert!((p_one - expected).abs() < 1e-12, "{kind:?}");
        }
        Ok(())
    }
}
