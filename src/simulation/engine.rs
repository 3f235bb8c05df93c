// src/simulation/engine.rs
use crate::core::{NORM_TOLERANCE, QsimError, QsimResult, StateVector};
use crate::gates::{Gate, GateKind, Unitary};
use crate::validation;
use num_complex::Complex64;
use num_traits::Zero;
use tracing::trace;

/// Evolves one state vector gate by gate.
///
/// Each execution owns its engine; nothing is shared between runs.
pub(crate) struct SimulationEngine {
    state: StateVector,
}

impl SimulationEngine {
    /// Starts from `|0…0⟩` on `num_qubits` qubits.
    pub(crate) fn init(num_qubits: usize) -> QsimResult<Self> {
        Ok(Self { state: StateVector::zero_state(num_qubits)? })
    }

    /// Starts from a caller-supplied state.
    pub(crate) fn with_state(state: StateVector) -> Self {
        Self { state }
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut StateVector {
        &mut self.state
    }

    pub(crate) fn into_state(self) -> StateVector {
        self.state
    }

    /// Applies gates strictly in order.
    pub(crate) fn apply_all(&mut self, gates: &[Gate]) -> QsimResult<()> {
        for gate in gates {
            self.apply_gate(gate)?;
        }
        Ok(())
    }

    /// Applies a single gate.
    ///
    /// # Errors
    /// * `QubitIndexOutOfRange` if the gate addresses a qubit the state does not have.
    /// * `DimensionMismatch` if the gate's matrix does not match its target count.
    /// * `UnnormalizedState` (debug builds only) if the norm drifted.
    pub(crate) fn apply_gate(&mut self, gate: &Gate) -> QsimResult<()> {
        gate.validate(self.state.num_qubits())?;
        trace!(gate = %gate, "applying gate");
        if let GateKind::Identity { .. } = gate.kind() {
            return Ok(());
        }
        let matrix = gate.matrix()?;
        self.apply_unitary(gate.qubits(), &matrix)?;

        if cfg!(debug_assertions) {
            validation::check_normalization(&self.state, Some(NORM_TOLERANCE))?;
        }
        Ok(())
    }

    /// Contracts a `2^k x 2^k` matrix against the amplitudes addressed by
    /// `qubits`, leaving every other qubit untouched.
    ///
    /// For each base index with all target bits clear, the `2^k` amplitudes
    /// reachable by setting target bits are gathered, multiplied and written
    /// back. The first listed qubit maps to the most significant bit of the
    /// matrix's local index.
    pub(crate) fn apply_unitary(&mut self, qubits: &[usize], matrix: &Unitary) -> QsimResult<()> {
        let k = qubits.len();
        if matrix.dim() != 1usize << k {
            return Err(QsimError::dimension(format!(
                "{}x{} matrix cannot act on {} qubit(s)",
                matrix.dim(),
                matrix.dim(),
                k
            )));
        }

        let masks = qubits
            .iter()
            .map(|&q| self.state.qubit_mask(q))
            .collect::<QsimResult<Vec<usize>>>()?;
        let target_mask = masks.iter().fold(0usize, |acc, m| acc | m);
        if target_mask.count_ones() as usize != k {
            return Err(QsimError::dimension(format!("repeated target qubit in {:?}", qubits)));
        }

        // offsets[j]: full-index bits to set for local basis state j.
        let local_dim = matrix.dim();
        let offsets: Vec<usize> = (0..local_dim)
            .map(|j| {
                masks
                    .iter()
                    .enumerate()
                    .filter(|(t, _)| (j >> (k - 1 - t)) & 1 == 1)
                    .fold(0usize, |acc, (_, m)| acc | m)
            })
            .collect();

        let dim = self.state.dim();
        let amplitudes = self.state.amplitudes_mut();
        let mut gathered = vec![Complex64::zero(); local_dim];
        for base in 0..dim {
            if base & target_mask != 0 {
                continue;
            }
            for (slot, offset) in gathered.iter_mut().zip(&offsets) {
                *slot = amplitudes[base | offset];
            }
            for (row, offset) in offsets.iter().enumerate() {
                amplitudes[base | offset] = matrix
                    .row(row)
                    .iter()
                    .zip(&gathered)
                    .map(|(u, psi)| u * psi)
                    .sum();
            }
        }
        Ok(())
    }
}
