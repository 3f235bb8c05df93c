// src/core/state.rs

use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::Serialize;
use std::fmt;

use super::constants::tolerances::{AMPLITUDE_EPSILON, PROBABILITY_TOLERANCE};
use super::constants::MAX_QUBITS;
use super::error::{QsimError, QsimResult};

/// A pure state of `N` qubits stored as `2^N` complex amplitudes.
///
/// Basis index `i` is read as an `N`-bit label where qubit 0 is the *most
/// significant* bit. `|01⟩` in a 2-qubit register is therefore index 1: qubit 0
/// is `0`, qubit 1 is `1`. Every label rendered by this crate uses the same
/// order, character `k` of the label being qubit `k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl StateVector {
    /// Creates `|0…0⟩` on `num_qubits` qubits.
    pub fn zero_state(num_qubits: usize) -> QsimResult<Self> {
        Self::basis_state(num_qubits, 0)
    }

    /// Creates the computational basis state with the given index.
    pub fn basis_state(num_qubits: usize, index: usize) -> QsimResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(QsimError::config(format!(
                "{} qubits requested, the simulator supports at most {}",
                num_qubits, MAX_QUBITS
            )));
        }
        let dim = 1usize << num_qubits;
        if index >= dim {
            return Err(QsimError::dimension(format!(
                "basis index {} does not fit a {}-qubit register (dimension {})",
                index, num_qubits, dim
            )));
        }
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[index] = Complex64::one();
        Ok(Self { amplitudes, num_qubits })
    }

    /// Wraps caller-supplied amplitudes.
    ///
    /// The length must be a power of two and the vector must be normalized
    /// within the sampling tolerance.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> QsimResult<Self> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(QsimError::dimension(format!(
                "state vector length {} is not a power of two",
                dim
            )));
        }
        let num_qubits = dim.trailing_zeros() as usize;
        if num_qubits > MAX_QUBITS {
            return Err(QsimError::config(format!(
                "{} qubits supplied, the simulator supports at most {}",
                num_qubits, MAX_QUBITS
            )));
        }
        let state = Self { amplitudes, num_qubits };
        let norm_sqr = state.norm_sqr();
        if (norm_sqr - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(QsimError::UnnormalizedState { norm_sqr });
        }
        Ok(state)
    }

    /// Number of qubits `N`.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes, `2^N`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Amplitude of a single basis state, `None` when out of range.
    pub fn amplitude(&self, index: usize) -> Option<Complex64> {
        self.amplitudes.get(index).copied()
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Born-rule probability of every basis state, in index order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Probability of the basis state written as a label such as `"011"`.
    pub fn probability_of(&self, label: &str) -> QsimResult<f64> {
        let index = parse_label(label, self.num_qubits)?;
        Ok(self.amplitudes[index].norm_sqr())
    }

    /// The full `N`-character label of a basis index.
    pub fn label_of(&self, index: usize) -> String {
        format_bits(index, self.num_qubits)
    }

    /// Bit mask selecting `qubit` inside a basis index.
    pub fn qubit_mask(&self, qubit: usize) -> QsimResult<usize> {
        if qubit >= self.num_qubits {
            return Err(QsimError::QubitIndexOutOfRange { qubit, num_qubits: self.num_qubits });
        }
        Ok(1usize << (self.num_qubits - 1 - qubit))
    }

    fn masks_for(&self, qubits: &[usize]) -> QsimResult<Vec<usize>> {
        let mut masks = Vec::with_capacity(qubits.len());
        for &q in qubits {
            let mask = self.qubit_mask(q)?;
            if masks.contains(&mask) {
                return Err(QsimError::dimension(format!("qubit {} listed more than once", q)));
            }
            masks.push(mask);
        }
        Ok(masks)
    }

    /// Marginal distribution over `qubits`.
    ///
    /// Entry `k` is the probability that the listed qubits read as the bits of
    /// `k`, the first listed qubit being the most significant bit.
    pub fn marginal_probabilities(&self, qubits: &[usize]) -> QsimResult<Vec<f64>> {
        let masks = self.masks_for(qubits)?;
        let mut marginal = vec![0.0; 1usize << masks.len()];
        for (index, amp) in self.amplitudes.iter().enumerate() {
            marginal[outcome_index(index, &masks)] += amp.norm_sqr();
        }
        Ok(marginal)
    }

    /// Projects onto the subspace where `qubits` read as `outcome` and renormalizes.
    ///
    /// Returns the probability the outcome had before the projection. The new
    /// amplitudes are built in a separate buffer and swapped in at the end, so
    /// a failing collapse leaves the state untouched.
    pub fn collapse(&mut self, qubits: &[usize], outcome: usize) -> QsimResult<f64> {
        let masks = self.masks_for(qubits)?;
        if outcome >= (1usize << masks.len()) {
            return Err(QsimError::protocol(format!(
                "outcome {} cannot be read from {} measured qubit(s)",
                outcome,
                masks.len()
            )));
        }

        let probability: f64 = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(index, _)| outcome_index(*index, &masks) == outcome)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();
        if probability < AMPLITUDE_EPSILON {
            return Err(QsimError::protocol(format!(
                "outcome {} on qubits {:?} has zero probability",
                format_bits(outcome, masks.len()),
                qubits
            )));
        }

        let scale = 1.0 / probability.sqrt();
        let collapsed: Vec<Complex64> = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(index, amp)| {
                if outcome_index(index, &masks) == outcome {
                    *amp * scale
                } else {
                    Complex64::zero()
                }
            })
            .collect();
        self.amplitudes = collapsed;
        Ok(probability)
    }

    /// Reduced 2x2 density matrix of one qubit, tracing out the rest.
    pub fn reduced_density_matrix(&self, qubit: usize) -> QsimResult<[[Complex64; 2]; 2]> {
        let mask = self.qubit_mask(qubit)?;
        let mut rho = [[Complex64::zero(); 2]; 2];
        for i in 0..self.dim() {
            if i & mask == 0 {
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[i | mask];
                rho[0][0] += a0 * a0.conj();
                rho[0][1] += a0 * a1.conj();
                rho[1][1] += a1 * a1.conj();
            }
        }
        rho[1][0] = rho[0][1].conj();
        Ok(rho)
    }

    /// Bloch vector `(x, y, z)` of one qubit. Length 1 for a pure single-qubit
    /// factor, shorter when the qubit is entangled with the rest.
    pub fn bloch_vector(&self, qubit: usize) -> QsimResult<[f64; 3]> {
        let rho = self.reduced_density_matrix(qubit)?;
        Ok([
            2.0 * rho[0][1].re,
            -2.0 * rho[0][1].im,
            rho[0][0].re - rho[1][1].re,
        ])
    }

    /// Tensor product `self ⊗ other`; `self` supplies the lower-numbered qubits.
    pub fn tensor(&self, other: &StateVector) -> QsimResult<StateVector> {
        let num_qubits = self.num_qubits + other.num_qubits;
        if num_qubits > MAX_QUBITS {
            return Err(QsimError::config(format!(
                "tensor product would span {} qubits, the simulator supports at most {}",
                num_qubits, MAX_QUBITS
            )));
        }
        let mut amplitudes = Vec::with_capacity(self.dim() * other.dim());
        for a in &self.amplitudes {
            for b in &other.amplitudes {
                amplitudes.push(*a * *b);
            }
        }
        Ok(StateVector { amplitudes, num_qubits })
    }
}

/// Projects a full basis index onto the bits selected by `masks`.
pub(crate) fn outcome_index(index: usize, masks: &[usize]) -> usize {
    masks
        .iter()
        .fold(0, |acc, mask| (acc << 1) | usize::from(index & mask != 0))
}

/// Renders the low `width` bits of `value`, most significant first.
pub(crate) fn format_bits(value: usize, width: usize) -> String {
    (0..width)
        .map(|k| if (value >> (width - 1 - k)) & 1 == 1 { '1' } else { '0' })
        .collect()
}

fn parse_label(label: &str, num_qubits: usize) -> QsimResult<usize> {
    if label.len() != num_qubits {
        return Err(QsimError::dimension(format!(
            "label '{}' has {} characters, expected {}",
            label,
            label.len(),
            num_qubits
        )));
    }
    label.chars().try_fold(0usize, |acc, c| match c {
        '0' => Ok(acc << 1),
        '1' => Ok((acc << 1) | 1),
        other => Err(QsimError::dimension(format!(
            "label '{}' contains '{}', expected only 0 and 1",
            label, other
        ))),
    })
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateVector[{} qubits](", self.num_qubits)?;
        let mut first = true;
        for (i, c) in self.amplitudes.iter().enumerate() {
            if c.norm_sqr() < AMPLITUDE_EPSILON {
                continue;
            }
            write!(f, "{}({:.4})|{}⟩", if first { "" } else { " + " }, c, self.label_of(i))?;
            first = false;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn bell_phi_plus() -> StateVector {
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        StateVector::from_amplitudes(vec![h, Complex64::zero(), Complex64::zero(), h]).unwrap()
    }

    #[test]
    fn zero_state_has_single_unit_amplitude() {
        let state = StateVector::zero_state(3).unwrap();
        assert_eq!(state.dim(), 8);
        assert_eq!(state.amplitude(0), Some(Complex64::one()));
        assert!((state.norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
    }

    #[test]
    fn qubit_zero_is_most_significant() {
        let state = StateVector::basis_state(2, 0b10).unwrap();
        assert_eq!(state.label_of(2), "10");
        assert_eq!(state.probability_of("10").unwrap(), 1.0);
        assert_eq!(state.qubit_mask(0).unwrap(), 0b10);
        assert_eq!(state.qubit_mask(1).unwrap(), 0b01);
    }

    #[test]
    fn from_amplitudes_rejects_bad_input() {
        let err = StateVector::from_amplitudes(vec![Complex64::one(); 3]).unwrap_err();
        assert!(matches!(err, QsimError::DimensionMismatch { .. }));

        let err = StateVector::from_amplitudes(vec![Complex64::one(); 2]).unwrap_err();
        assert!(matches!(err, QsimError::UnnormalizedState { .. }));
    }

    #[test]
    fn too_many_qubits_is_a_configuration_error() {
        let err = StateVector::zero_state(MAX_QUBITS + 1).unwrap_err();
        assert!(matches!(err, QsimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn marginal_of_bell_pair_is_uniform() {
        let state = bell_phi_plus();
        let marginal = state.marginal_probabilities(&[1]).unwrap();
        assert!((marginal[0] - 0.5).abs() < TEST_TOLERANCE);
        assert!((marginal[1] - 0.5).abs() < TEST_TOLERANCE);
    }

    #[test]
    fn collapse_renormalizes_and_correlates() {
        let mut state = bell_phi_plus();
        let p = state.collapse(&[0], 1).unwrap();
        assert!((p - 0.5).abs() < TEST_TOLERANCE);
        assert!((state.norm_sqr() - 1.0).abs() < TEST_TOLERANCE);
        assert!((state.probability_of("11").unwrap() - 1.0).abs() < TEST_TOLERANCE);
    }

    #[test]
    fn collapse_onto_impossible_outcome_leaves_state_untouched() {
        let mut state = bell_phi_plus();
        let before = state.clone();
        let err = state.collapse(&[0, 1], 0b01).unwrap_err();
        assert!(matches!(err, QsimError::ProtocolInvariantViolation { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn bloch_vector_of_entangled_qubit_is_centered() {
        let state = bell_phi_plus();
        let [x, y, z] = state.bloch_vector(0).unwrap();
        assert!(x.abs() < TEST_TOLERANCE && y.abs() < TEST_TOLERANCE && z.abs() < TEST_TOLERANCE);

        let plus_i = StateVector::from_amplitudes(vec![
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, FRAC_1_SQRT_2),
        ])
        .unwrap();
        let [x, y, z] = plus_i.bloch_vector(0).unwrap();
        assert!(x.abs() < TEST_TOLERANCE);
        assert!((y - 1.0).abs() < TEST_TOLERANCE);
        assert!(z.abs() < TEST_TOLERANCE);
    }

    #[test]
    fn tensor_places_left_operand_on_low_qubits() {
        let one = StateVector::basis_state(1, 1).unwrap();
        let zero = StateVector::zero_state(1).unwrap();
        let joint = one.tensor(&zero).unwrap();
        assert_eq!(joint.probability_of("10").unwrap(), 1.0);
    }

    #[test]
    fn label_parsing_rejects_garbage() {
        let state = StateVector::zero_state(2).unwrap();
        assert!(state.probability_of("0").is_err());
        assert!(state.probability_of("0x").is_err());
    }
}
