// src/simulation/sampler.rs
use super::results::Counts;
use crate::core::state::format_bits;
use crate::core::{QsimError, QsimResult, StateVector, NORM_TOLERANCE, PROBABILITY_TOLERANCE};
use crate::validation;
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use tracing::debug;

/// Born-rule sampling over a state vector.
///
/// Owns its random stream. Two samplers built from the same seed draw the
/// same outcomes for the same calls.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
    seed: u64,
}

impl Sampler {
    /// Seeds the stream with `seed`, or a fresh random seed when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        Self { rng: StdRng::seed_from_u64(seed), seed }
    }

    /// The seed this sampler started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next uniform draw in `[0, 1)` from this sampler's stream.
    pub fn uniform(&mut self) -> f64 {
        StandardUniform.sample(&mut self.rng)
    }

    /// Draws `shots` independent outcomes over `measured` without touching the state.
    ///
    /// Labels list `measured` in the order given; an empty slice measures
    /// every qubit.
    ///
    /// # Errors
    /// * `InvalidConfiguration` when `shots` is zero.
    /// * `UnnormalizedState` when the probabilities do not sum to 1 within 1e-6.
    /// * `QubitIndexOutOfRange` for a measured qubit the state does not have.
    pub fn sample_counts(&mut self, state: &StateVector, measured: &[usize], shots: u64) -> QsimResult<Counts> {
        if shots == 0 {
            return Err(QsimError::config("shot count must be positive"));
        }
        validation::check_normalization(state, Some(PROBABILITY_TOLERANCE))?;

        let all: Vec<usize>;
        let measured = if measured.is_empty() {
            all = (0..state.num_qubits()).collect();
            &all[..]
        } else {
            measured
        };

        let marginal = state.marginal_probabilities(measured)?;
        let table = CumulativeTable::new(&marginal);
        let mut tally = vec![0u64; marginal.len()];
        for _ in 0..shots {
            let r = self.uniform();
            tally[table.draw(r)] += 1;
        }

        let mut counts = Counts::new();
        for (outcome, n) in tally.into_iter().enumerate().filter(|(_, n)| *n > 0) {
            counts.record(format_bits(outcome, measured.len()), n);
        }
        debug!(shots, qubits = ?measured, outcomes = counts.len(), "sampled counts");
        Ok(counts)
    }

    /// Measures `qubits` once and collapses the state onto the observed outcome.
    ///
    /// Returns one bit per listed qubit, in the order given.
    ///
    /// # Errors
    /// * `UnnormalizedState` if the input or the post-measurement state is not normalized.
    /// * `QubitIndexOutOfRange` / `DimensionMismatch` for bad or repeated qubits.
    pub fn measure(&mut self, state: &mut StateVector, qubits: &[usize]) -> QsimResult<Vec<u8>> {
        validation::check_normalization(state, Some(PROBABILITY_TOLERANCE))?;
        let marginal = state.marginal_probabilities(qubits)?;
        let outcome = CumulativeTable::new(&marginal).draw(self.uniform());
        let probability = state.collapse(qubits, outcome)?;
        validation::check_normalization(state, Some(NORM_TOLERANCE))?;

        let width = qubits.len();
        let bits: Vec<u8> = (0..width).map(|k| ((outcome >> (width - 1 - k)) & 1) as u8).collect();
        debug!(qubits = ?qubits, bits = ?bits, probability, "measured and collapsed");
        Ok(bits)
    }
}

/// Running sums of an outcome distribution.
struct CumulativeTable {
    cumulative: Vec<f64>,
    last_nonzero: usize,
}

impl CumulativeTable {
    fn new(probabilities: &[f64]) -> Self {
        let mut acc = 0.0;
        let cumulative = probabilities
            .iter()
            .map(|p| {
                acc += p;
                acc
            })
            .collect();
        let last_nonzero = probabilities.iter().rposition(|&p| p > 0.0).unwrap_or(0);
        Self { cumulative, last_nonzero }
    }

    /// Maps a uniform draw in `[0, 1)` to an outcome index.
    ///
    /// Draws past the accumulated total (rounding) land on the last outcome
    /// with nonzero probability, never on an impossible one.
    fn draw(&self, r: f64) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let target = r * total;
        let index = self.cumulative.partition_point(|&c| c <= target);
        if index > self.last_nonzero { self.last_nonzero } else { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn bell_phi_plus() -> StateVector {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let o = Complex64::new(0.0, 0.0);
        StateVector::from_amplitudes(vec![s, o, o, s]).unwrap()
    }

    #[test]
    fn basis_state_always_yields_its_label() -> QsimResult<()> {
        let state = StateVector::basis_state(3, 0b101)?;
        let counts = Sampler::new(Some(7)).sample_counts(&state, &[], 200)?;
        assert_eq!(counts.get("101"), 200);
        assert_eq!(counts.len(), 1);
        Ok(())
    }

    #[test]
    fn same_seed_same_counts() -> QsimResult<()> {
        let state = bell_phi_plus();
        let a = Sampler::new(Some(42)).sample_counts(&state, &[0, 1], 500)?;
        let b = Sampler::new(Some(42)).sample_counts(&state, &[0, 1], 500)?;
        assert_eq!(a, b);
        assert_eq!(a.total(), 500);
        assert_eq!(a.get("01") + a.get("10"), 0);
        Ok(())
    }

    #[test]
    fn marginal_labels_follow_listed_qubits() -> QsimResult<()> {
        // |01>: qubit 0 reads 0, qubit 1 reads 1.
        let state = StateVector::basis_state(2, 0b01)?;
        let mut sampler = Sampler::new(Some(1));
        assert_eq!(sampler.sample_counts(&state, &[1], 10)?.get("1"), 10);
        assert_eq!(sampler.sample_counts(&state, &[1, 0], 10)?.get("10"), 10);
        Ok(())
    }

    #[test]
    fn zero_shots_are_rejected() {
        let state = StateVector::zero_state(1).unwrap();
        let err = Sampler::new(Some(0)).sample_counts(&state, &[], 0).unwrap_err();
        assert!(matches!(err, QsimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn measure_collapses_entangled_partner() -> QsimResult<()> {
        for seed in 0..20 {
            let mut state = bell_phi_plus();
            let mut sampler = Sampler::new(Some(seed));
            let bits = sampler.measure(&mut state, &[0])?;
            let label = if bits[0] == 0 { "00" } else { "11" };
            assert!((state.probability_of(label)? - 1.0).abs() < 1e-9);
            assert!((state.norm_sqr() - 1.0).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn rounding_never_selects_impossible_outcome() {
        let table = CumulativeTable::new(&[0.5, 0.5, 0.0, 0.0]);
        assert_eq!(table.draw(0.0), 0);
        assert_eq!(table.draw(0.75), 1);
        assert_eq!(table.draw(1.0), 1);
    }
}
