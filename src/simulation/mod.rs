// src/simulation/mod.rs

//! Executes `qsim::circuits::Circuit`s.
//!
//! [`Simulator`] is the entry point: it evolves a fresh state through the
//! internal `SimulationEngine` and either hands back the final
//! [`StateVector`] or samples it with a [`Sampler`].

mod config;
pub(crate) mod engine;
mod results;
pub mod sampler;

pub use config::{DEFAULT_SHOTS, SimulatorConfig};
pub use results::{Counts, SimulationResult};
pub use sampler::Sampler;

use crate::circuits::Circuit;
use crate::core::{QsimError, QsimResult, StateVector};
use engine::SimulationEngine;
use tracing::debug;

/// Runs circuits against a statevector.
///
/// Holds only configuration; every call allocates its own state and sampler,
/// so one `Simulator` can serve many circuits.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with explicit settings.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `config` fails validation.
    pub fn with_config(config: SimulatorConfig) -> QsimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Evolves `|0…0⟩` through the circuit and returns the final state.
    pub fn statevector(&self, circuit: &Circuit) -> QsimResult<StateVector> {
        let mut engine = SimulationEngine::init(circuit.num_qubits())?;
        engine.apply_all(circuit.gates())?;
        Ok(engine.into_state())
    }

    /// Evolves `initial` through the circuit and returns the final state.
    ///
    /// # Errors
    /// `DimensionMismatch` if `initial` does not have the circuit's width.
    pub fn statevector_from(&self, circuit: &Circuit, initial: StateVector) -> QsimResult<StateVector> {
        if initial.num_qubits() != circuit.num_qubits() {
            return Err(QsimError::dimension(format!(
                "initial state has {} qubits but the circuit acts on {}",
                initial.num_qubits(),
                circuit.num_qubits()
            )));
        }
        let mut engine = SimulationEngine::with_state(initial);
        engine.apply_all(circuit.gates())?;
        Ok(engine.into_state())
    }

    /// Executes the circuit and samples its measured qubits `config.shots` times.
    ///
    /// The sampler is seeded from `config.seed`; the seed actually used is
    /// reported in the result so unseeded runs can be replayed.
    pub fn run(&self, circuit: &Circuit) -> QsimResult<SimulationResult> {
        let mut sampler = Sampler::new(self.config.seed);
        self.run_with_sampler(circuit, &mut sampler)
    }

    /// Like [`run`](Self::run), drawing from a caller-owned sampler.
    pub fn run_with_sampler(&self, circuit: &Circuit, sampler: &mut Sampler) -> QsimResult<SimulationResult> {
        let shots = self.config.shots;
        debug!(
            num_qubits = circuit.num_qubits(),
            gates = circuit.len(),
            shots,
            seed = sampler.seed(),
            "running circuit"
        );
        let state = self.statevector(circuit)?;
        let measured = circuit.measured_qubits();
        let counts = sampler.sample_counts(&state, &measured, shots)?;
        Ok(SimulationResult::new(counts, measured, shots, sampler.seed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn assert_complex_vec_approx_equal(actual: &[Complex64], expected: &[Complex64], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i,
                actual[i],
                expected[i],
                context
            );
        }
    }

    fn seeded(shots: u64, seed: u64) -> Simulator {
        Simulator::with_config(SimulatorConfig::default().with_shots(shots).with_seed(seed)).unwrap()
    }

    #[test]
    fn empty_circuit_stays_in_ground_state() -> QsimResult<()> {
        let circuit = CircuitBuilder::new(2).build()?;
        let result = seeded(64, 3).run(&circuit)?;
        assert_eq!(result.counts().get("00"), 64);
        assert_eq!(result.measured_qubits(), &[0, 1]);
        Ok(())
    }

    #[test]
    fn statevector_of_plus_state() -> QsimResult<()> {
        let circuit = CircuitBuilder::new(1).h(0).build()?;
        let state = Simulator::new().statevector(&circuit)?;
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(state.amplitudes(), &[s, s], "H|0>");
        Ok(())
    }

    #[test]
    fn statevector_from_custom_initial_state() -> QsimResult<()> {
        let circuit = CircuitBuilder::new(2).cnot(0, 1).build()?;
        let state = Simulator::new().statevector_from(&circuit, StateVector::basis_state(2, 0b10)?)?;
        assert_eq!(state.probability_of("11")?, 1.0);

        let err = Simulator::new()
            .statevector_from(&circuit, StateVector::zero_state(3)?)
            .unwrap_err();
        assert!(matches!(err, QsimError::DimensionMismatch { .. }));
        Ok(())
    }

    #[test]
    fn run_reports_seed_and_replays() -> QsimResult<()> {
        let circuit = CircuitBuilder::new(2).h(0).h(1).build()?;
        let first = Simulator::new().run(&circuit)?;
        let replay = seeded(first.shots(), first.seed()).run(&circuit)?;
        assert_eq!(first.counts(), replay.counts());
        assert_eq!(first.shots(), DEFAULT_SHOTS);
        assert_eq!(first.counts().total(), DEFAULT_SHOTS);
        Ok(())
    }

    #[test]
    fn measuring_a_subset_marginalizes() -> QsimResult<()> {
        let circuit = CircuitBuilder::new(2).x(1).h(0).measure(1).build()?;
        let result = seeded(100, 11).run(&circuit)?;
        assert_eq!(result.counts().get("1"), 100);
        assert_eq!(result.counts().len(), 1);
        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Simulator::with_config(SimulatorConfig::default().with_shots(0)).unwrap_err();
        assert!(matches!(err, QsimError::InvalidConfiguration { .. }));
    }
}
