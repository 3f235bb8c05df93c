// src/lib.rs

//! `qsim` - A small statevector simulator for lesson-sized quantum circuits
//!
//! Builds circuits from a closed set of gates (Pauli X/Y/Z, Hadamard, axis
//! rotations, CNOT, identity), evolves `2^N` complex amplitudes exactly, and
//! samples measurement outcomes with a seedable random stream. Ships the
//! Bell-state, Deutsch-oracle and teleportation circuits.
//!
//! Qubit 0 is the most significant bit of a basis index, so the label `"10"`
//! means qubit 0 reads 1 and qubit 1 reads 0.

pub mod core;
pub mod gates;
pub mod circuits;
pub mod simulation;
pub mod protocols;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{MAX_QUBITS, QsimError, QsimResult, StateVector};
pub use gates::{Axis, Gate, GateKind, Pauli, Unitary};
pub use circuits::{Circuit, CircuitBuilder};
pub use circuits::library::{BellState, OracleKind, bell_state, deutsch_oracle};
pub use simulation::{Counts, Sampler, SimulationResult, Simulator, SimulatorConfig};
pub use protocols::teleportation::{
    ClassicalBits, StatePreparation, Teleportation, TeleportationStage, fidelity_benchmark,
    teleportation_circuit,
};
pub use validation::{check_normalization, equal_up_to_global_phase, state_fidelity};

// Example 1: Double Hadamard
// H is self-inverse, so every shot reads |0>.
/// ```
/// use qsim::{CircuitBuilder, Simulator, SimulatorConfig, QsimError};
///
/// let circuit = CircuitBuilder::new(1).h(0).h(0).measure(0).build()?;
/// let simulator = Simulator::with_config(SimulatorConfig::default().with_shots(1000).with_seed(1))?;
/// let result = simulator.run(&circuit)?;
///
/// println!("Circuit:\n{}", circuit);
/// println!("Result:\n{}", result);
/// assert_eq!(result.counts().get("0"), 1000);
/// # Ok::<(), QsimError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Bell pair
// Only correlated outcomes appear, each close to half the shots.
/// ```
/// use qsim::{bell_state, BellState, Simulator, SimulatorConfig, QsimError};
///
/// let circuit = bell_state(BellState::PhiPlus)?;
/// let simulator = Simulator::with_config(SimulatorConfig::default().with_shots(500).with_seed(7))?;
/// let counts = simulator.run(&circuit)?.into_counts();
///
/// assert_eq!(counts.get("00") + counts.get("11"), 500);
/// assert_eq!(counts.get("01") + counts.get("10"), 0);
/// # Ok::<(), QsimError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Teleportation
// The receiver ends up holding the prepared state, whatever bits were measured.
/// ```
/// use qsim::{Sampler, StatePreparation, Teleportation, QsimError};
///
/// let mut sampler = Sampler::new(Some(2024));
/// let outcome = Teleportation::run(StatePreparation::euler(1.2, 0.4)?, &mut sampler)?;
///
/// println!("bits {} fidelity {:.6}", outcome.bits, outcome.fidelity);
/// assert!((outcome.fidelity - 1.0).abs() < 1e-9);
/// # Ok::<(), QsimError>(())
/// ```
#[doc(hidden)]
const _: () = ();
