// src/protocols/teleportation.rs

//! Three-qubit teleportation of a prepared message state.
//!
//! Qubit 0 carries the message, qubits 1 and 2 share a `|Φ+⟩` pair. After the
//! Bell-basis rotation, measuring qubits 0 and 1 yields `(m0, m1)` and leaves
//! qubit 2 in `X^m1 Z^m0 |ψ⟩`. Applying X if `m1 = 1` and then Z if `m0 = 1`
//! restores `|ψ⟩` on qubit 2.
//!
//! ```text
//! q0: ─[prep]─────────@──H──M
//! q1: ───H────@───────X─────M
//! q2: ────────X─────────────── X^m1 ── Z^m0
//! ```

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{PROBABILITY_TOLERANCE, QsimError, QsimResult, StateVector};
use crate::gates::{Axis, Gate, GateKind};
use crate::simulation::Sampler;
use crate::simulation::engine::SimulationEngine;
use crate::validation;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

const MESSAGE: usize = 0;
const SENDER: usize = 1;
const RECEIVER: usize = 2;

/// Single-qubit gates that prepare the message from `|0⟩`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePreparation {
    gates: Vec<GateKind>,
}

impl StatePreparation {
    /// # Errors
    /// `InvalidGateParameter` if a gate is not single-qubit or has a bad angle.
    pub fn new(gates: Vec<GateKind>) -> QsimResult<Self> {
        for kind in &gates {
            if kind.arity() != 1 {
                return Err(QsimError::invalid_gate(format!(
                    "state preparation takes single-qubit gates, got {}-qubit {}",
                    kind.arity(),
                    kind.symbol()
                )));
            }
            kind.matrix()?;
        }
        Ok(Self { gates })
    }

    /// `R_z(phi) R_y(theta) |0⟩`, which reaches every point of the Bloch sphere.
    pub fn euler(theta: f64, phi: f64) -> QsimResult<Self> {
        Self::new(vec![
            GateKind::Rotation { axis: Axis::Y, theta },
            GateKind::Rotation { axis: Axis::Z, theta: phi },
        ])
    }

    /// A state drawn uniformly over the Bloch sphere.
    ///
    /// `cos(theta)` is uniform on `[-1, 1]` and `phi` on `[0, 2π)`.
    pub fn random(sampler: &mut Sampler) -> QsimResult<Self> {
        let theta = (1.0 - 2.0 * sampler.uniform()).acos();
        let phi = 2.0 * PI * sampler.uniform();
        Self::euler(theta, phi)
    }

    pub fn gates(&self) -> &[GateKind] {
        &self.gates
    }

    /// The preparation bound to qubit `q`.
    pub fn gates_on(&self, q: usize) -> Vec<Gate> {
        self.gates.iter().map(|kind| Gate::new(*kind, vec![q])).collect()
    }

    /// The one-qubit state the preparation produces on its own.
    pub fn reference_state(&self) -> QsimResult<StateVector> {
        let mut engine = SimulationEngine::init(1)?;
        engine.apply_all(&self.gates_on(0))?;
        Ok(engine.into_state())
    }
}

/// Preparation on qubit 0, Bell pair on (1, 2), Bell-basis rotation on (0, 1).
/// Measures qubits 0 and 1; no corrections.
pub fn teleportation_circuit(preparation: &StatePreparation) -> QsimResult<Circuit> {
    CircuitBuilder::new(3)
        .add_gates(preparation.gates_on(MESSAGE))
        .h(SENDER)
        .cnot(SENDER, RECEIVER)
        .cnot(MESSAGE, SENDER)
        .h(MESSAGE)
        .measure(MESSAGE)
        .measure(SENDER)
        .build()
}

/// The two classical bits sent from qubits 0 and 1 to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClassicalBits {
    m0: bool,
    m1: bool,
}

impl ClassicalBits {
    pub const ALL: [ClassicalBits; 4] = [
        ClassicalBits { m0: false, m1: false },
        ClassicalBits { m0: false, m1: true },
        ClassicalBits { m0: true, m1: false },
        ClassicalBits { m0: true, m1: true },
    ];

    /// # Errors
    /// `ProtocolInvariantViolation` for anything but 0 or 1.
    pub fn from_bits(m0: u8, m1: u8) -> QsimResult<Self> {
        let bit = |name: &str, value: u8| match value {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(QsimError::protocol(format!("classical bit {name} must be 0 or 1, got {other}"))),
        };
        Ok(Self { m0: bit("m0", m0)?, m1: bit("m1", m1)? })
    }

    pub fn m0(self) -> u8 {
        u8::from(self.m0)
    }

    pub fn m1(self) -> u8 {
        u8::from(self.m1)
    }

    /// Outcome index over (qubit 0, qubit 1), i.e. `2·m0 + m1`.
    pub fn index(self) -> usize {
        (usize::from(self.m0) << 1) | usize::from(self.m1)
    }

    /// Receiver corrections for this outcome, in application order.
    pub fn corrections(self) -> Vec<Gate> {
        match (self.m0, self.m1) {
            (false, false) => vec![],
            (false, true) => vec![Gate::x(RECEIVER)],
            (true, false) => vec![Gate::z(RECEIVER)],
            (true, true) => vec![Gate::x(RECEIVER), Gate::z(RECEIVER)],
        }
    }
}

impl fmt::Display for ClassicalBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.m0(), self.m1())
    }
}

/// Where a [`Teleportation`] run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TeleportationStage {
    Unprepared,
    Entangled,
    Measured(ClassicalBits),
    Corrected(ClassicalBits),
    Verified { bits: ClassicalBits, fidelity: f64 },
}

impl fmt::Display for TeleportationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeleportationStage::Unprepared => write!(f, "Unprepared"),
            TeleportationStage::Entangled => write!(f, "Entangled"),
            TeleportationStage::Measured(bits) => write!(f, "Measured({bits})"),
            TeleportationStage::Corrected(bits) => write!(f, "Corrected({bits})"),
            TeleportationStage::Verified { bits, fidelity } => {
                write!(f, "Verified({bits}, fidelity {fidelity:.6})")
            }
        }
    }
}

/// Result of a complete teleportation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeleportationOutcome {
    pub bits: ClassicalBits,
    pub fidelity: f64,
}

/// Steps one teleportation through
/// `Unprepared → Entangled → Measured → Corrected → Verified`.
///
/// Each step checks the current stage and fails with
/// `ProtocolInvariantViolation` when called out of order.
pub struct Teleportation {
    preparation: StatePreparation,
    engine: SimulationEngine,
    stage: TeleportationStage,
}

impl Teleportation {
    pub fn new(preparation: StatePreparation) -> QsimResult<Self> {
        Ok(Self {
            preparation,
            engine: SimulationEngine::init(3)?,
            stage: TeleportationStage::Unprepared,
        })
    }

    pub fn stage(&self) -> TeleportationStage {
        self.stage
    }

    pub fn state(&self) -> &StateVector {
        self.engine.state()
    }

    pub fn preparation(&self) -> &StatePreparation {
        &self.preparation
    }

    fn out_of_order(&self, step: &str) -> QsimError {
        QsimError::protocol(format!("cannot {step} while {}", self.stage))
    }

    fn advance(&mut self, stage: TeleportationStage) {
        debug!(from = %self.stage, to = %stage, "teleportation transition");
        self.stage = stage;
    }

    /// Runs the pre-measurement circuit.
    pub fn entangle(&mut self) -> QsimResult<()> {
        if self.stage != TeleportationStage::Unprepared {
            return Err(self.out_of_order("entangle"));
        }
        let circuit = teleportation_circuit(&self.preparation)?;
        self.engine.apply_all(circuit.gates())?;
        self.advance(TeleportationStage::Entangled);
        Ok(())
    }

    /// Measures qubits 0 and 1, collapsing the register.
    pub fn measure(&mut self, sampler: &mut Sampler) -> QsimResult<ClassicalBits> {
        if self.stage != TeleportationStage::Entangled {
            return Err(self.out_of_order("measure"));
        }
        let raw = sampler.measure(self.engine.state_mut(), &[MESSAGE, SENDER])?;
        let bits = ClassicalBits::from_bits(raw[0], raw[1])?;
        self.advance(TeleportationStage::Measured(bits));
        Ok(bits)
    }

    /// Post-selects the branch `bits` instead of sampling one.
    ///
    /// Returns the probability the branch had; every branch has 1/4.
    pub fn measure_forced(&mut self, bits: ClassicalBits) -> QsimResult<f64> {
        if self.stage != TeleportationStage::Entangled {
            return Err(self.out_of_order("measure"));
        }
        let probability = self.engine.state_mut().collapse(&[MESSAGE, SENDER], bits.index())?;
        self.advance(TeleportationStage::Measured(bits));
        Ok(probability)
    }

    /// Applies the receiver corrections for the measured bits.
    pub fn correct(&mut self) -> QsimResult<()> {
        let TeleportationStage::Measured(bits) = self.stage else {
            return Err(self.out_of_order("correct"));
        };
        self.engine.apply_all(&bits.corrections())?;
        self.advance(TeleportationStage::Corrected(bits));
        Ok(())
    }

    /// Fidelity between qubit 2 and the state the preparation makes on its own.
    ///
    /// # Errors
    /// `ProtocolInvariantViolation` if called before `correct`, or if the
    /// fidelity leaves `[0, 1]` by more than the probability tolerance.
    pub fn verify(&mut self) -> QsimResult<f64> {
        let TeleportationStage::Corrected(bits) = self.stage else {
            return Err(self.out_of_order("verify"));
        };
        let rho = self.engine.state().reduced_density_matrix(RECEIVER)?;
        let reference = self.preparation.reference_state()?;
        let raw = validation::fidelity_with_density_matrix(&reference, &rho)?;
        if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&raw) {
            return Err(QsimError::protocol(format!("fidelity {raw} is outside [0, 1]")));
        }
        let fidelity = raw.clamp(0.0, 1.0);
        self.advance(TeleportationStage::Verified { bits, fidelity });
        Ok(fidelity)
    }

    /// Entangle, measure, correct and verify in one go.
    pub fn run(preparation: StatePreparation, sampler: &mut Sampler) -> QsimResult<TeleportationOutcome> {
        let mut protocol = Self::new(preparation)?;
        protocol.entangle()?;
        let bits = protocol.measure(sampler)?;
        protocol.correct()?;
        let fidelity = protocol.verify()?;
        Ok(TeleportationOutcome { bits, fidelity })
    }
}

/// Aggregate of [`fidelity_benchmark`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub trials: usize,
    pub min_fidelity: f64,
    pub mean_fidelity: f64,
    /// Runs per measured branch, indexed by [`ClassicalBits::index`].
    pub branches: [usize; 4],
}

/// Teleports `trials` random message states and summarizes the fidelities.
///
/// # Errors
/// `InvalidConfiguration` when `trials` is zero.
pub fn fidelity_benchmark(trials: usize, seed: u64) -> QsimResult<BenchmarkSummary> {
    if trials == 0 {
        return Err(QsimError::config("benchmark needs at least one trial"));
    }
    let mut sampler = Sampler::new(Some(seed));
    let mut branches = [0usize; 4];
    let mut min_fidelity = f64::INFINITY;
    let mut total = 0.0;
    for _ in 0..trials {
        let preparation = StatePreparation::random(&mut sampler)?;
        let outcome = Teleportation::run(preparation, &mut sampler)?;
        branches[outcome.bits.index()] += 1;
        min_fidelity = min_fidelity.min(outcome.fidelity);
        total += outcome.fidelity;
    }
    let summary = BenchmarkSummary {
        trials,
        min_fidelity,
        mean_fidelity: total / trials as f64,
        branches,
    };
    debug!(?summary, "teleportation benchmark finished");
    Ok(summary)
}
