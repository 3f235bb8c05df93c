//! Property-based tests for gate algebra, evolution and sampling.

use proptest::prelude::*;
use qsim::gates::{self, Axis};
use qsim::{Circuit, CircuitBuilder, Gate, Sampler, Simulator, SimulatorConfig};

const TOLERANCE: f64 = 1e-9;

/// Gates drawn for random circuits.
#[derive(Debug, Clone)]
enum GateOp {
    H(usize),
    X(usize),
    Y(usize),
    Z(usize),
    R(Axis, f64, usize),
    CX(usize, usize),
}

impl GateOp {
    fn into_gate(self) -> Gate {
        match self {
            GateOp::H(q) => Gate::h(q),
            GateOp::X(q) => Gate::x(q),
            GateOp::Y(q) => Gate::y(q),
            GateOp::Z(q) => Gate::z(q),
            GateOp::R(axis, theta, q) => Gate::rotation(axis, theta, q).expect("finite angle"),
            GateOp::CX(c, t) => Gate::cnot(c, t),
        }
    }
}

fn arb_axis() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)]
}

fn arb_gate_op(num_qubits: usize) -> impl Strategy<Value = GateOp> {
    let single = prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
        (0..num_qubits).prop_map(GateOp::Y),
        (0..num_qubits).prop_map(GateOp::Z),
        (arb_axis(), -10.0f64..10.0, 0..num_qubits).prop_map(|(a, t, q)| GateOp::R(a, t, q)),
    ];
    if num_qubits < 2 {
        single.boxed()
    } else {
        prop_oneof![
            4 => single,
            1 => (0..num_qubits, 0..num_qubits)
                .prop_filter("Control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| GateOp::CX(c, t)),
        ]
        .boxed()
    }
}

/// 1-4 qubits, 1-12 gates.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1usize..=4).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=12).prop_map(move |ops| {
            CircuitBuilder::new(num_qubits)
                .add_gates(ops.into_iter().map(GateOp::into_gate))
                .build()
                .expect("generated circuit is valid")
        })
    })
}

proptest! {
    #[test]
    fn test_rotations_are_unitary(axis in arb_axis(), theta in -20.0f64..20.0) {
        let u = gates::rotation(axis, theta).expect("finite angle");
        prop_assert!(u.is_unitary(TOLERANCE));
        let round_trip = u.mul(&u.dagger()).expect("same size");
        prop_assert!(round_trip.approx_eq(&gates::identity(1).expect("1 qubit"), TOLERANCE));
    }

    #[test]
    fn test_rotation_inverse_is_negated_angle(axis in arb_axis(), theta in -20.0f64..20.0) {
        let forward = gates::rotation(axis, theta).expect("finite angle");
        let backward = gates::rotation(axis, -theta).expect("finite angle");
        prop_assert!(forward.dagger().approx_eq(&backward, TOLERANCE));
    }

    /// U followed by U† returns every circuit to |0…0⟩.
    #[test]
    fn test_circuit_then_inverse_is_identity(circuit in arb_circuit()) {
        let state = Simulator::new()
            .statevector(&circuit.compose(&circuit.inverse()))
            .expect("valid circuit");
        let zeros = "0".repeat(circuit.num_qubits());
        prop_assert!((state.probability_of(&zeros).expect("label") - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_evolution_preserves_norm(circuit in arb_circuit()) {
        let state = Simulator::new().statevector(&circuit).expect("valid circuit");
        prop_assert!((state.norm_sqr() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_counts_sum_to_shots(circuit in arb_circuit(), shots in 1u64..2000, seed in any::<u64>()) {
        let config = SimulatorConfig::default().with_shots(shots).with_seed(seed);
        let result = Simulator::with_config(config)
            .expect("valid config")
            .run(&circuit)
            .expect("valid circuit");
        prop_assert_eq!(result.counts().total(), shots);
        for (label, _) in result.counts().iter() {
            prop_assert_eq!(label.len(), circuit.num_qubits());
        }
    }

    #[test]
    fn test_collapse_keeps_unit_norm(circuit in arb_circuit(), seed in any::<u64>(), qubit in 0usize..4) {
        let mut state = Simulator::new().statevector(&circuit).expect("valid circuit");
        let qubit = qubit % circuit.num_qubits();
        let bits = Sampler::new(Some(seed)).measure(&mut state, &[qubit]).expect("normalized state");
        prop_assert!((state.norm_sqr() - 1.0).abs() < TOLERANCE);
        let marginal = state.marginal_probabilities(&[qubit]).expect("in range");
        prop_assert!((marginal[bits[0] as usize] - 1.0).abs() < TOLERANCE);
    }
}
