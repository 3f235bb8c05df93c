// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! gates (`qsim::gates::Gate`) together with a measurement specification.
//!
//! A [`Circuit`] is immutable once built. Use [`CircuitBuilder`] to assemble
//! one; validation of qubit indices, gate arity and rotation angles happens in
//! [`CircuitBuilder::build`], so a built circuit never fails those checks at
//! execution time.

pub mod library;

use crate::core::{MAX_QUBITS, QsimError, QsimResult};
use crate::gates::{Axis, Gate, GateKind};
use std::collections::BTreeSet;
use std::fmt;

/// An ordered sequence of gates on a fixed-width register plus the qubits to
/// measure at the end.
///
/// Gates are executed strictly in insertion order. An empty measurement set
/// means every qubit is measured.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<Gate>,
    measured: BTreeSet<usize>,
}

impl Circuit {
    /// Width of the register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The gates in execution order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Qubits that will be read out, in ascending order.
    ///
    /// Falls back to every qubit when no measurement was requested.
    pub fn measured_qubits(&self) -> Vec<usize> {
        if self.measured.is_empty() {
            (0..self.num_qubits).collect()
        } else {
            self.measured.iter().copied().collect()
        }
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns `true` if the circuit contains no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The circuit that undoes this one: gates reversed and inverted.
    /// The measurement specification is kept.
    pub fn inverse(&self) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates.iter().rev().map(Gate::inverse).collect(),
            measured: self.measured.clone(),
        }
    }

    /// Appends `other`'s gates after this circuit's gates.
    ///
    /// The result takes the wider register and measures every qubit either
    /// side measures. A side with no explicit measurements counts as
    /// measuring all of its own qubits.
    pub fn compose(&self, other: &Circuit) -> Circuit {
        let mut gates = self.gates.clone();
        gates.extend(other.gates.iter().cloned());
        let measured = if self.measured.is_empty() && other.measured.is_empty() {
            BTreeSet::new()
        } else {
            self.measured_qubits()
                .into_iter()
                .chain(other.measured_qubits())
                .collect()
        };
        Circuit {
            num_qubits: self.num_qubits.max(other.num_qubits),
            gates,
            measured,
        }
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    num_qubits: usize,
    gates: Vec<Gate>,
    measured: BTreeSet<usize>,
}

impl CircuitBuilder {
    /// Starts a circuit on `num_qubits` qubits, all initialised to `|0⟩`.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            measured: BTreeSet::new(),
        }
    }

    /// Appends a gate.
    pub fn add_gate(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    /// Appends several gates in order.
    pub fn add_gates<I>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = Gate>,
    {
        self.gates.extend(gates);
        self
    }

    /// Pauli X on `q`.
    pub fn x(self, q: usize) -> Self {
        self.add_gate(Gate::x(q))
    }

    /// Pauli Y on `q`.
    pub fn y(self, q: usize) -> Self {
        self.add_gate(Gate::y(q))
    }

    /// Pauli Z on `q`.
    pub fn z(self, q: usize) -> Self {
        self.add_gate(Gate::z(q))
    }

    /// Hadamard on `q`.
    pub fn h(self, q: usize) -> Self {
        self.add_gate(Gate::h(q))
    }

    /// Rotation about `axis` by `theta` on `q`. A non-finite angle is reported by `build`.
    pub fn rotation(self, axis: Axis, theta: f64, q: usize) -> Self {
        self.add_gate(Gate::new(GateKind::Rotation { axis, theta }, vec![q]))
    }

    /// `R_x(theta)` on `q`.
    pub fn rx(self, theta: f64, q: usize) -> Self {
        self.rotation(Axis::X, theta, q)
    }

    /// `R_y(theta)` on `q`.
    pub fn ry(self, theta: f64, q: usize) -> Self {
        self.rotation(Axis::Y, theta, q)
    }

    /// `R_z(theta)` on `q`.
    pub fn rz(self, theta: f64, q: usize) -> Self {
        self.rotation(Axis::Z, theta, q)
    }

    /// CNOT from `control` to `target`.
    pub fn cnot(self, control: usize, target: usize) -> Self {
        self.add_gate(Gate::cnot(control, target))
    }

    /// Explicit no-op on `q`.
    pub fn identity(self, q: usize) -> Self {
        self.add_gate(Gate::identity(vec![q]))
    }

    /// Marks `q` for measurement.
    pub fn measure(mut self, q: usize) -> Self {
        self.measured.insert(q);
        self
    }

    /// Marks every qubit for measurement.
    pub fn measure_all(mut self) -> Self {
        self.measured.extend(0..self.num_qubits);
        self
    }

    /// Validates and returns the built `Circuit`.
    ///
    /// # Errors
    /// * `InvalidConfiguration` if the register is wider than the simulator supports.
    /// * `QubitIndexOutOfRange`, `DimensionMismatch` or `InvalidGateParameter`
    ///   for the first offending gate.
    /// * `QubitIndexOutOfRange` for a measured qubit outside the register.
    pub fn build(self) -> QsimResult<Circuit> {
        if self.num_qubits > MAX_QUBITS {
            return Err(QsimError::config(format!(
                "circuit declares {} qubits, the simulator supports at most {}",
                self.num_qubits, MAX_QUBITS
            )));
        }
        for gate in &self.gates {
            gate.validate(self.num_qubits)?;
        }
        if let Some(&qubit) = self.measured.iter().find(|&&q| q >= self.num_qubits) {
            return Err(QsimError::QubitIndexOutOfRange { qubit, num_qubits: self.num_qubits });
        }
        Ok(Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates,
            measured: self.measured,
        })
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_qubits = self.num_qubits;
        if num_qubits == 0 {
            return writeln!(f, "qsim::Circuit[{} gates on 0 qubits]", self.gates.len());
        }

        // One column per gate plus a trailing measurement column.
        let num_cols = self.gates.len() + 1;
        let labels: Vec<String> = (0..num_qubits).map(|q| format!("q{}", q)).collect();
        let max_label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_cols]; num_qubits];
        // v_connect[row][col] is the connector drawn *below* `row`.
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_cols]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, gate) in self.gates.iter().enumerate() {
            match gate.kind() {
                GateKind::Identity { .. } => continue,
                GateKind::ControlledNot => {
                    let (ctrl, tgt) = (gate.qubits()[0], gate.qubits()[1]);
                    op_grid[ctrl][t] = format_gate("@");
                    op_grid[tgt][t] = format_gate("X");
                    let (r_min, r_max) = (ctrl.min(tgt), ctrl.max(tgt));
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                }
                kind => {
                    for &q in gate.qubits() {
                        op_grid[q][t] = format_gate(&kind.symbol());
                    }
                }
            }
        }
        for q in self.measured_qubits() {
            op_grid[q][num_cols - 1] = format_gate("M");
        }

        writeln!(f, "qsim::Circuit[{} gates on {} qubits]", self.gates.len(), num_qubits)?;
        for r in 0..num_qubits {
            write!(f, "{:<width$}", format!("{}: ", labels[r]), width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_cols {
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), v_connect[r][t], " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_gate_order() {
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).z(1).build().unwrap();
        let kinds: Vec<_> = circuit.gates().iter().map(|g| *g.kind()).collect();
        assert_eq!(
            kinds,
            vec![GateKind::Hadamard, GateKind::ControlledNot, GateKind::Pauli(crate::gates::Pauli::Z)]
        );
    }

    #[test]
    fn empty_measurement_set_means_all_qubits() {
        let circuit = CircuitBuilder::new(3).build().unwrap();
        assert_eq!(circuit.measured_qubits(), vec![0, 1, 2]);

        let circuit = CircuitBuilder::new(3).measure(2).measure(0).build().unwrap();
        assert_eq!(circuit.measured_qubits(), vec![0, 2]);
    }

    #[test]
    fn build_rejects_out_of_range_targets() {
        let err = CircuitBuilder::new(2).cnot(0, 2).build().unwrap_err();
        assert_eq!(err, QsimError::QubitIndexOutOfRange { qubit: 2, num_qubits: 2 });

        let err = CircuitBuilder::new(2).measure(5).build().unwrap_err();
        assert_eq!(err, QsimError::QubitIndexOutOfRange { qubit: 5, num_qubits: 2 });
    }

    #[test]
    fn build_rejects_bad_angles() {
        let err = CircuitBuilder::new(1).rx(f64::NAN, 0).build().unwrap_err();
        assert!(matches!(err, QsimError::InvalidGateParameter { .. }));
    }

    #[test]
    fn inverse_reverses_and_inverts() {
        let circuit = CircuitBuilder::new(1).ry(0.3, 0).h(0).build().unwrap();
        let inv = circuit.inverse();
        assert_eq!(inv.gates()[0].kind(), &GateKind::Hadamard);
        assert_eq!(inv.gates()[1].kind(), &GateKind::Rotation { axis: Axis::Y, theta: -0.3 });
    }

    #[test]
    fn compose_keeps_implicit_measure_all() {
        let all = CircuitBuilder::new(2).h(0).cnot(0, 1).build().unwrap();
        let first = CircuitBuilder::new(2).x(0).measure(0).build().unwrap();
        assert_eq!(all.compose(&first).measured_qubits(), vec![0, 1]);
        assert_eq!(first.compose(&all).measured_qubits(), vec![0, 1]);

        let second = CircuitBuilder::new(3).measure(2).build().unwrap();
        assert_eq!(first.compose(&second).measured_qubits(), vec![0, 2]);

        let wide = CircuitBuilder::new(3).build().unwrap();
        assert_eq!(all.compose(&wide).measured_qubits(), vec![0, 1, 2]);
    }

    #[test]
    fn diagram_draws_control_and_measurement() {
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build().unwrap();
        let diagram = circuit.to_string();
        assert!(diagram.starts_with("qsim::Circuit[2 gates on 2 qubits]"));
        assert!(diagram.contains("───H───"));
        assert!(diagram.contains("───@───"));
        assert!(diagram.contains("───M───"));
        assert!(diagram.contains('│'));
    }
}
