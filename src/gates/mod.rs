// src/gates/mod.rs

//! The gate library: fixed and parametrized unitaries plus the [`Gate`]
//! value that binds one of them to target qubits.
//!
//! Gates form a closed set ([`GateKind`]). The simulation engine asks a gate
//! for its [`Unitary`] and contracts it against the addressed amplitudes, so
//! no gate needs to know how the state vector is laid out.
//!
//! Phase conventions: Hadamard is real-valued, CNOT uses the textbook
//! `|control, target⟩` ordering, and rotations are `R_a(θ) = exp(-iθσ_a/2)`.
//! With these, `R_a(π) = -i·σ_a`, so rotations by π match the Paulis only up
//! to an unobservable global phase.

use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{QsimError, QsimResult};

/// A square complex matrix of dimension `2^k`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Unitary {
    dim: usize,
    entries: Vec<Complex64>,
}

impl Unitary {
    /// Builds a matrix from rows. Every row must have as many entries as
    /// there are rows, and the row count must be a power of two.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> QsimResult<Self> {
        let dim = rows.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(QsimError::dimension(format!(
                "matrix with {} rows is not 2^k x 2^k",
                dim
            )));
        }
        let mut entries = Vec::with_capacity(dim * dim);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(QsimError::dimension(format!(
                    "row {} has {} entries, expected {}",
                    r,
                    row.len(),
                    dim
                )));
            }
            entries.extend(row);
        }
        Ok(Self { dim, entries })
    }

    fn from_array<const N: usize>(rows: [[Complex64; N]; N]) -> Self {
        Self {
            dim: N,
            entries: rows.into_iter().flatten().collect(),
        }
    }

    /// Side length of the matrix.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubits the matrix acts on.
    pub fn num_qubits(&self) -> usize {
        self.dim.trailing_zeros() as usize
    }

    /// Entry at row `r`, column `c`.
    pub fn get(&self, r: usize, c: usize) -> Complex64 {
        self.entries[r * self.dim + c]
    }

    /// Row `r` as a slice.
    pub fn row(&self, r: usize) -> &[Complex64] {
        &self.entries[r * self.dim..(r + 1) * self.dim]
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len());
        for r in 0..self.dim {
            for c in 0..self.dim {
                entries.push(self.get(c, r).conj());
            }
        }
        Self { dim: self.dim, entries }
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &Unitary) -> QsimResult<Self> {
        if self.dim != other.dim {
            return Err(QsimError::dimension(format!(
                "cannot multiply {}x{} by {}x{}",
                self.dim, self.dim, other.dim, other.dim
            )));
        }
        let mut entries = vec![Complex64::zero(); self.dim * self.dim];
        for r in 0..self.dim {
            for c in 0..self.dim {
                entries[r * self.dim + c] = (0..self.dim).map(|k| self.get(r, k) * other.get(k, c)).sum();
            }
        }
        Ok(Self { dim: self.dim, entries })
    }

    /// Entry-wise comparison.
    pub fn approx_eq(&self, other: &Unitary, tolerance: f64) -> bool {
        self.dim == other.dim
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// `U†U ≈ I`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.dagger()
            .mul(self)
            .map(|product| product.approx_eq(&identity_matrix(self.num_qubits()), tolerance))
            .unwrap_or(false)
    }

    /// Equality after removing a global phase factor `e^{iφ}`.
    ///
    /// The phase is read off the largest entry of `self` and divided out of
    /// `other` before comparing.
    pub fn approx_eq_up_to_global_phase(&self, other: &Unitary, tolerance: f64) -> bool {
        if self.dim != other.dim {
            return false;
        }
        let pivot = self
            .entries
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm_sqr().total_cmp(&b.norm_sqr()))
            .map(|(i, _)| i);
        let Some(pivot) = pivot else {
            return true;
        };
        let (a, b) = (self.entries[pivot], other.entries[pivot]);
        if b.norm() <= tolerance {
            return false;
        }
        let phase = a / b;
        let phase = phase / phase.norm();
        self.entries
            .iter()
            .zip(&other.entries)
            .all(|(x, y)| (x - y * phase).norm() <= tolerance)
    }
}

impl fmt::Display for Unitary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.dim {
            let cells: Vec<String> = self.row(r).iter().map(|c| format!("{:.4}", c)).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Pauli X (bit flip).
pub fn pauli_x() -> Unitary {
    Unitary::from_array([[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
}

/// Pauli Y.
pub fn pauli_y() -> Unitary {
    Unitary::from_array([[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]])
}

/// Pauli Z (phase flip).
pub fn pauli_z() -> Unitary {
    Unitary::from_array([[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]])
}

/// Hadamard, real-valued.
pub fn hadamard() -> Unitary {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    Unitary::from_array([[c(s, 0.0), c(s, 0.0)], [c(s, 0.0), c(-s, 0.0)]])
}

/// `R_axis(θ) = exp(-iθσ_axis/2)`.
///
/// # Errors
/// `InvalidGateParameter` when `theta` is NaN or infinite.
pub fn rotation(axis: Axis, theta: f64) -> QsimResult<Unitary> {
    if !theta.is_finite() {
        return Err(QsimError::invalid_gate(format!(
            "rotation angle must be finite, got {}",
            theta
        )));
    }
    let (cos, sin) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    Ok(match axis {
        Axis::X => Unitary::from_array([[c(cos, 0.0), c(0.0, -sin)], [c(0.0, -sin), c(cos, 0.0)]]),
        Axis::Y => Unitary::from_array([[c(cos, 0.0), c(-sin, 0.0)], [c(sin, 0.0), c(cos, 0.0)]]),
        Axis::Z => Unitary::from_array([
            [Complex64::from_polar(1.0, -theta / 2.0), Complex64::zero()],
            [Complex64::zero(), Complex64::from_polar(1.0, theta / 2.0)],
        ]),
    })
}

/// CNOT on the ordered pair `(control, target)`; basis `|00⟩, |01⟩, |10⟩, |11⟩`.
pub fn controlled_not() -> Unitary {
    let (o, l) = (Complex64::zero(), Complex64::one());
    Unitary::from_array([[l, o, o, o], [o, l, o, o], [o, o, o, l], [o, o, l, o]])
}

/// The `2^width` identity, used as a no-op placeholder.
pub fn identity(width: usize) -> QsimResult<Unitary> {
    if width > crate::core::MAX_QUBITS {
        return Err(QsimError::invalid_gate(format!(
            "identity on {} qubits exceeds the simulator limit of {}",
            width,
            crate::core::MAX_QUBITS
        )));
    }
    Ok(identity_matrix(width))
}

fn identity_matrix(width: usize) -> Unitary {
    let dim = 1usize << width;
    let mut entries = vec![Complex64::zero(); dim * dim];
    for i in 0..dim {
        entries[i * dim + i] = Complex64::one();
    }
    Unitary { dim, entries }
}

/// Rotation axis on the Bloch sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// The Pauli matching this axis.
    pub fn pauli(self) -> Pauli {
        match self {
            Axis::X => Pauli::X,
            Axis::Y => Pauli::Y,
            Axis::Z => Pauli::Z,
        }
    }
}

impl FromStr for Axis {
    type Err = QsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(QsimError::invalid_gate(format!("unsupported rotation axis '{}'", s))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// One of the three Pauli matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Bit flip.
    X,
    /// Bit and phase flip.
    Y,
    /// Phase flip.
    Z,
}

impl Pauli {
    /// The 2x2 matrix.
    pub fn matrix(self) -> Unitary {
        match self {
            Pauli::X => pauli_x(),
            Pauli::Y => pauli_y(),
            Pauli::Z => pauli_z(),
        }
    }
}

/// The closed set of operations the simulator understands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A Pauli X, Y or Z.
    Pauli(Pauli),
    /// Hadamard.
    Hadamard,
    /// `R_axis(theta)`, angle in radians.
    Rotation {
        /// Rotation axis.
        axis: Axis,
        /// Angle in radians.
        theta: f64,
    },
    /// CNOT; the first target qubit is the control.
    ControlledNot,
    /// Identity on `width` qubits.
    Identity {
        /// Number of qubits the identity spans.
        width: usize,
    },
}

impl GateKind {
    /// How many target qubits the gate takes.
    pub fn arity(&self) -> usize {
        match self {
            GateKind::Pauli(_) | GateKind::Hadamard | GateKind::Rotation { .. } => 1,
            GateKind::ControlledNot => 2,
            GateKind::Identity { width } => *width,
        }
    }

    /// The gate's unitary.
    ///
    /// # Errors
    /// `InvalidGateParameter` for a non-finite rotation angle or an oversized identity.
    pub fn matrix(&self) -> QsimResult<Unitary> {
        match self {
            GateKind::Pauli(p) => Ok(p.matrix()),
            GateKind::Hadamard => Ok(hadamard()),
            GateKind::Rotation { axis, theta } => rotation(*axis, *theta),
            GateKind::ControlledNot => Ok(controlled_not()),
            GateKind::Identity { width } => identity(*width),
        }
    }

    /// The inverse operation, which stays inside the closed set.
    pub fn inverse(&self) -> GateKind {
        match self {
            GateKind::Rotation { axis, theta } => GateKind::Rotation { axis: *axis, theta: -theta },
            other => *other,
        }
    }

    /// Short symbol used in circuit diagrams.
    pub fn symbol(&self) -> String {
        match self {
            GateKind::Pauli(Pauli::X) => "X".to_string(),
            GateKind::Pauli(Pauli::Y) => "Y".to_string(),
            GateKind::Pauli(Pauli::Z) => "Z".to_string(),
            GateKind::Hadamard => "H".to_string(),
            GateKind::Rotation { axis, .. } => format!("R{}", axis),
            GateKind::ControlledNot => "X".to_string(),
            GateKind::Identity { .. } => "I".to_string(),
        }
    }
}

/// A gate kind bound to its target qubits.
///
/// For multi-qubit gates the first listed qubit is the most significant bit
/// of the gate's local basis, so `Gate::cnot(c, t)` targets `[c, t]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    kind: GateKind,
    qubits: Vec<usize>,
}

impl Gate {
    /// Binds `kind` to `qubits` without validation; see [`Gate::validate`].
    pub fn new(kind: GateKind, qubits: Vec<usize>) -> Self {
        Self { kind, qubits }
    }

    /// Pauli X on `q`.
    pub fn x(q: usize) -> Self {
        Self::new(GateKind::Pauli(Pauli::X), vec![q])
    }

    /// Pauli Y on `q`.
    pub fn y(q: usize) -> Self {
        Self::new(GateKind::Pauli(Pauli::Y), vec![q])
    }

    /// Pauli Z on `q`.
    pub fn z(q: usize) -> Self {
        Self::new(GateKind::Pauli(Pauli::Z), vec![q])
    }

    /// Hadamard on `q`.
    pub fn h(q: usize) -> Self {
        Self::new(GateKind::Hadamard, vec![q])
    }

    /// Rotation about `axis` on `q`. Fails for a non-finite angle.
    pub fn rotation(axis: Axis, theta: f64, q: usize) -> QsimResult<Self> {
        rotation(axis, theta)?;
        Ok(Self::new(GateKind::Rotation { axis, theta }, vec![q]))
    }

    /// `R_x(theta)` on `q`.
    pub fn rx(theta: f64, q: usize) -> QsimResult<Self> {
        Self::rotation(Axis::X, theta, q)
    }

    /// `R_y(theta)` on `q`.
    pub fn ry(theta: f64, q: usize) -> QsimResult<Self> {
        Self::rotation(Axis::Y, theta, q)
    }

    /// `R_z(theta)` on `q`.
    pub fn rz(theta: f64, q: usize) -> QsimResult<Self> {
        Self::rotation(Axis::Z, theta, q)
    }

    /// CNOT with the given control and target.
    pub fn cnot(control: usize, target: usize) -> Self {
        Self::new(GateKind::ControlledNot, vec![control, target])
    }

    /// Identity spanning `qubits`.
    pub fn identity(qubits: Vec<usize>) -> Self {
        Self::new(GateKind::Identity { width: qubits.len() }, qubits)
    }

    /// The gate kind.
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Target qubits in gate order.
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// The gate's unitary.
    pub fn matrix(&self) -> QsimResult<Unitary> {
        self.kind.matrix()
    }

    /// The inverse gate on the same qubits.
    pub fn inverse(&self) -> Self {
        Self::new(self.kind.inverse(), self.qubits.clone())
    }

    /// Checks the gate against a register of `num_qubits` qubits.
    ///
    /// # Errors
    /// * `QubitIndexOutOfRange` if a target is `>= num_qubits`.
    /// * `DimensionMismatch` if the number of targets does not match the
    ///   gate's arity, or a target is repeated.
    /// * `InvalidGateParameter` for a bad angle.
    pub fn validate(&self, num_qubits: usize) -> QsimResult<()> {
        if let Some(&qubit) = self.qubits.iter().find(|&&q| q >= num_qubits) {
            return Err(QsimError::QubitIndexOutOfRange { qubit, num_qubits });
        }
        if self.qubits.len() != self.kind.arity() {
            return Err(QsimError::dimension(format!(
                "{} gate acts on {} qubit(s) but {} target(s) were given",
                self.kind.symbol(),
                self.kind.arity(),
                self.qubits.len()
            )));
        }
        for (i, q) in self.qubits.iter().enumerate() {
            if self.qubits[..i].contains(q) {
                return Err(QsimError::dimension(format!(
                    "qubit {} appears more than once in {:?}",
                    q, self.qubits
                )));
            }
        }
        if let GateKind::Rotation { theta, .. } = self.kind {
            if !theta.is_finite() {
                return Err(QsimError::invalid_gate(format!(
                    "rotation angle must be finite, got {}",
                    theta
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GateKind::Rotation { theta, .. } => {
                write!(f, "{}({:.4}) {:?}", self.kind.symbol(), theta, self.qubits)
            }
            GateKind::ControlledNot => write!(f, "CNOT {:?}", self.qubits),
            _ => write!(f, "{} {:?}", self.kind.symbol(), self.qubits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TEST_TOLERANCE: f64 = 1e-12;

    #[test]
    fn fixed_gates_are_unitary() {
        for u in [pauli_x(), pauli_y(), pauli_z(), hadamard(), controlled_not()] {
            assert!(u.is_unitary(TEST_TOLERANCE), "not unitary:\n{}", u);
        }
    }

    #[test]
    fn rotations_are_unitary_for_arbitrary_angles() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            for theta in [-3.1, -0.4, 0.0, 0.7, 2.0, 5.5] {
                assert!(rotation(axis, theta).unwrap().is_unitary(TEST_TOLERANCE));
            }
        }
    }

    #[test]
    fn rotation_by_pi_is_pauli_up_to_phase() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let r = rotation(axis, PI).unwrap();
            let p = axis.pauli().matrix();
            assert!(r.approx_eq_up_to_global_phase(&p, 1e-12), "axis {}", axis);
            assert!(!r.approx_eq(&p, 1e-6), "R{}(π) should differ from the Pauli by -i", axis);
        }
    }

    #[test]
    fn hadamard_squares_to_identity() {
        let hh = hadamard().mul(&hadamard()).unwrap();
        assert!(hh.approx_eq(&identity(1).unwrap(), TEST_TOLERANCE));
    }

    #[test]
    fn non_finite_angles_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = rotation(Axis::Y, bad).unwrap_err();
            assert!(matches!(err, QsimError::InvalidGateParameter { .. }));
        }
    }

    #[test]
    fn axis_parsing() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!(" Z ".parse::<Axis>().unwrap(), Axis::Z);
        let err = "w".parse::<Axis>().unwrap_err();
        assert!(matches!(err, QsimError::InvalidGateParameter { .. }));
    }

    #[test]
    fn inverse_composes_to_identity() {
        let kinds = [
            GateKind::Pauli(Pauli::Y),
            GateKind::Hadamard,
            GateKind::Rotation { axis: Axis::X, theta: 0.83 },
            GateKind::ControlledNot,
        ];
        for kind in kinds {
            let u = kind.matrix().unwrap();
            let product = kind.inverse().matrix().unwrap().mul(&u).unwrap();
            assert!(product.approx_eq(&identity(u.num_qubits()).unwrap(), TEST_TOLERANCE), "{:?}", kind);
        }
    }

    #[test]
    fn validate_catches_bad_targets() {
        assert!(matches!(
            Gate::h(2).validate(2),
            Err(QsimError::QubitIndexOutOfRange { qubit: 2, num_qubits: 2 })
        ));
        assert!(matches!(
            Gate::new(GateKind::ControlledNot, vec![0]).validate(2),
            Err(QsimError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            Gate::cnot(1, 1).validate(2),
            Err(QsimError::DimensionMismatch { .. })
        ));
        assert!(Gate::cnot(0, 1).validate(2).is_ok());
    }
}
