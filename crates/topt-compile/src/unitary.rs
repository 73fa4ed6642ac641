//! Dense unitaries of small circuits.
//!
//! This is a correctness oracle for tests and `topt resynth --verify`, not a
//! simulator: it handles the standard gate set and composite boxes, and
//! rejects measurements and conditional gates.

use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

use topt_ir::{Circuit, GateKind, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};

/// Tolerance for floating point comparisons.
const EPSILON: f64 = 1e-10;

/// Widest circuit the oracle will build a unitary for.
pub const MAX_ORACLE_QUBITS: usize = 12;

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create a diagonal matrix.
    pub fn diagonal(a: Complex64, d: Complex64) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self::new(a, zero, zero, d)
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::diagonal(Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0))
    }

    /// Create a Hadamard matrix.
    pub fn h() -> Self {
        let s = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Self::new(s, s, s, -s)
    }

    /// Create a Pauli-X matrix.
    pub fn x() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        Self::new(zero, one, one, zero)
    }

    /// Create a Pauli-Y matrix.
    pub fn y() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self::new(zero, Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0), zero)
    }

    /// Create a Pauli-Z matrix.
    pub fn z() -> Self {
        Self::p(PI)
    }

    /// Create an RZ rotation matrix.
    pub fn rz(theta: f64) -> Self {
        Self::diagonal(
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Create a phase gate P(lambda).
    pub fn p(lambda: f64) -> Self {
        Self::diagonal(Complex64::new(1.0, 0.0), Complex64::from_polar(1.0, lambda))
    }

    /// The matrix of a single-qubit standard gate.
    pub fn for_gate(gate: &StandardGate) -> CompileResult<Self> {
        Ok(match gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::x(),
            StandardGate::Y => Self::y(),
            StandardGate::Z => Self::z(),
            StandardGate::H => Self::h(),
            StandardGate::S => Self::p(PI / 2.0),
            StandardGate::Sdg => Self::p(-PI / 2.0),
            StandardGate::T => Self::p(PI / 4.0),
            StandardGate::Tdg => Self::p(-PI / 4.0),
            StandardGate::Rz(theta) => Self::rz(concrete_angle(gate, theta)?),
            StandardGate::P(lambda) => Self::p(concrete_angle(gate, lambda)?),
            other => return Err(CompileError::UnsupportedGate(other.name().to_string())),
        })
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Get the conjugate transpose (dagger).
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Check if this is approximately identity (up to global phase).
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        if b.norm() > EPSILON || c.norm() > EPSILON {
            return false;
        }
        (a - d).norm() < EPSILON
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

fn concrete_angle(
    gate: &StandardGate,
    angle: &topt_ir::ParameterExpression,
) -> CompileResult<f64> {
    angle
        .as_f64()
        .ok_or_else(|| CompileError::SymbolicParameter {
            gate_name: gate.name().to_string(),
            symbol: angle.first_symbol().unwrap_or_default().to_string(),
        })
}

/// The unitary of `circuit`, with qubit `i` as bit `i` of the basis index.
///
/// Composite gates are expanded with the given CNOT-synthesis section size.
pub fn circuit_unitary(circuit: &Circuit, section_size: usize) -> CompileResult<Array2<Complex64>> {
    let n = circuit.num_qubits();
    if n > MAX_ORACLE_QUBITS {
        return Err(CompileError::UnsupportedGate(format!(
            "unitary of {n}-qubit circuit (limit {MAX_ORACLE_QUBITS})"
        )));
    }
    let dim = 1usize << n;
    let mut u = Array2::from_shape_fn((dim, dim), |(i, j)| {
        if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    });
    for inst in circuit.instructions() {
        apply_instruction(&mut u, inst, section_size)?;
    }
    Ok(u)
}

fn apply_instruction(
    u: &mut Array2<Complex64>,
    inst: &Instruction,
    section_size: usize,
) -> CompileResult<()> {
    let gate = match &inst.kind {
        InstructionKind::Barrier => return Ok(()),
        InstructionKind::Measure => {
            return Err(CompileError::UnsupportedGate("measure".into()));
        }
        InstructionKind::Gate(g) => g,
    };
    if gate.condition.is_some() {
        return Err(CompileError::UnsupportedGate(format!(
            "conditional {}",
            gate.name()
        )));
    }
    match &gate.kind {
        GateKind::Composite(c) => {
            for sub in c.decompose(&inst.qubits, section_size)? {
                apply_instruction(u, &sub, section_size)?;
            }
            Ok(())
        }
        GateKind::Standard(g) => apply_standard(u, g, &inst.qubits),
    }
}

fn apply_standard(
    u: &mut Array2<Complex64>,
    gate: &StandardGate,
    qubits: &[QubitId],
) -> CompileResult<()> {
    let dim = u.nrows();
    match gate {
        StandardGate::CX => {
            let (c, t) = (bit(qubits[0]), bit(qubits[1]));
            for i in (0..dim).filter(|i| i & c != 0 && i & t == 0) {
                swap_rows(u, i, i | t);
            }
        }
        StandardGate::Swap => {
            let (a, b) = (bit(qubits[0]), bit(qubits[1]));
            for i in (0..dim).filter(|i| i & a != 0 && i & b == 0) {
                swap_rows(u, i, (i & !a) | b);
            }
        }
        StandardGate::CZ => phase_rows(u, bit(qubits[0]) | bit(qubits[1]), Complex64::new(-1.0, 0.0)),
        StandardGate::CP(lambda) => {
            let phase = Complex64::from_polar(1.0, concrete_angle(gate, lambda)?);
            phase_rows(u, bit(qubits[0]) | bit(qubits[1]), phase);
        }
        single => {
            let m = Unitary2x2::for_gate(single)?;
            let q = bit(qubits[0]);
            for i in (0..dim).filter(|i| i & q == 0) {
                let j = i | q;
                for col in 0..dim {
                    let (a, b) = (u[[i, col]], u[[j, col]]);
                    u[[i, col]] = m.data[0] * a + m.data[1] * b;
                    u[[j, col]] = m.data[2] * a + m.data[3] * b;
                }
            }
        }
    }
    Ok(())
}

#[inline]
fn bit(q: QubitId) -> usize {
    1usize << q.index()
}

fn swap_rows(u: &mut Array2<Complex64>, i: usize, j: usize) {
    for col in 0..u.ncols() {
        u.swap([i, col], [j, col]);
    }
}

fn phase_rows(u: &mut Array2<Complex64>, mask: usize, phase: Complex64) {
    for i in (0..u.nrows()).filter(|i| i & mask == mask) {
        u.row_mut(i).mapv_inplace(|v| v * phase);
    }
}

/// Whether `a` and `b` agree up to a global phase, entry-wise within `tol`.
pub fn equal_up_to_global_phase(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    let Some((pivot, _)) = a
        .indexed_iter()
        .max_by(|x, y| x.1.norm().total_cmp(&y.1.norm()))
    else {
        return true;
    };
    if a[pivot].norm() < tol {
        return b.iter().all(|v| v.norm() < tol);
    }
    let phase = b[pivot] / a[pivot];
    if (phase.norm() - 1.0).abs() > tol {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x * phase - y).norm() < tol)
}

/// Compare two circuits on the same wires up to global phase.
pub fn circuits_equivalent(
    a: &Circuit,
    b: &Circuit,
    section_size: usize,
    tol: f64,
) -> CompileResult<bool> {
    if a.num_qubits() != b.num_qubits() {
        return Ok(false);
    }
    let ua = circuit_unitary(a, section_size)?;
    let ub = circuit_unitary(b, section_size)?;
    Ok(equal_up_to_global_phase(&ua, &ub, tol))
}
