//! Clifford tableaux with sign tracking.
//!
//! The tableau of a Clifford `C` on `n` qubits stores the images `C X_j C†`
//! (rows `0..n`) and `C Z_j C†` (rows `n..2n`). Columns `0..n` hold X bits,
//! `n..2n` hold Z bits and column `2n` the sign. A row with both bits set on a
//! qubit denotes `Y` on that qubit.

use ndarray::{Array2, azip, s};
use num_complex::Complex64;
use std::fmt;

use topt_ir::{
    Circuit, GateKind, InstructionKind, IrError, Pauli, PauliTensor, QubitId, StandardGate,
};

use crate::error::{CompileError, CompileResult};

/// Section size used when expanding boxes; it does not change the Clifford.
const EXPANSION_SECTION_SIZE: usize = 2;

/// A stabilizer tableau.
#[derive(Clone, PartialEq, Eq)]
pub struct CliffordTableau {
    num_qubits: usize,
    tableau: Array2<bool>,
}

impl CliffordTableau {
    /// The identity Clifford on `num_qubits`.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            tableau: Array2::from_shape_fn((2 * num_qubits, 2 * num_qubits + 1), |(i, j)| i == j),
        }
    }

    /// The tableau of a Clifford-only circuit.
    ///
    /// Rotations count as Clifford when their angle is a multiple of π/2
    /// (π for controlled phases). Composite boxes are expanded first.
    pub fn from_circuit(circuit: &Circuit) -> CompileResult<Self> {
        let mut tableau = Self::identity(circuit.num_qubits());
        for inst in circuit.instructions() {
            tableau.append_instruction(&inst.kind, &inst.qubits)?;
        }
        Ok(tableau)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn append_instruction(&mut self, kind: &InstructionKind, qubits: &[QubitId]) -> CompileResult<()> {
        let gate = match kind {
            InstructionKind::Barrier => return Ok(()),
            InstructionKind::Measure => return Err(CompileError::NotClifford("measure".into())),
            InstructionKind::Gate(g) => g,
        };
        if gate.condition.is_some() {
            return Err(CompileError::NotClifford(format!("conditional {}", gate.name())));
        }
        match &gate.kind {
            GateKind::Composite(c) => {
                for sub in c.decompose(qubits, EXPANSION_SECTION_SIZE)? {
                    self.append_instruction(&sub.kind, &sub.qubits)?;
                }
                Ok(())
            }
            GateKind::Standard(g) => {
                let wires: Vec<usize> = qubits.iter().map(|q| q.index()).collect();
                self.append_gate(g, &wires)
            }
        }
    }

    /// Append one standard gate on the given wire indices.
    pub fn append_gate(&mut self, gate: &StandardGate, wires: &[usize]) -> CompileResult<()> {
        let not_clifford = || CompileError::NotClifford(gate.name().to_string());
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.append_x(wires[0]),
            StandardGate::Y => self.append_y(wires[0]),
            StandardGate::Z => self.append_z(wires[0]),
            StandardGate::H => self.append_h(wires[0]),
            StandardGate::S => self.append_s(wires[0]),
            StandardGate::Sdg => self.append_sdg(wires[0]),
            StandardGate::CX => self.append_cx(wires[0], wires[1]),
            StandardGate::CZ => self.append_cz(wires[0], wires[1]),
            StandardGate::Swap => self.append_swap(wires[0], wires[1]),
            StandardGate::T | StandardGate::Tdg => return Err(not_clifford()),
            StandardGate::Rz(_) | StandardGate::P(_) => {
                let quarter_turns = clifford_steps(gate, 0.5).ok_or_else(not_clifford)?;
                for _ in 0..quarter_turns {
                    self.append_s(wires[0]);
                }
            }
            StandardGate::CP(_) => {
                if clifford_steps(gate, 1.0).ok_or_else(not_clifford)? % 2 == 1 {
                    self.append_cz(wires[0], wires[1]);
                }
            }
        }
        Ok(())
    }

    /// Modifies the tableau in-place by appending X-gate
    pub fn append_x(&mut self, qubit: usize) {
        let (z, mut p) = self
            .tableau
            .multi_slice_mut((s![.., self.num_qubits + qubit], s![.., 2 * self.num_qubits]));
        azip!((p in &mut p, &z in &z) *p ^= z);
    }

    /// Modifies the tableau in-place by appending Y-gate
    pub fn append_y(&mut self, qubit: usize) {
        let (x, z, mut p) = self.tableau.multi_slice_mut((
            s![.., qubit],
            s![.., self.num_qubits + qubit],
            s![.., 2 * self.num_qubits],
        ));
        azip!((p in &mut p, &x in &x, &z in &z) *p ^= x ^ z);
    }

    /// Modifies the tableau in-place by appending Z-gate
    pub fn append_z(&mut self, qubit: usize) {
        let (x, mut p) = self
            .tableau
            .multi_slice_mut((s![.., qubit], s![.., 2 * self.num_qubits]));
        azip!((p in &mut p, &x in &x) *p ^= x);
    }

    /// Modifies the tableau in-place by appending H-gate
    pub fn append_h(&mut self, qubit: usize) {
        let (mut x, mut z, mut p) = self.tableau.multi_slice_mut((
            s![.., qubit],
            s![.., self.num_qubits + qubit],
            s![.., 2 * self.num_qubits],
        ));
        azip!((p in &mut p, &x in &x, &z in &z) *p ^= x & z);
        azip!((x in &mut x, z in &mut z) (*x, *z) = (*z, *x));
    }

    /// Modifies the tableau in-place by appending S-gate
    pub fn append_s(&mut self, qubit: usize) {
        let (x, mut z, mut p) = self.tableau.multi_slice_mut((
            s![.., qubit],
            s![.., self.num_qubits + qubit],
            s![.., 2 * self.num_qubits],
        ));
        azip!((p in &mut p, &x in &x, &z in &z) *p ^= x & z);
        azip!((z in &mut z, &x in &x) *z ^= x);
    }

    /// Modifies the tableau in-place by appending Sdg-gate
    pub fn append_sdg(&mut self, qubit: usize) {
        let (x, mut z, mut p) = self.tableau.multi_slice_mut((
            s![.., qubit],
            s![.., self.num_qubits + qubit],
            s![.., 2 * self.num_qubits],
        ));
        azip!((p in &mut p, &x in &x, &z in &z) *p ^= x & !z);
        azip!((z in &mut z, &x in &x) *z ^= x);
    }

    /// Modifies the tableau in-place by appending CX-gate
    pub fn append_cx(&mut self, control: usize, target: usize) {
        let (x0, mut z0, mut x1, z1, mut p) = self.tableau.multi_slice_mut((
            s![.., control],
            s![.., self.num_qubits + control],
            s![.., target],
            s![.., self.num_qubits + target],
            s![.., 2 * self.num_qubits],
        ));
        azip!((p in &mut p, &x0 in &x0, &z0 in &z0, &x1 in &x1, &z1 in &z1) *p ^= (x1 ^ z0 ^ true) & z1 & x0);
        azip!((x1 in &mut x1, &x0 in &x0) *x1 ^= x0);
        azip!((z0 in &mut z0, &z1 in &z1) *z0 ^= z1);
    }

    /// Modifies the tableau in-place by appending CZ-gate
    pub fn append_cz(&mut self, q0: usize, q1: usize) {
        self.append_h(q1);
        self.append_cx(q0, q1);
        self.append_h(q1);
    }

    /// Modifies the tableau in-place by appending SWAP-gate
    pub fn append_swap(&mut self, q0: usize, q1: usize) {
        let (mut x0, mut z0, mut x1, mut z1) = self.tableau.multi_slice_mut((
            s![.., q0],
            s![.., self.num_qubits + q0],
            s![.., q1],
            s![.., self.num_qubits + q1],
        ));
        azip!((x0 in &mut x0, x1 in &mut x1) (*x0, *x1) = (*x1, *x0));
        azip!((z0 in &mut z0, z1 in &mut z1) (*z0, *z1) = (*z1, *z0));
    }

    /// Compute `C P C†` for the Clifford `C` this tableau describes.
    ///
    /// `P` is expanded as `i^{#Y} Π_j X_j^{x_j} Z_j^{z_j}` and each factor is
    /// replaced by its tableau row; the row products accumulate powers of `i`.
    pub fn conjugate(&self, pauli: &PauliTensor) -> CompileResult<PauliTensor> {
        let n = self.num_qubits;
        let mut acc_x = vec![false; n];
        let mut acc_z = vec![false; n];
        let mut i_power: u32 = 0;

        for (&qubit, &label) in &pauli.string {
            let j = qubit.index();
            if j >= n {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: None,
                }
                .into());
            }
            let (x, z) = label.to_bits();
            if x && z {
                i_power += 1;
            }
            if x {
                i_power += self.multiply_row_into(j, &mut acc_x, &mut acc_z);
            }
            if z {
                i_power += self.multiply_row_into(n + j, &mut acc_x, &mut acc_z);
            }
        }

        let string = (0..n)
            .map(|q| (QubitId(q as u32), Pauli::from_bits(acc_x[q], acc_z[q])))
            .filter(|(_, p)| *p != Pauli::I)
            .collect();
        Ok(PauliTensor {
            string,
            coeff: pauli.coeff * i_pow(i_power),
        })
    }

    /// Right-multiply the accumulator by `row`, returning the power of `i` picked up.
    fn multiply_row_into(&self, row: usize, acc_x: &mut [bool], acc_z: &mut [bool]) -> u32 {
        let n = self.num_qubits;
        let mut power: i32 = if self.tableau[[row, 2 * n]] { 2 } else { 0 };
        for q in 0..n {
            let (x2, z2) = (self.tableau[[row, q]], self.tableau[[row, n + q]]);
            power += pauli_product_phase(acc_x[q], acc_z[q], x2, z2);
            acc_x[q] ^= x2;
            acc_z[q] ^= z2;
        }
        power.rem_euclid(4) as u32
    }
}

/// Exponent of `i` in `σ(x1, z1) · σ(x2, z2)`.
fn pauli_product_phase(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    let (x2, z2) = (i32::from(x2), i32::from(z2));
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => z2 - x2,
        (true, false) => z2 * (2 * x2 - 1),
        (false, true) => x2 * (1 - 2 * z2),
    }
}

fn i_pow(power: u32) -> Complex64 {
    match power % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Number of `step`-half-turn increments in a Clifford rotation, in `0..4`.
fn clifford_steps(gate: &StandardGate, step: f64) -> Option<u32> {
    let half_turns = gate.parameter()?.half_turns()?;
    if !topt_ir::is_multiple_of(half_turns, step) {
        return None;
    }
    Some(((half_turns / step).round() as i64).rem_euclid(4) as u32)
}

impl fmt::Debug for CliffordTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CliffordTableau({} qubits)", self.num_qubits)?;
        for row in self.tableau.rows() {
            for &bit in row {
                write!(f, "{} ", u8::from(bit))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
