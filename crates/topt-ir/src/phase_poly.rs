//! Phase-polynomial blocks.
//!
//! A [`PhasePolyBox`] on `n` wires acts on a basis state `|x⟩` as
//!
//! ```text
//! |x⟩  ↦  exp(-iπ/2 · Σ_k a_k · (-1)^{p_k·x}) · |L·x⟩
//! ```
//!
//! i.e. each term `(p_k, a_k)` is an `Rz(π·a_k)` applied to the parity `p_k`
//! of the *input* wires, and the linear map `L` is applied afterwards.
//! Angles `a_k` are in half-turns.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{StandardGate, concrete_half_turns, is_multiple_of};
use crate::instruction::{Instruction, InstructionKind};
use crate::linear::{LinearMap, parity_string};
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// One `(parity, angle)` term of a phase polynomial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTerm {
    /// Which input wires participate, one flag per wire.
    pub parity: Vec<bool>,
    /// Rotation angle in half-turns.
    pub half_turns: f64,
}

impl PhaseTerm {
    /// Create a term.
    pub fn new(parity: Vec<bool>, half_turns: f64) -> Self {
        Self { parity, half_turns }
    }

    /// Whether the angle is a multiple of π/2.
    pub fn is_clifford(&self) -> bool {
        is_multiple_of(self.half_turns, 0.5)
    }

    /// Whether the angle is an odd multiple of π/4.
    pub fn is_t_like(&self) -> bool {
        is_multiple_of(self.half_turns, 0.25) && !self.is_clifford()
    }
}

/// A CNOT+Rz block in phase-polynomial form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPhasePolyBox")]
pub struct PhasePolyBox {
    linear: LinearMap,
    terms: Vec<PhaseTerm>,
}

/// Unchecked wire form of a [`PhasePolyBox`].
#[derive(Deserialize)]
struct RawPhasePolyBox {
    linear: LinearMap,
    terms: Vec<PhaseTerm>,
}

impl TryFrom<RawPhasePolyBox> for PhasePolyBox {
    type Error = IrError;

    fn try_from(raw: RawPhasePolyBox) -> IrResult<Self> {
        Self::new(raw.linear, raw.terms)
    }
}

impl PhasePolyBox {
    /// Create a block. Parities must be unique, non-empty and as wide as the map.
    pub fn new(linear: LinearMap, terms: Vec<PhaseTerm>) -> IrResult<Self> {
        let n = linear.size();
        let mut seen = FxHashSet::default();
        for term in &terms {
            if term.parity.len() != n {
                return Err(IrError::DimensionMismatch {
                    expected: n,
                    got: term.parity.len(),
                });
            }
            if !term.parity.contains(&true) {
                return Err(IrError::EmptyParity);
            }
            if !seen.insert(term.parity.clone()) {
                return Err(IrError::DuplicateParity(parity_string(&term.parity)));
            }
        }
        Ok(Self { linear, terms })
    }

    /// Build from a circuit of CNOT, SWAP and diagonal gates.
    pub fn from_circuit(circuit: &Circuit) -> IrResult<Self> {
        let mut builder = PhasePolyBuilder::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            builder.push(inst)?;
        }
        builder.finish()
    }

    /// Number of wires.
    pub fn num_qubits(&self) -> u32 {
        self.linear.size() as u32
    }

    /// The linear map applied after the phases.
    pub fn linear(&self) -> &LinearMap {
        &self.linear
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[PhaseTerm] {
        &self.terms
    }

    /// Whether every term angle is a multiple of π/2.
    pub fn is_clifford(&self) -> bool {
        self.terms.iter().all(PhaseTerm::is_clifford)
    }

    /// Number of terms with an odd multiple of π/4.
    pub fn t_count(&self) -> usize {
        self.terms.iter().filter(|t| t.is_t_like()).count()
    }

    /// The inverse block.
    ///
    /// `U†|y⟩ = e^{-iφ(L⁻¹y)} |L⁻¹y⟩`, so each parity `p` becomes `(L⁻¹)ᵀp`
    /// and each angle flips sign.
    pub fn dagger(&self) -> IrResult<Self> {
        let inverse = self.linear.inverse()?;
        let transposed = inverse.transpose();
        let terms = self
            .terms
            .iter()
            .map(|t| {
                Ok(PhaseTerm {
                    parity: transposed.apply(&t.parity)?,
                    half_turns: -t.half_turns,
                })
            })
            .collect::<IrResult<Vec<_>>>()?;
        Self::new(inverse, terms)
    }

    /// Expand into CNOT ladders, Rz rotations and a synthesised CNOT network.
    pub fn decompose(&self, qubits: &[QubitId], section_size: usize) -> Vec<Instruction> {
        let mut out = vec![];
        for term in &self.terms {
            let wires: Vec<QubitId> = term
                .parity
                .iter()
                .zip(qubits)
                .filter(|(bit, _)| **bit)
                .map(|(_, q)| *q)
                .collect();
            out.extend(parity_gadget(&wires, term.half_turns));
        }
        out.extend(
            self.linear
                .synthesise_cnots(section_size)
                .into_iter()
                .map(|(c, t)| Instruction::two_qubit_gate(StandardGate::CX, qubits[c], qubits[t])),
        );
        out
    }
}

impl PhasePolyBox {
    /// The block as a standalone circuit of CX and Rz gates.
    pub fn to_circuit(&self, section_size: usize) -> IrResult<Circuit> {
        let mut circuit = Circuit::with_size("phasepolybox", self.num_qubits(), 0);
        let qubits: Vec<QubitId> = circuit.qubits().iter().map(|q| q.id).collect();
        for inst in self.decompose(&qubits, section_size) {
            circuit.apply(inst)?;
        }
        Ok(circuit)
    }
}

/// `Rz(π·half_turns)` on the parity of `wires`, via a CNOT ladder onto the last wire.
pub fn parity_gadget(wires: &[QubitId], half_turns: f64) -> Vec<Instruction> {
    let Some((&pivot, rest)) = wires.split_last() else {
        return vec![];
    };
    let mut out: Vec<Instruction> = rest
        .iter()
        .map(|&w| Instruction::two_qubit_gate(StandardGate::CX, w, pivot))
        .collect();
    out.push(Instruction::single_qubit_gate(
        StandardGate::Rz(ParameterExpression::from_half_turns(half_turns)),
        pivot,
    ));
    out.extend(
        rest.iter()
            .rev()
            .map(|&w| Instruction::two_qubit_gate(StandardGate::CX, w, pivot)),
    );
    out
}

/// Accumulates CNOT, SWAP and diagonal gates into a [`PhasePolyBox`].
///
/// Each wire tracks the parity of inputs it currently carries. Diagonal gates
/// add phase to those parities; CNOT and SWAP update them.
#[derive(Debug, Clone)]
pub struct PhasePolyBuilder {
    wires: Vec<Vec<bool>>,
    terms: Vec<PhaseTerm>,
    index: FxHashMap<Vec<bool>, usize>,
    gates: usize,
}

impl PhasePolyBuilder {
    /// Start an identity block on `n` wires.
    pub fn new(n: usize) -> Self {
        Self {
            wires: (0..n).map(|i| (0..n).map(|j| i == j).collect()).collect(),
            terms: vec![],
            index: FxHashMap::default(),
            gates: 0,
        }
    }

    /// Number of gates absorbed so far.
    pub fn num_gates(&self) -> usize {
        self.gates
    }

    /// Whether nothing has been absorbed.
    pub fn is_empty(&self) -> bool {
        self.gates == 0
    }

    /// Whether `inst` could be absorbed by [`PhasePolyBuilder::push`].
    pub fn accepts(inst: &Instruction) -> bool {
        match &inst.kind {
            InstructionKind::Gate(g) if g.condition.is_none() => g.as_standard().is_some_and(|s| {
                s.is_diagonal() || matches!(s, StandardGate::CX | StandardGate::Swap)
            }),
            _ => false,
        }
    }

    /// Absorb one instruction, with qubit ids used as wire indices.
    pub fn push(&mut self, inst: &Instruction) -> IrResult<()> {
        let gate = match &inst.kind {
            InstructionKind::Gate(g) if g.condition.is_none() => g.as_standard(),
            _ => None,
        }
        .ok_or_else(|| IrError::NotPhasePolynomial(inst.name().to_string()))?;

        let wires: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        for (&w, q) in wires.iter().zip(&inst.qubits) {
            if w >= self.wires.len() {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: Some(gate.name().to_string()),
                });
            }
        }

        match gate {
            StandardGate::I => {}
            StandardGate::CX => {
                let control = self.wires[wires[0]].clone();
                for (t, c) in self.wires[wires[1]].iter_mut().zip(control) {
                    *t ^= c;
                }
            }
            StandardGate::Swap => self.wires.swap(wires[0], wires[1]),
            StandardGate::CZ => self.add_controlled_phase(wires[0], wires[1], 1.0),
            StandardGate::CP(p) => {
                let a = concrete_half_turns(p)?;
                self.add_controlled_phase(wires[0], wires[1], a);
            }
            other => match other.z_half_turns()? {
                Some(a) => {
                    let parity = self.wires[wires[0]].clone();
                    self.add_term(parity, a);
                }
                None => return Err(IrError::NotPhasePolynomial(other.name().to_string())),
            },
        }
        self.gates += 1;
        Ok(())
    }

    /// `CP(π·a)` equals, up to global phase, `a/2` on each wire and `-a/2` on their sum.
    fn add_controlled_phase(&mut self, c: usize, t: usize, a: f64) {
        let pc = self.wires[c].clone();
        let pt = self.wires[t].clone();
        let sum: Vec<bool> = pc.iter().zip(&pt).map(|(x, y)| x ^ y).collect();
        self.add_term(pc, a / 2.0);
        self.add_term(pt, a / 2.0);
        self.add_term(sum, -a / 2.0);
    }

    fn add_term(&mut self, parity: Vec<bool>, half_turns: f64) {
        match self.index.get(&parity) {
            Some(&k) => self.terms[k].half_turns += half_turns,
            None => {
                self.index.insert(parity.clone(), self.terms.len());
                self.terms.push(PhaseTerm::new(parity, half_turns));
            }
        }
    }

    /// Finish the block, dropping terms whose angle is a multiple of 2π.
    pub fn finish(self) -> IrResult<PhasePolyBox> {
        let linear = LinearMap::from_rows(&self.wires)?;
        let terms = self
            .terms
            .into_iter()
            .filter(|t| !is_multiple_of(t.half_turns, 2.0))
            .collect();
        PhasePolyBox::new(linear, terms)
    }
}
