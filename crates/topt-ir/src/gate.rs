//! Gate types.
//!
//! Elementary gates live in [`StandardGate`]. Boxes that the compiler builds
//! and later flattens live in [`CompositeGate`].

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::pauli::Pauli;
use crate::phase_poly::{PhasePolyBox, parity_gadget};
use crate::qubit::{ClbitId, QubitId};

/// Tolerance for comparing angles expressed in half-turns.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Whether `half_turns` is an integer multiple of `step`, within tolerance.
#[inline]
pub fn is_multiple_of(half_turns: f64, step: f64) -> bool {
    let r = half_turns / step;
    (r - r.round()).abs() < ANGLE_EPSILON
}

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,

    // Single-qubit non-Clifford gates
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Rotation around Z axis, `exp(-iθZ/2)`.
    Rz(ParameterExpression),
    /// Phase gate, `diag(1, e^{iθ})`.
    P(ParameterExpression),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Controlled phase gate.
    CP(ParameterExpression),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CP(_) => "cp",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rz(_)
            | StandardGate::P(_) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::Swap | StandardGate::CP(_) => 2,
        }
    }

    /// Check if this gate has symbolic parameters.
    pub fn is_parameterized(&self) -> bool {
        self.parameter().is_some_and(ParameterExpression::is_symbolic)
    }

    /// The angle of a rotation gate.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            StandardGate::Rz(p) | StandardGate::P(p) | StandardGate::CP(p) => Some(p),
            _ => None,
        }
    }

    /// Whether the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::CP(_)
        )
    }

    /// The Z-rotation angle of a single-qubit diagonal gate, in half-turns.
    ///
    /// `P(θ)` reports the same angle as `Rz(θ)`; they differ by a global phase.
    pub fn z_half_turns(&self) -> IrResult<Option<f64>> {
        let angle = match self {
            StandardGate::Z => 1.0,
            StandardGate::S => 0.5,
            StandardGate::Sdg => -0.5,
            StandardGate::T => 0.25,
            StandardGate::Tdg => -0.25,
            StandardGate::Rz(p) | StandardGate::P(p) => concrete_half_turns(p)?,
            _ => return Ok(None),
        };
        Ok(Some(angle))
    }

    /// Whether the gate is in the Clifford group (up to global phase).
    ///
    /// Symbolic rotations are never Clifford.
    pub fn is_clifford(&self) -> bool {
        match self {
            StandardGate::T | StandardGate::Tdg => false,
            StandardGate::Rz(p) | StandardGate::P(p) => {
                p.half_turns().is_some_and(|a| is_multiple_of(a, 0.5))
            }
            StandardGate::CP(p) => p.half_turns().is_some_and(|a| is_multiple_of(a, 1.0)),
            _ => true,
        }
    }

    /// The inverse gate.
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rz(p) => StandardGate::Rz(p.negated()),
            StandardGate::P(p) => StandardGate::P(p.negated()),
            StandardGate::CP(p) => StandardGate::CP(p.negated()),
            other => other.clone(),
        }
    }
}

pub(crate) fn concrete_half_turns(p: &ParameterExpression) -> IrResult<f64> {
    p.half_turns().ok_or_else(|| {
        IrError::UnboundParameter(p.first_symbol().unwrap_or_default().to_string())
    })
}

/// One Pauli exponential `exp(-iπ·t/2 · P)` inside a [`PauliGadgetSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliGadget {
    /// Dense Pauli string over the box wires.
    pub string: Vec<Pauli>,
    /// Rotation angle `t` in half-turns.
    pub half_turns: f64,
}

/// A product of mutually commuting Pauli exponentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPauliGadgetSet")]
pub struct PauliGadgetSet {
    num_qubits: u32,
    gadgets: Vec<PauliGadget>,
}

#[derive(Deserialize)]
struct RawPauliGadgetSet {
    num_qubits: u32,
    gadgets: Vec<PauliGadget>,
}

impl TryFrom<RawPauliGadgetSet> for PauliGadgetSet {
    type Error = IrError;

    fn try_from(raw: RawPauliGadgetSet) -> IrResult<Self> {
        let mut set = Self::new(raw.num_qubits);
        for gadget in raw.gadgets {
            set.push(gadget.string, gadget.half_turns)?;
        }
        Ok(set)
    }
}

impl PauliGadgetSet {
    /// Create an empty set on `num_qubits` wires.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gadgets: vec![],
        }
    }

    /// Add a gadget. Strings must be as wide as the box and commute with
    /// every gadget already in the set.
    pub fn push(&mut self, string: Vec<Pauli>, half_turns: f64) -> IrResult<()> {
        if string.len() != self.num_qubits as usize {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits as usize,
                got: string.len(),
            });
        }
        if self.gadgets.iter().any(|g| !strings_commute(&g.string, &string)) {
            let label: String = string.iter().map(ToString::to_string).collect();
            return Err(IrError::NonCommutingGadget(label));
        }
        self.gadgets.push(PauliGadget { string, half_turns });
        Ok(())
    }

    /// Number of wires.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The gadgets in application order.
    pub fn gadgets(&self) -> &[PauliGadget] {
        &self.gadgets
    }

    /// Whether the set holds no gadgets.
    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    /// The inverse set. Gadgets commute, so only the angles flip.
    pub fn inverse(&self) -> Self {
        Self {
            num_qubits: self.num_qubits,
            gadgets: self
                .gadgets
                .iter()
                .map(|g| PauliGadget {
                    string: g.string.clone(),
                    half_turns: -g.half_turns,
                })
                .collect(),
        }
    }

    fn decompose(&self, qubits: &[QubitId]) -> Vec<Instruction> {
        let mut out = vec![];
        for gadget in &self.gadgets {
            let support: Vec<(QubitId, Pauli)> = qubits
                .iter()
                .zip(&gadget.string)
                .filter(|(_, p)| **p != Pauli::I)
                .map(|(q, p)| (*q, *p))
                .collect();

            // Rotate each factor into the Z basis.
            for &(q, p) in &support {
                match p {
                    Pauli::X => out.push(Instruction::single_qubit_gate(StandardGate::H, q)),
                    Pauli::Y => {
                        out.push(Instruction::single_qubit_gate(StandardGate::Sdg, q));
                        out.push(Instruction::single_qubit_gate(StandardGate::H, q));
                    }
                    Pauli::I | Pauli::Z => {}
                }
            }
            let wires: Vec<QubitId> = support.iter().map(|(q, _)| *q).collect();
            out.extend(parity_gadget(&wires, gadget.half_turns));
            for &(q, p) in support.iter().rev() {
                match p {
                    Pauli::X => out.push(Instruction::single_qubit_gate(StandardGate::H, q)),
                    Pauli::Y => {
                        out.push(Instruction::single_qubit_gate(StandardGate::H, q));
                        out.push(Instruction::single_qubit_gate(StandardGate::S, q));
                    }
                    Pauli::I | Pauli::Z => {}
                }
            }
        }
        out
    }
}

/// Boxes built by the compiler.
/// Dense strings commute iff they anticommute on an even number of wires.
fn strings_commute(a: &[Pauli], b: &[Pauli]) -> bool {
    a.iter()
        .zip(b)
        .filter(|(p, q)| p.anticommutes_with(**q))
        .count()
        % 2
        == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompositeGate {
    /// A CNOT+Rz block in phase-polynomial form.
    PhasePoly(PhasePolyBox),
    /// CZ followed by SWAP, used to move a wire's state onto an ancilla.
    FSwap,
    /// Commuting Pauli exponentials.
    PauliGadgets(PauliGadgetSet),
}

impl CompositeGate {
    /// Get the name of this gate.
    pub fn name(&self) -> &'static str {
        match self {
            CompositeGate::PhasePoly(_) => "phasepolybox",
            CompositeGate::FSwap => "fswap",
            CompositeGate::PauliGadgets(_) => "pauli_gadgets",
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        match self {
            CompositeGate::PhasePoly(b) => b.num_qubits(),
            CompositeGate::FSwap => 2,
            CompositeGate::PauliGadgets(g) => g.num_qubits(),
        }
    }

    /// The inverse box.
    pub fn inverse(&self) -> IrResult<CompositeGate> {
        Ok(match self {
            CompositeGate::PhasePoly(b) => CompositeGate::PhasePoly(b.dagger()?),
            // CZ and SWAP commute, so the box is self-inverse.
            CompositeGate::FSwap => CompositeGate::FSwap,
            CompositeGate::PauliGadgets(g) => CompositeGate::PauliGadgets(g.inverse()),
        })
    }

    /// Expand into standard gates acting on `qubits`.
    ///
    /// `section_size` tunes the CNOT synthesis of phase-polynomial boxes.
    pub fn decompose(&self, qubits: &[QubitId], section_size: usize) -> IrResult<Vec<Instruction>> {
        if qubits.len() != self.num_qubits() as usize {
            return Err(IrError::QubitCountMismatch {
                gate_name: self.name().to_string(),
                expected: self.num_qubits(),
                got: qubits.len() as u32,
            });
        }
        Ok(match self {
            CompositeGate::PhasePoly(b) => b.decompose(qubits, section_size),
            CompositeGate::FSwap => vec![
                Instruction::two_qubit_gate(StandardGate::CZ, qubits[0], qubits[1]),
                Instruction::two_qubit_gate(StandardGate::Swap, qubits[0], qubits[1]),
            ],
            CompositeGate::PauliGadgets(g) => g.decompose(qubits),
        })
    }
}

/// A quantum gate, either standard or composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A box that decomposes into standard gates.
    Composite(CompositeGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Composite(g) => g.name(),
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Composite(g) => g.num_qubits(),
        }
    }
}

/// Classical condition for conditional gates.
///
/// The gate fires when the bits, read little-endian, equal `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// Bits the condition reads.
    pub clbits: Vec<ClbitId>,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(clbits: impl IntoIterator<Item = ClbitId>, value: u64) -> Self {
        Self {
            clbits: clbits.into_iter().collect(),
            value,
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional classical condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
            condition: None,
        }
    }

    /// Create a new gate from a composite gate.
    pub fn composite(gate: CompositeGate) -> Self {
        Self {
            kind: GateKind::Composite(gate),
            label: None,
            condition: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a classical condition to the gate.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// The standard gate, if this is one.
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match &self.kind {
            GateKind::Standard(g) => Some(g),
            GateKind::Composite(_) => None,
        }
    }

    /// The phase-polynomial box, if this is one.
    pub fn as_phase_poly(&self) -> Option<&PhasePolyBox> {
        match &self.kind {
            GateKind::Composite(CompositeGate::PhasePoly(b)) => Some(b),
            _ => None,
        }
    }

    /// The inverse gate. Conditional gates have none.
    pub fn inverse(&self) -> IrResult<Gate> {
        if self.condition.is_some() {
            return Err(IrError::NonInvertible(format!("conditional {}", self.name())));
        }
        let kind = match &self.kind {
            GateKind::Standard(g) => GateKind::Standard(g.inverse()),
            GateKind::Composite(g) => GateKind::Composite(g.inverse()?),
        };
        Ok(Gate {
            kind,
            label: self.label.clone(),
            condition: None,
        })
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CompositeGate> for Gate {
    fn from(gate: CompositeGate) -> Self {
        Gate::composite(gate)
    }
}

impl From<PhasePolyBox> for Gate {
    fn from(b: PhasePolyBox) -> Self {
        Gate::composite(CompositeGate::PhasePoly(b))
    }
}
