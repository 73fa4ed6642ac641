//! High-level circuit builder API.
//!
//! A [`Circuit`] is an ordered list of instructions over named wires. Every
//! instruction is validated on insertion, so a circuit value is always
//! well-formed.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, CompositeGate, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::phase_poly::PhasePolyBox;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit, indexed by id.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit, indexed by id.
    clbits: Vec<Clbit>,
    /// Instructions in application order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// An empty circuit with the same wires as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            instructions: vec![],
        }
    }

    /// Parse a circuit from JSON, validating every instruction.
    pub fn from_json(json: &str) -> IrResult<Self> {
        let raw: Circuit = serde_json::from_str(json)?;
        let mut circuit = raw.empty_like();
        for (i, qubit) in circuit.qubits.iter().enumerate() {
            if qubit.id.index() != i {
                return Err(IrError::DimensionMismatch {
                    expected: i,
                    got: qubit.id.index(),
                });
            }
        }
        for (i, clbit) in circuit.clbits.iter().enumerate() {
            if clbit.id.index() != i {
                return Err(IrError::DimensionMismatch {
                    expected: i,
                    got: clbit.id.index(),
                });
            }
        }
        for inst in raw.instructions {
            circuit.apply(inst)?;
        }
        Ok(circuit)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = QubitId(self.qubits.len() as u32);
                self.qubits.push(Qubit::with_register(id, &name, i));
                id
            })
            .collect()
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = ClbitId(self.clbits.len() as u32);
                self.clbits.push(Clbit::with_register(id, &name, i));
                id
            })
            .collect()
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<()> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if qubit.index() >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let condition_bits = instruction
            .condition()
            .map(|c| c.clbits.as_slice())
            .unwrap_or_default();
        for &clbit in instruction.clbits.iter().chain(condition_bits) {
            if clbit.index() >= self.clbits.len() {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        self.instructions.push(instruction);
        Ok(())
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.apply(instruction)?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Tdg, qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    /// Apply phase gate.
    pub fn p(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::P(lambda.into()),
            qubit,
        ))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CZ, q1, q2))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply controlled phase gate.
    pub fn cp(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CP(lambda.into()),
            control,
            target,
        ))
    }

    // =========================================================================
    // Boxes
    // =========================================================================

    /// Apply a phase-polynomial box.
    pub fn phase_poly(
        &mut self,
        block: PhasePolyBox,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(block, qubits))
    }

    /// Apply CZ then SWAP as a single box.
    pub fn fswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(CompositeGate::FSwap, [q1, q2]))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Apply X to `qubit` when `clbit` reads `value`.
    pub fn x_if(&mut self, qubit: QubitId, clbit: ClbitId, value: u64) -> IrResult<&mut Self> {
        self.push(Instruction::conditional(
            StandardGate::X,
            [qubit],
            ClassicalCondition::new([clbit], value),
        ))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.push(Instruction::barrier(qubits))
    }

    /// Append every instruction of `other`, which must use a subset of our wires.
    pub fn append(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        for inst in &other.instructions {
            self.apply(inst.clone())?;
        }
        Ok(self)
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// The same instructions in reverse order, each left as-is.
    pub fn reversed(&self) -> Circuit {
        let mut out = self.empty_like();
        out.instructions = self.instructions.iter().rev().cloned().collect();
        out
    }

    /// The inverse circuit. Fails on measurements and conditional gates.
    pub fn dagger(&self) -> IrResult<Circuit> {
        let mut out = self.empty_like();
        for inst in self.instructions.iter().rev() {
            let kind = match &inst.kind {
                InstructionKind::Gate(g) => InstructionKind::Gate(g.inverse()?),
                InstructionKind::Barrier => InstructionKind::Barrier,
                InstructionKind::Measure => {
                    return Err(IrError::NonInvertible(inst.name().to_string()));
                }
            };
            out.instructions.push(Instruction {
                kind,
                qubits: inst.qubits.clone(),
                clbits: inst.clbits.clone(),
            });
        }
        Ok(out)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Ids of the qubits in a named register.
    pub fn qubits_in_register(&self, register: &str) -> Vec<QubitId> {
        self.qubits
            .iter()
            .filter(|q| q.in_register(register))
            .map(|q| q.id)
            .collect()
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions with the given name.
    pub fn count_ops(&self, name: &str) -> usize {
        self.instructions.iter().filter(|i| i.name() == name).count()
    }

    /// Instruction counts by name.
    pub fn op_counts(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth, counting every instruction as one layer on the wires
    /// and bits it touches.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.qubits.len()];
        let mut clbit_level = vec![0usize; self.clbits.len()];
        let mut depth = 0;
        for inst in &self.instructions {
            let condition_bits = inst
                .condition()
                .map(|c| c.clbits.as_slice())
                .unwrap_or_default();
            let bits: Vec<usize> = inst
                .clbits
                .iter()
                .chain(condition_bits)
                .map(|c| c.index())
                .collect();
            let level = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.index()])
                .chain(bits.iter().map(|&b| clbit_level[b]))
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                qubit_level[q.index()] = level;
            }
            for &b in &bits {
                clbit_level[b] = level;
            }
            depth = depth.max(level);
        }
        depth
    }

    /// Whether any gate carries a symbolic angle.
    pub fn is_parameterized(&self) -> bool {
        self.instructions.iter().any(|inst| {
            inst.as_gate()
                .and_then(Gate::as_standard)
                .is_some_and(StandardGate::is_parameterized)
        })
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::with_size("qft", n, 0);
        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                let angle = PI / f64::from(1u32 << (j - i));
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearMap;
    use crate::phase_poly::PhaseTerm;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let anc = circuit.add_qreg("z_ancillas", 3);
        let bits = circuit.add_creg("bits", 3);
        assert_eq!(anc, vec![QubitId(2), QubitId(3), QubitId(4)]);
        assert_eq!(bits.len(), 3);
        assert_eq!(circuit.qubits_in_register("z_ancillas"), anc);
        assert_eq!(circuit.qubits()[3].to_string(), "z_ancillas[1]");
    }

    #[test]
    fn test_validation() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        assert!(matches!(
            circuit.h(QubitId(5)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(0)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.x_if(QubitId(0), ClbitId(3), 1),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(matches!(
            circuit.gate(StandardGate::CX, [QubitId(0)]),
            Err(IrError::QubitCountMismatch { .. })
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_fluent_api_and_depth() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.count_ops("measure"), 2);
    }

    #[test]
    fn test_reversed_and_dagger() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit
            .t(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .rz(PI / 8.0, QubitId(1))
            .unwrap();

        let rev = circuit.reversed();
        let names: Vec<_> = rev.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["rz", "cx", "t"]);

        let dag = circuit.dagger().unwrap();
        let names: Vec<_> = dag.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["rz", "cx", "tdg"]);
        let angle = dag.instructions()[0]
            .as_gate()
            .and_then(Gate::as_standard)
            .and_then(StandardGate::parameter)
            .and_then(ParameterExpression::as_f64)
            .unwrap();
        assert!((angle + PI / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_dagger_rejects_measure() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(matches!(circuit.dagger(), Err(IrError::NonInvertible(_))));
    }

    #[test]
    fn test_append() {
        let mut a = Circuit::with_size("a", 3, 0);
        let mut b = Circuit::with_size("b", 2, 0);
        b.h(QubitId(1)).unwrap();
        a.append(&b).unwrap();
        assert_eq!(a.len(), 1);

        let mut wide = Circuit::with_size("wide", 4, 0);
        wide.h(QubitId(3)).unwrap();
        assert!(b.append(&wide).is_err());
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cp(PI / 2.0, QubitId(0), QubitId(1))
            .unwrap()
            .x_if(QubitId(1), ClbitId(0), 1)
            .unwrap();
        let json = circuit.to_json().unwrap();
        assert_eq!(Circuit::from_json(&json).unwrap(), circuit);

        let broken = json.replace("\"id\": 1", "\"id\": 9");
        assert!(Circuit::from_json(&broken).is_err());
    }

    #[test]
    fn test_json_rejects_singular_block() {
        let block = PhasePolyBox::new(
            LinearMap::identity(2),
            vec![PhaseTerm::new(vec![true, false], 0.25)],
        )
        .unwrap();
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit
            .phase_poly(block, [QubitId(0), QubitId(1)])
            .unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        assert_eq!(Circuit::from_json(&json).unwrap(), circuit);

        let singular = json.replace("[true,false,false,true]", "[true,true,true,true]");
        assert_ne!(singular, json);
        assert!(matches!(
            Circuit::from_json(&singular),
            Err(IrError::Serialization(e)) if e.to_string().contains("singular")
        ));
    }

    #[test]
    fn test_qft_structure() {
        let circuit = Circuit::qft(4).unwrap();
        assert_eq!(circuit.count_ops("h"), 4);
        assert_eq!(circuit.count_ops("cp"), 6);
        assert_eq!(circuit.count_ops("swap"), 2);
    }
}
