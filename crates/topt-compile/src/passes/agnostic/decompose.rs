//! Box expansion and gate rewriting.

use tracing::debug;

use topt_ir::{
    Circuit, Gate, GateKind, Instruction, InstructionKind, ParameterExpression, StandardGate,
};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Expand every composite gate into standard gates, recursively.
///
/// A condition on a box is copied onto each gate it expands to.
pub fn decompose_boxes(circuit: &Circuit, section_size: usize) -> CompileResult<Circuit> {
    let mut out = circuit.empty_like();
    let mut expanded = 0;
    let mut pending: Vec<Instruction> = circuit.instructions().iter().rev().cloned().collect();

    while let Some(inst) = pending.pop() {
        let parts = match &inst.kind {
            InstructionKind::Gate(Gate {
                kind: GateKind::Composite(composite),
                condition,
                ..
            }) => {
                let mut parts = composite.decompose(&inst.qubits, section_size)?;
                if let Some(condition) = condition {
                    for part in &mut parts {
                        if let Some(g) = part.gate_mut() {
                            g.condition = Some(condition.clone());
                        }
                    }
                }
                Some(parts)
            }
            _ => None,
        };
        match parts {
            Some(parts) => {
                expanded += 1;
                pending.extend(parts.into_iter().rev());
            }
            None => out.apply(inst)?,
        }
    }

    debug!(expanded, "Decomposed boxes");
    Ok(out)
}

/// Replace `T` and `T†` with `Rz(±π/4)`.
pub fn replace_t_with_rz(circuit: &Circuit) -> CompileResult<Circuit> {
    let mut out = circuit.empty_like();
    for inst in circuit.instructions() {
        let mut inst = inst.clone();
        if let Some(gate) = inst.gate_mut() {
            let half_turns = match gate.as_standard() {
                Some(StandardGate::T) => Some(0.25),
                Some(StandardGate::Tdg) => Some(-0.25),
                _ => None,
            };
            if let Some(a) = half_turns {
                gate.kind = GateKind::Standard(StandardGate::Rz(
                    ParameterExpression::from_half_turns(a),
                ));
            }
        }
        out.apply(inst)?;
    }
    Ok(out)
}

/// Transformation pass wrapping [`decompose_boxes`].
///
/// Uses the configured CNOT-synthesis section size.
pub struct DecomposeBoxes;

impl Pass for DecomposeBoxes {
    fn name(&self) -> &'static str {
        "decompose_boxes"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        *circuit = decompose_boxes(circuit, properties.config.pmh_section_size)?;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, _properties: &PropertySet) -> bool {
        circuit
            .instructions()
            .iter()
            .any(|i| i.as_gate().is_some_and(|g| g.as_standard().is_none()))
    }
}

/// Transformation pass wrapping [`replace_t_with_rz`].
pub struct ReplaceTWithRz;

impl Pass for ReplaceTWithRz {
    fn name(&self) -> &'static str {
        "replace_t_with_rz"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        *circuit = replace_t_with_rz(circuit)?;
        Ok(())
    }
}
