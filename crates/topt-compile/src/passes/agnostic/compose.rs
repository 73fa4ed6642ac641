//! Grouping CNOT and diagonal gates into phase-polynomial boxes.

use tracing::debug;

use topt_ir::{Circuit, InstructionKind, PhasePolyBuilder, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrite a circuit into the `{h, phasepolybox}` gate set.
///
/// Every maximal run of CNOT, SWAP and diagonal gates becomes one box over
/// all wires. Hadamards, barriers and existing boxes end a run and are kept
/// as they are. Any other instruction is rejected.
pub fn compose_phase_poly_boxes(circuit: &Circuit) -> CompileResult<Circuit> {
    let n = circuit.num_qubits();
    let wires: Vec<QubitId> = circuit.qubits().iter().map(|q| q.id).collect();
    let mut out = circuit.empty_like();
    let mut run = PhasePolyBuilder::new(n);
    let mut boxes = 0;

    for inst in circuit.instructions() {
        if PhasePolyBuilder::accepts(inst) {
            run.push(inst)?;
            continue;
        }
        let passthrough = inst.is_hadamard()
            || matches!(inst.kind, InstructionKind::Barrier)
            || inst
                .as_gate()
                .is_some_and(|g| g.condition.is_none() && g.as_phase_poly().is_some());
        if !passthrough {
            return Err(CompileError::InvalidGateSet {
                gate_name: inst.name().to_string(),
                allowed: "h, cx, cz, swap, cp, rz, p, z, s, sdg, t, tdg, barrier".into(),
            });
        }
        boxes += flush(&mut run, &mut out, &wires)?;
        out.apply(inst.clone())?;
    }
    boxes += flush(&mut run, &mut out, &wires)?;

    debug!(boxes, "Composed phase-polynomial boxes");
    Ok(out)
}

/// Emit the pending run as a box, if it absorbed anything.
fn flush(run: &mut PhasePolyBuilder, out: &mut Circuit, wires: &[QubitId]) -> CompileResult<usize> {
    if run.is_empty() {
        return Ok(0);
    }
    let finished = std::mem::replace(run, PhasePolyBuilder::new(wires.len()));
    out.phase_poly(finished.finish()?, wires.iter().copied())?;
    Ok(1)
}

/// Transformation pass wrapping [`compose_phase_poly_boxes`].
pub struct ComposePhasePolyBoxes;

impl Pass for ComposePhasePolyBoxes {
    fn name(&self) -> &'static str {
        "compose_phase_poly_boxes"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        *circuit = compose_phase_poly_boxes(circuit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unitary::circuits_equivalent;
    use std::f64::consts::PI;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_runs_split_at_hadamards() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit
            .cx(q(0), q(1))
            .unwrap()
            .t(q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .h(q(0))
            .unwrap()
            .cx(q(0), q(2))
            .unwrap()
            .t(q(2))
            .unwrap()
            .cx(q(0), q(2))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .t(q(1))
            .unwrap()
            .h(q(0))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();

        let composed = compose_phase_poly_boxes(&circuit).unwrap();
        let names: Vec<&str> = composed.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(
            names,
            ["phasepolybox", "h", "phasepolybox", "h", "phasepolybox"]
        );
        assert!(circuits_equivalent(&circuit, &composed, 2, 1e-9).unwrap());

        let last = composed.instructions()[4].as_gate().unwrap().as_phase_poly().unwrap();
        assert!(last.is_clifford());
        assert!(last.terms().is_empty());
    }

    #[test]
    fn test_adjacent_hadamards_emit_no_empty_box() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .h(q(0))
            .unwrap()
            .h(q(1))
            .unwrap()
            .cp(PI / 2.0, q(0), q(1))
            .unwrap();
        let composed = compose_phase_poly_boxes(&circuit).unwrap();
        assert_eq!(composed.len(), 3);
        assert_eq!(composed.count_ops("phasepolybox"), 1);
        assert!(circuits_equivalent(&circuit, &composed, 2, 1e-9).unwrap());
    }

    #[test]
    fn test_barrier_ends_run() {
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit
            .t(q(0))
            .unwrap()
            .barrier_all()
            .unwrap()
            .t(q(0))
            .unwrap();
        let composed = compose_phase_poly_boxes(&circuit).unwrap();
        assert_eq!(composed.count_ops("phasepolybox"), 2);
        assert_eq!(composed.count_ops("barrier"), 1);
    }

    #[test]
    fn test_unsupported_gate() {
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.x(q(0)).unwrap();
        assert!(matches!(
            compose_phase_poly_boxes(&circuit),
            Err(CompileError::InvalidGateSet { gate_name, .. }) if gate_name == "x"
        ));
    }

    #[test]
    fn test_pass_rewrites_circuit() {
        let mut circuit = Circuit::qft(3).unwrap();
        let original = circuit.clone();
        ComposePhasePolyBoxes
            .run(&mut circuit, &mut PropertySet::new())
            .unwrap();
        assert_eq!(circuit.count_ops("h"), 3);
        assert!(circuit.instructions().iter().all(|i| i.is_hadamard() || i.name() == "phasepolybox"));
        assert!(circuits_equivalent(&original, &circuit, 2, 1e-9).unwrap());
    }
}
