//! Integration tests for Hadamard gadgetisation on composed circuits.

use std::f64::consts::PI;

use topt_compile::passes::{
    GadgetisationReport, clifford_boundary, compose_phase_poly_boxes, count_conditional_x,
    count_internal_hadamards, decompose_boxes, gadgetise_hadamards,
};
use topt_compile::{CompileError, PassManagerBuilder, TransformConfig};
use topt_ir::{Circuit, LinearMap, PhasePolyBox, PhaseTerm, QubitId};

fn q(i: u32) -> QubitId {
    QubitId(i)
}

/// A single-term block on all `n` wires.
fn block(n: usize, half_turns: f64) -> PhasePolyBox {
    let mut parity = vec![false; n];
    parity[0] = true;
    PhasePolyBox::new(LinearMap::identity(n), vec![PhaseTerm::new(parity, half_turns)]).unwrap()
}

fn all(n: u32) -> Vec<QubitId> {
    (0..n).map(QubitId).collect()
}

/// Gadgetise and check the counting invariants against the input.
fn gadgetise_checked(circuit: &Circuit) -> Circuit {
    let internal = count_internal_hadamards(circuit).unwrap();
    let out = gadgetise_hadamards(circuit, &TransformConfig::default()).unwrap();
    assert_eq!(count_conditional_x(&out), internal);
    assert_eq!(out.num_qubits(), circuit.num_qubits() + internal);
    assert_eq!(out.num_clbits(), circuit.num_clbits() + internal);
    out
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_four_wire_circuit() {
    let mut circuit = Circuit::with_size("four", 4, 0);
    circuit
        .t(q(0))
        .unwrap()
        .cx(q(0), q(3))
        .unwrap()
        .cx(q(2), q(1))
        .unwrap()
        .cx(q(3), q(1))
        .unwrap()
        .t(q(3))
        .unwrap()
        .h(q(0))
        .unwrap()
        .h(q(1))
        .unwrap()
        .cp(PI / 4.0, q(0), q(3))
        .unwrap()
        .h(q(2))
        .unwrap()
        .cz(q(0), q(3))
        .unwrap();

    let composed = compose_phase_poly_boxes(&circuit).unwrap();
    assert_eq!(composed.count_ops("phasepolybox"), 3);
    assert_eq!(count_internal_hadamards(&composed).unwrap(), 2);

    let out = gadgetise_checked(&composed);
    assert_eq!(out.num_qubits(), 6);
    assert_eq!(count_conditional_x(&out), 2);
    // H(2) follows the last non-Clifford block and stays.
    assert_eq!(out.count_ops("h"), 2 + 2 + 1);
}

/// QFT without the final swaps, preceded by a layer of T gates so that the
/// first Hadamard is already inside the non-Clifford region.
fn t_layer_qft(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("qft", n, 0);
    for i in 0..n {
        circuit.t(q(i)).unwrap();
    }
    for i in 0..n {
        circuit.h(q(i)).unwrap();
        for j in (i + 1)..n {
            let angle = PI / f64::from(1u32 << (j - i));
            circuit.cp(angle, q(j), q(i)).unwrap();
        }
    }
    circuit
}

#[test]
fn test_qft_style_circuits() {
    for n in 2..=6 {
        let composed = compose_phase_poly_boxes(&t_layer_qft(n)).unwrap();
        assert_eq!(
            count_internal_hadamards(&composed).unwrap(),
            (n - 1) as usize,
            "n = {n}"
        );
        let out = gadgetise_checked(&composed);
        assert_eq!(out.num_qubits(), (2 * n - 1) as usize);
        assert_eq!(count_conditional_x(&out), (n - 1) as usize);
    }
}

#[test]
fn test_pipeline_reports_gadgets() {
    let mut circuit = t_layer_qft(4);
    // The controlled phases are not single-qubit rotations, so the angle
    // check stays off.
    let (pm, mut props) = PassManagerBuilder::new().with_composition(true).build();
    pm.run(&mut circuit, &mut props).unwrap();

    let report = props.get::<GadgetisationReport>().unwrap();
    assert_eq!(report.internal_hadamards, 3);
    assert_eq!(report.original_qubits, 4);
    assert_eq!(report.ancillas, vec![q(4), q(5), q(6)]);
    assert_eq!(circuit.qubits_in_register("z_ancillas"), report.ancillas);
}

#[test]
fn test_all_clifford_blocks_raise_on_boundary() {
    let mut circuit = Circuit::with_size("c", 2, 0);
    circuit
        .s(q(0))
        .unwrap()
        .h(q(1))
        .unwrap()
        .cz(q(0), q(1))
        .unwrap()
        .h(q(0))
        .unwrap()
        .sdg(q(1))
        .unwrap();
    let composed = compose_phase_poly_boxes(&circuit).unwrap();
    assert_eq!(count_internal_hadamards(&composed).unwrap(), 0);
    assert!(matches!(
        clifford_boundary(&composed),
        Err(CompileError::NoNonCliffordBlock)
    ));
    // Nothing to gadgetise, so the boundary is never needed.
    let out = gadgetise_hadamards(&composed, &TransformConfig::default()).unwrap();
    assert_eq!(out, composed);
}

// ============================================================================
// Boundary values: Hadamards adjacent to the first and last non-Clifford block
// ============================================================================

/// `H C H T H C H T H C H`, with `C` a Clifford block and `T` a non-Clifford one.
fn boundary_circuit() -> Circuit {
    let mut circuit = Circuit::with_size("boundary", 1, 0);
    let w = q(0);
    circuit
        .h(w)
        .unwrap()
        .phase_poly(block(1, 0.5), all(1))
        .unwrap()
        .h(w)
        .unwrap()
        .phase_poly(block(1, 0.25), all(1))
        .unwrap()
        .h(w)
        .unwrap()
        .phase_poly(block(1, 1.0), all(1))
        .unwrap()
        .h(w)
        .unwrap()
        .phase_poly(block(1, 0.75), all(1))
        .unwrap()
        .h(w)
        .unwrap()
        .phase_poly(block(1, 0.5), all(1))
        .unwrap()
        .h(w)
        .unwrap();
    circuit
}

#[test]
fn test_boundary_indices_count_blocks_only() {
    let circuit = boundary_circuit();
    assert_eq!(clifford_boundary(&circuit).unwrap(), (1, 3));
    assert_eq!(count_internal_hadamards(&circuit).unwrap(), 2);
}

#[test]
fn test_hadamards_at_region_edges() {
    let out = gadgetise_checked(&boundary_circuit());
    let names: Vec<&str> = out.instructions().iter().map(|i| i.name()).collect();
    // Ancilla prep, then: H C H T [gadget] C [gadget] T H C H.
    let expected = [
        "h", "h", "barrier", //
        "h", "phasepolybox", "h", "phasepolybox", //
        "fswap", "h", "measure", "x", //
        "phasepolybox", //
        "fswap", "h", "measure", "x", //
        "phasepolybox", "h", "phasepolybox", "h",
    ];
    assert_eq!(names, expected);
}

#[test]
fn test_single_non_clifford_block_has_no_internal_region() {
    let mut circuit = Circuit::with_size("c", 1, 0);
    circuit
        .h(q(0))
        .unwrap()
        .phase_poly(block(1, 0.25), all(1))
        .unwrap()
        .h(q(0))
        .unwrap();
    assert_eq!(clifford_boundary(&circuit).unwrap(), (0, 0));
    let out = gadgetise_checked(&circuit);
    assert_eq!(out, circuit);
}

#[test]
fn test_gadgetised_circuit_decomposes() {
    let composed = compose_phase_poly_boxes(&t_layer_qft(3)).unwrap();
    let out = gadgetise_hadamards(&composed, &TransformConfig::default()).unwrap();
    let flat = decompose_boxes(&out, 2).unwrap();
    assert_eq!(flat.count_ops("fswap"), 0);
    assert_eq!(flat.count_ops("cz"), 2);
    assert_eq!(count_conditional_x(&flat), 2);
}

#[test]
fn test_gate_set_enforced() {
    let circuit = t_layer_qft(3);
    assert!(matches!(
        gadgetise_hadamards(&circuit, &TransformConfig::default()),
        Err(CompileError::InvalidGateSet { .. })
    ));
}
