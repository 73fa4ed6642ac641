//! Built-in compilation passes.

pub mod agnostic;

pub use agnostic::{
    CliffordTReport, CliffordTVerification, ComposePhasePolyBoxes, DecomposeBoxes,
    GadgetisationReport, GateSetPredicate, HadamardGadgetisation, ReplaceTWithRz,
    check_phase_poly_box, check_rz_angles, clifford_boundary, compose_phase_poly_boxes,
    count_conditional_x, count_internal_hadamards, decompose_boxes, gadgetise_hadamards,
    is_clifford_circuit, replace_t_with_rz,
};
