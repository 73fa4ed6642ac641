//! Gate-set agnostic passes.
//!
//! None of these consult hardware properties. They work on the
//! `{h, phasepolybox}` normal form and the gates it is built from.

pub mod boundary;
pub mod compose;
pub mod decompose;
pub mod gadgetise;
pub mod verification;

pub use boundary::{clifford_boundary, count_internal_hadamards};
pub use compose::{ComposePhasePolyBoxes, compose_phase_poly_boxes};
pub use decompose::{DecomposeBoxes, ReplaceTWithRz, decompose_boxes, replace_t_with_rz};
pub use gadgetise::{GadgetisationReport, HadamardGadgetisation, gadgetise_hadamards};
pub use verification::{
    CliffordTReport, CliffordTVerification, GateSetPredicate, check_phase_poly_box,
    check_rz_angles, count_conditional_x, is_clifford_circuit,
};
