//! Circuit intermediate representation for T-count optimisation.
//!
//! This crate holds the data structures that the gadgetisation and Clifford
//! resynthesis passes in `topt-compile` operate on.
//!
//! # Core Components
//!
//! - **Wires**: [`QubitId`], [`ClbitId`] and their register-aware [`Qubit`], [`Clbit`]
//! - **Gates**: [`StandardGate`] for the Clifford+T+rotation gate set and
//!   [`CompositeGate`] for compiler-built boxes
//! - **Phase polynomials**: [`PhasePolyBox`] (CNOT+Rz blocks) over a GF(2)
//!   [`LinearMap`]
//! - **Paulis**: [`Pauli`] and wire-keyed [`PauliTensor`]
//! - **Circuit**: [`Circuit`], a validated, ordered instruction list
//!
//! # Example: Absorbing a CNOT+T block
//!
//! ```rust
//! use topt_ir::{Circuit, PhasePolyBox, QubitId};
//!
//! let mut circuit = Circuit::with_size("block", 2, 0);
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.t(QubitId(1)).unwrap();
//!
//! let block = PhasePolyBox::from_circuit(&circuit).unwrap();
//! assert_eq!(block.t_count(), 1);
//! assert!(!block.is_clifford());
//! ```
//!
//! # Angles
//!
//! Gate angles are stored in radians. Phase-polynomial terms and Pauli
//! gadgets use half-turns (multiples of π): `T` is `0.25`, `S` is `0.5`.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod linear;
pub mod parameter;
pub mod pauli;
pub mod phase_poly;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{
    ANGLE_EPSILON, ClassicalCondition, CompositeGate, Gate, GateKind, PauliGadget,
    PauliGadgetSet, StandardGate, is_multiple_of,
};
pub use instruction::{Instruction, InstructionKind};
pub use linear::LinearMap;
pub use parameter::ParameterExpression;
pub use pauli::{Pauli, PauliTensor};
pub use phase_poly::{PhasePolyBox, PhasePolyBuilder, PhaseTerm, parity_gadget};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
