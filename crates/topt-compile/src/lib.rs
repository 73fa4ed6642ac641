//! T-count preserving rewrites for Clifford+T circuits.
//!
//! This crate works on circuits in the `{h, phasepolybox}` normal form: runs
//! of CNOT and diagonal gates collected into phase-polynomial boxes,
//! separated by Hadamards. It provides two algorithms:
//!
//! 1. **Hadamard gadgetisation**: every Hadamard between the first and last
//!    non-Clifford box is teleported through an ancilla, leaving a unitary
//!    part without internal Hadamards.
//! 2. **Clifford resynthesis**: for a box `U` and a Pauli `P`, the Clifford
//!    `U† P U` is built from a tableau conjugation and a set of commuting
//!    phase gadgets, without forming a unitary.
//!
//! # Architecture
//!
//! ```text
//! Clifford+T circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (TransformConfig, reports)
//! └─────────────┘
//!       │
//!       ├── CliffordTVerification
//!       ├── ComposePhasePolyBoxes
//!       └── HadamardGadgetisation
//!       │
//!       ▼
//! Gadgetised circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use topt_compile::PassManagerBuilder;
//! use topt_compile::passes::GadgetisationReport;
//! use topt_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("demo", 2, 0);
//! circuit
//!     .t(QubitId(0)).unwrap()
//!     .h(QubitId(0)).unwrap()
//!     .cx(QubitId(0), QubitId(1)).unwrap()
//!     .t(QubitId(1)).unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new().with_composition(true).build();
//! pm.run(&mut circuit, &mut props).unwrap();
//!
//! assert_eq!(props.get::<GadgetisationReport>().unwrap().internal_hadamards, 1);
//! assert_eq!(circuit.num_qubits(), 3);
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to add a pass:
//!
//! ```rust
//! use topt_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use topt_ir::Circuit;
//!
//! struct CountGates;
//!
//! impl Pass for CountGates {
//!     fn name(&self) -> &str { "count_gates" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(circuit.len());
//!         Ok(())
//!     }
//! }
//! ```

pub mod clifford;
pub mod config;
pub mod error;
pub mod manager;
pub mod pass;
pub mod property;
pub mod tableau;
pub mod unitary;

// Built-in passes
pub mod passes;

pub use clifford::{
    cnot_circuit, pauli_conjugate, pauli_tensor_to_circuit, phase_gadget_circuit,
    phase_term_tensors, synthesise_clifford, updated_paulis,
};
pub use config::TransformConfig;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::PropertySet;
pub use tableau::CliffordTableau;
pub use unitary::{circuit_unitary, circuits_equivalent, equal_up_to_global_phase};
