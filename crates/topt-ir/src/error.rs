//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit:?} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit:?} not found in circuit{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit:?} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Parameter is unbound.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Instruction has no inverse.
    #[error("Instruction '{0}' cannot be inverted")]
    NonInvertible(String),

    /// Linear map over GF(2) is not invertible.
    #[error("Linear map on {0} wires is singular")]
    SingularLinearMap(usize),

    /// The same parity appears twice in a phase polynomial.
    #[error("Parity {0} appears more than once in phase polynomial")]
    DuplicateParity(String),

    /// A phase term acts on no wire.
    #[error("Phase term has an all-zero parity")]
    EmptyParity,

    /// A Pauli gadget anticommutes with one already in its set.
    #[error("Pauli gadget {0} does not commute with the gadgets before it")]
    NonCommutingGadget(String),

    /// Sizes of related objects disagree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected width.
        expected: usize,
        /// Actual width.
        got: usize,
    },

    /// Gate cannot be absorbed into a phase polynomial.
    #[error("Gate '{0}' cannot be absorbed into a phase polynomial")]
    NotPhasePolynomial(String),

    /// Circuit (de)serialization failed.
    #[error("Circuit serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
