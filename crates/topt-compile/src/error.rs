//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] topt_ir::IrError),

    /// Circuit contains a gate outside the set a routine accepts.
    #[error("Gate '{gate_name}' is not allowed here; expected one of: {allowed}")]
    InvalidGateSet {
        /// Name of the offending instruction.
        gate_name: String,
        /// Comma-separated list of accepted gate names.
        allowed: String,
    },

    /// Every phase-polynomial block is Clifford.
    #[error("No non-Clifford phase-polynomial block in circuit")]
    NoNonCliffordBlock,

    /// A rotation angle is still symbolic.
    #[error("Gate '{gate_name}' has symbolic parameter '{symbol}'")]
    SymbolicParameter {
        /// Name of the gate.
        gate_name: String,
        /// The unbound symbol.
        symbol: String,
    },

    /// A non-Clifford angle is not an odd multiple of π/4.
    #[error("Angle {half_turns}π on '{gate_name}' is not a Clifford+T angle")]
    NonCliffordTAngle {
        /// Name of the gate.
        gate_name: String,
        /// The angle in half-turns.
        half_turns: f64,
    },

    /// The input has no rotation to check.
    #[error("No '{gate_name}' rotation in input")]
    EmptyCircuitInput {
        /// Name of the gate.
        gate_name: String,
    },

    /// A Clifford-only routine met a non-Clifford gate.
    #[error("Gate '{0}' is not Clifford")]
    NotClifford(String),

    /// Gate has no implementation in this routine.
    #[error("Unsupported gate '{0}'")]
    UnsupportedGate(String),

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed {
        /// Name of the pass.
        name: String,
        /// Why it failed.
        reason: String,
    },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
