//! Tunable settings shared by the passes.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Settings for gadgetisation and resynthesis.
///
/// Every field has a default, so a partial YAML or JSON document is enough:
///
/// ```
/// use topt_compile::TransformConfig;
///
/// let config: TransformConfig = serde_json::from_str(r#"{"pmh_section_size": 3}"#).unwrap();
/// assert_eq!(config.pmh_section_size, 3);
/// assert_eq!(config.ancilla_register, "z_ancillas");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Column section width for Patel–Markov–Hayes CNOT synthesis.
    pub pmh_section_size: usize,
    /// Register name for gadget ancilla qubits.
    pub ancilla_register: String,
    /// Register name for gadget measurement bits.
    pub ancilla_bit_register: String,
    /// Flatten composite gates after resynthesis.
    pub decompose_output: bool,
    /// Entry-wise tolerance for unitary comparisons.
    pub unitary_tolerance: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            pmh_section_size: 2,
            ancilla_register: "z_ancillas".into(),
            ancilla_bit_register: "bits".into(),
            decompose_output: true,
            unitary_tolerance: 1e-8,
        }
    }
}

impl TransformConfig {
    /// Reject settings no pass can work with.
    pub fn validate(&self) -> CompileResult<()> {
        if self.pmh_section_size == 0 {
            return Err(CompileError::InvalidConfiguration(
                "pmh_section_size must be at least 1".into(),
            ));
        }
        if self.ancilla_register.is_empty() || self.ancilla_bit_register.is_empty() {
            return Err(CompileError::InvalidConfiguration(
                "register names must not be empty".into(),
            ));
        }
        if self.unitary_tolerance.is_nan() || self.unitary_tolerance <= 0.0 {
            return Err(CompileError::InvalidConfiguration(
                "unitary_tolerance must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TransformConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pmh_section_size, 2);
        assert_eq!(config.ancilla_bit_register, "bits");
    }

    #[test]
    fn test_invalid_settings() {
        let config = TransformConfig {
            pmh_section_size: 0,
            ..TransformConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CompileError::InvalidConfiguration(_))
        ));

        let config = TransformConfig {
            unitary_tolerance: f64::NAN,
            ..TransformConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
