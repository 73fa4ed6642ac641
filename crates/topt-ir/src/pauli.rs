//! Pauli operators and tensors keyed by wire.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::qubit::QubitId;

/// A single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Symplectic encoding `(x, z)`, with Y as `(1, 1)`.
    #[inline]
    pub fn to_bits(self) -> (bool, bool) {
        match self {
            Pauli::I => (false, false),
            Pauli::X => (true, false),
            Pauli::Y => (true, true),
            Pauli::Z => (false, true),
        }
    }

    /// Inverse of [`Pauli::to_bits`].
    #[inline]
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Whether two single-qubit Paulis anticommute.
    #[inline]
    pub fn anticommutes_with(self, other: Pauli) -> bool {
        self != Pauli::I && other != Pauli::I && self != other
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        };
        write!(f, "{c}")
    }
}

/// A Pauli string with a complex coefficient.
///
/// Wires absent from the map carry the identity. The coefficient is a phase
/// (`±1`, `±i`) for Hermitian or anti-Hermitian strings, or a real angle when
/// the tensor labels a phase gadget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTensor {
    /// Non-identity factors, ordered by wire.
    pub string: BTreeMap<QubitId, Pauli>,
    /// Scalar coefficient.
    pub coeff: Complex64,
}

impl PauliTensor {
    /// The identity with unit coefficient.
    pub fn identity() -> Self {
        Self {
            string: BTreeMap::new(),
            coeff: Complex64::new(1.0, 0.0),
        }
    }

    /// Build from `(wire, pauli)` pairs with unit coefficient. Identity
    /// factors are dropped.
    pub fn new(factors: impl IntoIterator<Item = (QubitId, Pauli)>) -> Self {
        Self {
            string: factors
                .into_iter()
                .filter(|(_, p)| *p != Pauli::I)
                .collect(),
            coeff: Complex64::new(1.0, 0.0),
        }
    }

    /// A single `X` on wire `index`, identity elsewhere.
    pub fn from_x_index(index: u32) -> Self {
        Self::new([(QubitId(index), Pauli::X)])
    }

    /// Replace the coefficient.
    #[must_use]
    pub fn with_coeff(mut self, coeff: Complex64) -> Self {
        self.coeff = coeff;
        self
    }

    /// The factor on `qubit`.
    pub fn get(&self, qubit: QubitId) -> Pauli {
        self.string.get(&qubit).copied().unwrap_or(Pauli::I)
    }

    /// Set the factor on `qubit`; setting `I` removes it.
    pub fn set(&mut self, qubit: QubitId, pauli: Pauli) {
        if pauli == Pauli::I {
            self.string.remove(&qubit);
        } else {
            self.string.insert(qubit, pauli);
        }
    }

    /// Whether every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.string.is_empty()
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.string.len()
    }

    /// Whether the strings commute (coefficients are ignored).
    pub fn commutes_with(&self, other: &PauliTensor) -> bool {
        let anticommuting = self
            .string
            .iter()
            .filter(|(q, p)| p.anticommutes_with(other.get(**q)))
            .count();
        anticommuting % 2 == 0
    }

    /// Dense factor list over wires `0..n`.
    pub fn dense(&self, n: usize) -> Vec<Pauli> {
        (0..n).map(|i| self.get(QubitId(i as u32))).collect()
    }
}

impl fmt::Display for PauliTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.coeff.re, self.coeff.im)?;
        if self.string.is_empty() {
            return write!(f, " I");
        }
        for (q, p) in &self.string {
            write!(f, " {p}{}", q.0)?;
        }
        Ok(())
    }
}
