//! Gate angles.
//!
//! Angles are stored in radians. Rotations that feed phase polynomials are
//! converted to half-turns (multiples of π) with [`ParameterExpression::half_turns`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A symbolic or concrete angle expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant value in radians.
    Constant(f64),
    /// A free symbol.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant angle in radians.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create an angle from a multiple of π.
    pub fn from_half_turns(value: f64) -> Self {
        ParameterExpression::Constant(value * PI)
    }

    /// Create a free symbol.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to radians, if the expression is concrete.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Evaluate to half-turns (radians / π), if the expression is concrete.
    pub fn half_turns(&self) -> Option<f64> {
        self.as_f64().map(|v| v / PI)
    }

    /// Name of the first free symbol, for error reporting.
    pub fn first_symbol(&self) -> Option<&str> {
        match self {
            ParameterExpression::Symbol(name) => Some(name),
            ParameterExpression::Constant(_) | ParameterExpression::Pi => None,
            ParameterExpression::Neg(e) => e.first_symbol(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.first_symbol().or_else(|| b.first_symbol()),
        }
    }

    /// Bind a symbol to a value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        match self {
            ParameterExpression::Symbol(n) if n == name => ParameterExpression::Constant(value),
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::Symbol(_) => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind(name, value))),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
        }
    }

    /// The negated angle, folded to a constant when possible.
    pub fn negated(&self) -> Self {
        match self.as_f64() {
            Some(v) => ParameterExpression::Constant(-v),
            None => ParameterExpression::Neg(Box::new(self.clone())),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_half_turns() {
        let p = ParameterExpression::constant(PI / 4.0);
        assert!(!p.is_symbolic());
        assert!((p.half_turns().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_symbol() {
        let p = ParameterExpression::symbol("theta");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert_eq!(p.first_symbol(), Some("theta"));
    }

    #[test]
    fn test_bind_and_negate() {
        let p = -ParameterExpression::symbol("theta");
        assert!(p.negated().is_symbolic());
        let bound = p.bind("theta", PI / 2.0);
        assert!((bound.as_f64().unwrap() + PI / 2.0).abs() < 1e-12);
        assert!((bound.negated().as_f64().unwrap() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_half_turns() {
        let p = ParameterExpression::from_half_turns(-0.5);
        assert!((p.as_f64().unwrap() + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero_is_not_concrete() {
        let p = ParameterExpression::Div(
            Box::new(ParameterExpression::pi()),
            Box::new(ParameterExpression::constant(0.0)),
        );
        assert_eq!(p.as_f64(), None);
    }
}
