//! Gate-set and Clifford+T validators.
//!
//! These never rewrite a circuit. The free functions are usable on their own;
//! [`CliffordTVerification`] wraps them as an analysis pass.

use tracing::debug;

use topt_ir::{
    Circuit, CompositeGate, GateKind, InstructionKind, ParameterExpression, PhasePolyBox,
    StandardGate, is_multiple_of,
};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Non-Clifford angles, in half-turns modulo 2, that a T or T† sequence can reach.
const T_ANGLES: [f64; 4] = [0.25, 0.75, 1.25, 1.75];

/// Accepts circuits whose instructions all have one of a fixed set of names.
///
/// Conditional gates never match, whatever their name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSetPredicate {
    allowed: Vec<&'static str>,
}

impl GateSetPredicate {
    /// Create a predicate over the given instruction names.
    pub fn new(allowed: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// The `{h, phasepolybox}` gate set that gadgetisation works on.
    /// Barriers are accepted too.
    pub fn hadamard_phase_poly() -> Self {
        Self::new(["h", "phasepolybox", "barrier"])
    }

    /// The accepted names.
    pub fn allowed(&self) -> &[&'static str] {
        &self.allowed
    }

    /// Whether every instruction is in the set.
    pub fn verify(&self, circuit: &Circuit) -> bool {
        self.check(circuit).is_ok()
    }

    /// Like [`GateSetPredicate::verify`], naming the first offending instruction.
    pub fn check(&self, circuit: &Circuit) -> CompileResult<()> {
        for inst in circuit.instructions() {
            let name = inst.name();
            if inst.condition().is_some() || !self.allowed.contains(&name) {
                let gate_name = match inst.condition() {
                    Some(_) => format!("conditional {name}"),
                    None => name.to_string(),
                };
                return Err(CompileError::InvalidGateSet {
                    gate_name,
                    allowed: self.allowed.join(", "),
                });
            }
        }
        Ok(())
    }
}

/// Whether the circuit contains only unconditional Clifford operations.
///
/// Boxes count when their content is Clifford. Barriers are ignored and
/// measurements fail the check.
pub fn is_clifford_circuit(circuit: &Circuit) -> bool {
    circuit.instructions().iter().all(|inst| match &inst.kind {
        InstructionKind::Barrier => true,
        InstructionKind::Measure => false,
        InstructionKind::Gate(g) => {
            g.condition.is_none()
                && match &g.kind {
                    GateKind::Standard(s) => s.is_clifford(),
                    GateKind::Composite(CompositeGate::PhasePoly(b)) => b.is_clifford(),
                    GateKind::Composite(CompositeGate::FSwap) => true,
                    GateKind::Composite(CompositeGate::PauliGadgets(set)) => set
                        .gadgets()
                        .iter()
                        .all(|gadget| is_multiple_of(gadget.half_turns, 0.5)),
                }
        }
    })
}

/// Check that every non-Clifford rotation is a Clifford+T angle.
///
/// Looks at `rz`, `p`, `t` and `tdg` gates, and at the terms of every
/// phase-polynomial box. A circuit with none of these fails with
/// [`CompileError::EmptyCircuitInput`].
pub fn check_rz_angles(circuit: &Circuit) -> CompileResult<()> {
    let mut rotations = 0;
    for inst in circuit.instructions() {
        let Some(gate) = inst.as_gate() else {
            continue;
        };
        match &gate.kind {
            GateKind::Standard(StandardGate::T | StandardGate::Tdg) => rotations += 1,
            GateKind::Standard(s @ (StandardGate::Rz(p) | StandardGate::P(p))) => {
                check_angle(s.name(), concrete(s.name(), p)?)?;
                rotations += 1;
            }
            GateKind::Standard(s @ StandardGate::CP(p)) => {
                if !is_multiple_of(concrete(s.name(), p)?, 1.0) {
                    return Err(CompileError::InvalidGateSet {
                        gate_name: s.name().to_string(),
                        allowed: "single-qubit non-Clifford rotations".into(),
                    });
                }
            }
            GateKind::Standard(_) => {}
            GateKind::Composite(CompositeGate::PhasePoly(b)) => {
                rotations += check_box_terms(b)?;
            }
            GateKind::Composite(_) => {}
        }
    }
    if rotations == 0 {
        return Err(CompileError::EmptyCircuitInput {
            gate_name: "rz".into(),
        });
    }
    debug!(rotations, "Clifford+T angle check passed");
    Ok(())
}

/// Check a phase-polynomial box the way [`check_rz_angles`] checks a circuit.
pub fn check_phase_poly_box(pbox: &PhasePolyBox) -> CompileResult<()> {
    if check_box_terms(pbox)? == 0 {
        return Err(CompileError::EmptyCircuitInput {
            gate_name: "phasepolybox".into(),
        });
    }
    Ok(())
}

fn check_box_terms(pbox: &PhasePolyBox) -> CompileResult<usize> {
    for term in pbox.terms() {
        check_angle("phasepolybox", term.half_turns)?;
    }
    Ok(pbox.terms().len())
}

fn concrete(gate_name: &str, p: &ParameterExpression) -> CompileResult<f64> {
    p.half_turns().ok_or_else(|| CompileError::SymbolicParameter {
        gate_name: gate_name.to_string(),
        symbol: p.first_symbol().unwrap_or_default().to_string(),
    })
}

fn check_angle(gate_name: &str, half_turns: f64) -> CompileResult<()> {
    if is_multiple_of(half_turns, 0.5) {
        return Ok(());
    }
    let reduced = half_turns.rem_euclid(2.0);
    if T_ANGLES
        .iter()
        .any(|a| (reduced - a).abs() < topt_ir::ANGLE_EPSILON)
    {
        Ok(())
    } else {
        Err(CompileError::NonCliffordTAngle {
            gate_name: gate_name.to_string(),
            half_turns,
        })
    }
}

/// Number of classically conditioned `X` gates.
pub fn count_conditional_x(circuit: &Circuit) -> usize {
    circuit
        .instructions()
        .iter()
        .filter(|inst| {
            inst.condition().is_some()
                && inst
                    .as_gate()
                    .and_then(|g| g.as_standard())
                    .is_some_and(|s| *s == StandardGate::X)
        })
        .count()
}

/// Findings of [`CliffordTVerification`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliffordTReport {
    /// Whether the circuit is Clifford-only.
    pub is_clifford: bool,
    /// Number of classically conditioned `X` gates.
    pub conditional_x: usize,
}

/// Analysis pass checking Clifford+T angles.
///
/// A Clifford-only circuit passes without any rotation. Records a
/// [`CliffordTReport`].
pub struct CliffordTVerification;

impl Pass for CliffordTVerification {
    fn name(&self) -> &'static str {
        "clifford_t_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let is_clifford = is_clifford_circuit(circuit);
        if !is_clifford {
            check_rz_angles(circuit)?;
        }
        properties.insert(CliffordTReport {
            is_clifford,
            conditional_x: count_conditional_x(circuit),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use topt_ir::{ClbitId, Instruction, QubitId};

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_clifford_t_angles() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .cx(q(0), q(1))
            .unwrap()
            .rz(PI / 4.0, q(1))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap()
            .rz(-PI / 4.0, q(1))
            .unwrap()
            .rz(0.75 * PI, q(1))
            .unwrap()
            .t(q(0))
            .unwrap()
            .rz(-0.75 * PI, q(0))
            .unwrap()
            .rz(-1.25 * PI, q(1))
            .unwrap();
        assert!(check_rz_angles(&circuit).is_ok());

        circuit.rz(0.61 * PI, q(0)).unwrap();
        assert!(matches!(
            check_rz_angles(&circuit),
            Err(CompileError::NonCliffordTAngle { .. })
        ));
    }

    #[test]
    fn test_symbolic_angle_rejected() {
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit
            .rz(ParameterExpression::symbol("theta"), q(0))
            .unwrap();
        assert!(matches!(
            check_rz_angles(&circuit),
            Err(CompileError::SymbolicParameter { symbol, .. }) if symbol == "theta"
        ));
    }

    #[test]
    fn test_no_rotation_is_empty_input() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(q(0)).unwrap().cx(q(0), q(1)).unwrap();
        assert!(matches!(
            check_rz_angles(&circuit),
            Err(CompileError::EmptyCircuitInput { .. })
        ));
    }

    #[test]
    fn test_non_clifford_controlled_phase() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.t(q(0)).unwrap().cp(PI / 4.0, q(0), q(1)).unwrap();
        assert!(matches!(
            check_rz_angles(&circuit),
            Err(CompileError::InvalidGateSet { .. })
        ));
    }

    #[test]
    fn test_phase_poly_box_check() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .cx(q(0), q(1))
            .unwrap()
            .rz(PI / 2.0, q(0))
            .unwrap()
            .cx(q(0), q(1))
            .unwrap();
        let clifford = PhasePolyBox::from_circuit(&circuit).unwrap();
        assert!(check_phase_poly_box(&clifford).is_ok());

        circuit.rz(0.19 * PI, q(1)).unwrap();
        let bad = PhasePolyBox::from_circuit(&circuit).unwrap();
        assert!(check_phase_poly_box(&bad).is_err());
    }

    #[test]
    fn test_conditional_counting() {
        let mut circuit = Circuit::with_size("c", 3, 3);
        circuit.x(q(0)).unwrap().cx(q(1), q(2)).unwrap();
        for i in 0..3 {
            circuit.measure(q(i), ClbitId(i)).unwrap();
        }
        assert_eq!(count_conditional_x(&circuit), 0);

        circuit.x_if(q(0), ClbitId(0), 1).unwrap();
        assert_eq!(count_conditional_x(&circuit), 1);

        // Only X is counted.
        circuit
            .apply(Instruction::conditional(
                StandardGate::Y,
                [q(0)],
                topt_ir::ClassicalCondition::new([ClbitId(0)], 1),
            ))
            .unwrap();
        circuit
            .apply(Instruction::conditional(
                StandardGate::CZ,
                [q(0), q(1)],
                topt_ir::ClassicalCondition::new([ClbitId(0)], 1),
            ))
            .unwrap();
        assert_eq!(count_conditional_x(&circuit), 1);

        circuit.x_if(q(2), ClbitId(1), 0).unwrap();
        assert_eq!(count_conditional_x(&circuit), 2);
    }

    #[test]
    fn test_gate_set_predicate() {
        let predicate = GateSetPredicate::hadamard_phase_poly();
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(q(0)).unwrap().barrier_all().unwrap();
        assert!(predicate.verify(&circuit));

        circuit.cx(q(0), q(1)).unwrap();
        assert!(matches!(
            predicate.check(&circuit),
            Err(CompileError::InvalidGateSet { gate_name, .. }) if gate_name == "cx"
        ));
    }

    #[test]
    fn test_is_clifford_circuit() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .h(q(0))
            .unwrap()
            .s(q(1))
            .unwrap()
            .cz(q(0), q(1))
            .unwrap()
            .rz(PI, q(1))
            .unwrap()
            .fswap(q(0), q(1))
            .unwrap();
        assert!(is_clifford_circuit(&circuit));
        circuit.t(q(0)).unwrap();
        assert!(!is_clifford_circuit(&circuit));
    }

    #[test]
    fn test_verification_pass_records_report() {
        let mut circuit = Circuit::with_size("c", 1, 1);
        circuit.t(q(0)).unwrap().x_if(q(0), ClbitId(0), 1).unwrap();
        let mut props = PropertySet::new();
        CliffordTVerification.run(&mut circuit, &mut props).unwrap();
        let report = props.get::<CliffordTReport>().unwrap();
        assert!(!report.is_clifford);
        assert_eq!(report.conditional_x, 1);
    }
}
