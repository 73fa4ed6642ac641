//! Clifford resynthesis from a phase polynomial and a Pauli operator.
//!
//! A phase-polynomial block factors as `U = L·D`, with `D` the diagonal part
//! and `L` the linear reversible part. For a Pauli `P`,
//!
//! ```text
//! U† P U = D† (L† P L) D = Π_{k anticommuting} exp(iπ a_k Z_k) · P'
//! ```
//!
//! where `P' = L† P L` and the product runs over phase terms whose Z string
//! anticommutes with `P'`. The correction is therefore the Pauli circuit of
//! `P'` followed by one phase gadget of angle `-2·a_k` per surviving term.
//! Nothing here builds a unitary.

use num_complex::Complex64;
use tracing::{debug, instrument};

use topt_ir::{
    Circuit, CompositeGate, Instruction, Pauli, PauliGadgetSet, PauliTensor, PhasePolyBox,
    QubitId, StandardGate,
};

use crate::config::TransformConfig;
use crate::error::CompileResult;
use crate::tableau::CliffordTableau;

/// The CNOT circuit realising the linear part of `pbox`.
pub fn cnot_circuit(pbox: &PhasePolyBox, section_size: usize) -> CompileResult<Circuit> {
    let mut circuit = Circuit::with_size("linear", pbox.num_qubits(), 0);
    for (control, target) in pbox.linear().synthesise_cnots(section_size) {
        circuit.cx(QubitId(control as u32), QubitId(target as u32))?;
    }
    Ok(circuit)
}

/// `P' = L† P L` for the linear part `L` of `pbox`.
///
/// The coefficient keeps unit magnitude; only labels move and the sign may flip.
pub fn pauli_conjugate(
    pbox: &PhasePolyBox,
    pauli: &PauliTensor,
    section_size: usize,
) -> CompileResult<PauliTensor> {
    let l_dagger = cnot_circuit(pbox, section_size)?.dagger()?;
    let tableau = CliffordTableau::from_circuit(&l_dagger)?;
    tableau.conjugate(pauli)
}

/// One `{Z, I}` tensor per phase term, carrying the angle in its coefficient.
pub fn phase_term_tensors(pbox: &PhasePolyBox) -> Vec<PauliTensor> {
    pbox.terms()
        .iter()
        .map(|term| {
            PauliTensor::new(
                term.parity
                    .iter()
                    .enumerate()
                    .filter(|(_, bit)| **bit)
                    .map(|(i, _)| (QubitId(i as u32), Pauli::Z)),
            )
            .with_coeff(Complex64::new(term.half_turns, 0.0))
        })
        .collect()
}

/// Keep the terms that anticommute with `pauli`, with their angle scaled by `-2`.
///
/// Commuting terms cancel between `D†` and `D` and are dropped.
pub fn updated_paulis(terms: &[PauliTensor], pauli: &PauliTensor) -> Vec<PauliTensor> {
    terms
        .iter()
        .filter(|t| !t.commutes_with(pauli))
        .map(|t| t.clone().with_coeff(t.coeff * -2.0))
        .collect()
}

/// A circuit applying each tensor as a Pauli exponential of angle `Re(coeff)`.
///
/// The tensors must commute pairwise. The circuit is at least `min_qubits`
/// wide; an empty list gives an empty circuit.
pub fn phase_gadget_circuit(terms: &[PauliTensor], min_qubits: u32) -> CompileResult<Circuit> {
    phase_gadget_circuit_with(terms, min_qubits, true)
}

fn phase_gadget_circuit_with(
    terms: &[PauliTensor],
    min_qubits: u32,
    decompose: bool,
) -> CompileResult<Circuit> {
    let referenced = terms
        .iter()
        .filter_map(|t| t.string.keys().next_back())
        .map(|q| q.0 + 1)
        .max()
        .unwrap_or(0);
    let width = min_qubits.max(referenced);
    let mut circuit = Circuit::with_size("phase_gadgets", width, 0);
    if terms.is_empty() {
        return Ok(circuit);
    }

    let mut gadgets = PauliGadgetSet::new(width);
    for term in terms {
        gadgets.push(term.dense(width as usize), term.coeff.re)?;
    }
    let qubits: Vec<QubitId> = (0..width).map(QubitId).collect();
    let gate = CompositeGate::PauliGadgets(gadgets);
    if decompose {
        for inst in gate.decompose(&qubits, 1)? {
            circuit.apply(inst)?;
        }
    } else {
        circuit.gate(gate, qubits)?;
    }
    Ok(circuit)
}

/// Single-qubit Pauli gates realising the labels of `pauli` on `num_qubits` wires.
///
/// Identity factors emit nothing and the coefficient is dropped.
pub fn pauli_tensor_to_circuit(pauli: &PauliTensor, num_qubits: u32) -> CompileResult<Circuit> {
    let mut circuit = Circuit::with_size("pauli", num_qubits, 0);
    for (&qubit, &label) in &pauli.string {
        let gate = match label {
            Pauli::I => continue,
            Pauli::X => StandardGate::X,
            Pauli::Y => StandardGate::Y,
            Pauli::Z => StandardGate::Z,
        };
        circuit.apply(Instruction::single_qubit_gate(gate, qubit))?;
    }
    Ok(circuit)
}

/// Synthesise the Clifford `U† P U` for the block `U = pbox`.
///
/// The returned circuit runs on the block's wires and, read in circuit order,
/// equals `U ; P ; U†` up to global phase. It holds Pauli gates followed by
/// CNOT ladders around Clifford `Rz` rotations (or a single `pauli_gadgets`
/// box when `config.decompose_output` is off).
#[instrument(skip(pbox, pauli, config), fields(qubits = pbox.num_qubits(), terms = pbox.terms().len()))]
pub fn synthesise_clifford(
    pbox: &PhasePolyBox,
    pauli: &PauliTensor,
    config: &TransformConfig,
) -> CompileResult<Circuit> {
    config.validate()?;
    let n = pbox.num_qubits();

    let conjugated = pauli_conjugate(pbox, pauli, config.pmh_section_size)?;
    debug!(input = %pauli, conjugated = %conjugated, "Conjugated Pauli through linear part");

    let mut circuit = pauli_tensor_to_circuit(&conjugated, n)?;
    let survivors = updated_paulis(&phase_term_tensors(pbox), &conjugated);
    debug!(
        kept = survivors.len(),
        dropped = pbox.terms().len() - survivors.len(),
        "Filtered phase terms"
    );

    let gadgets = phase_gadget_circuit_with(&survivors, n, config.decompose_output)?;
    circuit.append(&gadgets)?;
    circuit.set_name("clifford_correction");
    Ok(circuit)
}
