//! Hadamard gadgetisation.
//!
//! Every Hadamard strictly between the first and last non-Clifford block is
//! replaced by a measurement gadget on a fresh ancilla prepared in `|+⟩`:
//!
//! ```text
//! wire ──FSWAP──────────────X──
//!          │                ║
//! anc  ──FSWAP──H──M════════╝
//! ```
//!
//! The unitary part of the output then has no internal Hadamards, at the cost
//! of one ancilla, one measurement and one classically controlled `X` each.

use tracing::{debug, instrument, trace};

use topt_ir::{Circuit, QubitId};

use crate::config::TransformConfig;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::passes::agnostic::boundary::{clifford_boundary, count_internal_hadamards};
use crate::property::PropertySet;

/// What [`HadamardGadgetisation`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GadgetisationReport {
    /// Hadamards replaced by gadgets.
    pub internal_hadamards: usize,
    /// Qubits the circuit had before ancillas were added.
    pub original_qubits: usize,
    /// Block positions of the first and last non-Clifford block, when gadgets were inserted.
    pub boundary: Option<(usize, usize)>,
    /// Ancilla qubits, one per gadget in insertion order.
    pub ancillas: Vec<QubitId>,
}

/// Replace every internal Hadamard of an `{h, phasepolybox}` circuit with a
/// measurement gadget.
///
/// With no internal Hadamard the result is a copy of the input.
pub fn gadgetise_hadamards(circuit: &Circuit, config: &TransformConfig) -> CompileResult<Circuit> {
    gadgetise_with_report(circuit, config).map(|(out, _)| out)
}

#[instrument(skip(circuit, config), fields(qubits = circuit.num_qubits(), ops = circuit.len()))]
fn gadgetise_with_report(
    circuit: &Circuit,
    config: &TransformConfig,
) -> CompileResult<(Circuit, GadgetisationReport)> {
    config.validate()?;
    let internal = count_internal_hadamards(circuit)?;
    let mut report = GadgetisationReport {
        internal_hadamards: internal,
        original_qubits: circuit.num_qubits(),
        ..GadgetisationReport::default()
    };
    if internal == 0 {
        debug!("No internal Hadamards, circuit unchanged");
        return Ok((circuit.clone(), report));
    }

    let mut out = circuit.empty_like();
    let ancillas = out.add_qreg(config.ancilla_register.as_str(), internal as u32);
    let bits = out.add_creg(config.ancilla_bit_register.as_str(), internal as u32);
    for &ancilla in &ancillas {
        out.h(ancilla)?;
    }
    out.barrier(ancillas.iter().copied())?;

    let (first, last) = clifford_boundary(circuit)?;
    let mut blocks_seen = 0;
    let mut next = 0;
    for inst in circuit.instructions() {
        let is_block = inst.as_gate().and_then(|g| g.as_phase_poly()).is_some();
        if inst.is_hadamard() && first < blocks_seen && blocks_seen <= last {
            let wire = inst.qubits[0];
            let (ancilla, bit) = (ancillas[next], bits[next]);
            trace!(%wire, %ancilla, "Gadgetising Hadamard");
            out.fswap(wire, ancilla)?
                .h(ancilla)?
                .measure(ancilla, bit)?
                .x_if(wire, bit, 1)?;
            next += 1;
            continue;
        }
        out.apply(inst.clone())?;
        if is_block {
            blocks_seen += 1;
        }
    }

    debug!(
        gadgets = next,
        width = out.num_qubits(),
        "Inserted Hadamard gadgets"
    );
    report.boundary = Some((first, last));
    report.ancillas = ancillas;
    Ok((out, report))
}

/// Transformation pass wrapping [`gadgetise_hadamards`].
///
/// Reads the register names from the property set config and records a
/// [`GadgetisationReport`].
pub struct HadamardGadgetisation;

impl Pass for HadamardGadgetisation {
    fn name(&self) -> &'static str {
        "hadamard_gadgetisation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let (out, report) = gadgetise_with_report(circuit, &properties.config)?;
        *circuit = out;
        properties.insert(report);
        Ok(())
    }
}
