//! Resynth command implementation.

use anyhow::{Context, Result};
use console::style;

use topt_compile::passes::check_phase_poly_box;
use topt_compile::{circuits_equivalent, pauli_tensor_to_circuit, synthesise_clifford};
use topt_ir::{Circuit, PauliTensor, PhasePolyBox, QubitId};

use super::common::{load_block, load_config, parse_pauli, write_circuit};

/// Execute the resynth command.
pub fn execute(
    input: &str,
    x_index: Option<u32>,
    pauli: Option<&str>,
    output: Option<&str>,
    verify: bool,
    config: Option<&str>,
) -> Result<()> {
    let config = load_config(config)?;
    let pbox = load_block(input)?;
    check_phase_poly_box(&pbox).with_context(|| format!("{input} is not a Clifford+T block"))?;

    let pauli = match (x_index, pauli) {
        (_, Some(label)) => parse_pauli(label)?,
        (Some(index), None) => PauliTensor::from_x_index(index),
        (None, None) => anyhow::bail!("One of --x-index or --pauli is required"),
    };
    if let Some((q, _)) = pauli.string.last_key_value() {
        if q.0 >= pbox.num_qubits() {
            anyhow::bail!(
                "Pauli acts on wire {} but the block has {} wires",
                q.0,
                pbox.num_qubits()
            );
        }
    }

    eprintln!(
        "{} Resynthesising {} ({} wires, T-count {}) for {}",
        style("→").cyan().bold(),
        style(input).green(),
        pbox.num_qubits(),
        pbox.t_count(),
        style(&pauli).yellow()
    );

    let clifford = synthesise_clifford(&pbox, &pauli, &config)?;
    eprintln!(
        "  Result: {} instructions, {} CX, {} H",
        clifford.len(),
        clifford.count_ops("cx"),
        clifford.count_ops("h")
    );

    if verify {
        let reference = conjugation_reference(&pbox, &pauli)?;
        let equal = circuits_equivalent(
            &clifford,
            &reference,
            config.pmh_section_size,
            config.unitary_tolerance,
        )?;
        if !equal {
            anyhow::bail!("Synthesised circuit does not match U ; P ; U†");
        }
        eprintln!("{} Matches U ; P ; U† up to global phase", style("✓").green().bold());
    }

    write_circuit(&clifford, output)?;
    if let Some(path) = output {
        eprintln!("  Output: {}", style(path).green());
    }
    Ok(())
}

/// `U ; P ; U†` with both blocks kept whole.
fn conjugation_reference(pbox: &PhasePolyBox, pauli: &PauliTensor) -> Result<Circuit> {
    let n = pbox.num_qubits();
    let wires: Vec<QubitId> = (0..n).map(QubitId).collect();
    let mut circuit = Circuit::with_size("reference", n, 0);
    circuit.phase_poly(pbox.clone(), wires.clone())?;
    circuit.append(&pauli_tensor_to_circuit(pauli, n)?)?;
    circuit.phase_poly(pbox.dagger()?, wires)?;
    Ok(circuit)
}
