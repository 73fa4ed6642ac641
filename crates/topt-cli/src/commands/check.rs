//! Check command implementation.

use anyhow::Result;
use console::style;

use topt_compile::CompileError;
use topt_compile::passes::{
    GateSetPredicate, check_rz_angles, clifford_boundary, count_conditional_x,
    count_internal_hadamards, is_clifford_circuit,
};
use topt_ir::Circuit;

use super::common::load_circuit;

/// Execute the check command.
pub fn execute(input: &str) -> Result<()> {
    let circuit = load_circuit(input)?;

    println!("{} {}", style("Circuit:").bold(), style(input).green());
    println!(
        "  {} qubits, {} clbits, {} instructions, depth {}",
        circuit.num_qubits(),
        circuit.num_clbits(),
        circuit.len(),
        circuit.depth()
    );

    let mut counts: Vec<_> = circuit.op_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let summary: Vec<String> = counts.iter().map(|(name, n)| format!("{name}: {n}")).collect();
    println!("  Gates: {}", summary.join(", "));

    let clifford = is_clifford_circuit(&circuit);
    println!("  Clifford only: {}", yes_no(clifford));
    if !clifford {
        match check_rz_angles(&circuit) {
            Ok(()) => println!("  Clifford+T angles: {}", style("ok").green()),
            Err(e) => println!("  Clifford+T angles: {}", style(e).red()),
        }
    }
    println!("  Conditional X gates: {}", count_conditional_x(&circuit));

    report_normal_form(&circuit)
}

fn report_normal_form(circuit: &Circuit) -> Result<()> {
    let predicate = GateSetPredicate::hadamard_phase_poly();
    if let Err(e) = predicate.check(circuit) {
        println!("  Phase-polynomial normal form: {}", style("no").yellow());
        println!("    {e}");
        println!("    Run `topt gadgetise --compose` to collect phase-polynomial boxes.");
        return Ok(());
    }
    println!("  Phase-polynomial normal form: {}", yes_no(true));

    let t_count: usize = circuit
        .instructions()
        .iter()
        .filter_map(|inst| inst.as_gate().and_then(|g| g.as_phase_poly()))
        .map(|b| b.t_count())
        .sum();
    println!("  T-count: {t_count}");

    match clifford_boundary(circuit) {
        Ok((first, last)) => {
            println!("  Non-Clifford region: blocks {first}..={last}");
            println!(
                "  Internal Hadamards: {}",
                count_internal_hadamards(circuit)?
            );
        }
        Err(CompileError::NoNonCliffordBlock) => {
            println!("  Non-Clifford region: none");
            println!("  Internal Hadamards: 0");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn yes_no(value: bool) -> console::StyledObject<&'static str> {
    if value {
        style("yes").green()
    } else {
        style("no").yellow()
    }
}
