//! Gadgetise command implementation.

use anyhow::Result;
use console::style;

use topt_compile::PassManagerBuilder;
use topt_compile::passes::GadgetisationReport;

use super::common::{default_output_path, load_circuit, load_config, write_circuit};

/// Execute the gadgetise command.
pub fn execute(
    input: &str,
    output: Option<&str>,
    compose: bool,
    verify: bool,
    config: Option<&str>,
) -> Result<()> {
    println!(
        "{} Gadgetising {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let config = load_config(config)?;
    let mut circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qubits, {} instructions, {} Hadamards",
        circuit.num_qubits(),
        circuit.len(),
        circuit.count_ops("h")
    );

    let (pm, mut props) = PassManagerBuilder::new()
        .with_config(config)
        .with_verification(verify)
        .with_composition(compose)
        .build();
    println!("  Running passes: {}", pm.pass_names().join(", "));

    pm.run(&mut circuit, &mut props)?;

    match props.get::<GadgetisationReport>() {
        Some(report) if report.internal_hadamards > 0 => {
            println!(
                "{} Replaced {} internal Hadamards",
                style("✓").green().bold(),
                report.internal_hadamards
            );
            if let Some((first, last)) = report.boundary {
                println!("  Non-Clifford region: blocks {first}..={last}");
            }
            println!(
                "  Ancillas: {} (qubits {}..{})",
                report.ancillas.len(),
                report.original_qubits,
                circuit.num_qubits()
            );
        }
        _ => println!(
            "{} No internal Hadamards, circuit unchanged",
            style("✓").green().bold()
        ),
    }

    let output_path = output.map_or_else(|| default_output_path(input, "_gadgetised"), String::from);
    write_circuit(&circuit, Some(&output_path))?;
    println!("  Output: {}", style(&output_path).green());

    Ok(())
}
