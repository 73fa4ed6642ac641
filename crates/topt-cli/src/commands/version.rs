//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - T-count preserving rewrites for Clifford+T circuits",
        style("topt").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  topt-ir       Circuits, phase-polynomial boxes, Pauli tensors");
    println!("  topt-compile  Gadgetisation, resynthesis and pass manager");
    println!("  topt-cli      Command-line interface");
    println!();
    println!("License: {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
