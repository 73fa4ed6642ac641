//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use topt_compile::TransformConfig;
use topt_ir::{Circuit, Pauli, PauliTensor, PhasePolyBox, QubitId};

fn read_source(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let source = read_source(path)?;
    let circuit =
        Circuit::from_json(&source).with_context(|| format!("Invalid circuit in {path}"))?;
    debug!(path, qubits = circuit.num_qubits(), ops = circuit.len(), "loaded circuit");
    Ok(circuit)
}

/// Load a phase-polynomial block.
///
/// Accepts a serialized block, or a circuit of CNOT, SWAP and diagonal gates
/// which is collected into one.
pub fn load_block(path: &str) -> Result<PhasePolyBox> {
    let source = read_source(path)?;
    parse_block(&source).with_context(|| format!("Invalid block in {path}"))
}

fn parse_block(source: &str) -> Result<PhasePolyBox> {
    let value: serde_json::Value = serde_json::from_str(source).context("Not valid JSON")?;
    if value.get("linear").is_some() {
        // Deserialization checks the map is invertible and the terms fit it.
        return serde_json::from_value(value).context("Rejected phase-polynomial block");
    }
    let circuit = Circuit::from_json(source)?;
    PhasePolyBox::from_circuit(&circuit).context("Not a CNOT + diagonal circuit")
}

/// Load transform settings, or the defaults when no file is given.
pub fn load_config(path: Option<&str>) -> Result<TransformConfig> {
    let Some(path) = path else {
        return Ok(TransformConfig::default());
    };
    let source = read_source(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let config: TransformConfig = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON config: {path}"))?,
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML config: {path}"))?,
    };
    config
        .validate()
        .with_context(|| format!("Rejected config: {path}"))?;
    debug!(path, ?config, "loaded transform config");
    Ok(config)
}

/// Parse a dense Pauli string such as `"XIZ"`; character `i` acts on wire `i`.
pub fn parse_pauli(label: &str) -> Result<PauliTensor> {
    let mut factors = Vec::with_capacity(label.len());
    for (i, c) in label.chars().enumerate() {
        let pauli = match c.to_ascii_uppercase() {
            'I' => Pauli::I,
            'X' => Pauli::X,
            'Y' => Pauli::Y,
            'Z' => Pauli::Z,
            other => anyhow::bail!("Unknown Pauli '{other}' in \"{label}\""),
        };
        factors.push((QubitId(i as u32), pauli));
    }
    Ok(PauliTensor::new(factors))
}

/// `<stem><suffix>.json` next to the input file.
pub fn default_output_path(input: &str, suffix: &str) -> String {
    let p = Path::new(input);
    let stem = p.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{stem}{suffix}.json");
    match p.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name).to_string_lossy().into_owned(),
        _ => name,
    }
}

/// Write a circuit as JSON to a file, or to stdout when `path` is `None`.
pub fn write_circuit(circuit: &Circuit, path: Option<&str>) -> Result<()> {
    let json = circuit.to_json().context("Failed to serialize circuit")?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
