//! Locating the non-Clifford region of an `{h, phasepolybox}` circuit.

use topt_ir::{Circuit, Instruction};

use crate::error::{CompileError, CompileResult};
use crate::passes::agnostic::verification::GateSetPredicate;

/// Number of Hadamards between the first and last non-Clifford block.
///
/// Hadamards before the first non-Clifford block, or after the last one, are
/// not internal. Clifford blocks do not end either scan. The circuit must be
/// in the `{h, phasepolybox}` gate set.
pub fn count_internal_hadamards(circuit: &Circuit) -> CompileResult<usize> {
    GateSetPredicate::hadamard_phase_poly().check(circuit)?;

    let instructions = circuit.instructions();
    let total = instructions.iter().filter(|i| i.is_hadamard()).count();
    let leading = leading_hadamards(instructions.iter());
    if leading == total {
        // No non-Clifford block, or none with a Hadamard after it.
        return Ok(0);
    }
    let trailing = leading_hadamards(instructions.iter().rev());
    Ok(total - leading - trailing)
}

/// Hadamards seen before the first non-Clifford block.
fn leading_hadamards<'a>(instructions: impl Iterator<Item = &'a Instruction>) -> usize {
    let mut count = 0;
    for inst in instructions {
        if inst.is_hadamard() {
            count += 1;
        } else if is_non_clifford_block(inst) {
            break;
        }
    }
    count
}

fn is_non_clifford_block(inst: &Instruction) -> bool {
    inst.as_gate()
        .and_then(|g| g.as_phase_poly())
        .is_some_and(|b| !b.is_clifford())
}

/// Positions of the first and last non-Clifford block, counting blocks only.
///
/// Fails with [`CompileError::NoNonCliffordBlock`] when every block is Clifford.
pub fn clifford_boundary(circuit: &Circuit) -> CompileResult<(usize, usize)> {
    find_boundary(circuit).ok_or(CompileError::NoNonCliffordBlock)
}

fn find_boundary(circuit: &Circuit) -> Option<(usize, usize)> {
    let blocks: Vec<bool> = circuit
        .instructions()
        .iter()
        .filter_map(|inst| inst.as_gate().and_then(|g| g.as_phase_poly()))
        .map(|b| !b.is_clifford())
        .collect();
    let first = blocks.iter().position(|&non_clifford| non_clifford)?;
    let last = blocks.iter().rposition(|&non_clifford| non_clifford)?;
    Some((first, last))
}
