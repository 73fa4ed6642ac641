//! Benchmarks for gadgetisation and Clifford resynthesis
//!
//! Run with: cargo bench -p topt-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f64::consts::PI;

use topt_compile::passes::{compose_phase_poly_boxes, gadgetise_hadamards};
use topt_compile::{TransformConfig, synthesise_clifford};
use topt_ir::{Circuit, PauliTensor, PhasePolyBox, QubitId};

/// T layer followed by a swap-free QFT.
fn t_layer_qft(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("qft", n, 0);
    for i in 0..n {
        circuit.t(QubitId(i)).unwrap();
    }
    for i in 0..n {
        circuit.h(QubitId(i)).unwrap();
        for j in (i + 1)..n {
            let angle = PI / f64::from(1u32 << (j - i).min(30));
            circuit.cp(angle, QubitId(j), QubitId(i)).unwrap();
        }
    }
    circuit
}

/// A CNOT staircase with a T on every wire after each step.
fn staircase_block(n: u32, layers: u32) -> PhasePolyBox {
    let mut circuit = Circuit::with_size("staircase", n, 0);
    for layer in 0..layers {
        for i in 0..n - 1 {
            let (c, t) = if layer % 2 == 0 { (i, i + 1) } else { (i + 1, i) };
            circuit.cx(QubitId(c), QubitId(t)).unwrap();
        }
        for i in 0..n {
            circuit.t(QubitId(i)).unwrap();
        }
    }
    PhasePolyBox::from_circuit(&circuit).unwrap()
}

fn bench_compose_and_gadgetise(c: &mut Criterion) {
    let mut group = c.benchmark_group("gadgetisation");
    let config = TransformConfig::default();

    for num_qubits in &[4, 8, 16, 32] {
        let circuit = t_layer_qft(*num_qubits);
        group.bench_with_input(
            BenchmarkId::new("compose", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| compose_phase_poly_boxes(black_box(circuit)).unwrap());
            },
        );

        let composed = compose_phase_poly_boxes(&circuit).unwrap();
        group.bench_with_input(
            BenchmarkId::new("gadgetise", num_qubits),
            &composed,
            |b, composed| {
                b.iter(|| gadgetise_hadamards(black_box(composed), &config).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_resynthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("resynthesis");
    let config = TransformConfig::default();

    for num_qubits in &[4, 8, 16, 32, 64] {
        let pbox = staircase_block(*num_qubits, 4);
        let pauli = PauliTensor::from_x_index(num_qubits / 2);
        group.bench_with_input(
            BenchmarkId::new("synthesise_clifford", num_qubits),
            &pbox,
            |b, pbox| {
                b.iter(|| synthesise_clifford(black_box(pbox), black_box(&pauli), &config).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compose_and_gadgetise, bench_resynthesis);
criterion_main!(benches);
