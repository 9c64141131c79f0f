//! Solver and propagation benchmarks.
//!
//! Measures the three costs a calculator surface cares about:
//!
//! - **Parsing**: turning equation text into the solvable form
//! - **Solving**: the Newton-Raphson / bisection pipeline per solve call
//! - **Propagation**: gradient evaluation and uncertainty combination
//!
//! Run with: `cargo bench --bench solve`

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use physolve::{propagate, Equation, Formula, Measurement};

/// Equations of increasing numeric difficulty, each with its unknown and bindings.
fn solve_cases() -> Vec<(&'static str, &'static str, &'static str, HashMap<String, f64>)> {
    vec![
        ("linear", "2*x + 3 = 11", "x", HashMap::new()),
        (
            "quadratic",
            "d = v0*t + a*t^2/2",
            "a",
            HashMap::from([
                ("d".to_string(), 100.0),
                ("v0".to_string(), 5.0),
                ("t".to_string(), 4.0),
            ]),
        ),
        ("transcendental", "sin(x) = 0.5", "x", HashMap::new()),
        (
            "bisection_fallback",
            "x^3 - 2*x + 2 = 0",
            "x",
            HashMap::new(),
        ),
    ]
}

fn benchmark_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    for (name, source, unknown, bindings) in solve_cases() {
        let equation = Equation::parse(source).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &bindings, |b, bindings| {
            b.iter(|| equation.solve(black_box(bindings), unknown).unwrap())
        });
    }
    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source, _, _) in solve_cases() {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| Equation::parse(black_box(source)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_propagate(c: &mut Criterion) {
    let formula = Formula::new("m * v^2 / 2".to_string()).unwrap();
    let measurements = HashMap::from([
        ("m".to_string(), Measurement::new(4.0, 0.05)),
        ("v".to_string(), Measurement::new(3.0, 0.1)),
    ]);

    c.bench_function("propagate/kinetic_energy", |b| {
        b.iter(|| propagate(black_box(&formula), black_box(&measurements)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_solve,
    benchmark_parse,
    benchmark_propagate
);
criterion_main!(benches);
