//! Benchmarks for the Newton-KKT solver.
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use kkt_newton::{Config, Equation, Lagrangian, solve};

fn product_system() -> Lagrangian {
    let x = Equation::variable;
    let objective = x(0) * x(1) * x(2) * x(3) * x(4);
    let constraints = [
        x(0).powi(2) + x(1).powi(2) + x(2).powi(2) + x(3).powi(2) + x(4).powi(2)
            - Equation::constant(10.0),
        Equation::constant(5.0) * x(4) * x(3) - x(1) * x(2),
        x(0).powi(3) + x(1).powi(3) + Equation::constant(1.0),
    ];
    Lagrangian::new(objective, constraints, 5)
}

fn solve_product_problem(c: &mut Criterion) {
    let system = product_system();
    c.bench_function("solve_product_problem", |b| {
        b.iter(|| {
            black_box(
                solve(
                    &system,
                    &[-1.71, 1.59, 1.82, -0.763, -0.763],
                    &[1.0, 1.0, 1.0],
                    Config::default(),
                )
                .unwrap(),
            )
        });
    });
}

criterion_group!(benches, solve_product_problem);
criterion_main!(benches);
