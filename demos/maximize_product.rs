//! Maximize `x1.x2.x3.x4.x5` over the intersection of a sphere, a bilinear
//! surface, and a cubic curve, then print a convergence report.

use kkt_newton::{Config, Equation, Lagrangian, SolveOutcome, solve};

fn main() {
    let x = Equation::variable;
    let objective = x(0) * x(1) * x(2) * x(3) * x(4);
    let constraints = [
        x(0).powi(2) + x(1).powi(2) + x(2).powi(2) + x(3).powi(2) + x(4).powi(2)
            - Equation::constant(10.0),
        Equation::constant(5.0) * x(4) * x(3) - x(1) * x(2),
        x(0).powi(3) + x(1).powi(3) + Equation::constant(1.0),
    ];
    let system = Lagrangian::new(objective, constraints, 5);

    let starting_point = [-1.71, 1.59, 1.82, -0.763, -0.763];
    let initial_multipliers = [1.0, 1.0, 1.0];

    let results = match solve(
        &system,
        &starting_point,
        &initial_multipliers,
        Config::default(),
    ) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let objective_value: f64 = results.final_primal().iter().product();
    println!("=== Optimization results ===");
    println!("{}", results.summary());
    println!("Objective value at the final point: {objective_value}");
    print_trajectory(&results);
}

/// Show how the iterates moved: the beginning, middle, and end of the
/// generated sequence, plus the residual distance per iteration.
fn print_trajectory(results: &SolveOutcome) {
    let trajectory = &results.all_solutions;
    let len = trajectory.len();
    println!("Generated sequence begin: {:?}", &trajectory[..len.min(3)]);
    if len > 6 {
        let mid = len / 2;
        println!(
            "Generated sequence middle: {:?}",
            &trajectory[mid - 1..mid + 2]
        );
    }
    if len > 3 {
        println!("Generated sequence end: {:?}", &trajectory[len - 3..]);
    }
    println!("Distances per iteration: {:?}", results.distances);
}
