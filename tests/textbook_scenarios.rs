use approx::assert_abs_diff_eq;
use rootsolve::{
    count_csv_rows, solve, solve_batch, DifferenceScheme, Expression, IterationStep, Method,
    RealFunction, RootError, RootProblem, SolverConfig, SolverOptions, Termination,
};

fn bisection_intervals(config: &SolverConfig) -> Vec<(f64, f64, f64)> {
    solve(config)
        .unwrap()
        .trace
        .steps()
        .iter()
        .map(|step| match step {
            IterationStep::Bisection(step) => (step.a, step.b, step.error),
            IterationStep::Newton(_) => panic!("bisection produced a Newton step"),
        })
        .collect()
}

/// `x^2 - 4` on `[0, 3]` converges to 2 with a vanishing residual.
#[test]
fn bisection_finds_two() {
    let config = SolverConfig::bisection("x^2 - 4", 0.0, 3.0)
        .with_tolerance(1e-6)
        .with_max_iterations(50);
    let result = solve(&config).unwrap();

    assert!(result.converged);
    assert_abs_diff_eq!(result.root, 2.0, epsilon = 1e-6);
    let f = Expression::parse("x^2 - 4").unwrap();
    assert_abs_diff_eq!(f.value_at(result.root), 0.0, epsilon = 1e-5);
}

/// Newton from 3 reaches the same root in a handful of steps.
#[test]
fn newton_finds_two_quickly() {
    let config = SolverConfig::newton("x^2 - 4", 3.0)
        .with_tolerance(1e-6)
        .with_max_iterations(50);
    let result = solve(&config).unwrap();

    assert!(result.converged);
    assert_abs_diff_eq!(result.root, 2.0, epsilon = 1e-6);
    assert!(result.iterations() <= 10);
}

/// `x^2 + 1` is positive on both ends of `[-1, 1]`.
#[test]
fn bisection_rejects_missing_sign_change() {
    let err = solve(&SolverConfig::bisection("x^2 + 1", -1.0, 1.0)).unwrap_err();
    match err {
        RootError::Bracketing { a, b, fa, fb } => {
            assert_eq!((a, b), (-1.0, 1.0));
            assert_eq!((fa, fb), (2.0, 2.0));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// Newton on `x^2` from 1 halves its iterate until the slope estimate vanishes.
///
/// With forward differences the estimate of `f'(x)` never drops below the step
/// `h`, so the run converges near zero instead; the central stencil estimates
/// `2x` and trips the stationary guard once `x` falls below `5e-11`.
#[test]
fn newton_on_square_hits_stationary_derivative() {
    let forward = solve(&SolverConfig::newton("x^2", 1.0)).unwrap();
    assert!(forward.converged);
    assert!(forward.root.abs() < 1e-5);

    let options = SolverOptions::default()
        .with_difference_scheme(DifferenceScheme::Central)
        .with_tolerance(1e-14)
        .with_max_iterations(100);
    let err = solve(&SolverConfig::newton("x^2", 1.0).with_options(options)).unwrap_err();
    match &err {
        RootError::StationaryDerivative {
            iteration,
            x,
            derivative,
            trace,
        } => {
            assert!(derivative.abs() < 1e-10);
            assert!(x.abs() < 1e-10);
            assert_eq!(trace.len(), iteration - 1);
            // every recorded iterate moved towards zero
            let errors = trace.errors();
            assert!(errors.windows(2).all(|pair| pair[1] < pair[0]));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.partial_trace().is_some());
}

#[test]
fn bisection_halves_and_keeps_the_bracket() {
    let config = SolverConfig::bisection("x^3 - 2x - 5", 2.0, 3.0).with_tolerance(1e-9);
    let f = Expression::parse("x^3 - 2x - 5").unwrap();
    let intervals = bisection_intervals(&config);

    for pair in intervals.windows(2) {
        let (a_old, b_old, error_old) = pair[0];
        let (a_new, b_new, error_new) = pair[1];
        assert_abs_diff_eq!(b_new - a_new, (b_old - a_old) / 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(error_new, error_old / 2.0, epsilon = 1e-15);
        assert!(error_new <= error_old);
        assert!(f.value_at(a_new) * f.value_at(b_new) < 0.0);
    }
}

#[test]
fn newton_error_decreases_quadratically() {
    let result = solve(&SolverConfig::newton("x^2 - 2", 3.0).with_tolerance(1e-12)).unwrap();
    let errors = result.trace.errors();
    assert!(errors.len() >= 4);

    // once close to the root, each error is roughly C * previous^2
    let tail = &errors[1..errors.len() - 1];
    for pair in tail.windows(2) {
        let ratio = pair[1] / (pair[0] * pair[0]);
        assert!(ratio < 1.0, "error ratio {ratio} is not quadratic");
    }
}

#[test]
fn tiny_tolerance_exhausts_the_budget() {
    let config = SolverConfig::bisection("x^2 - 4", 0.0, 3.0)
        .with_tolerance(1e-300)
        .with_max_iterations(20);
    let result = solve(&config).unwrap();

    assert!(!result.converged);
    assert_eq!(result.termination, Termination::IterationLimit);
    assert_eq!(result.iterations(), 20);
    assert_eq!(Some(result.root), result.trace.last().map(IterationStep::estimate));
}

#[test]
fn csv_export_round_trips_row_count() {
    for config in [
        SolverConfig::bisection("cos(x) - x", 0.0, 1.0),
        SolverConfig::newton("cos(x) - x", 1.0),
    ] {
        let result = solve(&config).unwrap();
        let csv = result.trace.to_csv_string().unwrap();
        assert_eq!(count_csv_rows(csv.as_bytes()).unwrap(), result.iterations());
    }
}

#[test]
fn evaluation_is_pure() {
    let f = Expression::parse("exp(-x) * sin(3x) + sqrt(abs(x))").unwrap();
    let first: Vec<f64> = (-20..=20).map(|i| f.value_at(i as f64 * 0.25)).collect();
    let second: Vec<f64> = (-20..=20).map(|i| f.value_at(i as f64 * 0.25)).collect();
    assert_eq!(first, second);
}

#[test]
fn batch_results_are_independent_and_ordered() {
    let configs = vec![
        SolverConfig::bisection("x^2 - 4", 0.0, 3.0),
        SolverConfig::newton("x^2 - 9", 1.0),
        SolverConfig::bisection("x^2 + 1", -1.0, 1.0),
        SolverConfig::newton("x ^", 1.0),
    ];
    let results = solve_batch(&configs);

    assert_eq!(results.len(), 4);
    assert_abs_diff_eq!(results[0].as_ref().unwrap().root, 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(results[1].as_ref().unwrap().root, 3.0, epsilon = 1e-6);
    assert!(matches!(results[2], Err(RootError::Bracketing { .. })));
    assert!(matches!(results[3], Err(RootError::ExpressionSyntax { .. })));
}

/// Oversized input comes back as a syntax error instead of exhausting the stack.
#[test]
fn hostile_expressions_are_rejected() {
    let sum = format!("x{}", "+x".repeat(20_000));
    let nested = format!("{}x{}", "(".repeat(3_000), ")".repeat(3_000));
    for source in [sum, nested, "1e999 - x".to_string()] {
        let err = solve(&SolverConfig::newton(source, 1.0)).unwrap_err();
        assert!(matches!(err, RootError::ExpressionSyntax { .. }));
    }
}

#[test]
fn problem_from_parsed_expression() {
    let expression = Expression::parse("x^3 - x - 2").unwrap();
    let problem = RootProblem::from_parts(
        expression,
        Method::Newton { x0: 1.5 },
        SolverOptions::default().with_tolerance(1e-10),
    )
    .unwrap();
    let result = problem.solve().unwrap();
    assert_abs_diff_eq!(problem.expression().value_at(result.root), 0.0, epsilon = 1e-8);
}

#[test]
fn result_serializes_to_json() {
    let result = solve(&SolverConfig::newton("x^2 - 4", 3.0)).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["converged"], serde_json::json!(true));
    assert_eq!(value["termination"], serde_json::json!("tolerance"));
    assert_eq!(value["trace"]["method"], serde_json::json!("newton"));
    let steps = value["trace"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), result.iterations());
    assert_eq!(steps[0]["index"], serde_json::json!(1));
    assert_eq!(steps[0]["x_old"], serde_json::json!(3.0));
}

#[test]
fn config_reads_from_json() {
    let config: SolverConfig = serde_json::from_str(
        r#"{
            "expression": "x^2 - 4",
            "method": { "kind": "bisection", "a": 0.0, "b": 3.0 },
            "options": { "tolerance": 1e-8, "difference_scheme": "central" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.method, Method::Bisection { a: 0.0, b: 3.0 });
    assert_eq!(config.options.tolerance, 1e-8);
    assert_eq!(config.options.max_iterations, 50);
    assert_eq!(config.options.difference_scheme, DifferenceScheme::Central);
}
