//! Solver facade: validate a problem once, then dispatch to the chosen method.

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::bisection::bisect;
use crate::error::Result;
use crate::expression::Expression;
use crate::newton::newton;
use crate::options::{Method, SolverConfig, SolverOptions};
use crate::sampling::{sample_function, SamplePoint, DEFAULT_SPACING};
use crate::trace::{MethodKind, Trace};

/// Why a solver loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The step error fell below the tolerance.
    Tolerance,
    /// `|f(c)|` fell below the zero-residual guard (bisection only).
    ExactRoot,
    /// The iteration budget ran out first.
    IterationLimit,
}

/// Outcome of one solver run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolverResult {
    /// Final estimate; the last midpoint or iterate when not converged.
    pub root: f64,
    /// Whether a stopping criterion fired before the budget ran out.
    pub converged: bool,
    pub termination: Termination,
    /// Every completed iteration, in order.
    pub trace: Trace,
}

impl SolverResult {
    pub(crate) fn new(root: f64, converged: bool, termination: Termination, trace: Trace) -> Self {
        Self {
            root,
            converged,
            termination,
            trace,
        }
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    /// Method that produced this result.
    pub fn method(&self) -> MethodKind {
        self.trace.method()
    }
}

/// A validated root-finding problem with its expression parsed.
#[derive(Clone, Debug)]
pub struct RootProblem {
    expression: Expression,
    method: Method,
    options: SolverOptions,
}

impl RootProblem {
    /// Validates options and method parameters, then parses the expression.
    pub fn new(config: &SolverConfig) -> Result<Self> {
        config.options.validate()?;
        config.method.validate()?;
        let expression = Expression::parse(config.expression.as_str())?;
        Ok(Self {
            expression,
            method: config.method,
            options: config.options.clone(),
        })
    }

    /// Builds a problem from an already parsed expression.
    pub fn from_parts(expression: Expression, method: Method, options: SolverOptions) -> Result<Self> {
        options.validate()?;
        method.validate()?;
        Ok(Self {
            expression,
            method,
            options,
        })
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Runs the configured method to convergence, exhaustion, or failure.
    pub fn solve(&self) -> Result<SolverResult> {
        info!(
            "solving {} = 0 with {} (tolerance {}, at most {} iterations)",
            self.expression.source(),
            self.method.kind(),
            self.options.tolerance,
            self.options.max_iterations
        );
        match self.method {
            Method::Bisection { a, b } => bisect(&self.expression, a, b, &self.options),
            Method::Newton { x0 } => newton(&self.expression, x0, &self.options),
        }
    }

    /// Samples the function on the default plotting window for this method.
    pub fn plot_samples(&self) -> Result<Vec<SamplePoint>> {
        sample_function(
            &self.expression,
            self.method.plot_center(),
            self.method.plot_half_width(),
            DEFAULT_SPACING,
        )
    }
}

/// Validates and solves a single configuration.
pub fn solve(config: &SolverConfig) -> Result<SolverResult> {
    RootProblem::new(config)?.solve()
}

/// Solves independent configurations in parallel, preserving input order.
pub fn solve_batch(configs: &[SolverConfig]) -> Vec<Result<SolverResult>> {
    configs.par_iter().map(solve).collect()
}

/// Outcomes of running both methods on the same function.
#[derive(Debug)]
pub struct MethodComparison {
    pub bisection: Result<SolverResult>,
    pub newton: Result<SolverResult>,
}

/// Parses `expression` once and runs bisection on `[a, b]` and Newton from `x0`
/// concurrently with the same options.
pub fn compare_methods(
    expression: &str,
    a: f64,
    b: f64,
    x0: f64,
    options: &SolverOptions,
) -> Result<MethodComparison> {
    options.validate()?;
    let expression = Expression::parse(expression)?;
    let (bisection, newton) = rayon::join(
        || bisect(&expression, a, b, options),
        || newton(&expression, x0, options),
    );
    Ok(MethodComparison { bisection, newton })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::error::RootError;

    #[test]
    fn validation_precedes_parsing() {
        let config = SolverConfig::bisection("x^^2", 3.0, 0.0);
        assert!(matches!(
            RootProblem::new(&config),
            Err(RootError::InvalidInterval { .. })
        ));

        let config = SolverConfig::bisection("x^^2", 0.0, 3.0);
        assert!(matches!(
            RootProblem::new(&config),
            Err(RootError::ExpressionSyntax { position: 2, .. })
        ));
    }

    #[test]
    fn dispatches_by_method() {
        let bisection = solve(&SolverConfig::bisection("x^2 - 4", 0.0, 3.0)).unwrap();
        assert_eq!(bisection.method(), MethodKind::Bisection);

        let newton = solve(&SolverConfig::newton("x^2 - 4", 3.0)).unwrap();
        assert_eq!(newton.method(), MethodKind::Newton);
        assert_abs_diff_eq!(bisection.root, newton.root, epsilon = 1e-5);
    }

    #[test]
    fn comparison_runs_both_methods() {
        let comparison =
            compare_methods("x^3 - x - 2", 1.0, 2.0, 1.5, &SolverOptions::default()).unwrap();
        let bisection = comparison.bisection.unwrap();
        let newton = comparison.newton.unwrap();
        assert!(newton.iterations() < bisection.iterations());
        assert_abs_diff_eq!(bisection.root, newton.root, epsilon = 1e-5);
    }

    #[test]
    fn plot_samples_center_on_method() {
        let problem = RootProblem::new(&SolverConfig::newton("x", 2.0)).unwrap();
        let samples = problem.plot_samples().unwrap();
        assert_abs_diff_eq!(samples[0].x, -3.0, epsilon = 1e-12);
        assert_eq!(samples.len(), 101);
    }
}
