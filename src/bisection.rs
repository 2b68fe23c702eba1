//! Bisection: repeatedly halve an interval whose endpoints bracket a sign change.

use log::{debug, info, warn};

use crate::error::{Result, RootError};
use crate::expression::RealFunction;
use crate::options::{Method, SolverOptions};
use crate::solver::{SolverResult, Termination};
use crate::trace::{BisectionStep, IterationStep, MethodKind, Trace};

/// Runs bisection on `[a, b]`.
///
/// Requires `f(a) * f(b) < 0`; otherwise fails with
/// [`RootError::Bracketing`] before any iteration. Each iteration records the
/// interval, its midpoint `c`, `f(c)` and the width `|b - a|`, then stops when
/// `|f(c)|` is below the zero-residual guard or the width is below the
/// tolerance. The half that still contains the sign change is kept otherwise.
/// Running out of iterations is not an error: the result has
/// `converged == false` and the last midpoint as its root.
pub fn bisect<F: RealFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    options: &SolverOptions,
) -> Result<SolverResult> {
    options.validate()?;
    Method::Bisection { a, b }.validate()?;

    let (mut a, mut b) = (a, b);
    let mut fa = f.value_at(a);
    let fb = f.value_at(b);
    if !opposite_signs(fa, fb) {
        warn!("bisection rejected [{a}, {b}]: f(a) = {fa}, f(b) = {fb}");
        return Err(RootError::Bracketing { a, b, fa, fb });
    }

    let mut trace = Trace::new(MethodKind::Bisection);
    let mut c = a;

    for index in 1..=options.max_iterations {
        c = (a + b) / 2.0;
        let fc = f.value_at(c);
        let error = (b - a).abs();
        trace.record(IterationStep::Bisection(BisectionStep {
            index,
            a,
            b,
            c,
            fc,
            error,
        }));
        debug!("bisection step {index}: a = {a}, b = {b}, c = {c}, f(c) = {fc}, error = {error}");

        if !fc.is_finite() {
            warn!("bisection broke down at c = {c} in iteration {index}");
            return Err(RootError::EvaluationBreakdown { x: c, trace });
        }

        if fc == 0.0 || fc.abs() < options.zero_residual {
            info!("bisection hit an exact root {c} after {index} iterations");
            return Ok(SolverResult::new(c, true, Termination::ExactRoot, trace));
        }
        if error < options.tolerance {
            info!("bisection converged to {c} after {index} iterations");
            return Ok(SolverResult::new(c, true, Termination::Tolerance, trace));
        }

        if opposite_signs(fa, fc) {
            b = c;
        } else {
            a = c;
            fa = fc;
        }
    }

    warn!(
        "bisection did not converge within {} iterations; last midpoint {c}",
        options.max_iterations
    );
    Ok(SolverResult::new(c, false, Termination::IterationLimit, trace))
}

/// Strict sign change between two values; zero and NaN never qualify.
fn opposite_signs(lhs: f64, rhs: f64) -> bool {
    (lhs < 0.0 && rhs > 0.0) || (lhs > 0.0 && rhs < 0.0)
}
