//! Newton's method with a finite-difference slope.

use log::{debug, info, warn};

use crate::error::{Result, RootError};
use crate::expression::RealFunction;
use crate::options::{Method, SolverOptions};
use crate::solver::{SolverResult, Termination};
use crate::trace::{IterationStep, MethodKind, NewtonStep, Trace};

/// Runs Newton's method from `x0`.
///
/// Each iteration evaluates `f(x)` and a finite-difference `f'(x)`, then moves
/// to `x - f(x) / f'(x)`. A derivative with magnitude below
/// `options.stationary_threshold` stops the run with
/// [`RootError::StationaryDerivative`]; a non-finite value stops it with
/// [`RootError::EvaluationBreakdown`]. Both carry the steps recorded so far.
/// Divergence is not detected: a run that never meets the tolerance ends with
/// `converged == false` after `options.max_iterations` steps.
pub fn newton<F: RealFunction + ?Sized>(
    f: &F,
    x0: f64,
    options: &SolverOptions,
) -> Result<SolverResult> {
    options.validate()?;
    Method::Newton { x0 }.validate()?;

    let mut trace = Trace::new(MethodKind::Newton);
    let mut x = x0;

    for index in 1..=options.max_iterations {
        let fx = f.value_at(x);
        let dfx = options
            .difference_scheme
            .derivative(f, x, options.derivative_step);
        if !(fx.is_finite() && dfx.is_finite()) {
            warn!("newton broke down at x = {x} in iteration {index}: f(x) = {fx}, f'(x) = {dfx}");
            return Err(RootError::EvaluationBreakdown { x, trace });
        }

        if dfx.abs() < options.stationary_threshold {
            warn!("newton stopped at x = {x} in iteration {index}: f'(x) = {dfx}");
            return Err(RootError::StationaryDerivative {
                iteration: index,
                x,
                derivative: dfx,
                trace,
            });
        }

        let x_new = x - fx / dfx;
        if !x_new.is_finite() {
            warn!("newton step from x = {x} left the finite reals in iteration {index}");
            return Err(RootError::EvaluationBreakdown { x, trace });
        }
        let error = (x_new - x).abs();
        trace.record(IterationStep::Newton(NewtonStep {
            index,
            x_old: x,
            fx,
            dfx,
            x_new,
            error,
        }));
        debug!("newton step {index}: x = {x}, f(x) = {fx}, f'(x) = {dfx}, x_new = {x_new}, error = {error}");

        x = x_new;
        if error < options.tolerance {
            info!("newton converged to {x} after {index} iterations");
            return Ok(SolverResult::new(x, true, Termination::Tolerance, trace));
        }
    }

    warn!(
        "newton did not converge within {} iterations; last iterate {x}",
        options.max_iterations
    );
    Ok(SolverResult::new(x, false, Termination::IterationLimit, trace))
}
