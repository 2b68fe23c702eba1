//! Solver configuration: numeric options, method selection, and the full problem description.
//!
//! Every struct here derives serde so a problem can be read from a TOML or
//! JSON document; missing option fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::derivative::{DifferenceScheme, DEFAULT_STEP};
use crate::error::{Result, RootError};
use crate::sampling::DEFAULT_HALF_WIDTH;
use crate::trace::MethodKind;

/// Numeric knobs shared by both methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Convergence threshold on the per-step error.
    pub tolerance: f64,
    /// Maximum number of iterations before reporting non-convergence.
    pub max_iterations: usize,
    /// Finite-difference step used by Newton's method.
    pub derivative_step: f64,
    /// `|f'(x)|` below this value stops Newton's method.
    pub stationary_threshold: f64,
    /// `|f(c)|` below this value is treated as an exact bisection root.
    pub zero_residual: f64,
    /// Finite-difference stencil used by Newton's method.
    pub difference_scheme: DifferenceScheme,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            derivative_step: DEFAULT_STEP,
            stationary_threshold: 1e-10,
            zero_residual: 1e-15,
            difference_scheme: DifferenceScheme::Forward,
        }
    }
}

impl SolverOptions {
    /// Override the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Override the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Override the finite-difference step.
    pub fn with_derivative_step(mut self, step: f64) -> Self {
        self.derivative_step = step;
        self
    }

    /// Override the vanishing-derivative threshold.
    pub fn with_stationary_threshold(mut self, threshold: f64) -> Self {
        self.stationary_threshold = threshold;
        self
    }

    /// Override the exact-root residual guard.
    pub fn with_zero_residual(mut self, residual: f64) -> Self {
        self.zero_residual = residual;
        self
    }

    /// Select the finite-difference stencil.
    pub fn with_difference_scheme(mut self, scheme: DifferenceScheme) -> Self {
        self.difference_scheme = scheme;
        self
    }

    /// Checks that every option is inside its admissible range.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RootError::invalid_option("tolerance", self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(RootError::invalid_option("max_iterations", 0.0));
        }
        if !(self.derivative_step.is_finite() && self.derivative_step > 0.0) {
            return Err(RootError::invalid_option(
                "derivative_step",
                self.derivative_step,
            ));
        }
        if !(self.stationary_threshold.is_finite() && self.stationary_threshold >= 0.0) {
            return Err(RootError::invalid_option(
                "stationary_threshold",
                self.stationary_threshold,
            ));
        }
        if !(self.zero_residual.is_finite() && self.zero_residual >= 0.0) {
            return Err(RootError::invalid_option(
                "zero_residual",
                self.zero_residual,
            ));
        }
        Ok(())
    }
}

/// Root-finding method together with its starting data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Method {
    /// Bisection on the interval `[a, b]`.
    Bisection { a: f64, b: f64 },
    /// Newton's method started from `x0`.
    Newton { x0: f64 },
}

impl Method {
    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Bisection { .. } => MethodKind::Bisection,
            Method::Newton { .. } => MethodKind::Newton,
        }
    }

    /// Checks the method parameters (finite bounds with `a < b`, finite `x0`).
    pub fn validate(&self) -> Result<()> {
        match *self {
            Method::Bisection { a, b } => {
                if !(a.is_finite() && b.is_finite()) || a >= b {
                    return Err(RootError::InvalidInterval { a, b });
                }
            }
            Method::Newton { x0 } => {
                if !x0.is_finite() {
                    return Err(RootError::InvalidInitialGuess { x0 });
                }
            }
        }
        Ok(())
    }

    /// Center of the plotting window: the interval midpoint or the initial guess.
    pub fn plot_center(&self) -> f64 {
        match *self {
            Method::Bisection { a, b } => (a + b) / 2.0,
            Method::Newton { x0 } => x0,
        }
    }

    /// Half-width of the plotting window; widened to cover the whole bracket.
    pub fn plot_half_width(&self) -> f64 {
        match *self {
            Method::Bisection { a, b } => DEFAULT_HALF_WIDTH.max((b - a) / 2.0),
            Method::Newton { .. } => DEFAULT_HALF_WIDTH,
        }
    }
}

/// Complete description of a root-finding problem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Function of `x` whose root is sought.
    pub expression: String,
    pub method: Method,
    #[serde(default)]
    pub options: SolverOptions,
}

impl SolverConfig {
    /// Bisection problem with default options.
    pub fn bisection<S: Into<String>>(expression: S, a: f64, b: f64) -> Self {
        Self {
            expression: expression.into(),
            method: Method::Bisection { a, b },
            options: SolverOptions::default(),
        }
    }

    /// Newton problem with default options.
    pub fn newton<S: Into<String>>(expression: S, x0: f64) -> Self {
        Self {
            expression: expression.into(),
            method: Method::Newton { x0 },
            options: SolverOptions::default(),
        }
    }

    /// Override the numeric options while keeping expression and method.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Shorthand for overriding the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    /// Shorthand for overriding the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }
}
