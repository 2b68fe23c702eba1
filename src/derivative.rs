//! Finite-difference estimates of the first derivative.
//!
//! Forward differences carry first-order truncation error and lose precision to
//! cancellation where the function is nearly flat. They are the default because
//! Newton's method only needs the slope's sign and rough magnitude.

use serde::{Deserialize, Serialize};

use crate::expression::RealFunction;

/// Default finite-difference step.
pub const DEFAULT_STEP: f64 = 1e-6;

/// Which finite-difference stencil to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceScheme {
    /// `(f(x + h) - f(x)) / h`
    #[default]
    Forward,
    /// `(f(x + h) - f(x - h)) / (2h)`
    Central,
}

impl DifferenceScheme {
    /// Estimates `f'(x)` with step `h`. Failed evaluations yield `NaN`.
    pub fn derivative<F: RealFunction + ?Sized>(self, f: &F, x: f64, h: f64) -> f64 {
        match self {
            DifferenceScheme::Forward => forward_difference(f, x, h),
            DifferenceScheme::Central => central_difference(f, x, h),
        }
    }
}

/// Forward-difference derivative `(f(x + h) - f(x)) / h`.
pub fn forward_difference<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> f64 {
    (f.value_at(x + h) - f.value_at(x)) / h
}

/// Central-difference derivative `(f(x + h) - f(x - h)) / (2h)`.
pub fn central_difference<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> f64 {
    (f.value_at(x + h) - f.value_at(x - h)) / (2.0 * h)
}
