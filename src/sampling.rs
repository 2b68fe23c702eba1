//! Evenly spaced samples of a function, for plotting it around a located root.

use serde::Serialize;

use crate::error::{Result, RootError};
use crate::expression::RealFunction;

/// Default distance from the window center to either edge.
pub const DEFAULT_HALF_WIDTH: f64 = 5.0;
/// Default spacing between samples.
pub const DEFAULT_SPACING: f64 = 0.1;

/// One sample of the function; `y` is `None` where evaluation failed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: Option<f64>,
}

/// Samples `f` on `[center - half_width, center + half_width]` every `spacing`.
///
/// Grid points are computed as `start + i * spacing` rather than by repeated
/// addition, so the last point lands on the right edge up to rounding.
pub fn sample_function<F: RealFunction + ?Sized>(
    f: &F,
    center: f64,
    half_width: f64,
    spacing: f64,
) -> Result<Vec<SamplePoint>> {
    if !center.is_finite() {
        return Err(RootError::invalid_option("center", center));
    }
    if !(half_width.is_finite() && half_width > 0.0) {
        return Err(RootError::invalid_option("half_width", half_width));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(RootError::invalid_option("spacing", spacing));
    }

    let start = center - half_width;
    let intervals = (2.0 * half_width / spacing + 1e-9).floor() as usize;
    let mut samples = Vec::with_capacity(intervals + 1);
    for i in 0..=intervals {
        let x = start + i as f64 * spacing;
        samples.push(SamplePoint {
            x,
            y: f.evaluate(x).ok(),
        });
    }
    Ok(samples)
}
