use thiserror::Error;

use crate::trace::Trace;

/// Unified error type for `rootsolve` operations.
#[derive(Debug, Error)]
pub enum RootError {
    /// Raised when the expression text cannot be parsed.
    #[error("syntax error at position {position}: {message}")]
    ExpressionSyntax {
        /// Character offset into the expression where the problem was found.
        position: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// Raised when bisection is started on an interval without a sign change.
    #[error("f(a) and f(b) must have opposite signs on [{a}, {b}], found f(a) = {fa}, f(b) = {fb}")]
    Bracketing { a: f64, b: f64, fa: f64, fb: f64 },

    /// Raised when Newton's method meets a numerically vanishing derivative.
    #[error("derivative vanished at x = {x} (f'(x) = {derivative}) in iteration {iteration}")]
    StationaryDerivative {
        /// Iteration (1-indexed) in which the derivative was evaluated.
        iteration: usize,
        /// Point at which the derivative vanished.
        x: f64,
        /// The derivative estimate that fell below the threshold.
        derivative: f64,
        /// Steps completed before the failure.
        trace: Trace,
    },

    /// Raised when the function stops producing finite values inside the loop.
    #[error("function evaluation broke down near x = {x}")]
    EvaluationBreakdown {
        /// Point at which a non-finite value was produced.
        x: f64,
        /// Steps completed before the failure.
        trace: Trace,
    },

    /// Raised when a numeric option is outside its admissible range.
    #[error("option `{name}` is invalid: {value}")]
    InvalidOption { name: &'static str, value: f64 },

    /// Raised when bisection bounds are not finite or not ordered.
    #[error("invalid interval [{a}, {b}]: bounds must be finite with a < b")]
    InvalidInterval { a: f64, b: f64 },

    /// Raised when the Newton starting point is not finite.
    #[error("initial guess must be finite, found {x0}")]
    InvalidInitialGuess { x0: f64 },

    /// Raised when writing or reading a CSV export fails.
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),

    /// Raised on I/O failures outside the CSV layer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RootError {
    /// Helper to build an [`ExpressionSyntax`](RootError::ExpressionSyntax) error.
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::ExpressionSyntax {
            position,
            message: message.into(),
        }
    }

    /// Helper to reject an option value.
    pub fn invalid_option(name: &'static str, value: f64) -> Self {
        Self::InvalidOption { name, value }
    }

    /// Steps recorded before an in-loop failure, if the error carries any.
    pub fn partial_trace(&self) -> Option<&Trace> {
        match self {
            Self::StationaryDerivative { trace, .. } | Self::EvaluationBreakdown { trace, .. } => {
                Some(trace)
            }
            _ => None,
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, RootError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MethodKind;

    #[test]
    fn partial_trace_only_for_in_loop_failures() {
        let stationary = RootError::StationaryDerivative {
            iteration: 3,
            x: 0.0,
            derivative: 0.0,
            trace: Trace::new(MethodKind::Newton),
        };
        assert!(stationary.partial_trace().is_some());

        let bracket = RootError::Bracketing {
            a: -1.0,
            b: 1.0,
            fa: 2.0,
            fb: 2.0,
        };
        assert!(bracket.partial_trace().is_none());
    }

    #[test]
    fn syntax_message_mentions_position() {
        let err = RootError::syntax(4, "unexpected character '#'");
        assert_eq!(
            err.to_string(),
            "syntax error at position 4: unexpected character '#'"
        );
    }
}
