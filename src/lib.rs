//! Bisection and Newton root finding for single-variable functions written as text.
//!
//! This crate takes an expression such as `"x^2 - 4"`, parses it once, and
//! locates a root with one of two classical methods:
//!
//! - **bisection** on an interval `[a, b]` whose endpoints bracket a sign
//!   change (`bisection` module), and
//! - **Newton's method** from an initial guess, with the slope estimated by
//!   finite differences (`newton` and `derivative` modules).
//!
//! Every run records an append-only iteration trace (`trace` module) that can
//! be exported as CSV, and the function can be sampled around the solve region
//! for plotting (`sampling` module). The `solver` module is the entry point:
//! it validates a [`SolverConfig`], dispatches to the chosen method and returns
//! a [`SolverResult`] or a structured [`RootError`].
//!
//! Logging goes through the [`log`] facade; the library never installs a logger.
//!
//! # Quick start
//!
//! ```
//! use rootsolve::{solve, SolverConfig};
//!
//! let config = SolverConfig::bisection("x^2 - 4", 0.0, 3.0)
//!     .with_tolerance(1e-6)
//!     .with_max_iterations(50);
//! let result = solve(&config).expect("valid bracket");
//! assert!(result.converged);
//! assert!((result.root - 2.0).abs() < 1e-6);
//!
//! let csv = result.trace.to_csv_string().expect("in-memory export");
//! assert!(csv.starts_with("Iteration,a,b,c,f(c),Error"));
//! ```
//!
//! Newton's method reports a vanishing derivative as an error that still
//! carries the steps taken so far:
//!
//! ```
//! use rootsolve::{solve, RootError, SolverConfig};
//!
//! let err = solve(&SolverConfig::newton("x^3", 1.0)).unwrap_err();
//! assert!(matches!(err, RootError::StationaryDerivative { .. }));
//! assert!(!err.partial_trace().unwrap().is_empty());
//! ```

pub mod bisection;
pub mod derivative;
pub mod error;
pub mod expression;
pub mod newton;
pub mod options;
pub mod parser;
pub mod sampling;
pub mod solver;
pub mod trace;

pub use derivative::DifferenceScheme;
pub use error::{Result, RootError};
pub use expression::{EvalFailure, Expression, RealFunction};
pub use options::{Method, SolverConfig, SolverOptions};
pub use solver::{compare_methods, solve, solve_batch, RootProblem, SolverResult, Termination};
pub use trace::{count_csv_rows, IterationStep, MethodKind, Trace};
