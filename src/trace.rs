//! Iteration traces: the append-only audit trail of a solver run.
//!
//! Each solver records one step per completed iteration, in order, starting at
//! index 1. Callers receive the trace read-only through a
//! [`SolverResult`](crate::SolverResult) or a failing
//! [`RootError`](crate::RootError), and can export it as CSV.

use std::fmt;
use std::io;

use serde::Serialize;

use crate::error::{Result, RootError};

/// Which algorithm produced a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Bisection,
    Newton,
}

impl MethodKind {
    /// CSV header for traces of this method.
    pub fn csv_header(self) -> [&'static str; 6] {
        match self {
            MethodKind::Bisection => ["Iteration", "a", "b", "c", "f(c)", "Error"],
            MethodKind::Newton => [
                "Iteration",
                "x_old",
                "f(x_old)",
                "f'(x_old)",
                "x_new",
                "Error",
            ],
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Bisection => f.write_str("bisection"),
            MethodKind::Newton => f.write_str("newton"),
        }
    }
}

/// State of one bisection iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BisectionStep {
    pub index: usize,
    pub a: f64,
    pub b: f64,
    /// Midpoint `(a + b) / 2`.
    pub c: f64,
    pub fc: f64,
    /// Interval width `|b - a|` before halving.
    pub error: f64,
}

/// State of one Newton iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NewtonStep {
    pub index: usize,
    pub x_old: f64,
    pub fx: f64,
    pub dfx: f64,
    pub x_new: f64,
    /// Step length `|x_new - x_old|`.
    pub error: f64,
}

/// One recorded iteration of either method.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IterationStep {
    Bisection(BisectionStep),
    Newton(NewtonStep),
}

impl IterationStep {
    /// 1-based iteration index.
    pub fn index(&self) -> usize {
        match self {
            IterationStep::Bisection(step) => step.index,
            IterationStep::Newton(step) => step.index,
        }
    }

    /// Error measure used by the stopping rule.
    pub fn error(&self) -> f64 {
        match self {
            IterationStep::Bisection(step) => step.error,
            IterationStep::Newton(step) => step.error,
        }
    }

    /// Root estimate produced by this step (`c` or `x_new`).
    pub fn estimate(&self) -> f64 {
        match self {
            IterationStep::Bisection(step) => step.c,
            IterationStep::Newton(step) => step.x_new,
        }
    }

    pub fn method(&self) -> MethodKind {
        match self {
            IterationStep::Bisection(_) => MethodKind::Bisection,
            IterationStep::Newton(_) => MethodKind::Newton,
        }
    }

    fn csv_record(&self) -> [String; 6] {
        match self {
            IterationStep::Bisection(step) => [
                step.index.to_string(),
                step.a.to_string(),
                step.b.to_string(),
                step.c.to_string(),
                step.fc.to_string(),
                step.error.to_string(),
            ],
            IterationStep::Newton(step) => [
                step.index.to_string(),
                step.x_old.to_string(),
                step.fx.to_string(),
                step.dfx.to_string(),
                step.x_new.to_string(),
                step.error.to_string(),
            ],
        }
    }
}

/// Ordered record of the iterations of one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    method: MethodKind,
    steps: Vec<IterationStep>,
}

impl Trace {
    /// Creates an empty trace for `method`.
    pub fn new(method: MethodKind) -> Self {
        Self {
            method,
            steps: Vec::new(),
        }
    }

    /// Appends the next step. Only the solvers record steps.
    pub(crate) fn record(&mut self, step: IterationStep) {
        debug_assert_eq!(step.method(), self.method);
        debug_assert_eq!(step.index(), self.steps.len() + 1);
        self.steps.push(step);
    }

    pub fn method(&self) -> MethodKind {
        self.method
    }

    pub fn steps(&self) -> &[IterationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&IterationStep> {
        self.steps.last()
    }

    /// Error column of the trace, in iteration order.
    pub fn errors(&self) -> Vec<f64> {
        self.steps.iter().map(IterationStep::error).collect()
    }

    /// Writes the trace as CSV: a header row, then one row per step.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.method.csv_header())?;
        for step in &self.steps {
            csv.write_record(step.csv_record())?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Renders the CSV export into a string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|err| RootError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}

/// Counts the data rows of a CSV export, validating the column count.
pub fn count_csv_rows<R: io::Read>(reader: R) -> Result<usize> {
    let mut csv = csv::Reader::from_reader(reader);
    let columns = csv.headers()?.len();
    if columns != 6 {
        return Err(RootError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected 6 columns in trace export, found {columns}"),
        )));
    }
    let mut rows = 0usize;
    for record in csv.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newton_trace() -> Trace {
        let mut trace = Trace::new(MethodKind::Newton);
        trace.record(IterationStep::Newton(NewtonStep {
            index: 1,
            x_old: 3.0,
            fx: 5.0,
            dfx: 6.0,
            x_new: 2.1666666666666665,
            error: 0.8333333333333335,
        }));
        trace.record(IterationStep::Newton(NewtonStep {
            index: 2,
            x_old: 2.1666666666666665,
            fx: 0.6944444444444438,
            dfx: 4.333333333333333,
            x_new: 2.0064102564102564,
            error: 0.16025641025641013,
        }));
        trace
    }

    #[test]
    fn csv_export_has_method_header_and_full_precision() {
        let csv = newton_trace().to_csv_string().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Iteration,x_old,f(x_old),f'(x_old),x_new,Error")
        );
        assert_eq!(
            lines.next(),
            Some("1,3,5,6,2.1666666666666665,0.8333333333333335")
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn csv_round_trip_preserves_row_count() {
        let trace = newton_trace();
        let csv = trace.to_csv_string().unwrap();
        assert_eq!(count_csv_rows(csv.as_bytes()).unwrap(), trace.len());

        let empty = Trace::new(MethodKind::Bisection);
        let csv = empty.to_csv_string().unwrap();
        assert_eq!(csv, "Iteration,a,b,c,f(c),Error\n");
        assert_eq!(count_csv_rows(csv.as_bytes()).unwrap(), 0);
    }

    #[test]
    fn count_rejects_foreign_layout() {
        let result = count_csv_rows("a,b\n1,2\n".as_bytes());
        assert!(matches!(result, Err(RootError::Io(_))));
    }

    #[test]
    fn accessors_follow_recording_order() {
        let trace = newton_trace();
        assert_eq!(trace.method(), MethodKind::Newton);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.steps()[0].index(), 1);
        assert_eq!(trace.last().map(IterationStep::estimate), Some(2.0064102564102564));
        assert_eq!(trace.errors(), vec![0.8333333333333335, 0.16025641025641013]);
    }
}
