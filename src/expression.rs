//! Parsed single-variable expressions and their evaluation on the real line.
//!
//! An [`Expression`] is parsed once from text (see the [`parser`](crate::parser)
//! module for the accepted grammar) and can then be evaluated at any `x`.
//! Evaluation never panics: points where the formula is undefined yield an
//! [`EvalFailure`], and [`RealFunction::value_at`] turns that failure into `NaN`
//! so it propagates through the solvers' arithmetic.

use std::fmt;

use thiserror::Error;

use crate::error::Result;
use crate::parser;

/// Defined failure of an evaluation at a single point.
///
/// This is not a fatal error for a solver run; it means the function has no
/// real value at that sample.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum EvalFailure {
    /// Division by an exact zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Argument outside the real domain of a function (e.g. `sqrt(-1)`).
    #[error("{function} is undefined at {argument}")]
    Domain {
        function: &'static str,
        argument: f64,
    },
    /// Intermediate result overflowed or otherwise left the finite reals.
    #[error("evaluation produced a non-finite value")]
    NonFinite,
}

/// Narrow capability the solvers need from a function of one real variable.
pub trait RealFunction {
    /// Evaluates the function at `x`.
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvalFailure>;

    /// Evaluates at `x`, mapping a defined failure to `NaN`.
    fn value_at(&self, x: f64) -> f64 {
        self.evaluate(x).unwrap_or(f64::NAN)
    }
}

impl<F> RealFunction for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvalFailure> {
        finite(self(x))
    }
}

/// A parsed expression in the free variable `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parses `source`, reporting malformed input as
    /// [`RootError::ExpressionSyntax`](crate::RootError::ExpressionSyntax).
    pub fn parse<S: Into<String>>(source: S) -> Result<Self> {
        let source = source.into();
        let root = parser::parse(&source)?;
        Ok(Self { source, root })
    }

    /// Returns the original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parsed syntax tree.
    pub fn tree(&self) -> &Node {
        &self.root
    }
}

impl RealFunction for Expression {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvalFailure> {
        self.root.eval(x)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Node of a parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Number(f64),
    Variable,
    Negate(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Box<Node>),
    Call2(Function2, Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, x: f64) -> std::result::Result<f64, EvalFailure> {
        match self {
            Node::Number(value) => finite(*value),
            Node::Variable => finite(x),
            Node::Negate(inner) => Ok(-inner.eval(x)?),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(x)?, rhs.eval(x)?),
            Node::Call(function, arg) => function.apply(arg.eval(x)?),
            Node::Call2(function, first, second) => function.apply(first.eval(x)?, second.eval(x)?),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(value) => write!(f, "{value}"),
            Node::Variable => write!(f, "x"),
            Node::Negate(inner) => write!(f, "(-{inner})"),
            Node::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Node::Call(function, arg) => write!(f, "{}({arg})", function.name()),
            Node::Call2(function, first, second) => {
                write!(f, "{}({first}, {second})", function.name())
            }
        }
    }
}

/// Infix arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Operator symbol as written in expressions.
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> std::result::Result<f64, EvalFailure> {
        let value = match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => {
                if rhs == 0.0 {
                    return Err(EvalFailure::DivisionByZero);
                }
                lhs / rhs
            }
            BinaryOp::Pow => {
                let value = lhs.powf(rhs);
                if value.is_nan() {
                    // negative base with a fractional exponent
                    return Err(EvalFailure::Domain {
                        function: "^",
                        argument: lhs,
                    });
                }
                value
            }
        };
        finite(value)
    }
}

/// Built-in functions of one argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Cbrt,
    Abs,
    Sign,
    Exp,
    Ln,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
}

impl Function {
    const TABLE: [(&'static str, Function); 21] = [
        ("sqrt", Function::Sqrt),
        ("cbrt", Function::Cbrt),
        ("abs", Function::Abs),
        ("sign", Function::Sign),
        ("exp", Function::Exp),
        ("ln", Function::Ln),
        ("log", Function::Ln),
        ("log10", Function::Log10),
        ("log2", Function::Log2),
        ("sin", Function::Sin),
        ("cos", Function::Cos),
        ("tan", Function::Tan),
        ("asin", Function::Asin),
        ("acos", Function::Acos),
        ("atan", Function::Atan),
        ("sinh", Function::Sinh),
        ("cosh", Function::Cosh),
        ("tanh", Function::Tanh),
        ("floor", Function::Floor),
        ("ceil", Function::Ceil),
        ("round", Function::Round),
    ];

    /// Looks up a function by the name used in expressions.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    /// Canonical name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Cbrt => "cbrt",
            Function::Abs => "abs",
            Function::Sign => "sign",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log10 => "log10",
            Function::Log2 => "log2",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
        }
    }

    fn apply(self, arg: f64) -> std::result::Result<f64, EvalFailure> {
        let domain = |ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(EvalFailure::Domain {
                    function: self.name(),
                    argument: arg,
                })
            }
        };
        let value = match self {
            Function::Sqrt => {
                domain(arg >= 0.0)?;
                arg.sqrt()
            }
            Function::Cbrt => arg.cbrt(),
            Function::Abs => arg.abs(),
            Function::Sign => {
                if arg == 0.0 {
                    0.0
                } else {
                    arg.signum()
                }
            }
            Function::Exp => arg.exp(),
            Function::Ln => {
                domain(arg > 0.0)?;
                arg.ln()
            }
            Function::Log10 => {
                domain(arg > 0.0)?;
                arg.log10()
            }
            Function::Log2 => {
                domain(arg > 0.0)?;
                arg.log2()
            }
            Function::Sin => arg.sin(),
            Function::Cos => arg.cos(),
            Function::Tan => arg.tan(),
            Function::Asin => {
                domain((-1.0..=1.0).contains(&arg))?;
                arg.asin()
            }
            Function::Acos => {
                domain((-1.0..=1.0).contains(&arg))?;
                arg.acos()
            }
            Function::Atan => arg.atan(),
            Function::Sinh => arg.sinh(),
            Function::Cosh => arg.cosh(),
            Function::Tanh => arg.tanh(),
            Function::Floor => arg.floor(),
            Function::Ceil => arg.ceil(),
            Function::Round => arg.round(),
        };
        finite(value)
    }
}

/// Built-in functions of two arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function2 {
    Pow,
    Min,
    Max,
    Atan2,
    NthRoot,
}

impl Function2 {
    /// Looks up a two-argument function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pow" => Some(Function2::Pow),
            "min" => Some(Function2::Min),
            "max" => Some(Function2::Max),
            "atan2" => Some(Function2::Atan2),
            "nthRoot" => Some(Function2::NthRoot),
            _ => None,
        }
    }

    /// Canonical name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Function2::Pow => "pow",
            Function2::Min => "min",
            Function2::Max => "max",
            Function2::Atan2 => "atan2",
            Function2::NthRoot => "nthRoot",
        }
    }

    fn apply(self, first: f64, second: f64) -> std::result::Result<f64, EvalFailure> {
        let value = match self {
            Function2::Pow => return BinaryOp::Pow.apply(first, second),
            Function2::Min => first.min(second),
            Function2::Max => first.max(second),
            Function2::Atan2 => first.atan2(second),
            Function2::NthRoot => nth_root(first, second)?,
        };
        finite(value)
    }
}

/// Real `n`-th root; odd roots of negative values are allowed.
fn nth_root(value: f64, n: f64) -> std::result::Result<f64, EvalFailure> {
    let undefined = EvalFailure::Domain {
        function: "nthRoot",
        argument: value,
    };
    if n == 0.0 || n.fract() != 0.0 {
        return Err(undefined);
    }
    if value >= 0.0 {
        return Ok(value.powf(1.0 / n));
    }
    if n.rem_euclid(2.0) == 1.0 {
        Ok(-(-value).powf(1.0 / n))
    } else {
        Err(undefined)
    }
}

fn finite(value: f64) -> std::result::Result<f64, EvalFailure> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalFailure::NonFinite)
    }
}
