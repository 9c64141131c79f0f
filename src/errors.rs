//! Error types for the physolve crate.
//!
//! This module defines the various error types that can occur during expression
//! parsing, AST conversion, evaluation, equation solving, and uncertainty
//! propagation. The main error types are:
//!
//! - `ConvertError`: Errors during conversion from the evalexpr AST to our internal representation
//! - `EvalError`: Errors while evaluating an expression tree
//! - `FormulaError`: High-level errors when working with formulas
//! - `SolverError`: Errors when solving an equation for an unknown
//! - `PropagateError`: Errors during uncertainty propagation
//!
//! Each error type implements the standard Error trait and provides detailed error messages.

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

/// Errors that can occur during conversion from the evalexpr AST to our internal AST.
///
/// This enum represents various failure modes when converting the evalexpr expression
/// tree into our own AST format used for evaluation and symbolic differentiation.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Error when encountering an operator that is not supported by our implementation
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when encountering a function that is not supported by our implementation
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),
    /// Error when the root node does not have exactly one child
    #[error("Expected single child for root node: {0}")]
    RootNode(String),
    /// Error when a constant value is not a number
    #[error("Expected numeric constant: {0}")]
    ConstOperator(String),
    /// Error when a variable is not found in the variable map
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
}

/// Errors that can occur while evaluating an expression tree.
///
/// Evaluation fails deterministically instead of returning NaN or infinity, so a
/// domain violation always carries the offending sub-expression in its message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Error when a variable has no bound value at evaluation time
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    /// Error when a variable index points outside the value slice
    #[error("Variable index {index} out of range for {len} values")]
    IndexOutOfRange { index: u32, len: usize },
    /// Error when a divisor evaluates to zero
    #[error("Division by zero in: {0}")]
    DivisionByZero(String),
    /// Error when taking the logarithm of a non-positive value
    #[error("Logarithm of non-positive value {arg} in: {term}")]
    LogDomain { arg: f64, term: String },
    /// Error when taking the square root of a negative value
    #[error("Square root of negative value {arg} in: {term}")]
    SqrtDomain { arg: f64, term: String },
    /// Error when an operation produces a non-finite value
    #[error("Non-finite result in: {0}")]
    NonFinite(String),
}

/// High-level errors that can occur when working with formulas.
///
/// This enum represents the various ways that formula parsing, conversion,
/// differentiation, and evaluation can fail. It wraps lower-level errors from
/// the parsing and evaluation stages.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Error when parsing the initial expression string with evalexpr
    #[error("Failed to parse expression")]
    Parse(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when converting from the evalexpr AST to our internal AST representation
    #[error("Failed to build expression tree")]
    Convert(#[from] ConvertError),
    /// Error when evaluating the expression tree
    #[error("Failed to evaluate expression")]
    Eval(#[from] EvalError),
    /// Error when trying to get a derivative for a variable that doesn't exist
    #[error("Derivative not found for variable: {0}")]
    DerivativeNotFound(String),
    /// Error when the input length is not the same as the number of variables
    #[error("Invalid input length: expected {expected}, got {got}")]
    InvalidInputLength { expected: usize, got: usize },
    /// Error when a variable is not found in the formula
    #[error("Variable not found in formula: {0}")]
    VariableNotFound(String),
}

/// Errors that can occur when solving an equation for an unknown.
///
/// The format and evaluation variants abort a solve attempt immediately; the
/// numeric variants describe why neither Newton-Raphson nor bisection produced
/// a root.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Error when the equation text does not contain exactly one `=`
    #[error("Expected exactly one '=' in equation, found {found}")]
    Format { found: usize },
    /// Error when one of the equation's sides cannot be parsed or evaluated
    #[error("Failed to evaluate equation")]
    Evaluation(#[from] FormulaError),
    /// Error when the unknown does not appear in the equation
    #[error("Unknown '{0}' does not appear in the equation")]
    MissingUnknown(String),
    /// Error when a known variable has no binding
    #[error("No value bound for variable: {0}")]
    UnboundVariable(String),
    /// Error when a binding is not a finite number
    #[error("Binding for '{name}' is not finite: {value}")]
    NonFiniteBinding { name: String, value: f64 },
    /// Error when the residual derivative vanishes and Newton-Raphson cannot step
    #[error("derivative vanished near x = {x}")]
    FlatDerivative { x: f64 },
    /// Error when the Newton iterate leaves the representable range
    #[error("iteration diverged to a non-finite value")]
    Diverged,
    /// Error when no sign change can be bracketed for bisection
    #[error("no root in bracket: f({left}) = {left_residual}, f({right}) = {right_residual}")]
    NoBracket {
        left: f64,
        right: f64,
        left_residual: f64,
        right_residual: f64,
    },
    /// Error when the iteration budget is exhausted without convergence
    #[error("no convergence within {iterations} iterations")]
    IterationBudget { iterations: usize },
}

/// Errors that can occur during uncertainty propagation.
#[derive(Debug, Error)]
pub enum PropagateError {
    /// Error when the formula or one of its derivatives cannot be evaluated
    #[error("Failed to evaluate formula")]
    Formula(#[from] FormulaError),
    /// Error when a formula variable has no measurement
    #[error("No measurement supplied for variable: {0}")]
    MissingMeasurement(String),
    /// Error when a measurement carries a negative uncertainty
    #[error("Negative uncertainty for '{name}': {value}")]
    NegativeUncertainty { name: String, value: f64 },
}
