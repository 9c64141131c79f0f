//! Numeric equation solving and uncertainty propagation for physics formulas.
//!
//! This crate is the calculation core of a physics-formula calculator. It
//! builds on top of the [evalexpr](https://github.com/ISibboI/evalexpr) crate
//! for parsing and evaluates its own expression tree directly, with symbolic
//! differentiation for gradients and propagated uncertainties.
//!
//! # Features
//!
//! - Solve `lhs = rhs` equations for one unknown (Newton-Raphson with a
//!   bisection fallback)
//! - Deterministic expression evaluation that fails instead of returning NaN
//! - Symbolic differentiation and gradient computation
//! - Uncertainty propagation with a rendered propagation formula
//! - Type-safe Rust implementation
//!
//! # Example
//!
//! ```rust
//! use physolve::solve_equation;
//! use std::collections::HashMap;
//!
//! // Solve a formula for its one unbound variable
//! let bindings = HashMap::from([("d".to_string(), 100.0), ("t".to_string(), 8.0)]);
//! let v = solve_equation("v = d / t", &bindings, "v").unwrap();
//! assert!((v - 12.5).abs() < 1e-6);
//! ```

pub use equation::{solve_equation, Equation};
pub use formula::Formula;
pub use propagate::{propagate, Measurement, Propagated};
pub use solve::{find_root, SolveOptions};

pub mod prelude {
    pub use crate::convert::build_ast;
    pub use crate::equation::{solve_equation, Equation};
    pub use crate::errors::{EvalError, FormulaError, PropagateError, SolverError};
    pub use crate::expr::Expr;
    pub use crate::formula::Formula;
    pub use crate::propagate::{propagate, Measurement, Propagated};
    pub use crate::solve::{find_root, SolveOptions};
}

/// Conversion from parsed expressions to internal AST
pub mod convert;
/// Equation parsing and solving for one unknown
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Expression tree representation, evaluation and symbolic differentiation
pub mod expr;
/// Formula handling: parsed expressions with evaluation and gradients
pub mod formula;
/// Uncertainty propagation for measured inputs
pub mod propagate;
/// Root-finding strategies (Newton-Raphson, bisection)
pub mod solve;
