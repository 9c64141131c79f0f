//! Equation solving: find the value of one unknown in `lhs = rhs`.
//!
//! This module provides the `Equation` type which represents a physics formula
//! written as two expressions joined by a single `=`. Solving rewrites the
//! equation into the residual `f(x) = lhs - rhs`, binds every known variable,
//! and hands the residual to the root-finding pipeline (Newton-Raphson with a
//! bisection fallback).
//!
//! # Example
//!
//! ```
//! use physolve::Equation;
//! use std::collections::HashMap;
//!
//! let equation = Equation::parse("v = d / t").unwrap();
//! let bindings = HashMap::from([("d".to_string(), 100.0), ("v".to_string(), 8.0)]);
//! let t = equation.solve(&bindings, "t").unwrap();
//! assert!((t - 12.5).abs() < 1e-6);
//! ```
//!
//! The solver is deterministic: fixed initial guess, fixed default bracket,
//! fixed iteration budgets. When an equation has several roots it returns
//! whichever one the pipeline reaches first.

use std::collections::{HashMap, HashSet};

use evalexpr::build_operator_tree;
use log::debug;
use rayon::prelude::*;

use crate::convert::build_ast;
use crate::errors::{FormulaError, SolverError};
use crate::expr::Expr;
use crate::formula::extract_symbols_from_node;
use crate::solve::{find_root, SolveOptions};
use colored::Colorize;
use itertools::Itertools;

/// Results with a magnitude below this are reported as exactly zero, so
/// near-zero floating artifacts never reach the caller.
const ZERO_SNAP: f64 = 5e-4;

/// Represents an equation `lhs = rhs` over named variables.
///
/// Parsing splits the source on `=`, builds both sides over a shared variable
/// map (the union of both sides' symbols, indexed alphabetically), and keeps
/// the simplified residual `lhs - rhs` ready for solving. The struct is
/// immutable; each solve call owns its local iteration state, so a single
/// `Equation` can be solved concurrently.
#[derive(Clone)]
pub struct Equation {
    source: String,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
    residual: Box<Expr>,
    var_map: HashMap<String, u32>,
    sorted_variables: Vec<String>,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{\n")?;
        writeln!(f, "    {}: {}\n", "Equation".cyan(), self.source)?;
        writeln!(f, "    {}: {:?}\n", "Variables".cyan(), self.var_map)?;
        writeln!(f, "    {}: {}\n", "Residual".cyan(), self.residual)?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Equation {
    /// Parses an equation from its textual form.
    ///
    /// The text must contain exactly one `=`; both sides are parsed as
    /// expressions over the union of their variables, sorted alphabetically
    /// into a shared index map.
    ///
    /// # Errors
    /// Returns `SolverError::Format` if the `=` count is not exactly one, or
    /// `SolverError::Evaluation` if either side fails to parse.
    pub fn parse(source: &str) -> Result<Self, SolverError> {
        let sides: Vec<&str> = source.split('=').collect();
        if sides.len() != 2 {
            return Err(SolverError::Format {
                found: sides.len() - 1,
            });
        }

        let lhs_node = build_operator_tree(sides[0]).map_err(FormulaError::from)?;
        let rhs_node = build_operator_tree(sides[1]).map_err(FormulaError::from)?;

        let mut names = HashSet::new();
        extract_symbols_from_node(&lhs_node, &mut names);
        extract_symbols_from_node(&rhs_node, &mut names);

        let var_map: HashMap<String, u32> = names
            .into_iter()
            .sorted()
            .enumerate()
            .map(|(i, name)| (name, i as u32))
            .collect();
        let sorted_variables: Vec<String> = var_map
            .iter()
            .sorted_by_key(|(_, &idx)| idx)
            .map(|(name, _)| name.clone())
            .collect();

        let lhs = build_ast(&lhs_node, &var_map)
            .map_err(FormulaError::from)?
            .simplify();
        let rhs = build_ast(&rhs_node, &var_map)
            .map_err(FormulaError::from)?
            .simplify();
        let residual = Expr::Sub(lhs.clone(), rhs.clone()).simplify();

        Ok(Self {
            source: source.to_string(),
            lhs,
            rhs,
            residual,
            var_map,
            sorted_variables,
        })
    }

    /// Solves the equation for the unknown using the default solver options.
    ///
    /// See [`solve_with`](Self::solve_with).
    pub fn solve(
        &self,
        bindings: &HashMap<String, f64>,
        unknown: &str,
    ) -> Result<f64, SolverError> {
        self.solve_with(bindings, unknown, &SolveOptions::default())
    }

    /// Solves the equation for the unknown with explicit solver options.
    ///
    /// Every variable other than the unknown must have a finite binding. A
    /// binding supplied for the unknown itself is ignored; the iteration owns
    /// that slot. Results with a magnitude below `5e-4` are snapped to exactly
    /// zero.
    ///
    /// # Errors
    /// Returns `SolverError::MissingUnknown` if the unknown does not appear in
    /// the equation, `SolverError::UnboundVariable` /
    /// `SolverError::NonFiniteBinding` for bad bindings, and the pipeline's
    /// evaluation or no-root errors otherwise.
    pub fn solve_with(
        &self,
        bindings: &HashMap<String, f64>,
        unknown: &str,
        options: &SolveOptions,
    ) -> Result<f64, SolverError> {
        let unknown_index = *self
            .var_map
            .get(unknown)
            .ok_or_else(|| SolverError::MissingUnknown(unknown.to_string()))?
            as usize;

        let mut values = vec![0.0; self.sorted_variables.len()];
        for (name, &index) in &self.var_map {
            if name == unknown {
                continue;
            }
            let value = *bindings
                .get(name)
                .ok_or_else(|| SolverError::UnboundVariable(name.clone()))?;
            if !value.is_finite() {
                return Err(SolverError::NonFiniteBinding {
                    name: name.clone(),
                    value,
                });
            }
            values[index as usize] = value;
        }

        debug!("solving {} for {unknown}", self.source);
        let residual = &self.residual;
        let root = find_root(
            |x| {
                let mut scope = values.clone();
                scope[unknown_index] = x;
                Ok(residual.evaluate(&scope)?)
            },
            options,
        )?;

        Ok(snap_zero(root))
    }

    /// Solves the equation for the unknown across many independent binding sets.
    ///
    /// Each solve is pure and owns its local state, so the batch runs in
    /// parallel. Results are returned in input order, one per binding set.
    ///
    /// # Example
    /// ```
    /// use physolve::Equation;
    /// use std::collections::HashMap;
    ///
    /// let equation = Equation::parse("d = v * t").unwrap();
    /// let batches: Vec<_> = (1..=4)
    ///     .map(|v| {
    ///         HashMap::from([("d".to_string(), 120.0), ("v".to_string(), f64::from(v))])
    ///     })
    ///     .collect();
    /// let times = equation.solve_many(&batches, "t");
    /// assert!((times[3].as_ref().unwrap() - 30.0).abs() < 1e-6);
    /// ```
    pub fn solve_many(
        &self,
        bindings: &[HashMap<String, f64>],
        unknown: &str,
    ) -> Vec<Result<f64, SolverError>> {
        bindings
            .par_iter()
            .map(|set| self.solve(set, unknown))
            .collect()
    }

    /// Evaluates the left-hand side over a name-to-value scope.
    pub fn eval_lhs(&self, scope: &HashMap<String, f64>) -> Result<f64, SolverError> {
        Ok(self
            .lhs
            .evaluate(&self.values_from_scope(scope)?)
            .map_err(FormulaError::from)?)
    }

    /// Evaluates the right-hand side over a name-to-value scope.
    pub fn eval_rhs(&self, scope: &HashMap<String, f64>) -> Result<f64, SolverError> {
        Ok(self
            .rhs
            .evaluate(&self.values_from_scope(scope)?)
            .map_err(FormulaError::from)?)
    }

    /// Returns the original equation text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the simplified residual tree `lhs - rhs`.
    pub fn residual(&self) -> &Expr {
        &self.residual
    }

    /// Returns the map of variable names to their indices.
    pub fn variables(&self) -> &HashMap<String, u32> {
        &self.var_map
    }

    /// Returns the variables in index order.
    pub fn sorted_variables(&self) -> &[String] {
        &self.sorted_variables
    }

    fn values_from_scope(&self, scope: &HashMap<String, f64>) -> Result<Vec<f64>, SolverError> {
        self.sorted_variables
            .iter()
            .map(|name| {
                scope
                    .get(name)
                    .copied()
                    .ok_or_else(|| SolverError::UnboundVariable(name.clone()))
            })
            .collect()
    }
}

/// Solves an equation given as a string for the named unknown.
///
/// This is the plain function-call boundary over [`Equation`]: parse, bind,
/// solve, in one step.
///
/// # Arguments
/// * `source` - The equation text, containing exactly one `=`
/// * `bindings` - Values for every variable except the unknown
/// * `unknown` - The variable to solve for
///
/// # Example
/// ```
/// use physolve::solve_equation;
/// use std::collections::HashMap;
///
/// let root = solve_equation("2*x + 3 = 11", &HashMap::new(), "x").unwrap();
/// assert!((root - 4.0).abs() < 1e-6);
/// ```
pub fn solve_equation(
    source: &str,
    bindings: &HashMap<String, f64>,
    unknown: &str,
) -> Result<f64, SolverError> {
    Equation::parse(source)?.solve(bindings, unknown)
}

/// Snaps values extremely close to zero to exactly zero.
fn snap_zero(value: f64) -> f64 {
    if value.abs() < ZERO_SNAP {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_equation() {
        let root = solve_equation("2*x + 3 = 11", &HashMap::new(), "x").unwrap();
        assert_relative_eq!(root, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quadratic_equation_root_checks_back() {
        let equation = Equation::parse("x^2 = 16").unwrap();
        let root = equation.solve(&HashMap::new(), "x").unwrap();

        // Either root is acceptable; substituting back must balance both sides
        let scope = HashMap::from([("x".to_string(), root)]);
        let lhs = equation.eval_lhs(&scope).unwrap();
        let rhs = equation.eval_rhs(&scope).unwrap();
        assert_relative_eq!(lhs, rhs, epsilon = 1e-6);
        assert_relative_eq!(root.abs(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_kinematics_solve_for_acceleration() {
        // d = v0*t + a*t^2/2 with d=100, v0=5, t=4 -> a = 10
        let bindings = HashMap::from([
            ("d".to_string(), 100.0),
            ("v0".to_string(), 5.0),
            ("t".to_string(), 4.0),
        ]);
        let root = solve_equation("d = v0*t + a*t^2/2", &bindings, "a").unwrap();
        assert_relative_eq!(root, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transcendental_equation() {
        let root = solve_equation("sin(x) = 0.5", &HashMap::new(), "x").unwrap();
        assert_relative_eq!(root.sin(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_unbound_variable() {
        let err = solve_equation("x + y = 10", &HashMap::new(), "x").unwrap_err();
        assert!(matches!(err, SolverError::UnboundVariable(name) if name == "y"));
    }

    #[test]
    fn test_no_real_root() {
        let err = solve_equation("x^2 = -1", &HashMap::new(), "x").unwrap_err();
        assert!(matches!(err, SolverError::NoBracket { .. }));
    }

    #[test]
    fn test_missing_unknown() {
        let bindings = HashMap::from([("a".to_string(), 2.0)]);
        let err = solve_equation("a * 2 = 4", &bindings, "x").unwrap_err();
        assert!(matches!(err, SolverError::MissingUnknown(name) if name == "x"));
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(
            Equation::parse("x + 1").unwrap_err(),
            SolverError::Format { found: 0 }
        ));
        assert!(matches!(
            Equation::parse("x = 1 = 2").unwrap_err(),
            SolverError::Format { found: 2 }
        ));
    }

    #[test]
    fn test_non_finite_binding() {
        let bindings = HashMap::from([("a".to_string(), f64::NAN)]);
        let err = solve_equation("a + x = 1", &bindings, "x").unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteBinding { .. }));
    }

    #[test]
    fn test_binding_for_unknown_is_ignored() {
        let bindings = HashMap::from([("x".to_string(), 999.0)]);
        let root = solve_equation("2*x = 10", &bindings, "x").unwrap();
        assert_relative_eq!(root, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_near_zero_snap() {
        // sin(x) = 0 converges to a root within snapping distance of zero
        let root = solve_equation("sin(x) = 0", &HashMap::new(), "x").unwrap();
        assert_eq!(root, 0.0);
    }

    #[test]
    fn test_determinism() {
        let bindings = HashMap::from([("a".to_string(), 9.0)]);
        let first = solve_equation("x^2 = a", &bindings, "x").unwrap();
        let second = solve_equation("x^2 = a", &bindings, "x").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_solve_many_matches_serial() {
        let equation = Equation::parse("d = v * t").unwrap();
        let batches: Vec<_> = (1..=8)
            .map(|v| {
                HashMap::from([("d".to_string(), 240.0), ("v".to_string(), f64::from(v))])
            })
            .collect();

        let parallel = equation.solve_many(&batches, "t");
        for (set, result) in batches.iter().zip(parallel) {
            let serial = equation.solve(set, "t").unwrap();
            assert_eq!(result.unwrap(), serial);
        }
    }

    #[test]
    fn test_division_by_zero_is_an_evaluation_error() {
        let bindings = HashMap::from([("t".to_string(), 0.0), ("d".to_string(), 10.0)]);
        let err = solve_equation("v = d / t", &bindings, "v").unwrap_err();
        assert!(matches!(err, SolverError::Evaluation(_)));
    }
}
