//! Formula handling: parsed expressions with evaluation and differentiation.
//!
//! This module provides the core `Formula` type which represents a mathematical
//! expression that can be evaluated and differentiated. Formulas are parsed once
//! on creation; evaluation walks the simplified AST directly, and first order
//! partial derivatives are derived symbolically and kept ready for gradient
//! computation.
//!
//! # Example
//!
//! ```
//! use physolve::Formula;
//!
//! let formula = Formula::new("2*x + y^2".to_string()).unwrap();
//! let result = formula.eval(&[1.0, 2.0]).unwrap(); // 6.0
//! let gradient = formula.gradient(&[1.0, 2.0]).unwrap(); // [2.0, 4.0]
//! ```
//!
//! # Variable Handling
//!
//! Variables can be specified either:
//! - Automatically extracted and sorted alphabetically using `new()`
//! - Explicitly mapped to indices using `from_var_map()`
//!
//! Input arrays must match the variable ordering.

use std::collections::{HashMap, HashSet};

use evalexpr::{build_operator_tree, Node, Operator};

use crate::convert::build_ast;
use crate::errors::{EvalError, FormulaError};
use crate::expr::Expr;
use colored::Colorize;
use itertools::Itertools;

/// Represents a mathematical expression that can be evaluated and differentiated.
///
/// This struct holds the original expression string, the simplified AST, the
/// symbolic first order partial derivatives, and the variable ordering. All
/// evaluation goes through recursive pattern matching over the AST; there is no
/// runtime code generation.
///
/// Variables can be specified either:
/// - Automatically extracted and sorted alphabetically using `new()`
/// - Explicitly mapped to indices using `from_var_map()`
///
/// Input arrays must match the variable ordering.
#[derive(Clone)]
pub struct Formula {
    source: String,
    ast: Box<Expr>,
    derivatives: HashMap<String, Box<Expr>>,
    var_map: HashMap<String, u32>,
    sorted_variables: Vec<String>,
}

impl std::fmt::Debug for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{\n")?;
        writeln!(f, "    {}: {}\n", "Formula".cyan(), self.source)?;
        writeln!(f, "    {}: {:?}\n", "Variables".cyan(), self.var_map)?;
        writeln!(
            f,
            "    {}: {:?}\n",
            "Sorted Variables".cyan(),
            self.sorted_variables
        )?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Formula {
    /// Creates a new `Formula` from a string representation.
    ///
    /// This function will automatically extract the variable names from the
    /// expression string and use them to create the `Formula` instance. The
    /// variable names are sorted alphabetically and it is assumed that input
    /// arrays of values will be in the same order.
    ///
    /// For more control over variable ordering, use `from_var_map()` instead.
    ///
    /// # Arguments
    /// * `source` - The expression as a string (e.g. "2*x + y^2")
    ///
    /// # Returns
    /// * `Result<Self, FormulaError>` - The parsed formula or an error
    ///
    /// # Example
    /// ```
    /// # use physolve::Formula;
    /// let formula = Formula::new("2*x + y^2".to_string()).unwrap();
    /// let result = formula.eval(&[1.0, 2.0]).unwrap(); // x=1, y=2 -> 2*1 + 2^2 = 6
    /// assert_eq!(result, 6.0);
    /// ```
    pub fn new(source: String) -> Result<Self, FormulaError> {
        let node = build_operator_tree(&source)?;
        let variables = extract_symbols(&node);
        Self::build(&variables, source)
    }

    /// Creates a new `Formula` from a map of variable names to their indices.
    ///
    /// This function allows explicit control over variable ordering by specifying
    /// the mapping between variable names and their positions in input arrays.
    ///
    /// # Arguments
    /// * `source` - The expression as a string
    /// * `variables` - A map of variable names to their indices in input arrays
    ///
    /// # Returns
    /// * `Result<Self, FormulaError>` - The parsed formula or an error
    pub fn from_var_map(
        source: String,
        variables: &HashMap<String, u32>,
    ) -> Result<Self, FormulaError> {
        Self::build(variables, source)
    }

    /// Builds a `Formula` instance from a variable map and expression string.
    ///
    /// This is the core builder function used by both `new()` and `from_var_map()`.
    /// It handles:
    /// - Parsing the expression string into an AST
    /// - Validating that every referenced variable is in the provided map
    /// - Simplifying the AST
    /// - Deriving the symbolic first order partial derivatives
    ///
    /// # Errors
    /// Returns `FormulaError` if:
    /// - The expression string fails to parse
    /// - AST conversion fails
    /// - Variables in the expression are not found in the provided map
    fn build(variables: &HashMap<String, u32>, source: String) -> Result<Self, FormulaError> {
        let node = build_operator_tree(&source)?;

        // Validate that the referenced variables are all mapped
        let mut non_defined_variables = HashSet::new();
        let control_variables = extract_symbols(&node);
        for variable in control_variables.keys() {
            if !variables.contains_key(variable) {
                non_defined_variables.insert(variable.clone());
            }
        }

        if !non_defined_variables.is_empty() {
            return Err(FormulaError::VariableNotFound(
                non_defined_variables
                    .into_iter()
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
        }

        // Sort the variables by their indices
        let sorted_variables: Vec<String> = variables
            .iter()
            .sorted_by_key(|(_, &idx)| idx)
            .map(|(var, _)| var.clone())
            .collect();

        let ast = build_ast(&node, variables)?.simplify();

        // Derive the first order partial derivatives
        let mut derivatives = HashMap::new();
        for variable in sorted_variables.iter() {
            let derivative = ast.derivative(variable).simplify();
            derivatives.insert(variable.clone(), derivative);
        }

        Ok(Self {
            source,
            ast,
            derivatives,
            var_map: variables.clone(),
            sorted_variables,
        })
    }

    /// Evaluates the formula for the given input values.
    ///
    /// # Arguments
    /// * `values` - Array of f64 values corresponding to variables in order
    ///
    /// # Returns
    /// * `Result<f64, FormulaError>` - The result of evaluating the formula
    ///
    /// # Example
    /// ```
    /// # use physolve::Formula;
    /// let formula = Formula::new("2*x + y^2".to_string()).unwrap();
    /// assert_eq!(formula.eval(&[1.0, 2.0]).unwrap(), 6.0);
    /// ```
    ///
    /// # Errors
    /// Returns `FormulaError::InvalidInputLength` if the length of values doesn't
    /// match the number of variables, or the underlying `EvalError` if evaluation
    /// fails.
    pub fn eval(&self, values: &[f64]) -> Result<f64, FormulaError> {
        self.validate_input_length(values)?;
        Ok(self.ast.evaluate(values)?)
    }

    /// Evaluates the formula over a name-to-value scope.
    ///
    /// Builds the value array in variable order from the scope, failing with an
    /// unbound-variable error for any formula variable missing from the scope.
    /// Extra names in the scope are ignored.
    ///
    /// # Example
    /// ```
    /// # use physolve::Formula;
    /// # use std::collections::HashMap;
    /// let formula = Formula::new("2*x + y^2".to_string()).unwrap();
    /// let scope = HashMap::from([("x".to_string(), 1.0), ("y".to_string(), 2.0)]);
    /// assert_eq!(formula.eval_scope(&scope).unwrap(), 6.0);
    /// ```
    pub fn eval_scope(&self, scope: &HashMap<String, f64>) -> Result<f64, FormulaError> {
        let values = self.values_from_scope(scope)?;
        Ok(self.ast.evaluate(&values)?)
    }

    /// Computes the gradient (all first order partial derivatives) at the given point.
    ///
    /// # Arguments
    /// * `values` - Array of f64 values corresponding to variables in order
    ///
    /// # Returns
    /// * `Result<Vec<f64>, FormulaError>` - Vector of partial derivatives in variable order
    ///
    /// # Example
    /// ```
    /// # use physolve::Formula;
    /// let formula = Formula::new("2*x + y^2".to_string()).unwrap();
    /// let gradient = formula.gradient(&[1.0, 2.0]).unwrap();
    /// assert_eq!(gradient, vec![2.0, 4.0]); // [∂/∂x, ∂/∂y] = [2, 2y]
    /// ```
    pub fn gradient(&self, values: &[f64]) -> Result<Vec<f64>, FormulaError> {
        self.validate_input_length(values)?;
        self.sorted_variables
            .iter()
            .map(|variable| Ok(self.derivatives[variable].evaluate(values)?))
            .collect()
    }

    /// Returns the symbolic partial derivative tree for a specific variable.
    ///
    /// # Errors
    /// Returns `FormulaError::DerivativeNotFound` if the variable is not found.
    pub fn partial(&self, variable: &str) -> Result<&Expr, FormulaError> {
        self.derivatives
            .get(variable)
            .map(|derivative| derivative.as_ref())
            .ok_or(FormulaError::DerivativeNotFound(variable.to_string()))
    }

    /// Returns the partial derivative with respect to a variable as a new `Formula`.
    ///
    /// The derived formula shares this formula's variable ordering, so the same
    /// input arrays evaluate both.
    ///
    /// # Example
    /// ```
    /// # use physolve::Formula;
    /// let formula = Formula::new("x^2 * y".to_string()).unwrap();
    /// let dx = formula.derivative("x").unwrap();
    /// assert_eq!(dx.eval(&[2.0, 3.0]).unwrap(), 12.0); // 2xy
    /// ```
    ///
    /// # Errors
    /// Returns `FormulaError::DerivativeNotFound` if the variable is not found.
    pub fn derivative(&self, variable: &str) -> Result<Formula, FormulaError> {
        let ast = Box::new(self.partial(variable)?.clone());

        let mut derivatives = HashMap::new();
        for var in self.sorted_variables.iter() {
            derivatives.insert(var.clone(), ast.derivative(var).simplify());
        }

        Ok(Formula {
            source: ast.to_string(),
            ast,
            derivatives,
            var_map: self.var_map.clone(),
            sorted_variables: self.sorted_variables.clone(),
        })
    }

    /// Returns the map of variable names to their indices.
    pub fn variables(&self) -> &HashMap<String, u32> {
        &self.var_map
    }

    /// Returns the original expression string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the simplified expression tree.
    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Returns the sorted variables.
    pub fn sorted_variables(&self) -> &[String] {
        &self.sorted_variables
    }

    /// Builds a value array in variable order from a name-to-value scope.
    pub(crate) fn values_from_scope(
        &self,
        scope: &HashMap<String, f64>,
    ) -> Result<Vec<f64>, FormulaError> {
        self.sorted_variables
            .iter()
            .map(|variable| {
                scope
                    .get(variable)
                    .copied()
                    .ok_or_else(|| EvalError::UnboundVariable(variable.clone()).into())
            })
            .collect()
    }

    /// Validates that the input array length matches the number of variables.
    fn validate_input_length(&self, values: &[f64]) -> Result<(), FormulaError> {
        if values.len() != self.sorted_variables.len() {
            return Err(FormulaError::InvalidInputLength {
                expected: self.sorted_variables.len(),
                got: values.len(),
            });
        }
        Ok(())
    }
}

/// Extracts variables from an expression tree and assigns them indices.
///
/// # Arguments
/// * `node` - Root node of the expression tree
///
/// # Returns
/// HashMap mapping variable names to their indices in the evaluation array,
/// assigned in alphabetical order
pub fn extract_symbols(node: &Node) -> HashMap<String, u32> {
    let mut symbols = HashSet::new();
    extract_symbols_from_node(node, &mut symbols);

    let mut symbols: Vec<String> = symbols.into_iter().collect();
    symbols.sort();

    symbols
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, i as u32))
        .collect()
}

/// Recursively extracts variable names from an expression tree node.
pub(crate) fn extract_symbols_from_node(node: &Node, symbols: &mut HashSet<String>) {
    match node.operator() {
        Operator::VariableIdentifierRead { identifier } => {
            symbols.insert(identifier.to_string());
        }
        _ => {
            for child in node.children() {
                extract_symbols_from_node(child, symbols);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_formula() {
        let formula = Formula::new("2*x + y^2".to_string()).unwrap();
        assert_eq!(formula.eval(&[1.0, 2.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_gradient() {
        let formula = Formula::new("2*x + y^2".to_string()).unwrap();
        let gradient = formula.gradient(&[1.0, 2.0]).unwrap();
        assert_eq!(gradient, vec![2.0, 4.0]);
    }

    #[test]
    fn test_derivative_formula() {
        let formula = Formula::new("x^2 * y^2".to_string()).unwrap();
        let dx = formula.derivative("x").unwrap();
        assert_eq!(dx.eval(&[2.0, 3.0]).unwrap(), 36.0); // 2x*y^2
    }

    #[test]
    fn test_eval_invalid_length() {
        let formula = Formula::new("2*x + y^2".to_string()).unwrap();
        let err = formula.eval(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::InvalidInputLength {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_eval_scope_unbound_variable() {
        let formula = Formula::new("x + y".to_string()).unwrap();
        let scope = HashMap::from([("x".to_string(), 1.0)]);
        let err = formula.eval_scope(&scope).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::Eval(EvalError::UnboundVariable(name)) if name == "y"
        ));
    }

    #[test]
    fn test_from_var_map() {
        let formula = Formula::from_var_map(
            "2*x + y^2".to_string(),
            &HashMap::from([("x".to_string(), 1), ("y".to_string(), 0)]),
        )
        .unwrap();
        assert_eq!(formula.eval(&[2.0, 1.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_from_var_map_invalid() {
        let result = Formula::from_var_map(
            "2*x + y^2".to_string(),
            &HashMap::from([("x".to_string(), 0), ("z".to_string(), 1)]),
        );
        assert!(matches!(result, Err(FormulaError::VariableNotFound(_))));
    }

    #[test]
    fn test_variable_ordering() {
        let mut vars = HashMap::new();
        vars.insert("z".to_string(), 0);
        vars.insert("y".to_string(), 1);
        vars.insert("x".to_string(), 2);

        let formula = Formula::from_var_map("x + y + z".to_string(), &vars).unwrap();
        assert_eq!(formula.sorted_variables(), &["z", "y", "x"]);

        let result = formula.eval(&[1.0, 2.0, 3.0]).unwrap(); // z=1, y=2, x=3
        assert_eq!(result, 6.0);
    }

    #[test]
    fn test_invalid_expression() {
        let result = Formula::new("2*x + )".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_transcendental_eval() {
        let formula = Formula::new("exp(ln(x)) + sin(y)".to_string()).unwrap();
        let result = formula.eval(&[3.0, 0.5]).unwrap();
        assert_relative_eq!(result, 3.0 + 0.5_f64.sin(), max_relative = 1e-12);
    }

    #[test]
    fn test_extract_symbols() {
        let node = build_operator_tree("2*x + y^2 - x").unwrap();
        let symbols = extract_symbols(&node);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols["x"], 0);
        assert_eq!(symbols["y"], 1);
    }

    #[test]
    fn test_debug_and_display_formatting() {
        let formula = Formula::new("2*x + y^2".to_string()).unwrap();

        let debug_output = format!("{:?}", formula);
        assert!(debug_output.contains("2*x + y^2"));

        let display_output = format!("{}", formula);
        assert!(display_output.contains("2*x + y^2"));
    }

    #[test]
    fn test_accessor_methods() {
        let formula = Formula::new("2*x + y^2".to_string()).unwrap();

        assert_eq!(formula.source(), "2*x + y^2");
        assert!(!formula.variables().is_empty());
        assert!(!formula.sorted_variables().is_empty());
    }
}
