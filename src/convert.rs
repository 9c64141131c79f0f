//! Conversion module for transforming evalexpr AST nodes into our internal expression representation.
//!
//! This module handles converting the AST nodes from the evalexpr crate into our own
//! expression types that support direct evaluation and symbolic differentiation. It maps
//! variables, operators, and function calls into our internal representation.
//!
//! The main entry point is the `build_ast` function which recursively traverses the
//! evalexpr AST and builds up our expression tree.

use std::collections::HashMap;

use crate::{
    errors::ConvertError,
    expr::{Expr, VarRef},
};
use evalexpr::{Node, Operator};

/// Converts an evalexpr AST node into our internal expression representation.
///
/// This function recursively traverses the evalexpr AST and builds up our own AST
/// representation that can be evaluated and symbolically differentiated.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
/// * `var_map` - A mapping of variable names to their indices in the input array
///
/// # Returns
/// * `Result<Expr, ConvertError>` - The converted expression or an error if conversion fails
///
/// # Examples of supported operations:
/// * Basic arithmetic: +, -, *, /
/// * Variables: x, y, etc.
/// * Constants: integer and floating point numbers
/// * Functions: abs(), sqrt(), exp(), ln(), log(), sin(), cos(), tan()
/// * Exponentiation: x^n for integer, float, and expression exponents
pub fn build_ast(node: &Node, var_map: &HashMap<String, u32>) -> Result<Expr, ConvertError> {
    match node.operator() {
        // Addition operator - combines multiple children into a series of binary Add expressions
        Operator::Add => {
            let children = node.children();
            children
                .iter()
                .skip(1)
                .try_fold(build_ast(&children[0], var_map)?, |acc, child| {
                    Ok(Expr::Add(
                        Box::new(acc),
                        Box::new(build_ast(child, var_map)?),
                    ))
                })
        }
        // Multiplication operator - combines multiple children into a series of binary Mul expressions
        Operator::Mul => {
            let children = node.children();
            children.iter().skip(1).try_fold(
                build_ast(&children[0], var_map)?,
                |acc, child| -> Result<Expr, ConvertError> {
                    Ok(Expr::Mul(
                        Box::new(acc),
                        Box::new(build_ast(child, var_map)?),
                    ))
                },
            )
        }
        // Division operator - creates a binary Div expression
        Operator::Div => {
            let children = node.children();
            Ok(Expr::Div(
                Box::new(build_ast(&children[0], var_map)?),
                Box::new(build_ast(&children[1], var_map)?),
            ))
        }
        // Subtraction operator - creates a binary Sub expression
        Operator::Sub => {
            let children = node.children();
            Ok(Expr::Sub(
                Box::new(build_ast(&children[0], var_map)?),
                Box::new(build_ast(&children[1], var_map)?),
            ))
        }
        // Constant value - must be numeric
        Operator::Const { value } => match value {
            evalexpr::Value::Float(f) => Ok(Expr::Const(*f)),
            evalexpr::Value::Int(i) => Ok(Expr::Const(*i as f64)),
            _ => Err(ConvertError::ConstOperator(format!(
                "Expected numeric constant: {:?}",
                value
            ))),
        },
        // Variable reference - looks up the variable's index in var_map
        Operator::VariableIdentifierRead { identifier } => {
            let index = var_map
                .get(identifier.as_str())
                .ok_or(ConvertError::VariableNotFound(format!(
                    "Variable not found: {:?}",
                    identifier
                )))?;
            Ok(Expr::Var(VarRef {
                name: identifier.to_string(),
                index: *index,
            }))
        }
        // Negation operator - creates a Neg expression
        Operator::Neg => {
            let children = node.children();
            Ok(Expr::Neg(Box::new(build_ast(&children[0], var_map)?)))
        }
        // Function call - maps onto the supported transcendental functions
        Operator::FunctionIdentifier { identifier } => {
            let children = node.children();
            match identifier.as_str() {
                "abs" => Ok(Expr::Abs(Box::new(build_ast(&children[0], var_map)?))),
                "ln" => Ok(Expr::Ln(Box::new(build_ast(&children[0], var_map)?))),
                "log" => Ok(Expr::Ln(Box::new(build_ast(&children[0], var_map)?))),
                "sqrt" => Ok(Expr::Sqrt(Box::new(build_ast(&children[0], var_map)?))),
                "exp" => Ok(Expr::Exp(Box::new(build_ast(&children[0], var_map)?))),
                "sin" => Ok(Expr::Sin(Box::new(build_ast(&children[0], var_map)?))),
                "cos" => Ok(Expr::Cos(Box::new(build_ast(&children[0], var_map)?))),
                "tan" => Ok(Expr::Tan(Box::new(build_ast(&children[0], var_map)?))),
                _ => Err(ConvertError::UnsupportedFunction(format!(
                    "Unsupported function: {:?}",
                    identifier
                ))),
            }
        }
        // Root node - should have exactly one child
        Operator::RootNode => {
            let children = node.children();
            if children.len() == 1 {
                build_ast(&children[0], var_map)
            } else {
                Err(ConvertError::RootNode(format!(
                    "Expected single child for root node: {:?}",
                    children
                )))
            }
        }
        // Exponentiation - constant exponents get the dedicated Pow/PowFloat forms,
        // everything else falls back to the general expression exponent
        Operator::Exp => {
            let children = node.children();
            let base = build_ast(&children[0], var_map)?;

            if let Operator::Const { value } = children[1].operator() {
                match value {
                    evalexpr::Value::Int(exp) => return Ok(Expr::Pow(Box::new(base), *exp)),
                    evalexpr::Value::Float(exp) if exp.fract() == 0.0 => {
                        return Ok(Expr::Pow(Box::new(base), *exp as i64))
                    }
                    evalexpr::Value::Float(exp) => {
                        return Ok(Expr::PowFloat(Box::new(base), *exp))
                    }
                    _ => {}
                }
            }

            Ok(Expr::PowExpr(
                Box::new(base),
                Box::new(build_ast(&children[1], var_map)?),
            ))
        }
        // Any other operator is unsupported
        _ => Err(ConvertError::UnsupportedOperator(format!(
            "Unsupported operator: {:?}",
            node.operator()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalexpr::build_operator_tree;

    fn ast_for(expression: &str, vars: &[(&str, u32)]) -> Expr {
        let var_map: HashMap<String, u32> = vars
            .iter()
            .map(|(name, index)| (name.to_string(), *index))
            .collect();
        let node = build_operator_tree(expression).unwrap();
        build_ast(&node, &var_map).unwrap()
    }

    #[test]
    fn test_build_arithmetic() {
        let expr = ast_for("2*x + 3", &[("x", 0)]);
        assert_eq!(expr.evaluate(&[4.0]).unwrap(), 11.0);
    }

    #[test]
    fn test_build_integer_exponent() {
        let expr = ast_for("x^3", &[("x", 0)]);
        assert!(matches!(expr, Expr::Pow(_, 3)));
    }

    #[test]
    fn test_build_float_exponent() {
        let expr = ast_for("x^1.5", &[("x", 0)]);
        assert!(matches!(expr, Expr::PowFloat(_, _)));
        assert!((expr.evaluate(&[4.0]).unwrap() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_expression_exponent() {
        let expr = ast_for("x^y", &[("x", 0), ("y", 1)]);
        assert!(matches!(expr, Expr::PowExpr(_, _)));
        assert!((expr.evaluate(&[2.0, 3.0]).unwrap() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_functions() {
        let expr = ast_for("sin(x) + cos(x) + tan(x)", &[("x", 0)]);
        let x = 0.5_f64;
        let expected = x.sin() + x.cos() + x.tan();
        assert!((expr.evaluate(&[x]).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        let node = build_operator_tree("x + y").unwrap();
        let var_map = HashMap::from([("x".to_string(), 0)]);
        let err = build_ast(&node, &var_map).unwrap_err();
        assert!(matches!(err, ConvertError::VariableNotFound(_)));
    }

    #[test]
    fn test_unsupported_function_is_rejected() {
        let node = build_operator_tree("sinh(x)").unwrap();
        let var_map = HashMap::from([("x".to_string(), 0)]);
        let err = build_ast(&node, &var_map).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFunction(_)));
    }
}
