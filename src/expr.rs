//! Expression module for representing mathematical expressions.
//!
//! This module defines the core expression types used to represent mathematical
//! expressions in a form that supports direct evaluation and symbolic
//! differentiation. The main types are:
//!
//! - `Expr`: An enum representing different kinds of mathematical expressions
//! - `VarRef`: A struct containing metadata about variables in expressions
//!
//! The expression tree is built recursively using `Box<Expr>` for nested
//! expressions and can be:
//! - Evaluated over a slice of variable values via recursive pattern matching
//! - Symbolically differentiated to compute derivatives
//! - Simplified using algebraic rules
//!
//! Supported operations include:
//! - Basic arithmetic (+, -, *, /)
//! - Variables and constants
//! - Absolute value and negation
//! - Integer, float, and expression exponents
//! - Transcendental functions (exp, ln, sqrt, sin, cos, tan)
//!
//! # Evaluation semantics
//! Evaluation never produces NaN or infinity as a success value. Division by
//! zero, logarithms of non-positive values, square roots of negative values,
//! and overflowing operations all surface as an `EvalError` naming the
//! offending sub-expression.
//!
//! # Symbolic differentiation
//! The derivative method implements symbolic differentiation by recursively
//! applying calculus rules like the product rule, quotient rule, chain rule,
//! power rule, and the derivatives of the supported transcendental functions.

use crate::errors::EvalError;

/// Represents a reference to a variable in an expression.
///
/// Contains the variable's name and its index into the value slice passed to
/// [`Expr::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub index: u32,
}

/// An expression tree node representing mathematical operations.
///
/// This enum represents different types of mathematical expressions that can be
/// evaluated, symbolically differentiated, and simplified using algebraic rules.
/// The expression tree is built recursively using `Box<Expr>` for nested
/// expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant floating point value
    Const(f64),
    /// A reference to a variable
    Var(VarRef),
    /// Addition of two expressions
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction of two expressions
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication of two expressions
    Mul(Box<Expr>, Box<Expr>),
    /// Division of two expressions
    Div(Box<Expr>, Box<Expr>),
    /// Absolute value of an expression
    Abs(Box<Expr>),
    /// Exponentiation of an expression by an integer constant
    Pow(Box<Expr>, i64),
    /// Exponentiation of an expression by a floating point constant
    PowFloat(Box<Expr>, f64),
    /// Exponentiation of an expression by another expression
    PowExpr(Box<Expr>, Box<Expr>),
    /// Exponential function of an expression
    Exp(Box<Expr>),
    /// Natural logarithm of an expression
    Ln(Box<Expr>),
    /// Square root of an expression
    Sqrt(Box<Expr>),
    /// Sine of an expression (argument in radians)
    Sin(Box<Expr>),
    /// Cosine of an expression (argument in radians)
    Cos(Box<Expr>),
    /// Tangent of an expression (argument in radians)
    Tan(Box<Expr>),
    /// Negation of an expression
    Neg(Box<Expr>),
}

impl Expr {
    /// Evaluates the expression over a slice of variable values.
    ///
    /// Variables resolve through their index into `values`. The method walks
    /// the tree with recursive pattern matching and checks every node's result
    /// for finiteness, so callers never observe NaN or infinity as a success.
    ///
    /// # Arguments
    /// * `values` - Variable values, addressed by each `VarRef`'s index
    ///
    /// # Errors
    /// Returns `EvalError` on out-of-range variable indices, division by zero,
    /// domain violations of `ln` and `sqrt`, and any non-finite intermediate
    /// result (e.g. an overflowing `exp` or a tangent pole).
    pub fn evaluate(&self, values: &[f64]) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Const(c) => *c,
            Expr::Var(var_ref) => values.get(var_ref.index as usize).copied().ok_or(
                EvalError::IndexOutOfRange {
                    index: var_ref.index,
                    len: values.len(),
                },
            )?,
            Expr::Add(left, right) => left.evaluate(values)? + right.evaluate(values)?,
            Expr::Sub(left, right) => left.evaluate(values)? - right.evaluate(values)?,
            Expr::Mul(left, right) => left.evaluate(values)? * right.evaluate(values)?,
            Expr::Div(left, right) => {
                let divisor = right.evaluate(values)?;
                if divisor == 0.0 {
                    return Err(EvalError::DivisionByZero(self.to_string()));
                }
                left.evaluate(values)? / divisor
            }
            Expr::Abs(expr) => expr.evaluate(values)?.abs(),
            Expr::Neg(expr) => -expr.evaluate(values)?,
            Expr::Pow(base, exp) => base.evaluate(values)?.powi(*exp as i32),
            Expr::PowFloat(base, exp) => base.evaluate(values)?.powf(*exp),
            Expr::PowExpr(base, exponent) => {
                base.evaluate(values)?.powf(exponent.evaluate(values)?)
            }
            Expr::Exp(expr) => expr.evaluate(values)?.exp(),
            Expr::Ln(expr) => {
                let arg = expr.evaluate(values)?;
                if arg <= 0.0 {
                    return Err(EvalError::LogDomain {
                        arg,
                        term: self.to_string(),
                    });
                }
                arg.ln()
            }
            Expr::Sqrt(expr) => {
                let arg = expr.evaluate(values)?;
                if arg < 0.0 {
                    return Err(EvalError::SqrtDomain {
                        arg,
                        term: self.to_string(),
                    });
                }
                arg.sqrt()
            }
            Expr::Sin(expr) => expr.evaluate(values)?.sin(),
            Expr::Cos(expr) => expr.evaluate(values)?.cos(),
            Expr::Tan(expr) => expr.evaluate(values)?.tan(),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite(self.to_string()))
        }
    }

    /// Computes the symbolic derivative of this expression with respect to a variable.
    ///
    /// Recursively applies the rules of differentiation to build a new expression
    /// tree representing the derivative:
    /// - d/dx(c) = 0 for constants
    /// - d/dx(x) = 1 for the variable we're differentiating with respect to
    /// - d/dx(y) = 0 for other variables
    /// - Sum rule: d/dx(f + g) = df/dx + dg/dx
    /// - Product rule: d/dx(f * g) = f * dg/dx + g * df/dx
    /// - Quotient rule: d/dx(f/g) = (g * df/dx - f * dg/dx) / g^2
    /// - Chain rule for abs: d/dx|f| = f/|f| * df/dx
    /// - Power rule: d/dx(f^n) = n * f^(n-1) * df/dx
    /// - General power rule: d/dx(f^g) = f^g * (g' * ln(f) + g * f'/f)
    /// - Chain rules for exp, ln, sqrt, sin, cos, tan
    ///
    /// # Arguments
    /// * `with_respect_to` - The name of the variable to differentiate with respect to
    ///
    /// # Returns
    /// A new expression tree representing the derivative
    pub fn derivative(&self, with_respect_to: &str) -> Box<Expr> {
        match self {
            Expr::Const(_) => Box::new(Expr::Const(0.0)),

            Expr::Var(var_ref) => {
                if var_ref.name == with_respect_to {
                    Box::new(Expr::Const(1.0))
                } else {
                    Box::new(Expr::Const(0.0))
                }
            }

            Expr::Add(left, right) => Box::new(Expr::Add(
                left.derivative(with_respect_to),
                right.derivative(with_respect_to),
            )),

            Expr::Sub(left, right) => Box::new(Expr::Sub(
                left.derivative(with_respect_to),
                right.derivative(with_respect_to),
            )),

            Expr::Mul(left, right) => {
                // d/dx(f * g) = f * dg/dx + g * df/dx
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(left.clone(), right.derivative(with_respect_to))),
                    Box::new(Expr::Mul(right.clone(), left.derivative(with_respect_to))),
                ))
            }

            Expr::Div(left, right) => {
                // d/dx(f/g) = (g * df/dx - f * dg/dx) / g^2
                Box::new(Expr::Div(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Mul(right.clone(), left.derivative(with_respect_to))),
                        Box::new(Expr::Mul(left.clone(), right.derivative(with_respect_to))),
                    )),
                    Box::new(Expr::Pow(right.clone(), 2)),
                ))
            }

            Expr::Abs(expr) => {
                // d/dx|f| = f/|f| * df/dx
                Box::new(Expr::Mul(
                    Box::new(Expr::Div(expr.clone(), Box::new(Expr::Abs(expr.clone())))),
                    expr.derivative(with_respect_to),
                ))
            }

            Expr::Pow(base, exp) => {
                // d/dx(f^n) = n * f^(n-1) * df/dx
                Box::new(Expr::Mul(
                    Box::new(Expr::Mul(
                        Box::new(Expr::Const(*exp as f64)),
                        Box::new(Expr::Pow(base.clone(), exp - 1)),
                    )),
                    base.derivative(with_respect_to),
                ))
            }

            Expr::PowFloat(base, exp) => {
                // d/dx(f^c) = c * f^(c-1) * df/dx
                Box::new(Expr::Mul(
                    Box::new(Expr::Mul(
                        Box::new(Expr::Const(*exp)),
                        Box::new(Expr::PowFloat(base.clone(), exp - 1.0)),
                    )),
                    base.derivative(with_respect_to),
                ))
            }

            Expr::PowExpr(base, exponent) => {
                // d/dx(f^g) = f^g * (g' * ln(f) + g * f'/f)
                Box::new(Expr::Mul(
                    Box::new(Expr::PowExpr(base.clone(), exponent.clone())),
                    Box::new(Expr::Add(
                        Box::new(Expr::Mul(
                            exponent.derivative(with_respect_to),
                            Box::new(Expr::Ln(base.clone())),
                        )),
                        Box::new(Expr::Mul(
                            exponent.clone(),
                            Box::new(Expr::Div(base.derivative(with_respect_to), base.clone())),
                        )),
                    )),
                ))
            }

            Expr::Exp(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Exp(expr.clone())),
                expr.derivative(with_respect_to),
            )),

            Expr::Ln(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Div(Box::new(Expr::Const(1.0)), expr.clone())),
                expr.derivative(with_respect_to),
            )),

            Expr::Sqrt(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Mul(
                        Box::new(Expr::Const(2.0)),
                        Box::new(Expr::Sqrt(expr.clone())),
                    )),
                )),
                expr.derivative(with_respect_to),
            )),

            Expr::Sin(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Cos(expr.clone())),
                expr.derivative(with_respect_to),
            )),

            Expr::Cos(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Neg(Box::new(Expr::Sin(expr.clone())))),
                expr.derivative(with_respect_to),
            )),

            Expr::Tan(expr) => {
                // d/dx(tan(f)) = df/dx / cos(f)^2
                Box::new(Expr::Div(
                    expr.derivative(with_respect_to),
                    Box::new(Expr::Pow(Box::new(Expr::Cos(expr.clone())), 2)),
                ))
            }

            Expr::Neg(expr) => Box::new(Expr::Neg(expr.derivative(with_respect_to))),
        }
    }

    /// Simplifies the expression by folding constants and applying basic algebraic rules.
    ///
    /// The rules applied are:
    /// - Constant folding: 2 + 3 → 5, sin(0) → 0
    /// - Identity rules: x + 0 → x, x * 1 → x, x / 1 → x, x - 0 → x
    /// - Zero rules: x * 0 → 0, 0 / x → 0, x - x → 0
    /// - Exponent rules: x^0 → 1, x^1 → x, x / x → 1
    /// - Double negation: -(-x) → x
    /// - Special function folds: |-3| → 3, ||x|| → |x|, ln(exp(x)) → x,
    ///   exp(ln(x)) → x, sqrt(x^2) → |x|
    ///
    /// # Returns
    /// A new simplified expression tree
    pub fn simplify(&self) -> Box<Expr> {
        match self {
            Expr::Const(_) | Expr::Var(_) => Box::new(self.clone()),

            Expr::Add(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&*l, &*r) {
                    (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a + b)),
                    (expr, Expr::Const(0.0)) | (Expr::Const(0.0), expr) => Box::new(expr.clone()),
                    _ => Box::new(Expr::Add(l, r)),
                }
            }

            Expr::Sub(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&*l, &*r) {
                    (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a - b)),
                    (expr, Expr::Const(0.0)) => Box::new(expr.clone()),
                    (Expr::Const(0.0), expr) => Box::new(Expr::Neg(Box::new(expr.clone()))),
                    (a, b) if a == b => Box::new(Expr::Const(0.0)),
                    _ => Box::new(Expr::Sub(l, r)),
                }
            }

            Expr::Mul(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&*l, &*r) {
                    (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a * b)),
                    (Expr::Const(0.0), _) | (_, Expr::Const(0.0)) => Box::new(Expr::Const(0.0)),
                    (expr, Expr::Const(1.0)) | (Expr::Const(1.0), expr) => Box::new(expr.clone()),
                    (expr, Expr::Const(-1.0)) | (Expr::Const(-1.0), expr) => {
                        Box::new(Expr::Neg(Box::new(expr.clone())))
                    }
                    (a, b) if a == b => Box::new(Expr::Pow(l, 2)),
                    _ => Box::new(Expr::Mul(l, r)),
                }
            }

            Expr::Div(left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (&*l, &*r) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Box::new(Expr::Const(a / b)),
                    (Expr::Const(0.0), _) => Box::new(Expr::Const(0.0)),
                    (expr, Expr::Const(1.0)) => Box::new(expr.clone()),
                    (expr, Expr::Const(-1.0)) => Box::new(Expr::Neg(Box::new(expr.clone()))),
                    (a, b) if a == b => Box::new(Expr::Const(1.0)),
                    _ => Box::new(Expr::Div(l, r)),
                }
            }

            Expr::Abs(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(a) => Box::new(Expr::Const(a.abs())),
                    Expr::Abs(inner) => Box::new(Expr::Abs(inner.clone())),
                    Expr::Neg(inner) => Box::new(Expr::Abs(inner.clone())),
                    // Even powers are always non-negative
                    Expr::Pow(_, exp) if exp % 2 == 0 => e,
                    _ => Box::new(Expr::Abs(e)),
                }
            }

            Expr::Pow(base, exp) => {
                let b = base.simplify();
                match (&*b, exp) {
                    (_, 0) => Box::new(Expr::Const(1.0)),
                    (Expr::Const(a), exp) => Box::new(Expr::Const(a.powi(*exp as i32))),
                    (expr, 1) => Box::new(expr.clone()),
                    (Expr::Pow(inner_base, inner_exp), outer_exp) => {
                        Box::new(Expr::Pow(inner_base.clone(), inner_exp * outer_exp))
                    }
                    _ => Box::new(Expr::Pow(b, *exp)),
                }
            }

            Expr::PowFloat(base, exp) => {
                let b = base.simplify();
                match (&*b, exp) {
                    (_, exp) if *exp == 0.0 => Box::new(Expr::Const(1.0)),
                    (Expr::Const(a), exp) => Box::new(Expr::Const(a.powf(*exp))),
                    (expr, exp) if *exp == 1.0 => Box::new(expr.clone()),
                    // Integral float exponents degrade to the integer form
                    (expr, exp) if exp.fract() == 0.0 => {
                        Box::new(Expr::Pow(Box::new(expr.clone()), *exp as i64))
                    }
                    _ => Box::new(Expr::PowFloat(b, *exp)),
                }
            }

            Expr::PowExpr(base, exponent) => {
                let b = base.simplify();
                let e = exponent.simplify();
                match (&*b, &*e) {
                    (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a.powf(*b))),
                    (_, Expr::Const(0.0)) => Box::new(Expr::Const(1.0)),
                    (expr, Expr::Const(1.0)) => Box::new(expr.clone()),
                    (expr, Expr::Const(exp)) if exp.fract() == 0.0 => {
                        Box::new(Expr::Pow(Box::new(expr.clone()), *exp as i64))
                    }
                    (expr, Expr::Const(exp)) => {
                        Box::new(Expr::PowFloat(Box::new(expr.clone()), *exp))
                    }
                    _ => Box::new(Expr::PowExpr(b, e)),
                }
            }

            Expr::Exp(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(0.0) => Box::new(Expr::Const(1.0)),
                    Expr::Const(a) => Box::new(Expr::Const(a.exp())),
                    Expr::Ln(inner) => inner.clone(),
                    _ => Box::new(Expr::Exp(e)),
                }
            }

            Expr::Ln(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(1.0) => Box::new(Expr::Const(0.0)),
                    Expr::Const(a) if *a > 0.0 => Box::new(Expr::Const(a.ln())),
                    Expr::Exp(inner) => inner.clone(),
                    _ => Box::new(Expr::Ln(e)),
                }
            }

            Expr::Sqrt(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(a) if *a >= 0.0 => Box::new(Expr::Const(a.sqrt())),
                    Expr::Pow(x, 2) => Box::new(Expr::Abs(x.clone())),
                    _ => Box::new(Expr::Sqrt(e)),
                }
            }

            Expr::Sin(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(0.0) => Box::new(Expr::Const(0.0)),
                    Expr::Const(a) => Box::new(Expr::Const(a.sin())),
                    _ => Box::new(Expr::Sin(e)),
                }
            }

            Expr::Cos(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(0.0) => Box::new(Expr::Const(1.0)),
                    Expr::Const(a) => Box::new(Expr::Const(a.cos())),
                    _ => Box::new(Expr::Cos(e)),
                }
            }

            Expr::Tan(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(0.0) => Box::new(Expr::Const(0.0)),
                    Expr::Const(a) => Box::new(Expr::Const(a.tan())),
                    _ => Box::new(Expr::Tan(e)),
                }
            }

            Expr::Neg(expr) => {
                let e = expr.simplify();
                match &*e {
                    Expr::Const(a) => Box::new(Expr::Const(-a)),
                    Expr::Neg(inner) => inner.clone(),
                    _ => Box::new(Expr::Neg(e)),
                }
            }
        }
    }

}

/// Implements string formatting for expressions.
///
/// Converts expressions to their standard mathematical notation:
/// - Constants are formatted as numbers
/// - Variables are formatted as their names
/// - Binary operations (+,-,*,/) are wrapped in parentheses
/// - Functions (exp, ln, sqrt, sin, cos, tan) use function call notation
/// - Absolute value uses |x| notation
/// - Exponents use ^
/// - Negation uses - prefix
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{val}"),
            Expr::Var(var_ref) => write!(f, "{}", var_ref.name),
            Expr::Add(left, right) => write!(f, "({left} + {right})"),
            Expr::Sub(left, right) => write!(f, "({left} - {right})"),
            Expr::Mul(left, right) => write!(f, "({left} * {right})"),
            Expr::Div(left, right) => write!(f, "({left} / {right})"),
            Expr::Abs(expr) => write!(f, "|{expr}|"),
            Expr::Pow(base, exp) => write!(f, "({base}^{exp})"),
            Expr::PowFloat(base, exp) => write!(f, "({base}^{exp})"),
            Expr::PowExpr(base, exponent) => write!(f, "({base}^{exponent})"),
            Expr::Exp(expr) => write!(f, "exp({expr})"),
            Expr::Ln(expr) => write!(f, "ln({expr})"),
            Expr::Sqrt(expr) => write!(f, "sqrt({expr})"),
            Expr::Sin(expr) => write!(f, "sin({expr})"),
            Expr::Cos(expr) => write!(f, "cos({expr})"),
            Expr::Tan(expr) => write!(f, "tan({expr})"),
            Expr::Neg(expr) => write!(f, "-{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(VarRef {
            name: name.to_string(),
            index: 0,
        }))
    }

    #[test]
    fn test_evaluate_arithmetic() {
        // 2*x + 3 at x = 4 -> 11
        let expr = Expr::Add(
            Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), var("x"))),
            Box::new(Expr::Const(3.0)),
        );
        assert_eq!(expr.evaluate(&[4.0]).unwrap(), 11.0);
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let expr = Expr::Div(Box::new(Expr::Const(1.0)), var("x"));
        let err = expr.evaluate(&[0.0]).unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero(_)));
    }

    #[test]
    fn test_evaluate_log_domain() {
        let expr = Expr::Ln(var("x"));
        let err = expr.evaluate(&[-1.0]).unwrap_err();
        assert!(matches!(err, EvalError::LogDomain { arg: -1.0, .. }));
    }

    #[test]
    fn test_evaluate_sqrt_domain() {
        let expr = Expr::Sqrt(var("x"));
        let err = expr.evaluate(&[-4.0]).unwrap_err();
        assert!(matches!(err, EvalError::SqrtDomain { arg: -4.0, .. }));
    }

    #[test]
    fn test_evaluate_overflow_is_an_error() {
        // exp(x) at x = 1000 overflows to infinity
        let expr = Expr::Exp(var("x"));
        let err = expr.evaluate(&[1000.0]).unwrap_err();
        assert!(matches!(err, EvalError::NonFinite(_)));
    }

    #[test]
    fn test_evaluate_index_out_of_range() {
        let expr = Expr::Var(VarRef {
            name: "y".to_string(),
            index: 3,
        });
        let err = expr.evaluate(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::IndexOutOfRange { index: 3, len: 1 }
        ));
    }

    #[test]
    fn test_derivative_power_rule() {
        // d/dx(x^3) = 3*x^2, evaluated at x = 2 -> 12
        let expr = Expr::Pow(var("x"), 3);
        let derivative = expr.derivative("x");
        assert_eq!(derivative.evaluate(&[2.0]).unwrap(), 12.0);
    }

    #[test]
    fn test_derivative_product_rule() {
        // d/dx(x * sin(x)) = sin(x) + x*cos(x)
        let expr = Expr::Mul(var("x"), Box::new(Expr::Sin(var("x"))));
        let derivative = expr.derivative("x");
        let x = 1.3_f64;
        let expected = x.sin() + x * x.cos();
        assert!((derivative.evaluate(&[x]).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_of_other_variable_is_zero() {
        let expr = Expr::Mul(Box::new(Expr::Const(2.0)), var("x"));
        assert_eq!(*expr.derivative("y").simplify(), Expr::Const(0.0));
    }

    #[test]
    fn test_derivative_tan() {
        // d/dx(tan(x)) = 1/cos(x)^2
        let expr = Expr::Tan(var("x"));
        let derivative = expr.derivative("x");
        let x = 0.7_f64;
        let expected = 1.0 / (x.cos() * x.cos());
        assert!((derivative.evaluate(&[x]).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_simplify() {
        // Constant folding: 2 + 3 -> 5
        assert_eq!(
            *Expr::Add(Box::new(Expr::Const(2.0)), Box::new(Expr::Const(3.0))).simplify(),
            Expr::Const(5.0)
        );

        // Additive identity: x + 0 -> x
        assert_eq!(
            *Expr::Add(var("x"), Box::new(Expr::Const(0.0))).simplify(),
            *var("x")
        );

        // Multiplicative identity: x * 1 -> x
        assert_eq!(
            *Expr::Mul(var("x"), Box::new(Expr::Const(1.0))).simplify(),
            *var("x")
        );

        // Multiplication by zero: x * 0 -> 0
        assert_eq!(
            *Expr::Mul(var("x"), Box::new(Expr::Const(0.0))).simplify(),
            Expr::Const(0.0)
        );

        // Division by self: x / x -> 1
        assert_eq!(*Expr::Div(var("x"), var("x")).simplify(), Expr::Const(1.0));

        // Exponent rules: x^0 -> 1, x^1 -> x
        assert_eq!(*Expr::Pow(var("x"), 0).simplify(), Expr::Const(1.0));
        assert_eq!(*Expr::Pow(var("x"), 1).simplify(), *var("x"));

        // Subtraction from self: x - x -> 0
        assert_eq!(*Expr::Sub(var("x"), var("x")).simplify(), Expr::Const(0.0));

        // Double negation: -(-x) -> x
        assert_eq!(
            *Expr::Neg(Box::new(Expr::Neg(var("x")))).simplify(),
            *var("x")
        );

        // sqrt(x^2) -> |x|
        assert_eq!(
            *Expr::Sqrt(Box::new(Expr::Pow(var("x"), 2))).simplify(),
            Expr::Abs(var("x"))
        );

        // ln(exp(x)) -> x
        assert_eq!(
            *Expr::Ln(Box::new(Expr::Exp(var("x")))).simplify(),
            *var("x")
        );
    }

    #[test]
    fn test_display() {
        let expr = Expr::Add(
            Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), var("x"))),
            Box::new(Expr::Sqrt(var("x"))),
        );
        assert_eq!(expr.to_string(), "((2 * x) + sqrt(x))");
    }
}
