//! Root-finding strategies for single-unknown residual functions.
//!
//! Strategy pipeline
//! -----------------
//!  1. **Newton-Raphson** — fixed initial guess, forward finite-difference
//!     derivative with one larger-step retry when the tangent is near flat.
//!  2. **Bisection** — default bracket, widened symmetrically once if the
//!     endpoint residuals do not change sign.
//!
//! [`find_root`] tries the strategies in order and returns the first root.
//! An evaluation error from the residual aborts the whole pipeline: the
//! function is not well-defined, so falling back would be meaningless. Numeric
//! failures (flat tangent, divergence, exhausted budget) fall through to the
//! next strategy.
//!
//! The module is pure: each call owns its local iteration state, and the fixed
//! iteration budgets bound worst-case latency deterministically.

use log::{debug, trace};

use crate::errors::{FormulaError, SolverError};

/// Configuration for the root-finding pipeline.
///
/// The defaults reproduce the behavior expected by the equation solver: guess
/// at 1, residual tolerance 1e-10, and a ±100 starting bracket widened once by
/// 100 per side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Starting point for Newton-Raphson
    pub initial_guess: f64,
    /// Residual magnitude below which an iterate counts as a root
    pub tolerance: f64,
    /// Step for the forward finite-difference derivative estimate
    pub derivative_step: f64,
    /// Derivative magnitude below which the tangent counts as flat
    pub flat_threshold: f64,
    /// Newton-Raphson iteration budget
    pub max_newton_iters: usize,
    /// Default bisection bracket
    pub bracket: (f64, f64),
    /// Amount added to each side when widening an unbracketed interval
    pub bracket_widening: f64,
    /// Bisection iteration budget
    pub max_bisect_iters: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            initial_guess: 1.0,
            tolerance: 1e-10,
            derivative_step: 1e-6,
            flat_threshold: 1e-12,
            max_newton_iters: 50,
            bracket: (-100.0, 100.0),
            bracket_widening: 100.0,
            max_bisect_iters: 100,
        }
    }
}

/// Finds a root of `f` by trying Newton-Raphson, then bisection.
///
/// # Arguments
/// * `f` - The residual function; a root is a value where it returns 0
/// * `options` - Tolerances, budgets, and starting points
///
/// # Returns
/// * `Result<f64, SolverError>` - A value where `|f(x)|` is within tolerance
///
/// # Errors
/// Returns `SolverError::Evaluation` as soon as the residual fails to
/// evaluate, `SolverError::NoBracket` if bisection cannot bracket a sign
/// change even after widening, or another numeric variant if every strategy is
/// exhausted.
///
/// # Example
/// ```
/// use physolve::{find_root, SolveOptions};
///
/// // x^2 - 16 = 0
/// let root = find_root(|x| Ok(x * x - 16.0), &SolveOptions::default()).unwrap();
/// assert!((root.abs() - 4.0).abs() < 1e-6);
/// ```
pub fn find_root<F>(f: F, options: &SolveOptions) -> Result<f64, SolverError>
where
    F: Fn(f64) -> Result<f64, FormulaError>,
{
    match newton_raphson(&f, options) {
        Ok(root) => Ok(root),
        Err(SolverError::Evaluation(err)) => Err(SolverError::Evaluation(err)),
        Err(err) => {
            debug!("newton-raphson failed ({err}), falling back to bisection");
            bisect(&f, options)
        }
    }
}

/// Newton-Raphson iteration with a finite-difference derivative.
///
/// At each step the derivative is estimated with a forward difference. When
/// its magnitude falls below the flat threshold the estimate is retried with a
/// step 1000 times larger; if the tangent is still flat the iteration gives up
/// so the caller can fall back to bisection.
///
/// # Errors
/// `SolverError::Evaluation` if the residual fails to evaluate,
/// `SolverError::FlatDerivative` if no usable tangent exists near the current
/// iterate, `SolverError::Diverged` if an iterate leaves the representable
/// range, and `SolverError::IterationBudget` if the budget runs out.
pub fn newton_raphson<F>(f: &F, options: &SolveOptions) -> Result<f64, SolverError>
where
    F: Fn(f64) -> Result<f64, FormulaError>,
{
    let mut x = options.initial_guess;

    for iteration in 0..options.max_newton_iters {
        let fx = f(x)?;
        if fx.abs() < options.tolerance {
            debug!("newton-raphson converged to {x} after {iteration} iterations");
            return Ok(x);
        }

        let mut slope = (f(x + options.derivative_step)? - fx) / options.derivative_step;
        if slope.abs() < options.flat_threshold {
            // Near-flat tangent: retry with a much larger step before giving up
            let wide_step = options.derivative_step * 1e3;
            slope = (f(x + wide_step)? - fx) / wide_step;
            if slope.abs() < options.flat_threshold {
                return Err(SolverError::FlatDerivative { x });
            }
        }

        x -= fx / slope;
        trace!("newton-raphson iteration {iteration}: x = {x}");

        if !x.is_finite() {
            return Err(SolverError::Diverged);
        }
    }

    Err(SolverError::IterationBudget {
        iterations: options.max_newton_iters,
    })
}

/// Bisection over a sign-change bracket.
///
/// Starts from the default bracket; if the endpoint residuals share a sign the
/// bracket is widened symmetrically once and re-checked. The interval is then
/// repeatedly halved toward the sign change. The midpoint is returned as soon
/// as its residual is within tolerance, or after the budget is exhausted (100
/// halvings of the default bracket narrow it far below any representable
/// tolerance).
///
/// # Errors
/// `SolverError::Evaluation` if the residual fails to evaluate, or
/// `SolverError::NoBracket` if no sign change exists even in the widened
/// bracket.
pub fn bisect<F>(f: &F, options: &SolveOptions) -> Result<f64, SolverError>
where
    F: Fn(f64) -> Result<f64, FormulaError>,
{
    let (mut left, mut right) = options.bracket;
    let mut left_residual = f(left)?;
    let mut right_residual = f(right)?;

    if left_residual == 0.0 {
        return Ok(left);
    }
    if right_residual == 0.0 {
        return Ok(right);
    }

    if (left_residual > 0.0) == (right_residual > 0.0) {
        trace!("no sign change in [{left}, {right}], widening bracket");
        left -= options.bracket_widening;
        right += options.bracket_widening;
        left_residual = f(left)?;
        right_residual = f(right)?;

        if left_residual == 0.0 {
            return Ok(left);
        }
        if right_residual == 0.0 {
            return Ok(right);
        }
        if (left_residual > 0.0) == (right_residual > 0.0) {
            return Err(SolverError::NoBracket {
                left,
                right,
                left_residual,
                right_residual,
            });
        }
    }

    for iteration in 0..options.max_bisect_iters {
        let midpoint = 0.5 * (left + right);
        let residual = f(midpoint)?;

        if residual.abs() < options.tolerance {
            debug!("bisection converged to {midpoint} after {iteration} iterations");
            return Ok(midpoint);
        }

        if (residual > 0.0) == (left_residual > 0.0) {
            left = midpoint;
            left_residual = residual;
        } else {
            right = midpoint;
        }
    }

    let midpoint = 0.5 * (left + right);
    debug!("bisection budget exhausted, returning midpoint {midpoint}");
    Ok(midpoint)
}
