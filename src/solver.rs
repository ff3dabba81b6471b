//! Bracketed root finding and minimization.
//!
//! Each solver comes in two forms:
//!
//! * `find_root` and `find_local_minimum` take a plain closure, never fail and
//!   never give up.  Feeding them a bracket without a sign change, or a
//!   function that isn't unimodal, still returns a number; it just won't mean
//!   much.
//! * `brent_zero` and `brent_localmin` take any `RealFnEval`, check their
//!   inputs, refuse NaN evaluations and stop after a fixed number of
//!   evaluations.
//!
//! # Examples
//! Using the plain root finder:
//!
//! ```
//! use brent::solver::find_root;
//!
//! let root = find_root(0.0, 2.0, f64::EPSILON, 1e-12, |x| x * x - 2.0);
//! assert!((root - 2f64.sqrt()).abs() < 1e-10);
//! ```
//!
//! Using the checked minimizer:
//!
//! ```
//! use brent::bracket::Bounds;
//! use brent::solver::{brent_localmin, LocalMinConfig};
//! use brent::wrap::RealFn;
//!
//! let in_f = |x: f64| (x - 2.0) * (x - 2.0) + 1.0;
//! let f = RealFn::new(&in_f);
//!
//! let outcome = brent_localmin(&f, &Bounds::new(0.0, 5.0), &LocalMinConfig::default())
//!     .expect("minimum");
//! assert!((outcome.x - 2.0).abs() < 1e-6);
//! assert!((outcome.value - 1.0).abs() < 1e-12);
//! ```

pub mod driver;
pub mod localmin;
pub mod zero;

pub use self::localmin::{brent_localmin, LocalMinConfig, LocalMinOutcome, LocalMinState};
pub use self::zero::{brent_zero, ZeroConfig, ZeroOutcome, ZeroState};

use crate::tolerance::Tolerance;
use crate::wrap::RealFn;
use thiserror::Error;

/// Solver error conditions.
///
/// To help with diagnostics, these errors typically return the last relevant
/// `x` position.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid tolerance: {name} must be finite and positive, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("invalid evaluation budget: need at least 2, got {max_evaluations}")]
    InvalidBudget { max_evaluations: usize },

    #[error("no sign change on [{a}, {b}]: f(a) = {f_a}, f(b) = {f_b}")]
    NotBracketed { a: f64, b: f64, f_a: f64, f_b: f64 },

    #[error("function evaluated to NaN at x = {x}")]
    NonFiniteEvaluation { x: f64 },

    #[error("no convergence after {evaluations} evaluations, last x = {last_x}")]
    IterationLimit { last_x: f64, evaluations: usize },
}

impl SolveError {
    /// Best estimate at the time of failure, when there is one.
    pub fn last_x(&self) -> Option<f64> {
        match self {
            SolveError::IterationLimit { last_x, .. } => Some(*last_x),
            _ => None,
        }
    }
}

/// How a solver picked its next trial point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    Bisection,
    Secant,
    InverseQuadratic,
    Parabolic,
    GoldenSection,
}

/// Next point a solver wants evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trial {
    pub x: f64,
    pub kind: StepKind,
}

/// Finds a zero of `f` between `a` and `b` using Brent's method.
///
/// `f(a)` and `f(b)` should differ in sign; this isn't checked.  The result is
/// within `2 * relative_eps * |x| + absolute_tol` of a zero, or `f` is exactly
/// zero there.  `relative_eps` is typically `f64::EPSILON`.
pub fn find_root<F>(a: f64, b: f64, relative_eps: f64, absolute_tol: f64, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let tolerance = Tolerance::new(relative_eps, absolute_tol);
    zero::unchecked_zero(&RealFn::new(&f), a, b, &tolerance)
}

/// Finds a local minimum of `f` on `[a, b]` using Brent's method, returning
/// `(x, f(x))`.
///
/// `eps` should be no smaller than `2 * f64::EPSILON` and preferably about
/// `f64::EPSILON.sqrt()`.  Unimodality isn't checked.
pub fn find_local_minimum<F>(a: f64, b: f64, eps: f64, absolute_tol: f64, f: F) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let tolerance = Tolerance::new(eps, absolute_tol);
    localmin::unchecked_localmin(&RealFn::new(&f), a, b, &tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SolveError::NotBracketed {
            a: -1.0,
            b: 2.0,
            f_a: 2.0,
            f_b: 5.0,
        };
        assert_eq!(err.to_string(), "no sign change on [-1, 2]: f(a) = 2, f(b) = 5");
        assert_eq!(err.last_x(), None);

        let err = SolveError::IterationLimit {
            last_x: 1.5,
            evaluations: 4,
        };
        assert_eq!(err.to_string(), "no convergence after 4 evaluations, last x = 1.5");
        assert_eq!(err.last_x(), Some(1.5));
    }

    #[test]
    fn test_plain_entry_points_accept_closures() {
        let offset = 0.25;
        let root = find_root(0.0, 1.0, f64::EPSILON, 1e-12, |x| x - offset);
        assert!((root - offset).abs() < 1e-10);

        let (x, value) = find_local_minimum(-1.0, 1.0, f64::EPSILON.sqrt(), 1e-12, |x| {
            (x - offset).powi(2) - 1.0
        });
        assert!((x - offset).abs() < 1e-6);
        assert!((value + 1.0).abs() < 1e-12);
    }
}
