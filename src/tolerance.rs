//! Stopping resolution shared by the solvers.
//!
//! Both solvers stop once their bracket has shrunk to a tolerance unit
//! `scale * relative_eps * |x| + absolute_tol` around the current estimate.

use crate::solver::SolveError;

#[derive(Clone, Debug, PartialEq)]
pub struct Tolerance {
    pub relative_eps: f64,
    pub absolute_tol: f64,
}

impl Tolerance {
    pub fn new(relative_eps: f64, absolute_tol: f64) -> Tolerance {
        Tolerance {
            relative_eps,
            absolute_tol,
        }
    }

    /// Machine epsilon scaled resolution, suited to root finding.
    pub fn for_root() -> Tolerance {
        Tolerance::new(f64::EPSILON, 1e-12)
    }

    /// Square root of machine epsilon, suited to minimization.  Near a minimum
    /// `f` is flat to first order, so `x` cannot be resolved more finely than
    /// about `sqrt(EPSILON)` relative.
    pub fn for_minimum() -> Tolerance {
        Tolerance::new(f64::EPSILON.sqrt(), 1e-12)
    }

    /// Tolerance unit at `x`.
    pub fn at(&self, x: f64, scale: f64) -> f64 {
        scale * self.relative_eps * x.abs() + self.absolute_tol
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if !(self.relative_eps.is_finite() && self.relative_eps > 0.0) {
            return Err(SolveError::InvalidTolerance {
                name: "relative_eps",
                value: self.relative_eps,
            });
        }
        if !(self.absolute_tol.is_finite() && self.absolute_tol > 0.0) {
            return Err(SolveError::InvalidTolerance {
                name: "absolute_tol",
                value: self.absolute_tol,
            });
        }
        Ok(())
    }
}
