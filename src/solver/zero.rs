//! Brent's root finder.
//!
//! Keeps a bracket `[b, c]` holding a sign change, where `b` is the best
//! estimate so far and `c` the contrapoint, plus the previous iterate `a`.
//! Each step tries inverse quadratic interpolation through `a`, `b`, `c`
//! (secant when `a == c`) and falls back to bisection when the interpolated
//! step is out of the bracket or isn't shrinking fast enough.
//!
//! *Brent, R. P. (1973). "Algorithms for Minimization Without Derivatives",
//! chapter 4. Prentice-Hall.*

use super::driver::Evaluator;
use super::{SolveError, StepKind, Trial};
use crate::bracket::{is_sign_change, Bounds};
use crate::tolerance::Tolerance;
use crate::wrap::RealFnEval;
use tracing::{debug, trace};

/// Tolerance unit scale for the half-width test.
const TOL_SCALE: f64 = 2.0;

/// Working state of a single root search.
#[derive(Clone, Debug)]
pub struct ZeroState {
    a: f64,
    f_a: f64,
    b: f64,
    f_b: f64,
    c: f64,
    f_c: f64,
    d: f64,
    e: f64,
}

impl ZeroState {
    /// Starts a search from the end points `a`, `b` and their function values.
    pub fn new(a: f64, f_a: f64, b: f64, f_b: f64) -> ZeroState {
        ZeroState {
            a,
            f_a,
            b,
            f_b,
            c: a,
            f_c: f_a,
            d: b - a,
            e: b - a,
        }
    }

    /// Best estimate of the root.
    pub fn best(&self) -> f64 {
        self.b
    }

    pub fn best_value(&self) -> f64 {
        self.f_b
    }

    /// Current bracket, ordered.
    pub fn bracket(&self) -> (f64, f64) {
        (self.b.min(self.c), self.b.max(self.c))
    }

    /// Whether the bracket ends still straddle the root.
    pub fn is_bracketing(&self) -> bool {
        self.f_b == 0.0 || self.f_c == 0.0 || is_sign_change(self.f_b, self.f_c)
    }

    /// Picks the next point to evaluate, or `None` once converged.
    pub fn next_trial(&mut self, tolerance: &Tolerance) -> Option<Trial> {
        // contrapoint must hold the larger residual
        if self.f_c.abs() < self.f_b.abs() {
            self.a = self.b;
            self.f_a = self.f_b;
            self.b = self.c;
            self.f_b = self.f_c;
            self.c = self.a;
            self.f_c = self.f_a;
        }

        let tol = tolerance.at(self.b, TOL_SCALE);
        let m = 0.5 * (self.c - self.b);
        if m.abs() <= tol || self.f_b == 0.0 {
            return None;
        }

        let kind = if self.e.abs() < tol || self.f_a.abs() <= self.f_b.abs() {
            self.bisect(m)
        } else {
            self.interpolate(m, tol)
        };

        let step = if self.d.abs() > tol {
            self.d
        } else if m > 0.0 {
            tol
        } else {
            -tol
        };
        let x = self.b + step;
        trace!("{kind:?} step to {x}, bracket [{}, {}], tol {tol}", self.b, self.c);
        Some(Trial { x, kind })
    }

    fn bisect(&mut self, m: f64) -> StepKind {
        self.e = m;
        self.d = m;
        StepKind::Bisection
    }

    fn interpolate(&mut self, m: f64, tol: f64) -> StepKind {
        let s = self.f_b / self.f_a;
        let (mut p, mut q, kind) = if self.a == self.c {
            (2.0 * m * s, 1.0 - s, StepKind::Secant)
        } else {
            let q = self.f_a / self.f_c;
            let r = self.f_b / self.f_c;
            (
                s * (2.0 * m * q * (q - r) - (self.b - self.a) * (r - 1.0)),
                (q - 1.0) * (r - 1.0) * (s - 1.0),
                StepKind::InverseQuadratic,
            )
        };
        if p > 0.0 {
            q = -q;
        } else {
            p = -p;
        }

        let e_before_last = self.e;
        self.e = self.d;
        if 2.0 * p < 3.0 * m * q - (tol * q).abs() && p < (0.5 * e_before_last * q).abs() {
            self.d = p / q;
            kind
        } else {
            self.bisect(m)
        }
    }

    /// Takes in the evaluation of the trial point `x`.
    pub fn update(&mut self, x: f64, f_x: f64) {
        self.a = self.b;
        self.f_a = self.f_b;
        self.b = x;
        self.f_b = f_x;

        if (self.f_b > 0.0) == (self.f_c > 0.0) {
            self.c = self.a;
            self.f_c = self.f_a;
            self.d = self.b - self.a;
            self.e = self.d;
        }
    }
}

#[derive(Clone, Debug)]
pub struct ZeroConfig {
    pub tolerance: Tolerance,
    pub max_evaluations: usize,
}

impl ZeroConfig {
    pub fn validate(&self) -> Result<(), SolveError> {
        self.tolerance.validate()?;
        if self.max_evaluations < 2 {
            return Err(SolveError::InvalidBudget {
                max_evaluations: self.max_evaluations,
            });
        }
        Ok(())
    }
}

impl Default for ZeroConfig {
    fn default() -> Self {
        ZeroConfig {
            tolerance: Tolerance::for_root(),
            max_evaluations: 200,
        }
    }
}

#[derive(Debug)]
pub struct ZeroOutcome {
    pub root: f64,
    pub value: f64,
    pub evaluations: usize,
    pub interpolation_steps: usize,
    pub bisection_steps: usize,
    pub bracket: Bounds,
}

/// Runs the search loop until convergence or until the evaluator gives up.
fn search<F>(
    eval: &mut Evaluator<F>,
    mut state: ZeroState,
    tolerance: &Tolerance,
) -> Result<(ZeroState, usize, usize), SolveError>
where
    F: RealFnEval,
{
    let (mut interpolation_steps, mut bisection_steps) = (0, 0);
    while let Some(trial) = state.next_trial(tolerance) {
        match trial.kind {
            StepKind::Bisection => bisection_steps += 1,
            _ => interpolation_steps += 1,
        }
        let f_x = eval.eval(trial.x, state.best())?;
        state.update(trial.x, f_x);
    }
    debug!(
        "root search done: x = {}, f(x) = {}, evaluations: {}",
        state.b,
        state.f_b,
        eval.evaluations()
    );
    Ok((state, interpolation_steps, bisection_steps))
}

/// Root finding using Brent's method, with precondition checks and an
/// evaluation budget.
///
/// `f(a)` and `f(b)` must differ in sign, or one of them be zero.  Converges
/// superlinearly for well behaved functions and never much slower than
/// bisection otherwise.
pub fn brent_zero<F>(f: &F, bounds: &Bounds, config: &ZeroConfig) -> Result<ZeroOutcome, SolveError>
where
    F: RealFnEval,
{
    config.validate()?;

    let mut eval = Evaluator::guarded(f, config.max_evaluations);
    let (a, b) = (bounds.a, bounds.b);
    let f_a = eval.eval(a, a)?;
    let f_b = eval.eval(b, b)?;
    if !(f_a == 0.0 || f_b == 0.0 || is_sign_change(f_a, f_b)) {
        return Err(SolveError::NotBracketed { a, b, f_a, f_b });
    }

    let (state, interpolation_steps, bisection_steps) =
        search(&mut eval, ZeroState::new(a, f_a, b, f_b), &config.tolerance)?;
    let (low, high) = state.bracket();
    Ok(ZeroOutcome {
        root: state.b,
        value: state.f_b,
        evaluations: eval.evaluations(),
        interpolation_steps,
        bisection_steps,
        bracket: Bounds::new(low, high),
    })
}

/// Unchecked root search from `a`, `b` in either order.
pub(super) fn unchecked_zero<F>(f: &F, a: f64, b: f64, tolerance: &Tolerance) -> f64
where
    F: RealFnEval,
{
    let mut eval = Evaluator::unguarded(f);
    let mut run = || -> Result<f64, SolveError> {
        let f_a = eval.eval(a, a)?;
        let f_b = eval.eval(b, b)?;
        let (state, _, _) = search(&mut eval, ZeroState::new(a, f_a, b, f_b), tolerance)?;
        Ok(state.b)
    };
    // an unguarded evaluator never fails
    run().unwrap_or_else(|err| err.last_x().unwrap_or(b))
}
