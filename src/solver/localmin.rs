//! Brent's local minimizer.
//!
//! Golden section search guarantees progress on any unimodal function, and
//! successive parabolic interpolation through the three best points takes over
//! whenever the fitted vertex is safely inside the bracket.  If `f` has a
//! continuous second derivative, positive at the minimum, convergence is
//! superlinear.  It is never much slower than a Fibonacci search.
//!
//! *Brent, R. P. (1973). "Algorithms for Minimization Without Derivatives",
//! chapter 5. Prentice-Hall.*

use super::driver::Evaluator;
use super::{SolveError, StepKind, Trial};
use crate::bracket::Bounds;
use crate::tolerance::Tolerance;
use crate::wrap::RealFnEval;
use tracing::{debug, trace};

/// Golden section ratio, `(3 - sqrt(5)) / 2`.
pub const GOLDEN_SECTION: f64 = 0.381_966_011_250_105_1;

/// Tolerance unit scale for the trial spacing test.
const TOL_SCALE: f64 = 1.0;

/// Working state of a single minimum search.
///
/// `x` is the lowest point seen, `w` the second lowest and `v` the previous
/// value of `w`.  `d` is the last step and `e` the step before it.
#[derive(Clone, Debug)]
pub struct LocalMinState {
    a: f64,
    b: f64,
    x: f64,
    f_x: f64,
    w: f64,
    f_w: f64,
    v: f64,
    f_v: f64,
    d: f64,
    e: f64,
}

impl LocalMinState {
    /// Where the first evaluation must happen for the bracket `[a, b]`.
    pub fn start_point(a: f64, b: f64) -> f64 {
        a + GOLDEN_SECTION * (b - a)
    }

    /// Starts a search on `[a, b]` given `f` at `start_point(a, b)`.
    pub fn new(a: f64, b: f64, f_start: f64) -> LocalMinState {
        let x = LocalMinState::start_point(a, b);
        LocalMinState {
            a,
            b,
            x,
            f_x: f_start,
            w: x,
            f_w: f_start,
            v: x,
            f_v: f_start,
            d: 0.0,
            e: 0.0,
        }
    }

    pub fn best(&self) -> f64 {
        self.x
    }

    pub fn best_value(&self) -> f64 {
        self.f_x
    }

    pub fn bracket(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    /// Picks the next point to evaluate, or `None` once converged.
    pub fn next_trial(&mut self, tolerance: &Tolerance) -> Option<Trial> {
        let m = 0.5 * (self.a + self.b);
        let tol = tolerance.at(self.x, TOL_SCALE);
        let t2 = 2.0 * tol;
        if (self.x - m).abs() <= t2 - 0.5 * (self.b - self.a) {
            return None;
        }

        let (mut p, mut q, mut r) = (0.0, 0.0, 0.0);
        if self.e.abs() > tol {
            // fit parabola through x, w, v
            r = (self.x - self.w) * (self.f_x - self.f_v);
            q = (self.x - self.v) * (self.f_x - self.f_w);
            p = (self.x - self.v) * q - (self.x - self.w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            r = self.e;
            self.e = self.d;
        }

        let kind = if p.abs() < (0.5 * q * r).abs()
            && p > q * (self.a - self.x)
            && p < q * (self.b - self.x)
        {
            self.d = p / q;
            let u = self.x + self.d;
            // keep away from the bracket ends
            if u - self.a < t2 || self.b - u < t2 {
                self.d = if self.x < m { tol } else { -tol };
            }
            StepKind::Parabolic
        } else {
            self.e = (if self.x < m { self.b } else { self.a }) - self.x;
            self.d = GOLDEN_SECTION * self.e;
            StepKind::GoldenSection
        };

        // never evaluate closer than tol to x
        let step = if self.d.abs() >= tol {
            self.d
        } else if self.d > 0.0 {
            tol
        } else {
            -tol
        };
        let u = self.x + step;
        trace!("{kind:?} step to {u}, bracket [{}, {}], tol {tol}", self.a, self.b);
        Some(Trial { x: u, kind })
    }

    /// Takes in the evaluation of the trial point `u`.
    pub fn update(&mut self, u: f64, f_u: f64) {
        if f_u <= self.f_x {
            if u < self.x {
                self.b = self.x;
            } else {
                self.a = self.x;
            }
            self.v = self.w;
            self.f_v = self.f_w;
            self.w = self.x;
            self.f_w = self.f_x;
            self.x = u;
            self.f_x = f_u;
        } else {
            if u < self.x {
                self.a = u;
            } else {
                self.b = u;
            }
            if f_u <= self.f_w || self.w == self.x {
                self.v = self.w;
                self.f_v = self.f_w;
                self.w = u;
                self.f_w = f_u;
            } else if f_u <= self.f_v || self.v == self.x || self.v == self.w {
                self.v = u;
                self.f_v = f_u;
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct LocalMinConfig {
    pub tolerance: Tolerance,
    pub max_evaluations: usize,
}

impl LocalMinConfig {
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

impl Default for LocalMinConfig {
    fn default() -> Self {
        LocalMinConfig {
            tolerance: Tolerance::for_minimum(),
            max_evaluations: 500,
        }
    }
}

#[derive(Debug)]
pub struct LocalMinOutcome {
    pub x: f64,
    pub value: f64,
    pub evaluations: usize,
    pub parabolic_steps: usize,
    pub golden_steps: usize,
    pub bracket: Bounds,
}

fn search<F>(
    eval: &mut Evaluator<F>,
    mut state: LocalMinState,
    tolerance: &Tolerance,
) -> Result<(LocalMinState, usize, usize), SolveError>
where
    F: RealFnEval,
{
    let (mut parabolic_steps, mut golden_steps) = (0, 0);
    while let Some(trial) = state.next_trial(tolerance) {
        match trial.kind {
            StepKind::GoldenSection => golden_steps += 1,
            _ => parabolic_steps += 1,
        }
        let f_u = eval.eval(trial.x, state.best())?;
        state.update(trial.x, f_u);
    }
    debug!(
        "minimum search done: x = {}, f(x) = {}, evaluations: {}",
        state.x,
        state.f_x,
        eval.evaluations()
    );
    Ok((state, parabolic_steps, golden_steps))
}

/// Local minimization using Brent's method, with an evaluation budget.
///
/// If `f` is unimodal on `bounds` the result approximates its minimum to
/// within about three tolerance units.  Otherwise it may find a local,
/// non-global minimum, or a point at an end of `bounds`.
pub fn brent_localmin<F>(
    f: &F,
    bounds: &Bounds,
    config: &LocalMinConfig,
) -> Result<LocalMinOutcome, SolveError>
where
    F: RealFnEval,
{
    config.validate()?;

    let mut eval = Evaluator::guarded(f, config.max_evaluations);
    let start = LocalMinState::start_point(bounds.a, bounds.b);
    let f_start = eval.eval(start, start)?;

    let (state, parabolic_steps, golden_steps) = search(
        &mut eval,
        LocalMinState::new(bounds.a, bounds.b, f_start),
        &config.tolerance,
    )?;
    Ok(LocalMinOutcome {
        x: state.x,
        value: state.f_x,
        evaluations: eval.evaluations(),
        parabolic_steps,
        golden_steps,
        bracket: Bounds::new(state.a, state.b),
    })
}

/// Unchecked minimum search on `[a, b]`; `a` and `b` may come in either order.
pub(super) fn unchecked_localmin<F>(f: &F, a: f64, b: f64, tolerance: &Tolerance) -> (f64, f64)
where
    F: RealFnEval,
{
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let mut eval = Evaluator::unguarded(f);
    let start = LocalMinState::start_point(a, b);
    let mut run = || -> Result<(f64, f64), SolveError> {
        let f_start = eval.eval(start, start)?;
        let (state, _, _) = search(&mut eval, LocalMinState::new(a, b, f_start), tolerance)?;
        Ok((state.x, state.f_x))
    };
    // an unguarded evaluator never fails
    run().unwrap_or_else(|err| {
        let x = err.last_x().unwrap_or(start);
        (x, f.eval_f(x))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::find_local_minimum;
    use crate::wrap::RealFn;
    use assert_float_eq::*;
    use std::f64::consts::{LN_2, PI, SQRT_2};

    struct MinTest {
        name: &'static str,
        f: fn(f64) -> f64,
        minimum: f64,
        value: f64,
        bracket: Bounds,
    }

    fn make_min_tests() -> Vec<MinTest> {
        vec![
            MinTest {
                name: "Shifted Parabola",
                f: |x| (x - 2.0) * (x - 2.0),
                minimum: 2.0,
                value: 0.0,
                bracket: Bounds::new(0.0, 5.0),
            },
            MinTest {
                name: "Sine Trough",
                f: |x| x.sin(),
                minimum: 1.5 * PI,
                value: -1.0,
                bracket: Bounds::new(3.0, 6.0),
            },
            MinTest {
                name: "Shifted Cosh",
                f: |x| (x - 1.0).cosh(),
                minimum: 1.0,
                value: 1.0,
                bracket: Bounds::new(-3.0, 4.0),
            },
            MinTest {
                name: "Quartic Well",
                f: |x| (x * x - 2.0) * (x * x - 2.0),
                minimum: SQRT_2,
                value: 0.0,
                bracket: Bounds::new(0.0, 3.0),
            },
            MinTest {
                name: "Exponential Less Linear",
                f: |x| x.exp() - 2.0 * x,
                minimum: LN_2,
                value: 2.0 - 2.0 * LN_2,
                bracket: Bounds::new(0.0, 2.0),
            },
            MinTest {
                name: "Absolute Value Kink",
                f: |x| (x - 3.0).abs() + 1.0,
                minimum: 3.0,
                value: 1.0,
                bracket: Bounds::new(-1.0, 10.0),
            },
        ]
    }

    #[test]
    fn test_brent_localmin_minimization() {
        let config = LocalMinConfig::default();
        for t in make_min_tests() {
            let f = RealFn::new(&t.f);
            let outcome = brent_localmin(&f, &t.bracket, &config).expect("found minimum");
            assert!(
                (outcome.x - t.minimum).abs() < 1e-6,
                "{} minimum wanted={}, got={}",
                t.name,
                t.minimum,
                outcome.x
            );
            assert!(
                (outcome.value - t.value).abs() < 1e-6,
                "{} value wanted={}, got={}",
                t.name,
                t.value,
                outcome.value
            );
            assert!(outcome.bracket.contains(outcome.x));
            assert_eq!(
                outcome.evaluations,
                1 + outcome.parabolic_steps + outcome.golden_steps
            );
        }
    }

    #[test]
    fn test_bracket_never_grows() {
        let f = |x: f64| (x - 2.0) * (x - 2.0);
        let tolerance = Tolerance::for_minimum();
        let (a, b) = (0.0, 5.0);
        let mut state = LocalMinState::new(a, b, f(LocalMinState::start_point(a, b)));

        let mut half_width = 0.5 * (b - a);
        let mut steps = 0;
        while let Some(trial) = state.next_trial(&tolerance) {
            let (low, high) = state.bracket();
            assert!(low < trial.x && trial.x < high, "trial {} outside bracket", trial.x);
            state.update(trial.x, f(trial.x));

            let (low, high) = state.bracket();
            assert!(low <= 2.0 && 2.0 <= high, "lost the minimum at step {steps}");
            assert!(0.5 * (high - low) <= half_width);
            half_width = 0.5 * (high - low);
            steps += 1;
            assert!(steps < 100);
        }
        assert_float_absolute_eq!(2.0, state.best(), 1e-6);
        assert_float_absolute_eq!(0.0, state.best_value(), 1e-12);
    }

    #[test]
    fn test_smooth_minimum_uses_parabolic_steps() {
        let in_f = |x: f64| (x - 2.0) * (x - 2.0);
        let outcome = brent_localmin(&RealFn::new(&in_f), &Bounds::new(0.0, 5.0), &LocalMinConfig::default())
            .expect("found minimum");
        assert!(outcome.parabolic_steps > 0);
    }

    #[test]
    fn test_kinked_minimum_uses_golden_steps() {
        let (x, value) = find_local_minimum(-1.0, 10.0, f64::EPSILON.sqrt(), 1e-12, |x| {
            (x - 3.0).abs() + 1.0
        });
        assert_float_absolute_eq!(3.0, x, 1e-6);
        assert_float_absolute_eq!(1.0, value, 1e-6);

        let in_f = |x: f64| (x - 3.0).abs() + 1.0;
        let outcome = brent_localmin(&RealFn::new(&in_f), &Bounds::new(-1.0, 10.0), &LocalMinConfig::default())
            .expect("found minimum");
        assert!(outcome.golden_steps > 0);
    }

    #[test]
    fn test_monotone_runs_to_bracket_end() {
        let (x, value) = find_local_minimum(0.0, 1.0, f64::EPSILON.sqrt(), 1e-10, |x| x);
        assert!(x < 1e-8, "got {x}");
        assert_eq!(x, value);
    }

    #[test]
    fn test_reversed_and_degenerate_bracket() {
        let f = |x: f64| (x - 2.0) * (x - 2.0);
        let (x, _) = find_local_minimum(5.0, 0.0, f64::EPSILON.sqrt(), 1e-12, f);
        assert_float_absolute_eq!(2.0, x, 1e-6);

        let (x, value) = find_local_minimum(1.5, 1.5, f64::EPSILON.sqrt(), 1e-12, f);
        assert_eq!(x, 1.5);
        assert_eq!(value, 0.25);
    }

    #[test]
    fn test_iteration_limit() {
        let in_f = |x: f64| x.sin();
        let config = LocalMinConfig {
            max_evaluations: 3,
            ..LocalMinConfig::default()
        };
        match brent_localmin(&RealFn::new(&in_f), &Bounds::new(3.0, 6.0), &config) {
            Err(SolveError::IterationLimit { last_x, evaluations }) => {
                assert_eq!(evaluations, 3);
                assert!((3.0..=6.0).contains(&last_x));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nan_evaluation() {
        let in_f = |x: f64| if x > 2.0 { f64::NAN } else { x * x };
        match brent_localmin(&RealFn::new(&in_f), &Bounds::new(-1.0, 10.0), &LocalMinConfig::default()) {
            Err(SolveError::NonFiniteEvaluation { x }) => assert!(x > 2.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_idempotent() {
        let f = |x: f64| x.cos() + 0.1 * x;
        let first = find_local_minimum(2.0, 4.5, f64::EPSILON.sqrt(), 1e-12, f);
        let second = find_local_minimum(2.0, 4.5, f64::EPSILON.sqrt(), 1e-12, f);
        assert_eq!(first.0.to_bits(), second.0.to_bits());
        assert_eq!(first.1.to_bits(), second.1.to_bits());
    }
}
