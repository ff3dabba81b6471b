use super::SolveError;
use crate::wrap::RealFnEval;
use tracing::trace;

/// Evaluates the user function on behalf of a solver.
///
/// Counts evaluations against a budget and, when guarded, refuses NaN results.
/// The unguarded form has no budget and passes every value through, which is
/// how the raw entry points run.
pub struct Evaluator<'a, F>
where
    F: 'a + RealFnEval,
{
    f: &'a F,
    max_evaluations: usize,
    reject_nan: bool,
    evaluations: usize,
}

impl<'a, F> Evaluator<'a, F>
where
    F: 'a + RealFnEval,
{
    pub fn guarded(f: &'a F, max_evaluations: usize) -> Evaluator<'a, F> {
        Evaluator {
            f,
            max_evaluations,
            reject_nan: true,
            evaluations: 0,
        }
    }

    pub fn unguarded(f: &'a F) -> Evaluator<'a, F> {
        Evaluator {
            f,
            max_evaluations: usize::MAX,
            reject_nan: false,
            evaluations: 0,
        }
    }

    /// Evaluates f(x).  `best_x` is the caller's current estimate, reported
    /// back if the budget has run out.
    pub fn eval(&mut self, x: f64, best_x: f64) -> Result<f64, SolveError> {
        if self.evaluations >= self.max_evaluations {
            return Err(SolveError::IterationLimit {
                last_x: best_x,
                evaluations: self.evaluations,
            });
        }
        self.evaluations += 1;

        let f_x = self.f.eval_f(x);
        trace!("eval #{}: f({x}) = {f_x}", self.evaluations);
        if self.reject_nan && f_x.is_nan() {
            return Err(SolveError::NonFiniteEvaluation { x });
        }
        Ok(f_x)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}
