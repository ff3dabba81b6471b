//! Brackets and bracket discovery.
//!
//! The solvers need an interval known to hold the root (or minimum).  When one
//! isn't known up front, `BracketGenerator` scans a wider interval in fixed
//! windows and yields every window holding a sign change.

use crate::wrap::RealFnEval;

/// Bounds represents the closed interval [a,b].
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    pub(crate) a: f64,
    pub(crate) b: f64,
}

impl Bounds {
    pub fn new(a: f64, b: f64) -> Bounds {
        assert!(a <= b);
        assert!(a.is_finite() && b.is_finite());
        Bounds { a, b }
    }

    /// Bounds spanning two points given in either order.
    pub fn spanning(x: f64, y: f64) -> Bounds {
        Bounds::new(x.min(y), x.max(y))
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn middle(&self) -> f64 {
        self.a + (self.b - self.a) / 2.0
    }

    pub fn size(&self) -> f64 {
        self.b - self.a
    }

    pub fn contains(&self, x: f64) -> bool {
        self.a <= x && x <= self.b
    }
}

/// Whether signs of values differ, properly handling floating point underflow.
pub fn is_sign_change(lhs: f64, rhs: f64) -> bool {
    lhs.signum() != rhs.signum()
}

/// Scans interval [a,b] and emits the first bracket containing a sign change.
/// For a continuous function the Intermediate Value Theorem guarantees that the
/// bracket contains at least one root.  Without a continuity guarantee, it
/// might be a singularity instead.
pub fn first_bracket<F>(f: &F, bounds: &Bounds, window_size: f64) -> Option<Bounds>
where
    F: RealFnEval,
{
    BracketGenerator::new(f, bounds.clone(), window_size).next()
}

/// Iterator over all windows of `bounds` holding a sign change.
///
/// Each window is `window_size` wide, except possibly the last which is
/// clipped to `bounds`.  Every function value is computed exactly once.
pub struct BracketGenerator<'a, F>
where
    F: 'a + RealFnEval,
{
    f: &'a F,
    bounds: Bounds,
    window_size: f64,
    win: Bounds,
    f_a: f64,
}

impl<'a, F> BracketGenerator<'a, F>
where
    F: 'a + RealFnEval,
{
    pub fn new(f: &'a F, bounds: Bounds, window_size: f64) -> BracketGenerator<'a, F> {
        assert!(window_size > 0.0);

        let win = Bounds {
            a: bounds.a,
            b: (bounds.a + window_size).min(bounds.b),
        };
        let f_a = f.eval_f(win.a);
        BracketGenerator {
            f,
            bounds,
            window_size,
            win,
            f_a,
        }
    }
}

impl<'a, F> Iterator for BracketGenerator<'a, F>
where
    F: 'a + RealFnEval,
{
    type Item = Bounds;

    fn next(&mut self) -> Option<Bounds> {
        while self.win.a < self.bounds.b {
            let f_b = self.f.eval_f(self.win.b);
            let found = self.win.clone();
            let sign_change = is_sign_change(self.f_a, f_b);

            self.f_a = f_b;
            self.win.a = self.win.b;
            self.win.b = (self.win.b + self.window_size).min(self.bounds.b);

            // found root or singularity
            if sign_change {
                return Some(found);
            }
        }
        None
    }
}
