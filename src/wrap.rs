/// Trait evaluating: f(x) with x in R^1.
pub trait RealFnEval {
    fn eval_f(&self, x: f64) -> f64;
}

/// Wraps function to implement RealFnEval.
pub struct RealFn<'a, F>
where
    F: 'a + Fn(f64) -> f64,
{
    pub f: &'a F,
}

impl<'a, F> RealFn<'a, F>
where
    F: 'a + Fn(f64) -> f64,
{
    pub fn new(f: &'a F) -> RealFn<'a, F> {
        RealFn { f }
    }
}

impl<'a, F> RealFnEval for RealFn<'a, F>
where
    F: 'a + Fn(f64) -> f64,
{
    fn eval_f(&self, x: f64) -> f64 {
        (self.f)(x)
    }
}

impl<T: RealFnEval + ?Sized> RealFnEval for &T {
    fn eval_f(&self, x: f64) -> f64 {
        (**self).eval_f(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shifted {
        offset: f64,
    }

    impl RealFnEval for Shifted {
        fn eval_f(&self, x: f64) -> f64 {
            x - self.offset
        }
    }

    #[test]
    fn test_real_fn_captures_context() {
        let scale = 3.0;
        let in_f = |x: f64| scale * x;
        let f = RealFn::new(&in_f);
        assert_eq!(f.eval_f(2.0), 6.0);
    }

    #[test]
    fn test_custom_impl_through_reference() {
        let f = Shifted { offset: 1.5 };
        let by_ref = &f;
        assert_eq!(by_ref.eval_f(2.0), 0.5);
    }
}
