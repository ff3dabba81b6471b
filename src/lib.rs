//! Brent's derivative-free algorithms for scalar functions: a bracketed root
//! finder and a bracketed local minimizer.
//!
//! Both keep a shrinking bracket, try a fast interpolation step, fall back to
//! a slow but sure one (bisection, golden section) when interpolation can't be
//! trusted, and evaluate the function once per iteration.
//!
//! * `solver` holds the algorithms, in plain and checked forms.
//! * `bracket` has the interval type and a scanner for finding brackets.
//! * `tolerance` defines the stopping resolution.
//! * `wrap` adapts closures to the `RealFnEval` trait.
//!
//! ```
//! use brent::bracket::{BracketGenerator, Bounds};
//! use brent::solver::{brent_zero, ZeroConfig};
//! use brent::wrap::RealFn;
//!
//! let in_f = |x: f64| x.cos();
//! let f = RealFn::new(&in_f);
//!
//! let roots: Vec<f64> = BracketGenerator::new(&f, Bounds::new(0.0, 10.0), 0.5)
//!     .map(|b| brent_zero(&f, &b, &ZeroConfig::default()).expect("root").root)
//!     .collect();
//! assert_eq!(roots.len(), 3);
//! assert!((roots[1] - 1.5 * std::f64::consts::PI).abs() < 1e-10);
//! ```

pub mod bracket;
pub mod solver;
pub mod tolerance;
pub mod wrap;

pub use solver::{find_local_minimum, find_root, SolveError};
