//! The capability a solver engine has to offer to be driven by [crate::LpProblem].
//!
//! Every array crossing this boundary is 1-based: element 0 is a sentinel and
//! is ignored by the engine, user data starts at index 1. Column indices are
//! 1-based as well.

use crate::constraint::Relation;
use crate::error::Result;
use crate::scaling::ScalingMode;
use crate::status;

/// How much the engine is allowed to print while working
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Verbosity {
    /// Nothing at all
    Neutral = 0,
    /// Only critical messages
    Critical = 1,
    /// Severe messages and worse
    Severe = 2,
    /// Important messages and worse
    Important = 3,
    /// Normal progress output
    Normal = 4,
    /// Detailed output
    Detailed = 5,
    /// Everything
    Full = 6,
}

/// A simplex / branch-and-bound engine holding one problem.
///
/// An engine is created with a fixed number of columns, filled, solved and
/// read back. Dropping it releases every resource it holds.
pub trait SolverEngine {
    /// Set the verbosity level
    fn set_verbose(&mut self, level: Verbosity) -> Result<()>;

    /// Maximise the objective function
    fn set_maxim(&mut self) -> Result<()>;

    /// Set the objective coefficients, given as a 1-based array
    fn set_obj_fn(&mut self, row: &[f64]) -> Result<()>;

    /// Select the scaling strategy for the next solve
    fn set_scaling(&mut self, mode: ScalingMode) -> Result<()>;

    /// Set the lower bound of a (1-based) column
    fn set_lowbo(&mut self, col: usize, value: f64) -> Result<()>;

    /// Set the upper bound of a (1-based) column
    fn set_upbo(&mut self, col: usize, value: f64) -> Result<()>;

    /// Mark a (1-based) column as integer or continuous
    fn set_int(&mut self, col: usize, integer: bool) -> Result<()>;

    /// Append a constraint row, its coefficients given as a 1-based array
    fn add_constraint(&mut self, row: &[f64], relation: Relation, rhs: f64) -> Result<()>;

    /// Run the solver and return a status code of the [status::code] vocabulary
    fn solve(&mut self) -> i32;

    /// Describe a status code
    fn status_text(&self, status: i32) -> String {
        status::status_text(status).to_string()
    }

    /// The objective value of the last solve
    fn objective(&self) -> f64;

    /// Copy the primal column values of the last solve into `values`
    fn variables(&self, values: &mut [f64]) -> Result<()>;

    /// Copy the dual solution of the last solve into `duals`:
    /// `[padding, row duals..., column duals...]`
    fn dual_solution(&self, duals: &mut [f64]) -> Result<()>;
}

/// Prepend the sentinel element expected by engines in front of `values`
pub fn pad_front(values: &[f64]) -> Vec<f64> {
    let mut padded = Vec::with_capacity(values.len() + 1);
    padded.push(0.);
    padded.extend_from_slice(values);
    padded
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pad_front() {
        for n in 0..6 {
            let values: Vec<f64> = (0..n).map(|i| i as f64 + 0.5).collect();
            let padded = pad_front(&values);
            assert_eq!(padded.len(), n + 1);
            assert_eq!(padded[0], 0.);
            assert_eq!(&padded[1..], values.as_slice());
        }
    }

    #[test]
    fn test_verbosity_order() {
        assert!(Verbosity::Neutral < Verbosity::Critical);
        assert!(Verbosity::Full > Verbosity::Normal);
    }
}
