#![forbid(missing_docs)]
//! Formulate and solve maximisation linear programs on top of the
//! [HiGHS](https://highs.dev) solver.
//!
//! ## Usage example
//!
//! ### Solving a problem given as plain arrays
//!
//! The objective holds one coefficient per variable, every constraint holds one
//! coefficient per variable plus a relation and a right-hand side.
//! Variables are bounded to `[0, +∞)` unless bounds are given.
//!
//! ```
//! use lpkit::{solve, LpConstraint, Relation};
//! // max: 3x + 2y
//! // under constraints:
//! // c1: x + y <= 4
//! let constraints = vec![LpConstraint::new(vec![1., 1.], Relation::Le, 4.)];
//! let result = solve(&[3., 2.], &constraints, None, None, None, None).unwrap();
//! assert_eq!(result.objective_value(), Some(12.));
//! assert_eq!(result.variable_values(), &[4., 0.]);
//! ```
//!
//! ### Building a problem with [LpProblem]
//!
//! Bounds, integrality and the scaling mode are optional. A bound or
//! integrality array whose length differs from the number of variables is
//! ignored, exactly as if it had not been given.
//!
//! ```
//! use lpkit::{LpConstraint, LpProblem, ScalingMode};
//! // max: 3x + 2y, x + y <= 4, x <= 3, y integer
//! let mut pb = LpProblem::new(vec![3., 2.]);
//! pb.add_constraint(LpConstraint::le(vec![1., 1.], 4.));
//! pb.add_constraint(LpConstraint::le(vec![1., 0.], 3.));
//! pb.set_integer_variables(vec![false, true]);
//! pb.set_scaling(ScalingMode::GEOMETRIC | ScalingMode::DYNUPDATE);
//! let result = pb.solve().unwrap();
//! let y = result.variable_values()[1];
//! assert!((y - y.round()).abs() < 1e-9);
//! assert!((result.objective_value().unwrap() - 11.).abs() < 1e-9);
//! ```
//!
//! ### Failure and retry
//!
//! A solve is accepted when the engine reports one of the status codes
//! `0, 1, 11, 12` (see [LpStatus]). Any other status triggers exactly one
//! more solve with scaling disabled; if that fails too, [LpError::Solve]
//! carries the last status and its description.
//!
//! ```
//! use lpkit::{solve, LpError};
//! // max x with x unbounded above
//! let err = solve(&[1.], &[], None, None, None, None).unwrap_err();
//! assert!(matches!(err, LpError::Solve { .. }));
//! ```
//!
//! ### Dual values
//!
//! The dual solution keeps the engine layout: a padding element, one shadow
//! price per constraint, then one reduced cost per variable.
//!
//! ```
//! use lpkit::{LpConstraint, LpProblem};
//! let mut pb = LpProblem::new(vec![3., 2.]);
//! pb.add_constraint(LpConstraint::le(vec![1., 1.], 4.));
//! let result = pb.solve().unwrap();
//! assert_eq!(result.dual_solution().len(), 1 + 1 + 2);
//! assert_eq!(result.constraint_duals().len(), 1);
//! assert_eq!(result.reduced_costs().len(), 2);
//! ```

use serde::{Deserialize, Serialize};

pub use constraint::{LpConstraint, Relation};
pub use engine::{pad_front, SolverEngine, Verbosity};
pub use error::{LpError, Result};
pub use highs::{HighsEngine, LP_INFINITY};
pub use knowledge::{
    FileStorage, KnowledgeBase, KnowledgeBaseError, MemoryStorage, StorageBackend,
};
pub use options::HighsOptionValue;
pub use result::LpResult;
pub use scaling::ScalingMode;
pub use status::{code, status_text, HighsModelStatus, HighsStatus, InvalidStatus, LpStatus};

mod constraint;
mod engine;
mod error;
mod highs;
mod knowledge;
mod options;
mod result;
mod scaling;
mod status;

/// Index of a constraint, in insertion order
pub type Row = usize;

/// A maximisation problem: objective, constraints, optional bounds,
/// integrality flags and scaling mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LpProblem {
    objective: Vec<f64>,
    constraints: Vec<LpConstraint>,
    lower_bounds: Option<Vec<f64>>,
    upper_bounds: Option<Vec<f64>>,
    integer_variables: Option<Vec<bool>>,
    scaling: Option<ScalingMode>,
}

impl LpProblem {
    /// Create a problem maximising `objective`, one coefficient per variable
    pub fn new(objective: impl Into<Vec<f64>>) -> Self {
        Self {
            objective: objective.into(),
            ..Self::default()
        }
    }

    /// Number of variables in the problem
    pub fn num_cols(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraints in the problem
    pub fn num_rows(&self) -> usize {
        self.constraints.len()
    }

    /// The objective coefficients
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// The constraints, in insertion order
    pub fn constraints(&self) -> &[LpConstraint] {
        &self.constraints
    }

    /// Append a constraint and return its row index
    pub fn add_constraint(&mut self, constraint: LpConstraint) -> Row {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    /// Lower bounds of the variables. Ignored unless there is one per variable.
    pub fn set_lower_bounds(&mut self, bounds: impl Into<Vec<f64>>) {
        self.lower_bounds = Some(bounds.into());
    }

    /// Upper bounds of the variables. Ignored unless there is one per variable.
    pub fn set_upper_bounds(&mut self, bounds: impl Into<Vec<f64>>) {
        self.upper_bounds = Some(bounds.into());
    }

    /// Which variables must take integer values. Ignored unless there is one
    /// flag per variable.
    pub fn set_integer_variables(&mut self, flags: impl Into<Vec<bool>>) {
        self.integer_variables = Some(flags.into());
    }

    /// Scaling mode for the first solve attempt. The engine default is used
    /// when none is set.
    pub fn set_scaling(&mut self, mode: ScalingMode) {
        self.scaling = Some(mode);
    }

    /// Solve the problem with HiGHS
    pub fn solve(&self) -> Result<LpResult> {
        self.solve_with(HighsEngine::make_lp)
    }

    /// Solve the problem with the engine built by `make_engine`.
    ///
    /// `make_engine` receives the initial number of rows (always 0, constraints
    /// are appended afterwards) and the number of columns. The engine is
    /// dropped before this function returns, whatever the outcome.
    pub fn solve_with<E, F>(&self, make_engine: F) -> Result<LpResult>
    where
        E: SolverEngine,
        F: FnOnce(usize, usize) -> Result<E>,
    {
        self.borrowed().solve_with(make_engine)
    }

    fn borrowed(&self) -> ProblemRef<'_> {
        ProblemRef {
            objective: &self.objective,
            constraints: &self.constraints,
            lower_bounds: self.lower_bounds.as_deref(),
            upper_bounds: self.upper_bounds.as_deref(),
            integer_variables: self.integer_variables.as_deref(),
            scaling: self.scaling,
        }
    }
}

/// A problem whose data is borrowed from the caller
#[derive(Clone, Copy)]
struct ProblemRef<'a> {
    objective: &'a [f64],
    constraints: &'a [LpConstraint],
    lower_bounds: Option<&'a [f64]>,
    upper_bounds: Option<&'a [f64]>,
    integer_variables: Option<&'a [bool]>,
    scaling: Option<ScalingMode>,
}

impl ProblemRef<'_> {
    fn solve_with<E, F>(self, make_engine: F) -> Result<LpResult>
    where
        E: SolverEngine,
        F: FnOnce(usize, usize) -> Result<E>,
    {
        self.validate()?;
        let n = self.objective.len();
        let m = self.constraints.len();
        let mut result = LpResult::new(n, m);

        let mut engine = make_engine(0, n)?;
        self.formulate(&mut engine)?;

        let mut status = LpStatus::from(engine.solve());
        if !status.is_usable() {
            log::warn!(
                "Solve ended with status {} ({}), retrying without scaling",
                status.code(),
                engine.status_text(status.code())
            );
            engine.set_scaling(ScalingMode::NONE)?;
            status = LpStatus::from(engine.solve());
            if !status.is_usable() {
                return Err(LpError::Solve {
                    status: status.code(),
                    status_text: engine.status_text(status.code()),
                });
            }
        }

        result.set_objective_value(engine.objective());
        engine.variables(result.variable_values_mut())?;
        engine.dual_solution(result.dual_solution_mut())?;
        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        let n = self.objective.len();
        if n == 0 {
            return Err(LpError::InvalidInput(
                "the objective needs at least one coefficient".to_string(),
            ));
        }
        for (row, constraint) in self.constraints.iter().enumerate() {
            if constraint.body().len() != n {
                return Err(LpError::InvalidInput(format!(
                    "constraint {} has {} coefficients but the problem has {} variables",
                    row,
                    constraint.body().len(),
                    n
                )));
            }
        }
        Ok(())
    }

    fn formulate<E: SolverEngine>(&self, engine: &mut E) -> Result<()> {
        let n = self.objective.len();
        log::debug!(
            "Formulating a problem with {} variables and {} constraints",
            n,
            self.constraints.len()
        );
        engine.set_verbose(Verbosity::Neutral)?;
        engine.set_maxim()?;
        engine.set_obj_fn(&pad_front(self.objective))?;

        if let Some(mode) = self.scaling {
            engine.set_scaling(mode)?;
        }

        let lower = matching_len(self.lower_bounds, n, "lower bounds");
        let upper = matching_len(self.upper_bounds, n, "upper bounds");
        let integer = matching_len(self.integer_variables, n, "integer flags");
        for i in 0..n {
            if let Some(lower) = lower {
                engine.set_lowbo(i + 1, lower[i])?;
            }
            if let Some(upper) = upper {
                engine.set_upbo(i + 1, upper[i])?;
            }
            if let Some(integer) = integer {
                engine.set_int(i + 1, integer[i])?;
            }
        }

        for constraint in self.constraints {
            engine.add_constraint(
                &pad_front(constraint.body()),
                constraint.relation(),
                constraint.rhs(),
            )?;
        }
        Ok(())
    }
}

/// `values` when it holds exactly `n` entries
fn matching_len<'a, T>(values: Option<&'a [T]>, n: usize, what: &str) -> Option<&'a [T]> {
    match values {
        Some(values) if values.len() == n => Some(values),
        Some(values) => {
            log::warn!(
                "Ignoring {}: got {} values for {} variables",
                what,
                values.len(),
                n
            );
            None
        }
        None => None,
    }
}

/// Maximise `objective` under `constraints` with HiGHS.
///
/// See [LpProblem] for the meaning of the optional arguments.
pub fn solve(
    objective: &[f64],
    constraints: &[LpConstraint],
    lower_bounds: Option<&[f64]>,
    upper_bounds: Option<&[f64]>,
    integer_variables: Option<&[bool]>,
    scaling: Option<ScalingMode>,
) -> Result<LpResult> {
    solve_borrowed(
        objective,
        constraints,
        lower_bounds,
        upper_bounds,
        integer_variables,
        scaling,
        HighsEngine::make_lp,
    )
}

fn solve_borrowed<E, F>(
    objective: &[f64],
    constraints: &[LpConstraint],
    lower_bounds: Option<&[f64]>,
    upper_bounds: Option<&[f64]>,
    integer_variables: Option<&[bool]>,
    scaling: Option<ScalingMode>,
    make_engine: F,
) -> Result<LpResult>
where
    E: SolverEngine,
    F: FnOnce(usize, usize) -> Result<E>,
{
    ProblemRef {
        objective,
        constraints,
        lower_bounds,
        upper_bounds,
        integer_variables,
        scaling,
    }
    .solve_with(make_engine)
}
