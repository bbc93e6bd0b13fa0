use std::convert::TryFrom;
use std::fmt::{Debug, Formatter};
use std::os::raw::c_int;

use highs_sys::*;

/// Status codes of the engine vocabulary, as returned by [crate::SolverEngine::solve].
pub mod code {
    /// No basis factorization package
    pub const NOBFP: i32 = -3;
    /// Not enough memory
    pub const NOMEMORY: i32 = -2;
    /// The model was never solved
    pub const NOTRUN: i32 = -1;
    /// Optimal solution
    pub const OPTIMAL: i32 = 0;
    /// Usable, but not proven optimal
    pub const SUBOPTIMAL: i32 = 1;
    /// Infeasible model
    pub const INFEASIBLE: i32 = 2;
    /// Unbounded model
    pub const UNBOUNDED: i32 = 3;
    /// Degenerate situation
    pub const DEGENERATE: i32 = 4;
    /// Numerical failure
    pub const NUMFAILURE: i32 = 5;
    /// Aborted by the user
    pub const USERABORT: i32 = 6;
    /// Time limit reached
    pub const TIMEOUT: i32 = 7;
    /// Still running
    pub const RUNNING: i32 = 8;
    /// Solved by presolve
    pub const PRESOLVED: i32 = 9;
    /// Branch and bound failed
    pub const PROCFAIL: i32 = 10;
    /// Branch and bound stopped early with a usable solution
    pub const PROCBREAK: i32 = 11;
    /// Branch and bound found a feasible solution
    pub const FEASFOUND: i32 = 12;
    /// Branch and bound found no feasible solution
    pub const NOFEASFOUND: i32 = 13;
    /// Branch was pruned
    pub const FATHOMED: i32 = 14;
}

/// Classification of an engine status code.
///
/// Only the first four variants carry a solution that can be read back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LpStatus {
    /// Optimal solution (0)
    Optimal,
    /// Sub-optimal but usable solution (1)
    Suboptimal,
    /// Branch and bound stopped early with a usable solution (11)
    ProcBreak,
    /// Branch and bound found a feasible solution (12)
    FeasFound,
    /// Any other code
    Failure(i32),
}

impl LpStatus {
    /// Whether a solution can be read back from the engine
    pub fn is_usable(self) -> bool {
        !matches!(self, LpStatus::Failure(_))
    }

    /// The raw engine code
    pub fn code(self) -> i32 {
        match self {
            LpStatus::Optimal => code::OPTIMAL,
            LpStatus::Suboptimal => code::SUBOPTIMAL,
            LpStatus::ProcBreak => code::PROCBREAK,
            LpStatus::FeasFound => code::FEASFOUND,
            LpStatus::Failure(c) => c,
        }
    }
}

impl From<i32> for LpStatus {
    fn from(value: i32) -> Self {
        match value {
            code::OPTIMAL => LpStatus::Optimal,
            code::SUBOPTIMAL => LpStatus::Suboptimal,
            code::PROCBREAK => LpStatus::ProcBreak,
            code::FEASFOUND => LpStatus::FeasFound,
            other => LpStatus::Failure(other),
        }
    }
}

/// Human-readable description of an engine status code
pub fn status_text(status: i32) -> &'static str {
    match status {
        code::NOBFP => "No basis factorization package",
        code::NOMEMORY => "Not enough memory available",
        code::NOTRUN => "Model has not been optimized",
        code::OPTIMAL => "OPTIMAL solution",
        code::SUBOPTIMAL => "SUB-OPTIMAL solution",
        code::INFEASIBLE => "INFEASIBLE model",
        code::UNBOUNDED => "UNBOUNDED model",
        code::DEGENERATE => "DEGENERATE situation",
        code::NUMFAILURE => "NUMFAILURE encountered",
        code::USERABORT => "User-requested termination",
        code::TIMEOUT => "Termination due to timeout",
        code::RUNNING => "RUNNING",
        code::PRESOLVED => "Model solved by presolve",
        code::PROCFAIL => "B&B routine failed",
        code::PROCBREAK => "B&B routine terminated",
        code::FEASFOUND => "Feasible B&B solution found",
        code::NOFEASFOUND => "No feasible B&B solution found",
        code::FATHOMED => "Fathomed/pruned branch",
        _ => "Undefined internal error",
    }
}

/// The status of a HiGHS model after a run
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum HighsModelStatus {
    /// not initialized
    NotSet = 0,
    /// Unable to load model
    LoadError,
    /// invalid model
    ModelError,
    /// Unable to run the pre-solve phase
    PresolveError,
    /// Unable to solve
    SolveError,
    /// Unable to clean after solve
    PostsolveError,
    /// No variables in the model: nothing to optimize
    ModelEmpty,
    /// There is an optimal solution
    Optimal,
    /// The problem is infeasible
    Infeasible,
    /// The problem is either unbounded or infeasible
    UnboundedOrInfeasible,
    /// The problem is unbounded
    Unbounded,
    /// The objective reached the given bound
    ObjectiveBound,
    /// The objective reached the given target
    ObjectiveTarget,
    /// The time limit was reached
    ReachedTimeLimit,
    /// The iteration limit was reached
    ReachedIterationLimit,
    /// Unknown model status
    Unknown,
    /// The MIP solution limit was reached
    ReachedSolutionLimit,
    /// The run was interrupted
    Interrupted,
}

/// This error should never happen: an unexpected status was returned
#[derive(PartialEq, Clone, Copy)]
pub struct InvalidStatus(pub c_int);

impl Debug for InvalidStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is not a valid HiGHS status. \
        This error comes from a bug in lpkit. \
        Please report it.",
            self.0
        )
    }
}

#[allow(non_upper_case_globals)]
impl TryFrom<c_int> for HighsModelStatus {
    type Error = InvalidStatus;

    fn try_from(value: c_int) -> Result<Self, Self::Error> {
        match value {
            kHighsModelStatusNotset => Ok(Self::NotSet),
            kHighsModelStatusLoadError => Ok(Self::LoadError),
            kHighsModelStatusModelError => Ok(Self::ModelError),
            kHighsModelStatusPresolveError => Ok(Self::PresolveError),
            kHighsModelStatusSolveError => Ok(Self::SolveError),
            kHighsModelStatusPostsolveError => Ok(Self::PostsolveError),
            kHighsModelStatusModelEmpty => Ok(Self::ModelEmpty),
            kHighsModelStatusOptimal => Ok(Self::Optimal),
            kHighsModelStatusInfeasible => Ok(Self::Infeasible),
            kHighsModelStatusUnboundedOrInfeasible => Ok(Self::UnboundedOrInfeasible),
            kHighsModelStatusUnbounded => Ok(Self::Unbounded),
            kHighsModelStatusObjectiveBound => Ok(Self::ObjectiveBound),
            kHighsModelStatusObjectiveTarget => Ok(Self::ObjectiveTarget),
            kHighsModelStatusTimeLimit => Ok(Self::ReachedTimeLimit),
            kHighsModelStatusIterationLimit => Ok(Self::ReachedIterationLimit),
            kHighsModelStatusUnknown => Ok(Self::Unknown),
            kHighsModelStatusSolutionLimit => Ok(Self::ReachedSolutionLimit),
            kHighsModelStatusInterrupt => Ok(Self::Interrupted),
            n => Err(InvalidStatus(n)),
        }
    }
}

impl HighsModelStatus {
    /// Translate into the engine status vocabulary.
    ///
    /// `feasible` tells whether HiGHS holds a feasible primal solution, `mip`
    /// whether any column is integer constrained.
    pub fn to_lp_code(self, feasible: bool, mip: bool) -> i32 {
        use HighsModelStatus::*;
        match self {
            Optimal | ModelEmpty => code::OPTIMAL,
            Infeasible => code::INFEASIBLE,
            Unbounded | UnboundedOrInfeasible => code::UNBOUNDED,
            ObjectiveBound | ObjectiveTarget if feasible => code::PROCBREAK,
            ObjectiveBound | ObjectiveTarget => code::PROCFAIL,
            ReachedTimeLimit | ReachedIterationLimit | ReachedSolutionLimit | Interrupted
                if feasible =>
            {
                if mip {
                    code::FEASFOUND
                } else {
                    code::SUBOPTIMAL
                }
            }
            Interrupted => code::USERABORT,
            ReachedTimeLimit | ReachedIterationLimit | ReachedSolutionLimit => code::TIMEOUT,
            LoadError | ModelError | PresolveError | SolveError | PostsolveError | NotSet
            | Unknown => code::NUMFAILURE,
        }
    }
}

/// The status of a HiGHS API call
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum HighsStatus {
    /// Success
    OK = 0,
    /// Done, with warning
    Warning = 1,
    /// An error occurred
    Error = 2,
}

impl TryFrom<c_int> for HighsStatus {
    type Error = InvalidStatus;

    fn try_from(value: c_int) -> Result<Self, InvalidStatus> {
        match value {
            STATUS_OK => Ok(Self::OK),
            STATUS_WARNING => Ok(Self::Warning),
            STATUS_ERROR => Ok(Self::Error),
            n => Err(InvalidStatus(n)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_usable_statuses() {
        let usable: Vec<i32> = (-5..20)
            .filter(|&c| LpStatus::from(c).is_usable())
            .collect();
        assert_eq!(usable, vec![0, 1, 11, 12]);
    }

    #[test]
    fn test_status_code_round_trip() {
        for c in [0, 1, 2, 3, 11, 12, 13] {
            assert_eq!(LpStatus::from(c).code(), c);
        }
        assert_eq!(LpStatus::from(5), LpStatus::Failure(5));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(code::OPTIMAL), "OPTIMAL solution");
        assert_eq!(status_text(code::INFEASIBLE), "INFEASIBLE model");
        assert_eq!(status_text(42), "Undefined internal error");
    }

    #[test]
    fn test_highs_model_status_translation() {
        use HighsModelStatus::*;
        assert_eq!(Optimal.to_lp_code(true, false), code::OPTIMAL);
        assert_eq!(Infeasible.to_lp_code(false, false), code::INFEASIBLE);
        assert_eq!(Unbounded.to_lp_code(true, false), code::UNBOUNDED);
        assert_eq!(UnboundedOrInfeasible.to_lp_code(false, false), code::UNBOUNDED);
        assert_eq!(ReachedTimeLimit.to_lp_code(true, false), code::SUBOPTIMAL);
        assert_eq!(ReachedTimeLimit.to_lp_code(true, true), code::FEASFOUND);
        assert_eq!(ReachedTimeLimit.to_lp_code(false, true), code::TIMEOUT);
        assert_eq!(Interrupted.to_lp_code(false, false), code::USERABORT);
        assert_eq!(ObjectiveTarget.to_lp_code(true, true), code::PROCBREAK);
        assert_eq!(ObjectiveBound.to_lp_code(true, false), code::PROCBREAK);
        assert_eq!(ObjectiveBound.to_lp_code(false, false), code::PROCFAIL);
        assert_eq!(ObjectiveTarget.to_lp_code(false, true), code::PROCFAIL);
        assert!(!LpStatus::from(ObjectiveBound.to_lp_code(false, false)).is_usable());
        assert_eq!(SolveError.to_lp_code(false, false), code::NUMFAILURE);
    }

    #[test]
    fn test_highs_model_status_from_int() {
        assert_eq!(HighsModelStatus::try_from(7), Ok(HighsModelStatus::Optimal));
        assert_eq!(HighsModelStatus::try_from(10), Ok(HighsModelStatus::Unbounded));
        assert!(HighsModelStatus::try_from(99).is_err());
    }
}
