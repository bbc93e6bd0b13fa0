//! [SolverEngine] implementation on top of the [HiGHS](https://highs.dev) C API.

use std::convert::{TryFrom, TryInto};
use std::ffi::{c_void, CString};
use std::os::raw::c_int;

use highs_sys::*;

use crate::constraint::Relation;
use crate::engine::{SolverEngine, Verbosity};
use crate::error::{LpError, Result};
use crate::options::HighsOptionValue;
use crate::scaling::ScalingMode;
use crate::status::{code, HighsModelStatus, HighsStatus};

/// Magnitude from which a bound counts as infinite
pub const LP_INFINITY: f64 = 1e30;

/// HiGHS `simplex_scale_strategy` values
const SCALE_STRATEGY_OFF: c_int = 0;
const SCALE_STRATEGY_CHOOSE: c_int = 1;
const SCALE_STRATEGY_EQUILIBRATION: c_int = 2;
const SCALE_STRATEGY_MAX_VALUE: c_int = 4;

macro_rules! highs_call {
    ($function_name:ident ($($param:expr),+)) => {
        try_handle_status(
            $function_name($($param),+),
            stringify!($function_name)
        )
    }
}

fn try_handle_status(status: c_int, msg: &str) -> Result<HighsStatus> {
    let status_enum = HighsStatus::try_from(status)
        .map_err(|e| LpError::Engine(format!("{}: {:?}", msg, e)))?;
    match status_enum {
        status @ HighsStatus::OK => Ok(status),
        status @ HighsStatus::Warning => {
            log::warn!("HiGHS emitted a warning: {}", msg);
            Ok(status)
        }
        HighsStatus::Error => Err(LpError::Engine(format!("{} failed", msg))),
    }
}

fn c(n: usize) -> Result<HighsInt> {
    n.try_into()
        .map_err(|_| LpError::Engine(format!("size {} too large for HiGHS", n)))
}

/// Values beyond [LP_INFINITY] in magnitude become real infinities
fn to_highs_bound(value: f64) -> f64 {
    if value >= LP_INFINITY {
        f64::INFINITY
    } else if value <= -LP_INFINITY {
        f64::NEG_INFINITY
    } else {
        value
    }
}

/// The HiGHS scaling strategy closest to the given scaling mode
fn scale_strategy(mode: ScalingMode) -> c_int {
    match mode.base() {
        ScalingMode::NONE => SCALE_STRATEGY_OFF,
        ScalingMode::EXTREME | ScalingMode::RANGE => SCALE_STRATEGY_MAX_VALUE,
        ScalingMode::MEAN | ScalingMode::GEOMETRIC | ScalingMode::CURTISREID => {
            SCALE_STRATEGY_EQUILIBRATION
        }
        _ => SCALE_STRATEGY_CHOOSE,
    }
}

/// Owned HiGHS instance, destroyed on drop.
#[derive(Debug)]
struct HighsPtr(*mut c_void);

// A HiGHS instance has no affinity to the thread that created it.
unsafe impl Send for HighsPtr {}

impl Drop for HighsPtr {
    fn drop(&mut self) {
        log::trace!("Destroying HiGHS instance");
        unsafe { Highs_destroy(self.0) }
    }
}

impl HighsPtr {
    fn new() -> Self {
        let ptr = unsafe { Highs_create() };
        assert!(!ptr.is_null(), "HiGHS could not allocate an instance");
        Self(ptr)
    }

    // HiGHS takes a mutable pointer even for read-only queries
    unsafe fn unsafe_mut_ptr(&self) -> *mut c_void {
        self.0
    }

    fn mut_ptr(&mut self) -> *mut c_void {
        self.0
    }

    fn make_quiet(&mut self) -> Result<()> {
        // setting log_file causes a double free in some HiGHS versions
        self.set_option(&b"output_flag"[..], false)?;
        self.set_option(&b"log_to_console"[..], false)
    }

    fn make_verbose(&mut self) -> Result<()> {
        self.set_option(&b"output_flag"[..], true)?;
        self.set_option(&b"log_to_console"[..], true)
    }

    fn set_option<STR: Into<Vec<u8>>, V: HighsOptionValue>(
        &mut self,
        option: STR,
        value: V,
    ) -> Result<()> {
        let c_str = CString::new(option)
            .map_err(|_| LpError::Engine("invalid option name".to_string()))?;
        let status = unsafe { value.apply_to_highs(self.mut_ptr(), c_str.as_ptr()) };
        try_handle_status(status, "Highs_setOptionValue").map(|_| ())
    }
}

struct Solution {
    colvalue: Vec<f64>,
    coldual: Vec<f64>,
    rowdual: Vec<f64>,
}

/// A HiGHS problem driven through the 1-based [SolverEngine] interface.
///
/// ```
/// use lpkit::{HighsEngine, LpConstraint, LpProblem};
/// let mut problem = LpProblem::new(vec![1., 1.]);
/// problem.add_constraint(LpConstraint::le(vec![1., 2.], 4.));
/// let result = problem
///     .solve_with(|rows, cols| {
///         let mut engine = HighsEngine::make_lp(rows, cols)?;
///         engine.set_option("time_limit", 30.0)?;
///         Ok(engine)
///     })
///     .unwrap();
/// assert!((result.objective_value().unwrap() - 4.).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct HighsEngine {
    highs: HighsPtr,
    collower: Vec<f64>,
    colupper: Vec<f64>,
    integer: Vec<bool>,
}

impl HighsEngine {
    /// Create a problem with `rows` empty free rows and `cols` columns of
    /// zero cost bounded to `[0, +∞)`
    pub fn make_lp(rows: usize, cols: usize) -> Result<Self> {
        log::debug!(
            "Creating a HiGHS problem with {} variables and {} constraints",
            cols,
            rows
        );
        let mut highs = HighsPtr::new();
        highs.make_quiet()?;
        let collower = vec![0.; cols];
        let colupper = vec![f64::INFINITY; cols];
        let no_index: Vec<HighsInt> = Vec::new();
        let no_value: Vec<f64> = Vec::new();
        if cols > 0 {
            let costs = vec![0.; cols];
            let starts: Vec<HighsInt> = vec![0; cols];
            unsafe {
                highs_call!(Highs_addCols(
                    highs.mut_ptr(),
                    c(cols)?,
                    costs.as_ptr(),
                    collower.as_ptr(),
                    colupper.as_ptr(),
                    0,
                    starts.as_ptr(),
                    no_index.as_ptr(),
                    no_value.as_ptr()
                ))?;
            }
        }
        if rows > 0 {
            let lower = vec![f64::NEG_INFINITY; rows];
            let upper = vec![f64::INFINITY; rows];
            let starts: Vec<HighsInt> = vec![0; rows];
            unsafe {
                highs_call!(Highs_addRows(
                    highs.mut_ptr(),
                    c(rows)?,
                    lower.as_ptr(),
                    upper.as_ptr(),
                    0,
                    starts.as_ptr(),
                    no_index.as_ptr(),
                    no_value.as_ptr()
                ))?;
            }
        }
        Ok(Self {
            highs,
            collower,
            colupper,
            integer: vec![false; cols],
        })
    }

    /// Set a custom parameter on the model.
    /// For the list of available options and their documentation, see:
    /// <https://ergo-code.github.io/HiGHS/dev/options/definitions/>
    pub fn set_option<STR: Into<Vec<u8>>, V: HighsOptionValue>(
        &mut self,
        option: STR,
        value: V,
    ) -> Result<()> {
        self.highs.set_option(option, value)
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.collower.len()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        let n = unsafe { Highs_getNumRows(self.highs.unsafe_mut_ptr()) };
        n.try_into().unwrap_or(0)
    }

    /// Whether at least one column is integer constrained
    pub fn is_mip(&self) -> bool {
        self.integer.iter().any(|&i| i)
    }

    /// 0-based HiGHS index of a 1-based column
    fn col_index(&self, col: usize) -> Result<usize> {
        if col == 0 || col > self.num_cols() {
            return Err(LpError::Engine(format!(
                "column {} out of range 1..={}",
                col,
                self.num_cols()
            )));
        }
        Ok(col - 1)
    }

    /// The user part of a 1-based array
    fn row_values<'a>(&self, row: &'a [f64]) -> Result<&'a [f64]> {
        let n = self.num_cols();
        if row.len() < n + 1 {
            return Err(LpError::Engine(format!(
                "expected {} values after the sentinel, got {}",
                n,
                row.len().saturating_sub(1)
            )));
        }
        Ok(&row[1..=n])
    }

    fn change_col_bounds(&mut self, idx: usize) -> Result<()> {
        unsafe {
            highs_call!(Highs_changeColBounds(
                self.highs.mut_ptr(),
                c(idx)?,
                self.collower[idx],
                self.colupper[idx]
            ))
        }
        .map(|_| ())
    }

    fn primal_feasible(&self) -> bool {
        let mut value: HighsInt = 0;
        let name = match CString::new("primal_solution_status") {
            Ok(name) => name,
            Err(_) => return false,
        };
        let status = unsafe {
            Highs_getIntInfoValue(self.highs.unsafe_mut_ptr(), name.as_ptr(), &mut value)
        };
        status == STATUS_OK && value == kHighsSolutionStatusFeasible
    }

    fn solution(&self) -> Solution {
        let cols = self.num_cols();
        let rows = self.num_rows();
        let mut colvalue: Vec<f64> = vec![0.; cols];
        let mut coldual: Vec<f64> = vec![0.; cols];
        let mut rowvalue: Vec<f64> = vec![0.; rows];
        let mut rowdual: Vec<f64> = vec![0.; rows];

        unsafe {
            Highs_getSolution(
                self.highs.unsafe_mut_ptr(),
                colvalue.as_mut_ptr(),
                coldual.as_mut_ptr(),
                rowvalue.as_mut_ptr(),
                rowdual.as_mut_ptr(),
            );
        }

        Solution {
            colvalue,
            coldual,
            rowdual,
        }
    }
}

impl SolverEngine for HighsEngine {
    fn set_verbose(&mut self, level: Verbosity) -> Result<()> {
        if level == Verbosity::Neutral {
            self.highs.make_quiet()
        } else {
            self.highs.make_verbose()
        }
    }

    fn set_maxim(&mut self) -> Result<()> {
        unsafe {
            highs_call!(Highs_changeObjectiveSense(
                self.highs.mut_ptr(),
                OBJECTIVE_SENSE_MAXIMIZE
            ))
        }
        .map(|_| ())
    }

    fn set_obj_fn(&mut self, row: &[f64]) -> Result<()> {
        let costs = self.row_values(row)?;
        for (idx, &cost) in costs.iter().enumerate() {
            unsafe { highs_call!(Highs_changeColCost(self.highs.mut_ptr(), c(idx)?, cost)) }?;
        }
        Ok(())
    }

    fn set_scaling(&mut self, mode: ScalingMode) -> Result<()> {
        let strategy = scale_strategy(mode);
        log::debug!(
            "Scaling mode {} mapped to HiGHS scale strategy {}",
            mode.code(),
            strategy
        );
        self.set_option("simplex_scale_strategy", strategy)
    }

    fn set_lowbo(&mut self, col: usize, value: f64) -> Result<()> {
        let idx = self.col_index(col)?;
        self.collower[idx] = to_highs_bound(value);
        self.change_col_bounds(idx)
    }

    fn set_upbo(&mut self, col: usize, value: f64) -> Result<()> {
        let idx = self.col_index(col)?;
        self.colupper[idx] = to_highs_bound(value);
        self.change_col_bounds(idx)
    }

    fn set_int(&mut self, col: usize, integer: bool) -> Result<()> {
        let idx = self.col_index(col)?;
        let var_type = if integer {
            kHighsVarTypeInteger
        } else {
            kHighsVarTypeContinuous
        };
        unsafe {
            highs_call!(Highs_changeColIntegrality(
                self.highs.mut_ptr(),
                c(idx)?,
                var_type
            ))
        }?;
        self.integer[idx] = integer;
        Ok(())
    }

    fn add_constraint(&mut self, row: &[f64], relation: Relation, rhs: f64) -> Result<()> {
        let mut cols: Vec<HighsInt> = Vec::new();
        let mut factors: Vec<f64> = Vec::new();
        for (idx, &factor) in self.row_values(row)?.iter().enumerate() {
            if factor != 0. {
                cols.push(c(idx)?);
                factors.push(factor);
            }
        }
        let rhs = to_highs_bound(rhs);
        let (lower, upper) = match relation {
            Relation::Le => (f64::NEG_INFINITY, rhs),
            Relation::Ge => (rhs, f64::INFINITY),
            Relation::Eq => (rhs, rhs),
        };
        unsafe {
            highs_call!(Highs_addRow(
                self.highs.mut_ptr(),
                lower,
                upper,
                c(cols.len())?,
                cols.as_ptr(),
                factors.as_ptr()
            ))
        }
        .map(|_| ())
    }

    fn solve(&mut self) -> i32 {
        if let Err(e) = unsafe { highs_call!(Highs_run(self.highs.mut_ptr())) } {
            log::warn!("HiGHS run did not complete cleanly: {}", e);
        }
        let raw = unsafe { Highs_getModelStatus(self.highs.unsafe_mut_ptr()) };
        match HighsModelStatus::try_from(raw) {
            Ok(model_status) => {
                let status = model_status.to_lp_code(self.primal_feasible(), self.is_mip());
                log::debug!(
                    "HiGHS finished with model status {:?} (status {})",
                    model_status,
                    status
                );
                status
            }
            Err(invalid) => {
                log::error!("{:?}", invalid);
                code::NUMFAILURE
            }
        }
    }

    fn objective(&self) -> f64 {
        unsafe { Highs_getObjectiveValue(self.highs.unsafe_mut_ptr()) }
    }

    fn variables(&self, values: &mut [f64]) -> Result<()> {
        let n = self.num_cols();
        if values.len() < n {
            return Err(LpError::Engine(format!(
                "variables buffer holds {} values, {} needed",
                values.len(),
                n
            )));
        }
        let solution = self.solution();
        values[..n].copy_from_slice(&solution.colvalue);
        Ok(())
    }

    fn dual_solution(&self, duals: &mut [f64]) -> Result<()> {
        let solution = self.solution();
        let m = solution.rowdual.len();
        let n = solution.coldual.len();
        if duals.len() < 1 + m + n {
            return Err(LpError::Engine(format!(
                "dual buffer holds {} values, {} needed",
                duals.len(),
                1 + m + n
            )));
        }
        duals[0] = 0.;
        duals[1..=m].copy_from_slice(&solution.rowdual);
        duals[m + 1..m + 1 + n].copy_from_slice(&solution.coldual);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::pad_front;
    use crate::status::LpStatus;

    #[test]
    fn test_scale_strategy_mapping() {
        assert_eq!(scale_strategy(ScalingMode::NONE), SCALE_STRATEGY_OFF);
        assert_eq!(
            scale_strategy(ScalingMode::NONE | ScalingMode::EQUILIBRATE),
            SCALE_STRATEGY_OFF
        );
        assert_eq!(
            scale_strategy(ScalingMode::DEFAULT),
            SCALE_STRATEGY_EQUILIBRATION
        );
        assert_eq!(
            scale_strategy(ScalingMode::EXTREME),
            SCALE_STRATEGY_MAX_VALUE
        );
        assert_eq!(
            scale_strategy(ScalingMode::from_code(5)),
            SCALE_STRATEGY_CHOOSE
        );
    }

    #[test]
    fn test_infinite_bounds() {
        assert_eq!(to_highs_bound(1e30), f64::INFINITY);
        assert_eq!(to_highs_bound(-1e31), f64::NEG_INFINITY);
        assert_eq!(to_highs_bound(12.5), 12.5);
    }

    #[test]
    fn test_make_lp_shape() {
        let engine = HighsEngine::make_lp(2, 3).unwrap();
        assert_eq!(engine.num_cols(), 3);
        assert_eq!(engine.num_rows(), 2);
        assert!(!engine.is_mip());
    }

    #[test]
    fn test_column_indices_are_one_based() {
        let mut engine = HighsEngine::make_lp(0, 2).unwrap();
        assert!(engine.set_lowbo(0, 1.).is_err());
        assert!(engine.set_upbo(3, 1.).is_err());
        engine.set_upbo(2, 5.).unwrap();
        assert_eq!(engine.colupper, vec![f64::INFINITY, 5.]);
        engine.set_int(1, true).unwrap();
        assert!(engine.is_mip());
    }

    #[test]
    fn test_short_row_rejected() {
        let mut engine = HighsEngine::make_lp(0, 2).unwrap();
        assert!(engine.set_obj_fn(&[1., 2.]).is_err());
        assert!(engine
            .add_constraint(&pad_front(&[1.]), Relation::Le, 1.)
            .is_err());
    }

    #[test]
    fn test_solve_and_read_back() {
        // max x + y, x + 2y <= 4, x <= 3
        let mut engine = HighsEngine::make_lp(0, 2).unwrap();
        engine.set_maxim().unwrap();
        engine.set_obj_fn(&pad_front(&[1., 1.])).unwrap();
        engine
            .add_constraint(&pad_front(&[1., 2.]), Relation::Le, 4.)
            .unwrap();
        engine.set_upbo(1, 3.).unwrap();
        assert_eq!(engine.solve(), code::OPTIMAL);
        assert!((engine.objective() - 3.5).abs() < 1e-9);

        let mut values = vec![0.; 2];
        engine.variables(&mut values).unwrap();
        assert!((values[0] - 3.).abs() < 1e-9);
        assert!((values[1] - 0.5).abs() < 1e-9);

        let mut duals = vec![1.; 4];
        engine.dual_solution(&mut duals).unwrap();
        assert_eq!(duals[0], 0.);
        // one extra unit of rhs buys half a unit of y
        assert!((duals[1].abs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_status() {
        let mut engine = HighsEngine::make_lp(0, 1).unwrap();
        engine.set_maxim().unwrap();
        engine.set_obj_fn(&[0., 1.]).unwrap();
        engine.add_constraint(&[0., 1.], Relation::Ge, 3.).unwrap();
        engine.add_constraint(&[0., 1.], Relation::Le, 2.).unwrap();
        let status = engine.solve();
        assert!(!LpStatus::from(status).is_usable());
        assert_eq!(engine.status_text(code::INFEASIBLE), "INFEASIBLE model");
    }
}
