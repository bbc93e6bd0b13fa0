use serde::{Deserialize, Serialize};

/// Outcome of a successful solve.
///
/// `dual_solution` keeps the engine layout: index 0 is padding, indices
/// `1..=m` hold one value per constraint in insertion order and the last `n`
/// entries hold one value per variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredResult")]
pub struct LpResult {
    objective_value: Option<f64>,
    variable_values: Vec<f64>,
    dual_solution: Vec<f64>,
    num_constraints: usize,
}

#[derive(Deserialize)]
struct StoredResult {
    objective_value: Option<f64>,
    variable_values: Vec<f64>,
    dual_solution: Vec<f64>,
    num_constraints: usize,
}

impl TryFrom<StoredResult> for LpResult {
    type Error = String;

    fn try_from(stored: StoredResult) -> Result<Self, Self::Error> {
        let expected = stored.variable_values.len() + stored.num_constraints + 1;
        if stored.dual_solution.len() != expected {
            return Err(format!(
                "dual solution has {} values, expected {} for {} variables and {} constraints",
                stored.dual_solution.len(),
                expected,
                stored.variable_values.len(),
                stored.num_constraints
            ));
        }
        Ok(Self {
            objective_value: stored.objective_value,
            variable_values: stored.variable_values,
            dual_solution: stored.dual_solution,
            num_constraints: stored.num_constraints,
        })
    }
}

impl LpResult {
    /// An empty result for `num_variables` variables and `num_constraints` constraints
    pub(crate) fn new(num_variables: usize, num_constraints: usize) -> Self {
        Self {
            objective_value: None,
            variable_values: vec![0.; num_variables],
            dual_solution: vec![0.; num_variables + num_constraints + 1],
            num_constraints,
        }
    }

    /// Value of the objective function at the solution
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    pub(crate) fn set_objective_value(&mut self, value: f64) {
        self.objective_value = Some(value);
    }

    /// One value per variable, in the order of the objective coefficients
    pub fn variable_values(&self) -> &[f64] {
        &self.variable_values
    }

    pub(crate) fn variable_values_mut(&mut self) -> &mut [f64] {
        &mut self.variable_values
    }

    /// The whole dual solution, padding included
    pub fn dual_solution(&self) -> &[f64] {
        &self.dual_solution
    }

    pub(crate) fn dual_solution_mut(&mut self) -> &mut [f64] {
        &mut self.dual_solution
    }

    /// Shadow prices of the constraints, in insertion order
    pub fn constraint_duals(&self) -> &[f64] {
        &self.dual_solution[1..=self.num_constraints]
    }

    /// Reduced costs of the variables
    pub fn reduced_costs(&self) -> &[f64] {
        &self.dual_solution[self.num_constraints + 1..]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_result_shape() {
        let result = LpResult::new(3, 2);
        assert_eq!(result.objective_value(), None);
        assert_eq!(result.variable_values(), &[0., 0., 0.]);
        assert_eq!(result.dual_solution().len(), 6);
        assert_eq!(result.constraint_duals().len(), 2);
        assert_eq!(result.reduced_costs().len(), 3);
    }

    #[test]
    fn test_dual_views_skip_padding() {
        let mut result = LpResult::new(2, 1);
        result
            .dual_solution_mut()
            .copy_from_slice(&[9., 1.5, -0.5, 0.25]);
        assert_eq!(result.constraint_duals(), &[1.5]);
        assert_eq!(result.reduced_costs(), &[-0.5, 0.25]);
        assert_eq!(result.dual_solution()[0], 9.);
    }

    #[test]
    fn test_json_round_trip_keeps_views() {
        let mut result = LpResult::new(2, 1);
        result.set_objective_value(4.);
        result
            .dual_solution_mut()
            .copy_from_slice(&[0., 1.5, -0.5, 0.25]);
        let json = serde_json::to_string(&result).unwrap();
        let back: LpResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.constraint_duals(), &[1.5]);
    }

    #[test]
    fn test_inconsistent_dual_length_is_rejected() {
        let json = r#"{"objective_value":1.0,"variable_values":[1.0],"dual_solution":[0.0],"num_constraints":3}"#;
        let err = serde_json::from_str::<LpResult>(json).unwrap_err();
        assert!(err.to_string().contains("dual solution has 1 values"));
    }

    #[test]
    fn test_no_constraints() {
        let result = LpResult::new(2, 0);
        assert!(result.constraint_duals().is_empty());
        assert_eq!(result.reduced_costs().len(), 2);
    }
}
