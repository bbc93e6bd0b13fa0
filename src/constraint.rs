use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::error::LpError;

/// How the body of a constraint relates to its right-hand side.
///
/// The discriminants are the wire codes understood by the engine.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Relation {
    /// body ≤ rhs
    Le = 1,
    /// body ≥ rhs
    Ge = 2,
    /// body = rhs
    Eq = 3,
}

impl Relation {
    /// The wire code of the relation
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Relation {
    type Error = LpError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Relation::Le),
            2 => Ok(Relation::Ge),
            3 => Ok(Relation::Eq),
            other => Err(LpError::InvalidInput(format!(
                "unknown constraint relation code {}",
                other
            ))),
        }
    }
}

/// A linear constraint `body · x (relation) rhs`.
///
/// The body holds one coefficient per variable, in variable order, starting
/// at index 0.
///
/// ```
/// use lpkit::{LpConstraint, Relation};
/// // 2x + y <= 10
/// let c = LpConstraint::new(vec![2., 1.], Relation::Le, 10.);
/// assert_eq!(c.body(), &[2., 1.]);
/// assert_eq!(c.relation(), Relation::Le);
/// assert_eq!(c.rhs(), 10.);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LpConstraint {
    body: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

impl LpConstraint {
    /// Create a constraint
    pub fn new(body: impl Into<Vec<f64>>, relation: Relation, rhs: f64) -> Self {
        Self {
            body: body.into(),
            relation,
            rhs,
        }
    }

    /// Shorthand for `body ≤ rhs`
    pub fn le(body: impl Into<Vec<f64>>, rhs: f64) -> Self {
        Self::new(body, Relation::Le, rhs)
    }

    /// Shorthand for `body ≥ rhs`
    pub fn ge(body: impl Into<Vec<f64>>, rhs: f64) -> Self {
        Self::new(body, Relation::Ge, rhs)
    }

    /// Shorthand for `body = rhs`
    pub fn equal(body: impl Into<Vec<f64>>, rhs: f64) -> Self {
        Self::new(body, Relation::Eq, rhs)
    }

    /// Coefficients of the left-hand side
    pub fn body(&self) -> &[f64] {
        &self.body
    }

    /// The relation between body and right-hand side
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// The right-hand side
    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accessors_return_inputs() {
        let body = vec![2., 1.];
        let c = LpConstraint::new(body.clone(), Relation::Le, 10.);
        assert_eq!(c.body(), body.as_slice());
        assert_eq!(c.relation(), Relation::Le);
        assert_eq!(c.rhs(), 10.);
        // reading twice does not change anything
        assert_eq!(c.body(), body.as_slice());
    }

    #[test]
    fn test_relation_wire_codes() {
        assert_eq!(Relation::Le.code(), 1);
        assert_eq!(Relation::Ge.code(), 2);
        assert_eq!(Relation::Eq.code(), 3);
        assert_eq!(Relation::try_from(2).unwrap(), Relation::Ge);
        assert!(matches!(
            Relation::try_from(0),
            Err(LpError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(LpConstraint::ge(vec![1.], 2.).relation(), Relation::Ge);
        assert_eq!(LpConstraint::equal(vec![1.], 2.).relation(), Relation::Eq);
        assert_eq!(
            LpConstraint::le([1., 1.], 4.),
            LpConstraint::new(vec![1., 1.], Relation::Le, 4.)
        );
    }

    #[test]
    fn test_json_shape() {
        let c = LpConstraint::le(vec![1., 2.], 3.);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"body":[1.0,2.0],"relation":"Le","rhs":3.0}"#);
        let back: LpConstraint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
