use thiserror::Error;

/// Errors produced while formulating or solving a problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LpError {
    /// Both the default attempt and the no-scaling retry ended with an unusable status.
    #[error("solve failed with status {status}: {status_text}")]
    Solve {
        /// Engine status code of the last attempt
        status: i32,
        /// Engine description of `status`
        status_text: String,
    },
    /// The caller-supplied arrays do not describe a valid problem.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The engine rejected a call outright.
    #[error("engine error: {0}")]
    Engine(String),
}

/// Result type used throughout the formulation code.
pub type Result<T> = std::result::Result<T, LpError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_solve_error_message() {
        let err = LpError::Solve {
            status: 2,
            status_text: "This problem is infeasible".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "solve failed with status 2: This problem is infeasible"
        );
    }
}
