use std::fmt;

/// A common error type returned by functions throughout the toolbox.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimaError {
    GenericError(String),
    IdxOutOfBoundError(String),
    ConfigurationError(String),
    NotInitializedError(String),
    SolverTimeout(String),
    ConstraintDimensionMismatch(String),
    CostDimensionMismatch(String),
    ModelLoadingError(String)
}
impl OptimaError {
    pub fn new_generic_error_str(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} -- File: {}, Line: {}", s, file, line);
        return Self::GenericError(s);
    }
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s)
    }
    pub fn new_check_for_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Result<(), Self> {
        return if given_idx < length_of_array { Ok(()) } else {
            Err(Self::new_idx_out_of_bound_error(given_idx, length_of_array, file, line))
        }
    }
    pub fn new_configuration_error(message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Configuration error.  {} -- File: {}, Line: {}", message, file, line);
        return Self::ConfigurationError(s);
    }
    pub fn new_not_initialized_error(function_name: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} was called before the planning was initialized -- File: {}, Line: {}", function_name, file, line);
        return Self::NotInitializedError(s);
    }
    pub fn new_solver_timeout_error(budget_in_seconds: f64, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Solver exceeded its computation budget of {:?} seconds -- File: {}, Line: {}", budget_in_seconds, file, line);
        return Self::SolverTimeout(s);
    }
    pub fn new_constraint_dimension_mismatch_error(constraint_name: &str, given_dimension: usize, expected_dimension: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Constraint {:?} produced a vector of length {:?}, but {:?} was expected -- File: {}, Line: {}", constraint_name, given_dimension, expected_dimension, file, line);
        return Self::ConstraintDimensionMismatch(s);
    }
    pub fn new_cost_dimension_mismatch_error(cost_name: &str, weights_num_joints: usize, state_num_joints: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Cost {:?} has weights for {:?} joints, but was given a state with {:?} joints -- File: {}, Line: {}", cost_name, weights_num_joints, state_num_joints, file, line);
        return Self::CostDimensionMismatch(s);
    }
    pub fn new_model_loading_error(message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Could not load the rigid body model.  {} -- File: {}, Line: {}", message, file, line);
        return Self::ModelLoadingError(s);
    }
    /// Recoverable errors are reported as a failed (false) planning cycle; the rest indicate a wiring
    /// problem and are handed back to the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            OptimaError::ConstraintDimensionMismatch(_) => { false }
            OptimaError::CostDimensionMismatch(_) => { false }
            OptimaError::ModelLoadingError(_) => { false }
            _ => { true }
        }
    }
    pub fn message(&self) -> &str {
        match self {
            OptimaError::GenericError(s) => { s }
            OptimaError::IdxOutOfBoundError(s) => { s }
            OptimaError::ConfigurationError(s) => { s }
            OptimaError::NotInitializedError(s) => { s }
            OptimaError::SolverTimeout(s) => { s }
            OptimaError::ConstraintDimensionMismatch(s) => { s }
            OptimaError::CostDimensionMismatch(s) => { s }
            OptimaError::ModelLoadingError(s) => { s }
        }
    }
}
impl fmt::Display for OptimaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
impl std::error::Error for OptimaError { }
