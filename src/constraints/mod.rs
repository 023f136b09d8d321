pub mod constrained_dynamical_system;

use nalgebra::DVector;
use crate::locomotion::locomotion_state::{LocomotionState, LocomotionVariables};
use crate::utils::utils_errors::OptimaError;

/// A vector-valued function of two consecutive knots that a solver must keep within `bounds`.
///
/// Constraints are registered by name on a `PlanningOfMotionSequences`; registering a second
/// constraint with the same name replaces the first.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;
    /// Length of the vector written by `compute`.
    fn dimension(&self) -> usize;
    /// Channel groups `compute` reads from either knot.  Solvers hold the other channels fixed when
    /// differentiating the constraint.
    fn locomotion_variables(&self) -> LocomotionVariables;
    /// Writes the constraint value for `state`, given the knot that precedes it (`last_state`).
    /// The vector may be resized by the implementation.
    fn compute(&self, constraint: &mut DVector<f64>, state: &LocomotionState, last_state: &LocomotionState) -> Result<(), OptimaError>;
    /// (lower, upper) bounds, each of length `dimension()`.
    fn bounds(&self) -> (DVector<f64>, DVector<f64>);

    fn is_equality(&self) -> bool {
        let (lower, upper) = self.bounds();
        lower == upper
    }
    /// `compute` followed by a check of the produced length against `dimension()`.
    fn compute_checked(&self, state: &LocomotionState, last_state: &LocomotionState) -> Result<DVector<f64>, OptimaError> {
        let mut out = DVector::zeros(self.dimension());
        self.compute(&mut out, state, last_state)?;
        if out.len() != self.dimension() {
            return Err(OptimaError::new_constraint_dimension_mismatch_error(self.name(), out.len(), self.dimension(), file!(), line!()));
        }
        Ok(out)
    }
    /// Checks that the bounds agree with `dimension()`.
    fn check_bounds(&self) -> Result<(), OptimaError> {
        let (lower, upper) = self.bounds();
        if lower.len() != self.dimension() {
            return Err(OptimaError::new_constraint_dimension_mismatch_error(self.name(), lower.len(), self.dimension(), file!(), line!()));
        }
        if upper.len() != self.dimension() {
            return Err(OptimaError::new_constraint_dimension_mismatch_error(self.name(), upper.len(), self.dimension(), file!(), line!()));
        }
        Ok(())
    }
}
