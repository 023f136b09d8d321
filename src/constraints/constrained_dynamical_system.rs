use std::sync::Arc;
use nalgebra::DVector;
use crate::constraints::Constraint;
use crate::locomotion::locomotion_state::{LocomotionState, LocomotionVariables};
use crate::rigid_body_model::{BodySelector, RigidBodyModel};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;

/// Time between two consecutive knots of the transcription.
pub const STEP_TIME: f64 = 0.1;

/// Width of the contact velocity block.
const CONTACT_VELOCITY_DIM: usize = 3;

/// Transcription of the contact-constrained floating-base dynamics between two consecutive knots.
///
/// The constraint vector has three blocks, all of which must be exactly zero:
/// - integration (length `system_dof`): `last_pos - pos + dt * vel`, a backward Euler step;
/// - inverse dynamics (length `joint_dof`): the joint forces the model needs to realize the motion
///   under the active contacts, minus the effort channel of the state.  Accelerations are backward
///   differences of the velocities;
/// - contact velocity (length 3): linear velocity of the active end-effector, which keeps the
///   contact stationary.
///
/// Only one 3-wide slot exists for the contact velocity.  With several active end-effectors, each
/// overwrites the slot and only the last one (in selector order) is constrained.
pub struct ConstrainedDynamicalSystem {
    name: String,
    model: Arc<dyn RigidBodyModel>,
    active_end_effectors: BodySelector,
    locomotion_variables: LocomotionVariables
}
impl ConstrainedDynamicalSystem {
    pub fn new(model: Arc<dyn RigidBodyModel>) -> Self {
        Self {
            name: "constrained".to_string(),
            model,
            active_end_effectors: vec![],
            locomotion_variables: LocomotionVariables {
                position: true,
                velocity: true,
                acceleration: false,
                effort: true
            }
        }
    }
    pub fn set_active_end_effectors(&mut self, active_set: BodySelector) {
        if active_set.len() > 1 {
            optima_print(&format!("{} active end-effectors were given to the constrained dynamical system, but only the velocity of the last one ({:?}) is constrained.", active_set.len(), active_set.last()), PrintMode::Println, PrintColor::Yellow, true);
        }
        for body in &active_set {
            if !self.model.floating_base_system().has_body(body) {
                optima_print(&format!("Active end-effector {:?} is not a body of the model {:?}.", body, self.model.floating_base_system().robot_name()), PrintMode::Println, PrintColor::Yellow, true);
            }
        }
        self.active_end_effectors = active_set;
    }
    pub fn active_end_effectors(&self) -> &BodySelector {
        &self.active_end_effectors
    }
    pub fn model(&self) -> &Arc<dyn RigidBodyModel> {
        &self.model
    }
    pub fn step_time(&self) -> f64 {
        STEP_TIME
    }
    fn system_dof(&self) -> usize {
        self.model.floating_base_system().system_dof()
    }
    fn joint_dof(&self) -> usize {
        self.model.floating_base_system().joint_dof()
    }
    fn check_state(&self, state: &LocomotionState) -> Result<(), OptimaError> {
        if !state.is_consistent() || state.num_joints() != self.joint_dof() {
            return Err(OptimaError::new_constraint_dimension_mismatch_error(&self.name, state.num_joints(), self.joint_dof(), file!(), line!()));
        }
        Ok(())
    }
}
impl Constraint for ConstrainedDynamicalSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.system_dof() + self.joint_dof() + CONTACT_VELOCITY_DIM
    }

    fn locomotion_variables(&self) -> LocomotionVariables {
        self.locomotion_variables.clone()
    }

    fn compute(&self, constraint: &mut DVector<f64>, state: &LocomotionState, last_state: &LocomotionState) -> Result<(), OptimaError> {
        self.check_state(state)?;
        self.check_state(last_state)?;

        let system = self.model.floating_base_system();
        let system_dof = self.system_dof();
        let joint_dof = self.joint_dof();
        *constraint = DVector::zeros(self.dimension());

        let dt = STEP_TIME;
        let base_int = last_state.base_pos - state.base_pos + dt * state.base_vel;
        let joint_int = &last_state.joint_pos - &state.joint_pos + dt * &state.joint_vel;
        let integration = system.to_generalized_joint_state(&base_int, &joint_int)?;
        constraint.rows_mut(0, system_dof).copy_from(&integration);

        let mut dynamic_state = state.clone();
        dynamic_state.base_acc = (state.base_vel - last_state.base_vel) / dt;
        dynamic_state.joint_acc = FiniteDifferenceUtils::backward_difference(&state.joint_vel, &last_state.joint_vel, dt);
        let estimated_joint_forces = self.model.constrained_inverse_dynamics(&dynamic_state, &self.active_end_effectors)?;
        if estimated_joint_forces.len() != joint_dof {
            return Err(OptimaError::new_constraint_dimension_mismatch_error(&self.name, estimated_joint_forces.len(), joint_dof, file!(), line!()));
        }
        constraint.rows_mut(system_dof, joint_dof).copy_from(&(estimated_joint_forces - &state.joint_eff));

        if !self.active_end_effectors.is_empty() {
            let end_effector_vels = self.model.forward_velocity_kinematics(state, &self.active_end_effectors)?;
            for end_effector in &self.active_end_effectors {
                let vel = match end_effector_vels.get(end_effector) {
                    Some(v) => { v }
                    None => {
                        return Err(OptimaError::new_generic_error_str(&format!("The model did not return a velocity for end-effector {:?}.", end_effector), file!(), line!()));
                    }
                };
                constraint.rows_mut(system_dof + joint_dof, CONTACT_VELOCITY_DIM).copy_from(vel);
            }
        }

        Ok(())
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        (DVector::zeros(self.dimension()), DVector::zeros(self.dimension()))
    }
}
