use nalgebra::{DVector, Vector6};
use serde::{Serialize, Deserialize};
use crate::costs::{base_weights_from_config, check_cost_inputs, joint_weights_from_config, ChannelWeights, Cost, WeightConfigurationReport};
use crate::locomotion::locomotion_state::LocomotionState;
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;
use crate::utils::utils_errors::OptimaError;

/// Configured weights of the tracking cost, grouped like the state channels they apply to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTrackingEnergyWeights {
    #[serde(default)]
    pub position: ChannelWeights,
    #[serde(default)]
    pub velocity: ChannelWeights,
    #[serde(default)]
    pub acceleration: ChannelWeights
}

/// Weighted squared distance to a desired state over base and joint positions, velocities and
/// accelerations.  Effort channels do not contribute.
#[derive(Clone, Debug)]
pub struct StateTrackingEnergyCost {
    name: String,
    weights: LocomotionState
}
impl StateTrackingEnergyCost {
    pub fn new(num_joints: usize) -> Self {
        Self {
            name: "state_tracking_energy".to_string(),
            weights: LocomotionState::new(num_joints)
        }
    }
    /// Builds the cost from configured weights.  Channels with no configured weight are set to zero
    /// and listed in the returned report.
    pub fn new_from_config(config: &StateTrackingEnergyWeights, system: &FloatingBaseSystem) -> (Self, WeightConfigurationReport) {
        let mut report = WeightConfigurationReport::new();
        let prefix = "cost.state_tracking_energy";

        let mut weights = LocomotionState::new(system.joint_dof());
        weights.base_pos = Vector6::from(base_weights_from_config(&format!("{}.position.base", prefix), &config.position.base, system, &mut report));
        weights.base_vel = Vector6::from(base_weights_from_config(&format!("{}.velocity.base", prefix), &config.velocity.base, system, &mut report));
        weights.base_acc = Vector6::from(base_weights_from_config(&format!("{}.acceleration.base", prefix), &config.acceleration.base, system, &mut report));
        weights.joint_pos = DVector::from_vec(joint_weights_from_config(&format!("{}.position.joints", prefix), &config.position.joints, system, &mut report));
        weights.joint_vel = DVector::from_vec(joint_weights_from_config(&format!("{}.velocity.joints", prefix), &config.velocity.joints, system, &mut report));
        weights.joint_acc = DVector::from_vec(joint_weights_from_config(&format!("{}.acceleration.joints", prefix), &config.acceleration.joints, system, &mut report));

        let mut out_self = Self::new(system.joint_dof());
        out_self.set_weights(weights);
        (out_self, report)
    }
}
impl Cost for StateTrackingEnergyCost {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_weights(&mut self, weights: LocomotionState) {
        self.weights = weights;
    }

    fn weights(&self) -> &LocomotionState {
        &self.weights
    }

    fn compute(&self, state: &LocomotionState, desired_state: &LocomotionState) -> Result<f64, OptimaError> {
        check_cost_inputs(&self.name, &self.weights, state, desired_state)?;
        let w = &self.weights;

        let mut cost = 0.0;
        cost += (state.base_pos - desired_state.base_pos).component_mul(&(state.base_pos - desired_state.base_pos)).dot(&w.base_pos);
        cost += (state.base_vel - desired_state.base_vel).component_mul(&(state.base_vel - desired_state.base_vel)).dot(&w.base_vel);
        cost += (state.base_acc - desired_state.base_acc).component_mul(&(state.base_acc - desired_state.base_acc)).dot(&w.base_acc);

        let joint_pos_error = &state.joint_pos - &desired_state.joint_pos;
        let joint_vel_error = &state.joint_vel - &desired_state.joint_vel;
        let joint_acc_error = &state.joint_acc - &desired_state.joint_acc;
        cost += joint_pos_error.component_mul(&joint_pos_error).dot(&w.joint_pos);
        cost += joint_vel_error.component_mul(&joint_vel_error).dot(&w.joint_vel);
        cost += joint_acc_error.component_mul(&joint_acc_error).dot(&w.joint_acc);

        Ok(cost)
    }

    fn gradient(&self, state: &LocomotionState, desired_state: &LocomotionState) -> Result<LocomotionState, OptimaError> {
        check_cost_inputs(&self.name, &self.weights, state, desired_state)?;
        let w = &self.weights;

        let mut out = LocomotionState::new(state.num_joints());
        out.time = state.time;
        out.base_pos = 2.0 * (state.base_pos - desired_state.base_pos).component_mul(&w.base_pos);
        out.base_vel = 2.0 * (state.base_vel - desired_state.base_vel).component_mul(&w.base_vel);
        out.base_acc = 2.0 * (state.base_acc - desired_state.base_acc).component_mul(&w.base_acc);
        out.joint_pos = 2.0 * (&state.joint_pos - &desired_state.joint_pos).component_mul(&w.joint_pos);
        out.joint_vel = 2.0 * (&state.joint_vel - &desired_state.joint_vel).component_mul(&w.joint_vel);
        out.joint_acc = 2.0 * (&state.joint_acc - &desired_state.joint_acc).component_mul(&w.joint_acc);

        Ok(out)
    }
}
