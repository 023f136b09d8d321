use std::collections::BTreeMap;
use nalgebra::DVector;
use crate::costs::{check_cost_inputs, joint_weights_from_config, Cost, WeightConfigurationReport};
use crate::locomotion::locomotion_state::LocomotionState;
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;
use crate::utils::utils_errors::OptimaError;

/// Weighted squared joint efforts.  Only the `joint_eff` weights are used.
#[derive(Clone, Debug)]
pub struct ControlEnergyCost {
    name: String,
    weights: LocomotionState
}
impl ControlEnergyCost {
    pub fn new(num_joints: usize) -> Self {
        Self {
            name: "control_energy".to_string(),
            weights: LocomotionState::new(num_joints)
        }
    }
    /// `config` maps joint names to effort weights.
    pub fn new_from_config(config: &BTreeMap<String, f64>, system: &FloatingBaseSystem) -> (Self, WeightConfigurationReport) {
        let mut report = WeightConfigurationReport::new();
        let mut weights = LocomotionState::new(system.joint_dof());
        weights.joint_eff = DVector::from_vec(joint_weights_from_config("cost.control_energy", config, system, &mut report));

        let mut out_self = Self::new(system.joint_dof());
        out_self.set_weights(weights);
        (out_self, report)
    }
}
impl Cost for ControlEnergyCost {
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
        Ok(state.joint_eff.component_mul(&state.joint_eff).dot(&self.weights.joint_eff))
    }

    fn gradient(&self, state: &LocomotionState, desired_state: &LocomotionState) -> Result<LocomotionState, OptimaError> {
        check_cost_inputs(&self.name, &self.weights, state, desired_state)?;
        let mut out = LocomotionState::new(state.num_joints());
        out.time = state.time;
        out.joint_eff = 2.0 * state.joint_eff.component_mul(&self.weights.joint_eff);
        Ok(out)
    }
}
