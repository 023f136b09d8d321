//! Scalar objective terms of a planning problem.  Costs are registered by name on a
//! `PlanningOfMotionSequences` and summed over every knot of a candidate trajectory.

pub mod control_energy_cost;
pub mod state_tracking_energy_cost;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::locomotion::locomotion_state::{Coords6d, LocomotionState};
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

pub trait Cost: Send + Sync {
    fn name(&self) -> &str;
    /// Weights are laid out like a state: one entry per channel.
    fn set_weights(&mut self, weights: LocomotionState);
    fn weights(&self) -> &LocomotionState;
    fn compute(&self, state: &LocomotionState, desired_state: &LocomotionState) -> Result<f64, OptimaError>;
    /// Derivative of `compute` with respect to every channel of `state`.
    fn gradient(&self, state: &LocomotionState, desired_state: &LocomotionState) -> Result<LocomotionState, OptimaError>;
}

pub(crate) fn check_cost_inputs(cost_name: &str, weights: &LocomotionState, state: &LocomotionState, desired_state: &LocomotionState) -> Result<(), OptimaError> {
    let n = weights.num_joints();
    for s in [state, desired_state] {
        if s.check_num_joints(n, file!(), line!()).is_err() {
            return Err(OptimaError::new_cost_dimension_mismatch_error(cost_name, n, s.num_joints(), file!(), line!()));
        }
    }
    Ok(())
}

/// Weights of one group of channels, keyed by base coordinate name (`LX` ... `AZ`) and by joint name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelWeights {
    #[serde(default)]
    pub base: BTreeMap<String, f64>,
    #[serde(default)]
    pub joints: BTreeMap<String, f64>
}

/// Lists every channel whose weight was not configured and therefore defaulted to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightConfigurationReport {
    defaulted_channels: Vec<String>
}
impl WeightConfigurationReport {
    pub fn new() -> Self {
        Self { defaulted_channels: vec![] }
    }
    pub fn record_defaulted_channel(&mut self, channel: &str) {
        optima_print(&format!("No weight configured for {}.  It will be set to zero.", channel), PrintMode::Println, PrintColor::Yellow, false);
        self.defaulted_channels.push(channel.to_string());
    }
    pub fn defaulted_channels(&self) -> &Vec<String> {
        &self.defaulted_channels
    }
    pub fn is_complete(&self) -> bool {
        self.defaulted_channels.is_empty()
    }
    pub fn merge(&mut self, other: WeightConfigurationReport) {
        self.defaulted_channels.extend(other.defaulted_channels);
    }
}

/// Reads the weight of every joint of `system` from `configured`, defaulting missing ones to zero.
pub(crate) fn joint_weights_from_config(prefix: &str, configured: &BTreeMap<String, f64>, system: &FloatingBaseSystem, report: &mut WeightConfigurationReport) -> Vec<f64> {
    for name in configured.keys() {
        if system.joint_idx(name).is_none() {
            optima_print(&format!("Weight {}.{} does not name a joint of {:?} and is ignored.", prefix, name, system.robot_name()), PrintMode::Println, PrintColor::Yellow, false);
        }
    }

    system.ordered_joint_names().iter().map(|name| {
        match configured.get(name) {
            Some(w) => { *w }
            None => {
                report.record_defaulted_channel(&format!("{}.{}", prefix, name));
                0.0
            }
        }
    }).collect()
}

/// Reads the weight of every active floating-base coordinate of `system`.  Inactive coordinates
/// always get a zero weight.
pub(crate) fn base_weights_from_config(prefix: &str, configured: &BTreeMap<String, f64>, system: &FloatingBaseSystem, report: &mut WeightConfigurationReport) -> [f64; 6] {
    let mut out = [0.0; 6];
    for joint in system.floating_base_joints() {
        if !joint.active { continue; }
        let coord_name = match Coords6d::from_idx(joint.id) {
            Ok(c) => { c.name() }
            Err(_) => { continue; }
        };
        match configured.get(coord_name) {
            Some(w) => { out[joint.id] = *w; }
            None => { report.record_defaulted_channel(&format!("{}.{}", prefix, coord_name)); }
        }
    }
    out
}
