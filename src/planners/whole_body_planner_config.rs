use std::collections::BTreeMap;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::costs::state_tracking_energy_cost::StateTrackingEnergyWeights;
use crate::locomotion::locomotion_state::{Coords6d, LocomotionState};
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;
use crate::utils::utils_errors::OptimaError;

/// Settings of a `ConstrainedWholeBodyPlanner`.  Every field may be omitted from a config file.
///
/// ## Example
/// ```
/// use optima_locomotion::planners::whole_body_planner_config::WholeBodyPlannerConfig;
/// use optima_locomotion::utils::utils_traits::ToAndFromJsonString;
/// let config = WholeBodyPlannerConfig::load_from_json_string(r#"{"horizon": 3, "desired_state": {"position": {"LZ": 0.6}}}"#).unwrap();
/// assert_eq!(config.horizon, 3);
/// assert_eq!(config.interpolation_time, -1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WholeBodyPlannerConfig {
    /// Resampling step of published trajectories.  Non-positive values publish the raw knots.
    #[serde(default = "default_interpolation_time")]
    pub interpolation_time: f64,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Seconds.  `None` is unbounded.
    #[serde(default)]
    pub computation_time: Option<f64>,
    /// End-effectors held by the environment while planning.
    #[serde(default = "default_active_contacts")]
    pub active_contacts: Vec<String>,
    #[serde(default)]
    pub desired_state: DesiredBaseStateConfig,
    #[serde(default)]
    pub cost: CostWeightsConfig
}
impl WholeBodyPlannerConfig {
    pub fn validate(&self) -> Result<(), OptimaError> {
        if self.horizon < 1 {
            return Err(OptimaError::new_configuration_error(&format!("horizon must be at least 1 (got {}).", self.horizon), file!(), line!()));
        }
        if let Some(t) = self.computation_time {
            if !t.is_finite() || t < 0.0 {
                return Err(OptimaError::new_configuration_error(&format!("computation_time must be a non-negative number of seconds (got {}).", t), file!(), line!()));
            }
        }
        self.desired_state.check_coord_names()?;
        Ok(())
    }
    /// Budgets too large for a `Duration` (e.g. `f64::MAX`) are unbounded.
    pub fn computation_time_duration(&self) -> Option<Duration> {
        self.computation_time.and_then(|t| Duration::try_from_secs_f64(t).ok())
    }
    /// The goal of the planner: configured base coordinates, every other channel zero.
    pub fn desired_state(&self, system: &FloatingBaseSystem) -> Result<LocomotionState, OptimaError> {
        self.desired_state.check_coord_names()?;
        let mut out = LocomotionState::new(system.joint_dof());
        for (name, value) in &self.desired_state.position { out.base_pos[coord_from_name(name)?.idx()] = *value; }
        for (name, value) in &self.desired_state.velocity { out.base_vel[coord_from_name(name)?.idx()] = *value; }
        for (name, value) in &self.desired_state.acceleration { out.base_acc[coord_from_name(name)?.idx()] = *value; }
        Ok(out)
    }
}
impl Default for WholeBodyPlannerConfig {
    fn default() -> Self {
        Self {
            interpolation_time: default_interpolation_time(),
            horizon: default_horizon(),
            computation_time: None,
            active_contacts: default_active_contacts(),
            desired_state: DesiredBaseStateConfig::default(),
            cost: CostWeightsConfig::default()
        }
    }
}

fn default_interpolation_time() -> f64 { -1.0 }
fn default_horizon() -> usize { 1 }
fn default_active_contacts() -> Vec<String> { vec!["foot".to_string()] }

fn coord_from_name(name: &str) -> Result<Coords6d, OptimaError> {
    for c in Coords6d::all() {
        if c.name() == name { return Ok(c); }
    }
    Err(OptimaError::new_configuration_error(&format!("{:?} is not a base coordinate (expected one of LX, LY, LZ, AX, AY, AZ).", name), file!(), line!()))
}

/// Desired base position, velocity and acceleration keyed by coordinate name (`LX` ... `AZ`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredBaseStateConfig {
    #[serde(default)]
    pub position: BTreeMap<String, f64>,
    #[serde(default)]
    pub velocity: BTreeMap<String, f64>,
    #[serde(default)]
    pub acceleration: BTreeMap<String, f64>
}
impl DesiredBaseStateConfig {
    fn check_coord_names(&self) -> Result<(), OptimaError> {
        for name in self.position.keys().chain(self.velocity.keys()).chain(self.acceleration.keys()) {
            coord_from_name(name)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostWeightsConfig {
    #[serde(default)]
    pub state_tracking_energy: StateTrackingEnergyWeights,
    /// Effort weight per joint name.
    #[serde(default)]
    pub control_energy: BTreeMap<String, f64>
}
