use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use crate::constraints::constrained_dynamical_system::ConstrainedDynamicalSystem;
use crate::costs::WeightConfigurationReport;
use crate::costs::control_energy_cost::ControlEnergyCost;
use crate::costs::state_tracking_energy_cost::StateTrackingEnergyCost;
use crate::locomotion::locomotion_state::LocomotionState;
use crate::planners::whole_body_messages::{JointStateFeed, JointStateMessage, TrajectoryObserver, WholeBodyTrajectoryMessage};
use crate::planners::whole_body_planner_config::WholeBodyPlannerConfig;
use crate::planning::PlanningOfMotionSequences;
use crate::rigid_body_model::RigidBodyModel;
use crate::solvers::SolverHandle;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_traits::LoadableFromFile;

/// Plans whole-body motions of a floating-base robot under contact-constrained dynamics.
///
/// Measured joint states come in through `joint_state_callback`; every new state triggers one
/// plan from that state to the configured desired state in `compute`.
pub struct ConstrainedWholeBodyPlanner {
    planning: PlanningOfMotionSequences,
    model: Arc<dyn RigidBodyModel>,
    config: WholeBodyPlannerConfig,
    weight_report: WeightConfigurationReport,
    current_state: LocomotionState,
    desired_state: LocomotionState,
    new_current_state: bool
}
impl ConstrainedWholeBodyPlanner {
    pub fn new(model: Arc<dyn RigidBodyModel>, solver: SolverHandle, config: WholeBodyPlannerConfig) -> Result<Self, OptimaError> {
        config.validate()?;
        let system = model.floating_base_system();
        let desired_state = config.desired_state(system)?;

        let mut planning = PlanningOfMotionSequences::new("constrained_whole_body_planner");
        planning.reset(solver);

        let mut dynamical_system = ConstrainedDynamicalSystem::new(model.clone());
        dynamical_system.set_active_end_effectors(config.active_contacts.clone());
        planning.add_constraint(Arc::new(dynamical_system));

        let (tracking_cost, mut weight_report) = StateTrackingEnergyCost::new_from_config(&config.cost.state_tracking_energy, system);
        let (control_cost, control_report) = ControlEnergyCost::new_from_config(&config.cost.control_energy, system);
        weight_report.merge(control_report);
        planning.add_cost(Arc::new(tracking_cost));
        planning.add_cost(Arc::new(control_cost));
        if !weight_report.is_complete() {
            optima_print(&format!("{} weight(s) of {:?} were not configured and default to zero.", weight_report.defaulted_channels().len(), system.robot_name()), PrintMode::Println, PrintColor::Yellow, true);
        }

        planning.set_horizon(config.horizon)?;
        planning.set_computation_time(config.computation_time_duration());

        let current_state = LocomotionState::new(system.joint_dof());
        Ok(Self {
            planning,
            model,
            config,
            weight_report,
            current_state,
            desired_state,
            new_current_state: false
        })
    }
    /// Same as `new`, with the config read from a json, ron or toml file.
    pub fn new_from_config_file(model: Arc<dyn RigidBodyModel>, solver: SolverHandle, config_path: &Path) -> Result<Self, OptimaError> {
        let config = WholeBodyPlannerConfig::load_from_file(config_path)?;
        Self::new(model, solver, config)
    }
    /// Replaces the current state with the measured one.
    ///
    /// Samples are matched by name against the actuated joints first, then against the active
    /// floating-base joints.  Unknown names are skipped.  Joints missing from the message keep
    /// their last measured values.  Accelerations are never measured and are set to zero, as is
    /// every base coordinate that no sample refers to.
    pub fn joint_state_callback(&mut self, message: &JointStateMessage) {
        let system = self.model.floating_base_system();
        let mut state = self.current_state.clone();
        state.time = message.time;
        state.set_base_zero();
        state.joint_acc.fill(0.0);

        for sample in &message.samples {
            if let Some(idx) = system.joint_idx(&sample.name) {
                state.joint_pos[idx] = sample.position;
                state.joint_vel[idx] = sample.velocity;
                state.joint_eff[idx] = sample.effort;
            } else if let Some(coord) = system.floating_base_coord_from_name(&sample.name) {
                state.base_pos[coord.idx()] = sample.position;
                state.base_vel[coord.idx()] = sample.velocity;
            }
        }

        self.current_state = state;
        self.new_current_state = true;
    }
    /// Plans from the last measured state, if one arrived since the previous call.
    pub fn compute(&mut self) -> Result<bool, OptimaError> {
        if !self.new_current_state { return Ok(false); }
        self.new_current_state = false;

        if !self.planning.init_plan(self.current_state.clone(), self.desired_state.clone()) {
            return Ok(false);
        }
        self.planning.compute_plan()
    }
    /// Sends the last plan to `observer`.  Returns false, without building anything, when the
    /// observer has no subscribers.
    pub fn publish_whole_body_trajectory(&self, observer: &mut dyn TrajectoryObserver) -> bool {
        if !observer.has_subscribers() { return false; }

        let trajectory = if self.config.interpolation_time > 0.0 {
            self.planning.interpolated_whole_body_trajectory(self.config.interpolation_time)
        } else {
            self.planning.whole_body_trajectory()
        };
        let message = WholeBodyTrajectoryMessage::new(&self.current_state, &trajectory, self.model.floating_base_system());
        observer.publish(message);
        true
    }
    /// Polls `feed` and plans once per `period` until a plan is found (true), `max_cycles` cycles
    /// went by (false) or a wiring error occurs.  The found plan is published to `observer`.
    pub fn run(&mut self, feed: &mut dyn JointStateFeed, observer: &mut dyn TrajectoryObserver, period: Duration, max_cycles: Option<usize>) -> Result<bool, OptimaError> {
        let mut cycles = 0;
        loop {
            let cycle_start = instant::Instant::now();

            if let Some(message) = feed.poll() {
                self.joint_state_callback(&message);
            }
            if self.compute()? {
                self.publish_whole_body_trajectory(observer);
                return Ok(true);
            }

            cycles += 1;
            if let Some(max_cycles) = max_cycles {
                if cycles >= max_cycles { return Ok(false); }
            }

            let elapsed = cycle_start.elapsed();
            if elapsed < period { std::thread::sleep(period - elapsed); }
        }
    }
    pub fn planning(&self) -> &PlanningOfMotionSequences {
        &self.planning
    }
    pub fn planning_mut(&mut self) -> &mut PlanningOfMotionSequences {
        &mut self.planning
    }
    pub fn model(&self) -> &Arc<dyn RigidBodyModel> {
        &self.model
    }
    pub fn config(&self) -> &WholeBodyPlannerConfig {
        &self.config
    }
    pub fn weight_report(&self) -> &WeightConfigurationReport {
        &self.weight_report
    }
    pub fn current_state(&self) -> &LocomotionState {
        &self.current_state
    }
    pub fn desired_state(&self) -> &LocomotionState {
        &self.desired_state
    }
    /// Changes the goal of the next plan.
    pub fn set_desired_state(&mut self, desired_state: LocomotionState) {
        self.planning.change_goal(desired_state.clone());
        self.desired_state = desired_state;
    }
}
