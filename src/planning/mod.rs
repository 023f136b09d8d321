use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use nalgebra::Vector3;
use serde::{Serialize, Deserialize};
use crate::constraints::Constraint;
use crate::costs::Cost;
use crate::locomotion::contact::{BodyPose, Contact};
use crate::locomotion::locomotion_state::LocomotionState;
use crate::locomotion::locomotion_trajectory::LocomotionTrajectory;
use crate::solvers::{PlanningProblem, SolverHandle};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

/// Where a `PlanningOfMotionSequences` is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanningStatus {
    /// No solver has been bound yet.
    Unbound,
    SolverBound,
    /// Start and goal are known; `compute_plan` may run.
    Ready,
    /// The last `compute_plan` produced a plan.
    Solved
}

/// Everything that `init_plan`, `compute_plan` and `change_goal` touch.  Guarded by a single lock.
struct PlanningSession {
    solver: Option<SolverHandle>,
    status: PlanningStatus,
    initial_state: Option<LocomotionState>,
    goal_state: Option<LocomotionState>,
    motion_plan: LocomotionTrajectory,
    contacts_sequence: Vec<Vec<Contact>>,
    pose_trajectory: Vec<BodyPose>
}

/// Plans whole-body motion sequences with a bound solver, a set of named constraints and a set of
/// named costs.
///
/// `init_plan`, `compute_plan` and `change_goal` take `&self` and are serialized by one lock, so a
/// planner behind an `Arc` can be driven by one thread while another updates the goal.  Registering
/// constraints and costs needs `&mut self` and is expected to happen before planning starts.
pub struct PlanningOfMotionSequences {
    name: String,
    constraints: BTreeMap<String, Arc<dyn Constraint>>,
    costs: BTreeMap<String, Arc<dyn Cost>>,
    horizon: usize,
    computation_time: Option<Duration>,
    session: Mutex<PlanningSession>
}
impl PlanningOfMotionSequences {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            constraints: BTreeMap::new(),
            costs: BTreeMap::new(),
            horizon: 1,
            computation_time: None,
            session: Mutex::new(PlanningSession {
                solver: None,
                status: PlanningStatus::Unbound,
                initial_state: None,
                goal_state: None,
                motion_plan: LocomotionTrajectory::new(),
                contacts_sequence: vec![],
                pose_trajectory: vec![]
            })
        }
    }
    fn lock_session(&self) -> MutexGuard<'_, PlanningSession> {
        // A panic inside a solver must not make the planner unusable.
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Binds `solver` and clears the start and goal.  Registries and previous results are kept.
    pub fn reset(&self, solver: SolverHandle) {
        let mut session = self.lock_session();
        session.solver = Some(solver);
        session.status = PlanningStatus::SolverBound;
        session.initial_state = None;
        session.goal_state = None;
    }
    /// Registers `constraint` under its name, replacing any constraint with the same name.
    pub fn add_constraint(&mut self, constraint: Arc<dyn Constraint>) {
        let name = constraint.name().to_string();
        if self.constraints.insert(name.clone(), constraint).is_some() {
            optima_print(&format!("Constraint {:?} was replaced.", name), PrintMode::Println, PrintColor::Blue, false);
        }
    }
    pub fn remove_constraint(&mut self, name: &str) {
        self.constraints.remove(name);
    }
    /// Registers `cost` under its name, replacing any cost with the same name.
    pub fn add_cost(&mut self, cost: Arc<dyn Cost>) {
        let name = cost.name().to_string();
        if self.costs.insert(name.clone(), cost).is_some() {
            optima_print(&format!("Cost {:?} was replaced.", name), PrintMode::Println, PrintColor::Blue, false);
        }
    }
    pub fn remove_cost(&mut self, name: &str) {
        self.costs.remove(name);
    }
    pub fn constraint(&self, name: &str) -> Option<&Arc<dyn Constraint>> {
        self.constraints.get(name)
    }
    pub fn cost(&self, name: &str) -> Option<&Arc<dyn Cost>> {
        self.costs.get(name)
    }
    pub fn constraint_names(&self) -> Vec<String> {
        self.constraints.keys().cloned().collect()
    }
    pub fn cost_names(&self) -> Vec<String> {
        self.costs.keys().cloned().collect()
    }
    pub fn set_horizon(&mut self, horizon: usize) -> Result<(), OptimaError> {
        if horizon < 1 {
            return Err(OptimaError::new_configuration_error(&format!("The horizon must be at least 1 (got {}).", horizon), file!(), line!()));
        }
        self.horizon = horizon;
        Ok(())
    }
    pub fn horizon(&self) -> usize {
        self.horizon
    }
    /// `None` lets the solver run unbounded.
    pub fn set_computation_time(&mut self, computation_time: Option<Duration>) {
        self.computation_time = computation_time;
    }
    pub fn computation_time(&self) -> Option<Duration> {
        self.computation_time
    }
    pub fn status(&self) -> PlanningStatus {
        self.lock_session().status
    }
    fn planning_problem(&self) -> PlanningProblem {
        PlanningProblem {
            horizon: self.horizon,
            constraints: self.constraints.values().cloned().collect(),
            costs: self.costs.values().cloned().collect()
        }
    }
    /// Captures the start and goal of the next plan.  Returns false if no solver is bound.
    pub fn init_plan(&self, start_state: LocomotionState, goal_state: LocomotionState) -> bool {
        let mut session = self.lock_session();
        if session.solver.is_none() {
            let e = OptimaError::new_configuration_error(&format!("Planner {:?} has no solver; call reset before init_plan.", self.name), file!(), line!());
            optima_print(e.message(), PrintMode::Println, PrintColor::Red, true);
            return false;
        }
        session.initial_state = Some(start_state);
        session.goal_state = Some(goal_state);
        session.status = PlanningStatus::Ready;
        true
    }
    /// Runs the bound solver from the captured start to the current goal.
    ///
    /// `Ok(false)` covers every condition a caller may retry: planning not initialized, solver
    /// timeout, infeasible problem.  Previous results are kept in that case.  `Err` is returned
    /// only for wiring errors (a constraint that disagrees with the model layout, a model that could
    /// not be loaded).
    pub fn compute_plan(&self) -> Result<bool, OptimaError> {
        let mut session = self.lock_session();

        let (solver, start, goal) = match (&session.status, &session.solver, &session.initial_state, &session.goal_state) {
            (PlanningStatus::Ready | PlanningStatus::Solved, Some(solver), Some(start), Some(goal)) => {
                (solver.clone(), start.clone(), goal.clone())
            }
            _ => {
                let e = OptimaError::new_not_initialized_error("compute_plan", file!(), line!());
                optima_print(e.message(), PrintMode::Println, PrintColor::Yellow, false);
                return Ok(false);
            }
        };

        let mut solver = solver.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = match solver.init(&self.planning_problem()) {
            Ok(()) => { solver.compute(&start, &goal, self.computation_time) }
            Err(e) => { Err(e) }
        };

        return match outcome {
            Ok(true) => {
                let motion_plan = solver.whole_body_trajectory().clone();
                session.pose_trajectory = base_pose_trajectory(&motion_plan);
                session.motion_plan = motion_plan;
                session.contacts_sequence = solver.contacts_sequence();
                session.status = PlanningStatus::Solved;
                Ok(true)
            }
            Ok(false) => {
                optima_print(&format!("Planner {:?} could not find a plan.", self.name), PrintMode::Println, PrintColor::Yellow, false);
                session.status = PlanningStatus::Ready;
                Ok(false)
            }
            Err(e) => {
                if !e.is_recoverable() {
                    optima_print(e.message(), PrintMode::Println, PrintColor::Red, true);
                    return Err(e);
                }
                optima_print(e.message(), PrintMode::Println, PrintColor::Yellow, false);
                session.status = PlanningStatus::Ready;
                Ok(false)
            }
        }
    }
    /// Replaces the goal used by the next `compute_plan`.
    pub fn change_goal(&self, goal_state: LocomotionState) {
        let mut session = self.lock_session();
        session.goal_state = Some(goal_state);
    }
    pub fn goal_state(&self) -> Option<LocomotionState> {
        self.lock_session().goal_state.clone()
    }
    pub fn whole_body_trajectory(&self) -> LocomotionTrajectory {
        self.lock_session().motion_plan.clone()
    }
    pub fn interpolated_whole_body_trajectory(&self, dt: f64) -> LocomotionTrajectory {
        self.lock_session().motion_plan.interpolate(dt)
    }
    pub fn contacts_sequence(&self) -> Vec<Vec<Contact>> {
        self.lock_session().contacts_sequence.clone()
    }
    /// Base pose of every knot of the last plan.
    pub fn pose_trajectory(&self) -> Vec<BodyPose> {
        self.lock_session().pose_trajectory.clone()
    }
    /// Sum of every registered cost over `trajectory`, against the current goal.
    pub fn evaluate_objective(&self, trajectory: &LocomotionTrajectory) -> Result<f64, OptimaError> {
        let goal = match self.goal_state() {
            Some(g) => { g }
            None => { return Err(OptimaError::new_not_initialized_error("evaluate_objective", file!(), line!())); }
        };
        self.planning_problem().evaluate_objective(trajectory.knots(), &goal)
    }
}

fn base_pose_trajectory(trajectory: &LocomotionTrajectory) -> Vec<BodyPose> {
    trajectory.iter().map(|knot| {
        BodyPose::new(
            Vector3::new(knot.base_pos[0], knot.base_pos[1], knot.base_pos[2]),
            Vector3::new(knot.base_pos[3], knot.base_pos[4], knot.base_pos[5])
        )
    }).collect()
}
