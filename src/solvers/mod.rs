pub mod open_solver;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::constraints::Constraint;
use crate::costs::Cost;
use crate::locomotion::contact::Contact;
use crate::locomotion::locomotion_state::{LocomotionState, LocomotionVariables};
use crate::locomotion::locomotion_trajectory::LocomotionTrajectory;
use crate::utils::utils_errors::OptimaError;

/// A nonlinear-program backend that plans whole-body trajectories.
///
/// `init` is called with the current constraint and cost registries before every solve.  `compute`
/// must report a timeout or an infeasible problem as `Ok(false)`; `Err` is reserved for wiring
/// errors such as a constraint whose residual disagrees with its declared dimension.
pub trait Solver: Send {
    fn name(&self) -> &str;
    fn init(&mut self, problem: &PlanningProblem) -> Result<(), OptimaError>;
    fn compute(&mut self, start: &LocomotionState, goal: &LocomotionState, computation_time: Option<Duration>) -> Result<bool, OptimaError>;
    /// Knots of the last successful solve.
    fn whole_body_trajectory(&self) -> &LocomotionTrajectory;
    /// Last solve resampled every `dt`.  A non-positive `dt` returns the raw knots.
    fn interpolated_whole_body_trajectory(&self, dt: f64) -> LocomotionTrajectory {
        self.whole_body_trajectory().interpolate(dt)
    }
    /// Footholds of the last successful solve, one list per knot.  Solvers that do not plan
    /// contacts return an empty sequence.
    fn contacts_sequence(&self) -> Vec<Vec<Contact>> {
        vec![]
    }
}

/// A solver shared between the planner that drives it and whoever constructed it.
pub type SolverHandle = Arc<Mutex<dyn Solver>>;

/// What a solver is asked to optimize: `horizon` knots subject to every constraint, scored by the
/// sum of every cost against the goal.
#[derive(Clone)]
pub struct PlanningProblem {
    pub horizon: usize,
    pub constraints: Vec<Arc<dyn Constraint>>,
    pub costs: Vec<Arc<dyn Cost>>
}
impl PlanningProblem {
    pub fn new(horizon: usize) -> Self {
        Self { horizon, constraints: vec![], costs: vec![] }
    }
    /// Sum of every cost over `knots` against `goal`.
    pub fn evaluate_objective(&self, knots: &[LocomotionState], goal: &LocomotionState) -> Result<f64, OptimaError> {
        let mut out = 0.0;
        for knot in knots {
            for cost in &self.costs {
                out += cost.compute(knot, goal)?;
            }
        }
        Ok(out)
    }
    /// Summed length of every constraint residual for one knot.
    pub fn constraint_dimension(&self) -> usize {
        self.constraints.iter().map(|c| c.dimension()).sum()
    }
    /// Every channel group that at least one constraint depends on.
    pub fn constraint_variables(&self) -> LocomotionVariables {
        self.constraints.iter().fold(LocomotionVariables::default(), |acc, c| acc.union(&c.locomotion_variables()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerParameters {
    /// Used when `Solver::compute` is not given a computation time.  `None` is unbounded.
    pub max_time: Option<Duration>,
    pub max_iterations: usize,
    pub max_outer_iterations: usize,
    pub open_tolerance: f64,
    pub feasibility_tolerance: f64,
    pub finite_difference_step: f64,
    pub lbfgs_memory: usize
}
impl Default for OptimizerParameters {
    fn default() -> Self {
        Self {
            max_time: None,
            max_iterations: 500,
            max_outer_iterations: 20,
            open_tolerance: 1e-5,
            feasibility_tolerance: 1e-4,
            finite_difference_step: 1e-7,
            lbfgs_memory: 3
        }
    }
}
