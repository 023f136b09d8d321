use std::sync::Mutex;
use std::time::Duration;
use nalgebra::DVector;
use optimization_engine::{constraints, Optimizer, Problem, SolverError};
use optimization_engine::alm::{AlmCache, AlmFactory, AlmOptimizer, AlmProblem, NO_JACOBIAN_MAPPING, NO_MAPPING, NO_SET};
use optimization_engine::core::ExitStatus;
use optimization_engine::panoc::{PANOCCache, PANOCOptimizer};
use crate::constraints::constrained_dynamical_system::STEP_TIME;
use crate::locomotion::locomotion_state::LocomotionState;
use crate::locomotion::locomotion_trajectory::LocomotionTrajectory;
use crate::solvers::{OptimizerParameters, PlanningProblem, Solver};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;

/// Direct transcription of the planning problem into an `optimization_engine` program.
///
/// The decision vector stacks `horizon` vectorized knots.  Without constraints the program is
/// solved with PANOC; otherwise every constraint residual is stacked into the ALM mapping `F2`,
/// which the optimizer drives to zero.
pub struct OpEnWholeBodySolver {
    name: String,
    parameters: OptimizerParameters,
    problem: Option<PlanningProblem>,
    trajectory: LocomotionTrajectory,
    last_report: Option<OpEnSolveReport>
}
impl OpEnWholeBodySolver {
    pub fn new(parameters: OptimizerParameters) -> Self {
        Self {
            name: "open_whole_body".to_string(),
            parameters,
            problem: None,
            trajectory: LocomotionTrajectory::new(),
            last_report: None
        }
    }
    pub fn parameters(&self) -> &OptimizerParameters {
        &self.parameters
    }
    pub fn set_parameters(&mut self, parameters: OptimizerParameters) {
        self.parameters = parameters;
    }
    /// Outcome of the last call to `compute` that reached the optimizer (or accepted the warm start).
    pub fn last_report(&self) -> Option<&OpEnSolveReport> {
        self.last_report.as_ref()
    }
    fn solve_panoc(&self, transcription: &Transcription, u: &mut [f64], max_duration: Option<Duration>) -> Result<OpEnSolveReport, SolverError> {
        let mut panoc_cache = PANOCCache::new(u.len(), self.parameters.open_tolerance, self.parameters.lbfgs_memory);

        let df = |u: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
            transcription.objective_gradient(u, grad).map_err(|e| transcription.record_error(e))
        };
        let f = |u: &[f64], cost: &mut f64| -> Result<(), SolverError> {
            *cost = transcription.objective(u).map_err(|e| transcription.record_error(e))?;
            Ok(())
        };

        let (lower_bounds, upper_bounds) = unbounded(u.len());
        let bounds = constraints::Rectangle::new(Some(&lower_bounds), Some(&upper_bounds));
        let problem = Problem::new(&bounds, df, f);

        let mut panoc = PANOCOptimizer::new(problem, &mut panoc_cache).with_max_iter(self.parameters.max_iterations);
        if let Some(d) = max_duration { panoc = panoc.with_max_duration(d); }

        let status = panoc.solve(u)?;

        Ok(OpEnSolveReport {
            exit_status: status.exit_status(),
            num_outer_iterations: 0,
            num_inner_iterations: status.iterations(),
            solve_time: status.solve_time(),
            cost: status.cost_value(),
            constraint_violation: 0.0
        })
    }
    fn solve_alm(&self, transcription: &Transcription, u: &mut [f64], max_duration: Option<Duration>) -> Result<OpEnSolveReport, SolverError> {
        let n2 = transcription.penalty_dimension();
        let panoc_cache = PANOCCache::new(u.len(), self.parameters.open_tolerance, self.parameters.lbfgs_memory);
        let mut alm_cache = AlmCache::new(panoc_cache, 0, n2);
        let step = self.parameters.finite_difference_step;

        let df = |u: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
            transcription.objective_gradient(u, grad).map_err(|e| transcription.record_error(e))
        };
        let f = |u: &[f64], cost: &mut f64| -> Result<(), SolverError> {
            *cost = transcription.objective(u).map_err(|e| transcription.record_error(e))?;
            Ok(())
        };
        let f2 = |u: &[f64], f2u: &mut [f64]| -> Result<(), SolverError> {
            let penalty = transcription.penalty(u).map_err(|e| transcription.record_error(e))?;
            f2u.copy_from_slice(penalty.as_slice());
            Ok(())
        };
        let f2_jacobian_product = |u: &[f64], d: &[f64], res: &mut [f64]| -> Result<(), SolverError> {
            let product = FiniteDifferenceUtils::jacobian_transpose_product(|x: &[f64]| transcription.penalty_or_zeros(x), u, d, &transcription.penalty_columns, step);
            if transcription.has_error() { return Err(SolverError::Cost); }
            res.copy_from_slice(&product);
            Ok(())
        };

        let (lower_bounds, upper_bounds) = unbounded(u.len());
        let bounds = constraints::Rectangle::new(Some(&lower_bounds), Some(&upper_bounds));

        let factory = AlmFactory::new(
            f,
            df,
            NO_MAPPING,
            NO_JACOBIAN_MAPPING,
            Some(f2),
            Some(f2_jacobian_product),
            NO_SET,
            n2
        );

        let alm_problem = AlmProblem::new(
            bounds,
            NO_SET,
            NO_SET,
            |u: &[f64], xi: &[f64], cost: &mut f64| -> Result<(), SolverError> {
                factory.psi(u, xi, cost)
            },
            |u: &[f64], xi: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
                factory.d_psi(u, xi, grad)
            },
            NO_MAPPING,
            Some(f2),
            0,
            n2
        );

        let mut alm_optimizer = AlmOptimizer::new(&mut alm_cache, alm_problem)
            .with_max_inner_iterations(self.parameters.max_iterations)
            .with_max_outer_iterations(self.parameters.max_outer_iterations)
            .with_epsilon_tolerance(self.parameters.open_tolerance)
            .with_delta_tolerance(self.parameters.feasibility_tolerance);
        if let Some(d) = max_duration { alm_optimizer = alm_optimizer.with_max_duration(d); }

        let r = alm_optimizer.solve(u)?;

        Ok(OpEnSolveReport {
            exit_status: r.exit_status(),
            num_outer_iterations: r.num_outer_iterations(),
            num_inner_iterations: r.num_inner_iterations(),
            solve_time: r.solve_time(),
            cost: r.cost(),
            constraint_violation: 0.0
        })
    }
}
impl Default for OpEnWholeBodySolver {
    fn default() -> Self {
        Self::new(OptimizerParameters::default())
    }
}
impl Solver for OpEnWholeBodySolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, problem: &PlanningProblem) -> Result<(), OptimaError> {
        if problem.horizon < 1 {
            return Err(OptimaError::new_configuration_error(&format!("The horizon must be at least 1 (got {}).", problem.horizon), file!(), line!()));
        }
        for constraint in &problem.constraints {
            constraint.check_bounds()?;
        }
        self.problem = Some(problem.clone());
        Ok(())
    }

    fn compute(&mut self, start: &LocomotionState, goal: &LocomotionState, computation_time: Option<Duration>) -> Result<bool, OptimaError> {
        let problem = match &self.problem {
            Some(p) => { p }
            None => { return Err(OptimaError::new_not_initialized_error("OpEnWholeBodySolver::compute", file!(), line!())); }
        };
        let num_joints = start.num_joints();
        start.check_num_joints(num_joints, file!(), line!())?;
        goal.check_num_joints(num_joints, file!(), line!())?;

        let transcription = Transcription::new(problem, start, goal);
        let mut u = transcription.warm_start();

        let warm_start_violation = max_abs(transcription.penalty(&u)?.as_slice());
        let mut warm_start_gradient = vec![0.0; u.len()];
        transcription.objective_gradient(&u, &mut warm_start_gradient)?;
        let warm_start_stationarity = max_abs(&warm_start_gradient);
        if warm_start_violation <= self.parameters.feasibility_tolerance && warm_start_stationarity <= self.parameters.open_tolerance {
            self.trajectory = transcription.trajectory(&u)?;
            self.last_report = Some(OpEnSolveReport {
                exit_status: ExitStatus::Converged,
                num_outer_iterations: 0,
                num_inner_iterations: 0,
                solve_time: Duration::from_secs(0),
                cost: transcription.objective(&u)?,
                constraint_violation: warm_start_violation
            });
            optima_print("Warm start is already optimal.", PrintMode::Println, PrintColor::Blue, false);
            return Ok(true);
        }

        let max_duration = computation_time.or(self.parameters.max_time);
        let result = if problem.constraints.is_empty() {
            self.solve_panoc(&transcription, &mut u, max_duration)
        } else {
            self.solve_alm(&transcription, &mut u, max_duration)
        };

        let mut report = match result {
            Ok(r) => { r }
            Err(e) => {
                if let Some(error) = transcription.take_error() {
                    if !error.is_recoverable() { return Err(error); }
                    optima_print(&format!("Solve aborted: {}", error), PrintMode::Println, PrintColor::Yellow, false);
                } else {
                    optima_print(&format!("Solve aborted by the optimizer: {:?}", e), PrintMode::Println, PrintColor::Yellow, false);
                }
                return Ok(false);
            }
        };
        report.constraint_violation = max_abs(transcription.penalty(&u)?.as_slice());

        match report.exit_status {
            ExitStatus::Converged => { }
            ExitStatus::NotConvergedOutOfTime => {
                let budget = max_duration.map(|d| d.as_secs_f64()).unwrap_or(f64::INFINITY);
                optima_print(OptimaError::new_solver_timeout_error(budget, file!(), line!()).message(), PrintMode::Println, PrintColor::Yellow, false);
                self.last_report = Some(report);
                return Ok(false);
            }
            ExitStatus::NotConvergedIterations => {
                optima_print(&format!("Solver ran out of iterations ({} outer, {} inner).", report.num_outer_iterations, report.num_inner_iterations), PrintMode::Println, PrintColor::Yellow, false);
                self.last_report = Some(report);
                return Ok(false);
            }
        }
        if report.constraint_violation > self.parameters.feasibility_tolerance {
            optima_print(&format!("Solver converged to an infeasible point (violation {:?}).", report.constraint_violation), PrintMode::Println, PrintColor::Yellow, false);
            self.last_report = Some(report);
            return Ok(false);
        }

        self.trajectory = transcription.trajectory(&u)?;
        optima_print(&format!("Plan found in {:?} ({} inner iterations, cost {:?}).", report.solve_time, report.num_inner_iterations, report.cost), PrintMode::Println, PrintColor::Green, false);
        self.last_report = Some(report);
        Ok(true)
    }

    fn whole_body_trajectory(&self) -> &LocomotionTrajectory {
        &self.trajectory
    }
}

#[derive(Clone, Debug)]
pub struct OpEnSolveReport {
    pub exit_status: ExitStatus,
    pub num_outer_iterations: usize,
    pub num_inner_iterations: usize,
    pub solve_time: Duration,
    pub cost: f64,
    /// Largest absolute entry of the stacked constraint penalty at the returned point.
    pub constraint_violation: f64
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

fn unbounded(n: usize) -> (Vec<f64>, Vec<f64>) {
    (vec![-f64::INFINITY; n], vec![f64::INFINITY; n])
}

/// The planning problem seen through a flat decision vector.  Errors raised inside optimizer
/// callbacks are parked here and recovered once the optimizer returns.
struct Transcription<'a> {
    problem: &'a PlanningProblem,
    start: &'a LocomotionState,
    goal: &'a LocomotionState,
    num_joints: usize,
    state_dimension: usize,
    /// Decision variables the constraint penalty depends on.
    penalty_columns: Vec<usize>,
    error: Mutex<Option<OptimaError>>
}
impl<'a> Transcription<'a> {
    fn new(problem: &'a PlanningProblem, start: &'a LocomotionState, goal: &'a LocomotionState) -> Self {
        let num_joints = start.num_joints();
        let state_dimension = LocomotionState::state_dimension(num_joints);
        let knot_columns = problem.constraint_variables().vectorized_indices(num_joints);
        let penalty_columns = (0..problem.horizon).flat_map(|k| knot_columns.iter().map(move |i| k * state_dimension + i)).collect();
        Self {
            problem,
            start,
            goal,
            num_joints,
            state_dimension,
            penalty_columns,
            error: Mutex::new(None)
        }
    }
    fn warm_start(&self) -> Vec<f64> {
        let start = self.start.vectorize();
        let mut out = Vec::with_capacity(self.problem.horizon * self.state_dimension);
        for _ in 0..self.problem.horizon { out.extend_from_slice(start.as_slice()); }
        out
    }
    fn knots(&self, u: &[f64]) -> Result<Vec<LocomotionState>, OptimaError> {
        u.chunks(self.state_dimension).enumerate().map(|(k, chunk)| {
            LocomotionState::from_vectorized(chunk, self.num_joints, self.start.time + k as f64 * STEP_TIME)
        }).collect()
    }
    fn trajectory(&self, u: &[f64]) -> Result<LocomotionTrajectory, OptimaError> {
        LocomotionTrajectory::new_from_knots(self.knots(u)?)
    }
    fn objective(&self, u: &[f64]) -> Result<f64, OptimaError> {
        self.problem.evaluate_objective(&self.knots(u)?, self.goal)
    }
    fn objective_gradient(&self, u: &[f64], grad: &mut [f64]) -> Result<(), OptimaError> {
        grad.iter_mut().for_each(|g| *g = 0.0);
        let mut knot_gradient = vec![0.0; self.state_dimension];
        for (k, knot) in self.knots(u)?.iter().enumerate() {
            let offset = k * self.state_dimension;
            for cost in &self.problem.costs {
                cost.gradient(knot, self.goal)?.write_vectorized(&mut knot_gradient);
                for (g, v) in grad[offset..offset + self.state_dimension].iter_mut().zip(knot_gradient.iter()) {
                    *g += *v;
                }
            }
        }
        Ok(())
    }
    fn penalty_dimension(&self) -> usize {
        self.problem.horizon * self.problem.constraint_dimension()
    }
    /// Stacked constraint penalty of every knot.  Equality rows give `r - lower`, inequality rows give
    /// the distance of `r` to `[lower, upper]`.
    fn penalty(&self, u: &[f64]) -> Result<DVector<f64>, OptimaError> {
        let knots = self.knots(u)?;
        let mut out = DVector::zeros(self.penalty_dimension());
        let mut bookmark = 0;
        for (k, knot) in knots.iter().enumerate() {
            let last_knot = if k == 0 { self.start } else { &knots[k - 1] };
            for constraint in &self.problem.constraints {
                let r = constraint.compute_checked(knot, last_knot)?;
                let (lower, upper) = constraint.bounds();
                for i in 0..r.len() {
                    out[bookmark + i] = if lower[i] == upper[i] {
                        r[i] - lower[i]
                    } else {
                        (r[i] - upper[i]).max(0.0) + (r[i] - lower[i]).min(0.0)
                    };
                }
                bookmark += r.len();
            }
        }
        Ok(out)
    }
    fn penalty_or_zeros(&self, u: &[f64]) -> DVector<f64> {
        return match self.penalty(u) {
            Ok(p) => { p }
            Err(e) => {
                self.record_error(e);
                DVector::zeros(self.penalty_dimension())
            }
        }
    }
    fn record_error(&self, error: OptimaError) -> SolverError {
        let mut slot = self.error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() { *slot = Some(error); }
        SolverError::Cost
    }
    fn has_error(&self) -> bool {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
    fn take_error(&self) -> Option<OptimaError> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use approx::assert_relative_eq;
    use crate::constraints::Constraint;
    use crate::costs::Cost;
    use crate::costs::state_tracking_energy_cost::StateTrackingEnergyCost;
    use crate::locomotion::locomotion_state::LocomotionVariables;
    use crate::utils::utils_console::set_console_verbosity;
    use super::*;

    /// Pins the first joint position to `value`.
    struct PinJoint {
        value: f64,
        bounds_len: usize,
        residual_len: usize
    }
    impl PinJoint {
        fn new(value: f64) -> Self {
            Self { value, bounds_len: 1, residual_len: 1 }
        }
    }
    impl Constraint for PinJoint {
        fn name(&self) -> &str { "pin_joint" }
        fn dimension(&self) -> usize { 1 }
        fn locomotion_variables(&self) -> LocomotionVariables {
            LocomotionVariables { position: true, ..Default::default() }
        }
        fn compute(&self, constraint: &mut DVector<f64>, state: &LocomotionState, _last_state: &LocomotionState) -> Result<(), OptimaError> {
            *constraint = DVector::from_element(self.residual_len, state.joint_pos[0]);
            Ok(())
        }
        fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
            (DVector::from_element(self.bounds_len, self.value), DVector::from_element(self.bounds_len, self.value))
        }
    }

    fn tracking_cost(weight: f64) -> Arc<dyn Cost> {
        let mut cost = StateTrackingEnergyCost::new(1);
        let mut w = LocomotionState::new(1);
        w.joint_pos[0] = weight;
        cost.set_weights(w);
        Arc::new(cost)
    }

    fn goal() -> LocomotionState {
        let mut g = LocomotionState::new(1);
        g.joint_pos[0] = 1.0;
        g
    }

    #[test]
    fn compute_before_init() {
        let mut solver = OpEnWholeBodySolver::default();
        let res = solver.compute(&LocomotionState::new(1), &goal(), None);
        assert!(matches!(res, Err(OptimaError::NotInitializedError(_))));
        assert!(solver.whole_body_trajectory().is_empty());
    }

    #[test]
    fn stationary_warm_start_is_accepted() {
        set_console_verbosity(false);
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(1);
        problem.costs.push(tracking_cost(0.0));
        solver.init(&problem).unwrap();

        let mut start = LocomotionState::new(1);
        start.time = 3.0;
        start.joint_pos[0] = 0.2;
        assert!(solver.compute(&start, &goal(), None).unwrap());
        assert_eq!(solver.whole_body_trajectory().knots(), &vec![start]);
        assert_eq!(solver.last_report().unwrap().num_inner_iterations, 0);
    }

    #[test]
    fn panoc_tracks_goal() {
        set_console_verbosity(false);
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(2);
        problem.costs.push(tracking_cost(1.0));
        solver.init(&problem).unwrap();

        assert!(solver.compute(&LocomotionState::new(1), &goal(), None).unwrap());
        let t = solver.whole_body_trajectory();
        assert_eq!(t.len(), 2);
        assert_relative_eq!(t.knots()[1].time, STEP_TIME);
        for knot in t {
            assert_relative_eq!(knot.joint_pos[0], 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn alm_respects_equality_constraint() {
        set_console_verbosity(false);
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(1);
        problem.costs.push(tracking_cost(1.0));
        problem.constraints.push(Arc::new(PinJoint::new(0.5)));
        solver.init(&problem).unwrap();

        assert!(solver.compute(&LocomotionState::new(1), &goal(), None).unwrap());
        assert_relative_eq!(solver.whole_body_trajectory().knots()[0].joint_pos[0], 0.5, epsilon = 1e-2);
        assert!(solver.last_report().unwrap().constraint_violation <= solver.parameters().feasibility_tolerance);
    }

    #[test]
    fn running_out_of_iterations_keeps_previous_plan() {
        set_console_verbosity(false);
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(2);
        problem.costs.push(tracking_cost(1.0));
        solver.init(&problem).unwrap();
        assert!(solver.compute(&LocomotionState::new(1), &goal(), None).unwrap());
        let plan = solver.whole_body_trajectory().clone();

        solver.set_parameters(OptimizerParameters { max_iterations: 1, ..Default::default() });
        let mut far_goal = goal();
        far_goal.joint_pos[0] = 50.0;
        assert!(!solver.compute(&LocomotionState::new(1), &far_goal, None).unwrap());
        assert!(matches!(solver.last_report().unwrap().exit_status, ExitStatus::NotConvergedIterations));
        assert_eq!(solver.whole_body_trajectory(), &plan);
    }

    #[test]
    fn penalty_columns_follow_constraint_variables() {
        let mut problem = PlanningProblem::new(2);
        problem.constraints.push(Arc::new(PinJoint::new(0.0)));
        let start = LocomotionState::new(1);
        let g = goal();
        let transcription = Transcription::new(&problem, &start, &g);
        let d = LocomotionState::state_dimension(1);
        let expected: Vec<usize> = (0..2).flat_map(|k| vec![0, 1, 2, 3, 4, 5, 18].into_iter().map(move |i| k * d + i)).collect();
        assert_eq!(transcription.penalty_columns, expected);

        // only the pinned joint position moves the penalty
        let u = transcription.warm_start();
        let product = FiniteDifferenceUtils::jacobian_transpose_product(|x: &[f64]| transcription.penalty_or_zeros(x), &u, &[1.0, 1.0], &transcription.penalty_columns, 1e-7);
        assert_relative_eq!(product[18], 1.0, epsilon = 1e-4);
        assert_relative_eq!(product[d + 18], 1.0, epsilon = 1e-4);
        assert_eq!(product.iter().filter(|p| p.abs() > 1e-6).count(), 2);
    }

    #[test]
    fn bad_bounds_fail_init() {
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(1);
        problem.constraints.push(Arc::new(PinJoint { value: 0.0, bounds_len: 2, residual_len: 1 }));
        assert!(matches!(solver.init(&problem), Err(OptimaError::ConstraintDimensionMismatch(_))));
    }

    #[test]
    fn bad_residual_fails_compute() {
        let mut solver = OpEnWholeBodySolver::default();
        let mut problem = PlanningProblem::new(1);
        problem.constraints.push(Arc::new(PinJoint { value: 0.0, bounds_len: 1, residual_len: 3 }));
        solver.init(&problem).unwrap();
        let res = solver.compute(&LocomotionState::new(1), &goal(), None);
        assert!(matches!(res, Err(OptimaError::ConstraintDimensionMismatch(_))));
    }

    #[test]
    fn zero_horizon_is_a_configuration_error() {
        let mut solver = OpEnWholeBodySolver::default();
        assert!(matches!(solver.init(&PlanningProblem::new(0)), Err(OptimaError::ConfigurationError(_))));
    }
}
