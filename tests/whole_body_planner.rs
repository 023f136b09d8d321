mod common;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use approx::assert_relative_eq;
use optima_locomotion::locomotion::locomotion_state::Coords6d;
use optima_locomotion::planners::constrained_whole_body_planner::ConstrainedWholeBodyPlanner;
use optima_locomotion::planners::whole_body_messages::{JointStateFeed, JointStateMessage, JointStateSample, TrajectoryObserver, WholeBodyTrajectoryMessage};
use optima_locomotion::planners::whole_body_planner_config::WholeBodyPlannerConfig;
use optima_locomotion::solvers::open_solver::OpEnWholeBodySolver;
use optima_locomotion::utils::utils_console::set_console_verbosity;
use optima_locomotion::utils::utils_traits::ToAndFromJsonString;
use common::{HopperModel, ScriptedOutcome, ScriptedSolver};

struct RecordingObserver {
    subscribed: bool,
    messages: Vec<WholeBodyTrajectoryMessage>
}
impl RecordingObserver {
    fn new(subscribed: bool) -> Self {
        Self { subscribed, messages: vec![] }
    }
}
impl TrajectoryObserver for RecordingObserver {
    fn has_subscribers(&self) -> bool {
        self.subscribed
    }
    fn publish(&mut self, message: WholeBodyTrajectoryMessage) {
        self.messages.push(message);
    }
}

struct ScriptedFeed {
    messages: VecDeque<Option<JointStateMessage>>
}
impl JointStateFeed for ScriptedFeed {
    fn poll(&mut self) -> Option<JointStateMessage> {
        self.messages.pop_front().flatten()
    }
}

fn config() -> WholeBodyPlannerConfig {
    let mut c = WholeBodyPlannerConfig::default();
    c.horizon = 3;
    c.desired_state.position.insert("LZ".to_string(), 0.6);
    c
}

fn stance_message(time: f64) -> JointStateMessage {
    JointStateMessage {
        time,
        samples: vec![
            JointStateSample::new("knee", -0.8, 0.1, 3.0),
            JointStateSample::new("slider", 0.55, -0.2, 0.0),
            JointStateSample::new("hip", 0.4, 0.0, 1.0),
            JointStateSample::new("camera_tilt", 9.0, 9.0, 9.0)
        ]
    }
}

fn scripted_planner(script: Vec<ScriptedOutcome>, config: WholeBodyPlannerConfig) -> (ConstrainedWholeBodyPlanner, Arc<Mutex<ScriptedSolver>>) {
    set_console_verbosity(false);
    let solver = ScriptedSolver::new(script).handle();
    let planner = ConstrainedWholeBodyPlanner::new(Arc::new(HopperModel::new()), solver.clone(), config).unwrap();
    (planner, solver)
}

#[test]
fn construction_registers_dynamics_and_costs() {
    let (planner, _solver) = scripted_planner(vec![], config());
    let planning = planner.planning();
    assert_eq!(planning.constraint_names(), vec!["constrained".to_string()]);
    assert_eq!(planning.cost_names(), vec!["control_energy".to_string(), "state_tracking_energy".to_string()]);
    assert_eq!(planning.horizon(), 3);
    assert_eq!(planning.computation_time(), None);
    assert_eq!(planner.desired_state().base_pos[Coords6d::LZ.idx()], 0.6);
    // every weight defaulted: 3 base channels, 3 x 2 joint channels, 2 efforts
    assert_eq!(planner.weight_report().defaulted_channels().len(), 11);
}

#[test]
fn configured_weights_reach_the_costs() {
    let json = r#"{
        "horizon": 2,
        "computation_time": 0.25,
        "cost": {
            "state_tracking_energy": {"position": {"base": {"LZ": 100.0}, "joints": {"hip": 1.0, "knee": 2.0}}},
            "control_energy": {"hip": 0.01, "knee": 0.02}
        }
    }"#;
    let config = WholeBodyPlannerConfig::load_from_json_string(json).unwrap();
    let (planner, _solver) = scripted_planner(vec![], config);
    let planning = planner.planning();
    assert_eq!(planning.computation_time(), Some(Duration::from_millis(250)));

    let tracking = planning.cost("state_tracking_energy").unwrap();
    assert_eq!(tracking.weights().base_pos[Coords6d::LZ.idx()], 100.0);
    assert_eq!(tracking.weights().joint_pos[1], 2.0);
    let control = planning.cost("control_energy").unwrap();
    assert_eq!(control.weights().joint_eff[0], 0.01);
    assert_eq!(planner.weight_report().defaulted_channels().len(), 6);
}

#[test]
fn invalid_config_is_rejected() {
    set_console_verbosity(false);
    let mut c = config();
    c.horizon = 0;
    let res = ConstrainedWholeBodyPlanner::new(Arc::new(HopperModel::new()), ScriptedSolver::new(vec![]).handle(), c);
    assert!(res.is_err());
}

#[test]
fn joint_state_callback_fills_channels_by_name() {
    let (mut planner, _solver) = scripted_planner(vec![], config());
    planner.joint_state_callback(&stance_message(2.0));
    let s = planner.current_state();
    assert_eq!(s.time, 2.0);
    assert_eq!(s.joint_pos.as_slice(), &[0.4, -0.8]);
    assert_eq!(s.joint_vel.as_slice(), &[0.0, 0.1]);
    assert_eq!(s.joint_eff.as_slice(), &[1.0, 3.0]);
    assert_eq!(s.base_pos[Coords6d::LZ.idx()], 0.55);
    assert_eq!(s.base_vel[Coords6d::LZ.idx()], -0.2);
    assert_eq!(s.base_pos[Coords6d::LX.idx()], 0.0);
    assert!(s.joint_acc.iter().all(|a| *a == 0.0));
    assert!(s.base_acc.iter().all(|a| *a == 0.0));
}

#[test]
fn unreported_joints_keep_their_last_values() {
    let (mut planner, _solver) = scripted_planner(vec![], config());
    planner.joint_state_callback(&stance_message(0.0));
    planner.joint_state_callback(&JointStateMessage {
        time: 0.1,
        samples: vec![JointStateSample::new("hip", 0.5, 0.2, 1.5)]
    });
    let s = planner.current_state();
    assert_eq!(s.time, 0.1);
    assert_eq!(s.joint_pos.as_slice(), &[0.5, -0.8]);
    assert_eq!(s.joint_vel.as_slice(), &[0.2, 0.1]);
    assert_eq!(s.joint_eff.as_slice(), &[1.5, 3.0]);
    // base coordinates are not carried over
    assert_eq!(s.base_pos[Coords6d::LZ.idx()], 0.0);
    assert_eq!(s.base_vel[Coords6d::LZ.idx()], 0.0);
}

#[test]
fn huge_computation_time_means_unbounded() {
    let mut c = config();
    c.computation_time = Some(f64::MAX);
    let (planner, _solver) = scripted_planner(vec![], c);
    assert_eq!(planner.planning().computation_time(), None);
}

#[test]
fn compute_plans_once_per_new_state() {
    let (mut planner, solver) = scripted_planner(vec![], config());
    assert!(!planner.compute().unwrap());

    planner.joint_state_callback(&stance_message(0.0));
    assert!(planner.compute().unwrap());
    assert!(!planner.compute().unwrap());
    assert_eq!(solver.lock().unwrap().goals.len(), 1);
    assert_eq!(solver.lock().unwrap().goals[0].base_pos[Coords6d::LZ.idx()], 0.6);
    assert_eq!(planner.planning().whole_body_trajectory().len(), 3);
}

#[test]
fn publishing_is_lazy() {
    let (mut planner, _solver) = scripted_planner(vec![], config());
    planner.joint_state_callback(&stance_message(0.0));
    planner.compute().unwrap();

    let mut nobody = RecordingObserver::new(false);
    assert!(!planner.publish_whole_body_trajectory(&mut nobody));
    assert!(nobody.messages.is_empty());

    let mut listener = RecordingObserver::new(true);
    assert!(planner.publish_whole_body_trajectory(&mut listener));
    let m = &listener.messages[0];
    assert_eq!(m.trajectory.len(), 3);
    assert_eq!(m.actual.base.len(), 1);
    assert_eq!(m.actual.base[0].name, "slider");
    assert_eq!(m.actual.base[0].position, 0.55);
    assert_eq!(m.actual.joints[0].name, "hip");
    assert_eq!(m.trajectory[2].base[0].position, 0.6);
}

#[test]
fn published_trajectory_is_resampled_when_configured() {
    let mut c = config();
    c.interpolation_time = 0.05;
    let (mut planner, _solver) = scripted_planner(vec![], c);
    planner.joint_state_callback(&stance_message(0.0));
    planner.compute().unwrap();

    let mut listener = RecordingObserver::new(true);
    planner.publish_whole_body_trajectory(&mut listener);
    let trajectory = &listener.messages[0].trajectory;
    assert_eq!(trajectory.len(), 5);
    assert_relative_eq!(trajectory[4].time, 0.2);
}

#[test]
fn run_stops_on_first_plan() {
    let (mut planner, solver) = scripted_planner(vec![ScriptedOutcome::Fail], config());
    let mut feed = ScriptedFeed {
        messages: VecDeque::from(vec![None, Some(stance_message(0.0)), None, Some(stance_message(0.1)), Some(stance_message(0.2))])
    };
    let mut listener = RecordingObserver::new(true);
    assert!(planner.run(&mut feed, &mut listener, Duration::from_millis(1), Some(10)).unwrap());

    // cycle 1: no state; cycle 2: plan fails; cycle 3: no state; cycle 4: plan found
    assert_eq!(solver.lock().unwrap().goals.len(), 2);
    assert_eq!(listener.messages.len(), 1);
    assert_eq!(feed.messages.len(), 1);
}

#[test]
fn run_gives_up_after_max_cycles() {
    let (mut planner, _solver) = scripted_planner(vec![ScriptedOutcome::Fail; 5], config());
    let mut feed = ScriptedFeed { messages: (0..5).map(|i| Some(stance_message(i as f64))).collect() };
    let mut listener = RecordingObserver::new(true);
    assert!(!planner.run(&mut feed, &mut listener, Duration::from_millis(0), Some(3)).unwrap());
    assert!(listener.messages.is_empty());
}

#[test]
fn config_file_is_loaded_by_extension() {
    set_console_verbosity(false);
    let path = std::env::temp_dir().join(format!("optima_locomotion_planner_config_{}.json", std::process::id()));
    std::fs::write(&path, config().convert_to_json_string()).unwrap();
    let planner = ConstrainedWholeBodyPlanner::new_from_config_file(Arc::new(HopperModel::new()), ScriptedSolver::new(vec![]).handle(), &path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(planner.planning().horizon(), 3);
}

#[test]
fn hopper_plans_its_own_static_stance() {
    set_console_verbosity(false);
    let model = Arc::new(HopperModel::new());
    let stance = model.static_stance(0.4, -0.8);
    let mut c = WholeBodyPlannerConfig::default();
    c.desired_state.position.insert("LZ".to_string(), stance.base_pos[Coords6d::LZ.idx()]);

    let solver = Arc::new(Mutex::new(OpEnWholeBodySolver::default()));
    let mut planner = ConstrainedWholeBodyPlanner::new(model, solver, c).unwrap();
    planner.set_desired_state(stance.clone());
    planner.joint_state_callback(&JointStateMessage {
        time: 0.0,
        samples: vec![
            JointStateSample::new("slider", stance.base_pos[Coords6d::LZ.idx()], 0.0, 0.0),
            JointStateSample::new("hip", 0.4, 0.0, stance.joint_eff[0]),
            JointStateSample::new("knee", -0.8, 0.0, stance.joint_eff[1])
        ]
    });
    assert!(planner.compute().unwrap());
    let plan = planner.planning().whole_body_trajectory();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.knots()[0], stance);
}
