#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use nalgebra::{DVector, Vector3};
use optima_locomotion::locomotion::locomotion_state::{Coords6d, LocomotionState};
use optima_locomotion::locomotion::locomotion_trajectory::LocomotionTrajectory;
use optima_locomotion::rigid_body_model::{BodySelector, BodyVector, RigidBodyModel};
use optima_locomotion::rigid_body_model::floating_base_system::FloatingBaseSystem;
use optima_locomotion::solvers::{PlanningProblem, Solver};
use optima_locomotion::utils::utils_errors::OptimaError;

pub const GRAVITY: f64 = 9.81;

pub const HOPPER_URDF: &str = r#"
<robot name="hopper">
  <link name="world"/>
  <link name="trunk">
    <inertial><mass value="10.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial>
  </link>
  <link name="upperleg">
    <inertial><mass value="1.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial>
  </link>
  <link name="lowerleg">
    <inertial><mass value="0.5"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial>
  </link>
  <link name="foot"/>
  <joint name="slider" type="prismatic">
    <parent link="world"/><child link="trunk"/><axis xyz="0 0 1"/>
    <limit lower="0" upper="2" effort="1000" velocity="10"/>
  </joint>
  <joint name="hip" type="revolute">
    <parent link="trunk"/><child link="upperleg"/><axis xyz="0 1 0"/>
    <limit lower="-2" upper="2" effort="100" velocity="10"/>
  </joint>
  <joint name="knee" type="revolute">
    <parent link="upperleg"/><child link="lowerleg"/><axis xyz="0 1 0"/>
    <limit lower="-2.5" upper="0" effort="100" velocity="10"/>
  </joint>
  <joint name="foot_joint" type="fixed">
    <parent link="lowerleg"/><child link="foot"/>
  </joint>
</robot>
"#;

/// A planar one-legged hopper on a vertical slider, with closed-form kinematics and dynamics.
///
/// Joint forces are `I * acc + gravity(q)`, plus, when the foot is in contact, the torque that
/// carries the trunk weight through the leg.
pub struct HopperModel {
    system: FloatingBaseSystem,
    pub trunk_mass: f64,
    pub upperleg_mass: f64,
    pub lowerleg_mass: f64,
    pub upperleg_length: f64,
    pub lowerleg_length: f64,
    pub joint_inertia: f64
}
impl HopperModel {
    pub fn new() -> Self {
        Self {
            system: FloatingBaseSystem::new_from_urdf_string(HOPPER_URDF).unwrap(),
            trunk_mass: 10.0,
            upperleg_mass: 1.0,
            lowerleg_mass: 0.5,
            upperleg_length: 0.35,
            lowerleg_length: 0.33,
            joint_inertia: 0.05
        }
    }
    /// Foot position relative to the hip, in the sagittal (x, z) plane.
    pub fn foot_position_from_hip(&self, hip: f64, knee: f64) -> (f64, f64) {
        let (l1, l2) = (self.upperleg_length, self.lowerleg_length);
        (l1 * hip.sin() + l2 * (hip + knee).sin(), -l1 * hip.cos() - l2 * (hip + knee).cos())
    }
    /// Jacobian of the foot height with respect to (hip, knee).
    fn foot_height_jacobian(&self, hip: f64, knee: f64) -> [f64; 2] {
        let (l1, l2) = (self.upperleg_length, self.lowerleg_length);
        [l1 * hip.sin() + l2 * (hip + knee).sin(), l2 * (hip + knee).sin()]
    }
    fn gravity_torques(&self, hip: f64, knee: f64) -> [f64; 2] {
        let (l1, l2) = (self.upperleg_length, self.lowerleg_length);
        let (m1, m2) = (self.upperleg_mass, self.lowerleg_mass);
        [
            m1 * GRAVITY * 0.5 * l1 * hip.sin() + m2 * GRAVITY * (l1 * hip.sin() + 0.5 * l2 * (hip + knee).sin()),
            m2 * GRAVITY * 0.5 * l2 * (hip + knee).sin()
        ]
    }
    /// A standing state at rest: the given joint angles and the efforts that hold the trunk up.
    pub fn static_stance(&self, hip: f64, knee: f64) -> LocomotionState {
        let mut state = LocomotionState::new(2);
        state.joint_pos = DVector::from_vec(vec![hip, knee]);
        let (_, foot_z) = self.foot_position_from_hip(hip, knee);
        state.base_pos[Coords6d::LZ.idx()] = -foot_z;
        state.joint_eff = self.constrained_inverse_dynamics(&state, &vec!["foot".to_string()]).unwrap();
        state
    }
}
impl RigidBodyModel for HopperModel {
    fn floating_base_system(&self) -> &FloatingBaseSystem {
        &self.system
    }

    fn constrained_inverse_dynamics(&self, state: &LocomotionState, active_contacts: &BodySelector) -> Result<DVector<f64>, OptimaError> {
        let (hip, knee) = (state.joint_pos[0], state.joint_pos[1]);
        let g = self.gravity_torques(hip, knee);
        let mut forces = DVector::from_vec(vec![
            self.joint_inertia * state.joint_acc[0] + g[0],
            self.joint_inertia * state.joint_acc[1] + g[1]
        ]);
        if active_contacts.iter().any(|c| c == "foot") {
            let contact_force = self.trunk_mass * (GRAVITY + state.base_acc[Coords6d::LZ.idx()]);
            let j = self.foot_height_jacobian(hip, knee);
            forces[0] += j[0] * contact_force;
            forces[1] += j[1] * contact_force;
        }
        Ok(forces)
    }

    fn forward_velocity_kinematics(&self, state: &LocomotionState, bodies: &BodySelector) -> Result<BodyVector, OptimaError> {
        let (l1, l2) = (self.upperleg_length, self.lowerleg_length);
        let (hip, knee) = (state.joint_pos[0], state.joint_pos[1]);
        let (dhip, dknee) = (state.joint_vel[0], state.joint_vel[1]);
        let mut out = BodyVector::new();
        for body in bodies {
            if body != "foot" {
                return Err(OptimaError::new_generic_error_str(&format!("Unknown body {:?}.", body), file!(), line!()));
            }
            let vx = l1 * hip.cos() * dhip + l2 * (hip + knee).cos() * (dhip + dknee);
            let vz = state.base_vel[Coords6d::LZ.idx()] + l1 * hip.sin() * dhip + l2 * (hip + knee).sin() * (dhip + dknee);
            out.insert(body.clone(), Vector3::new(vx, 0.0, vz));
        }
        Ok(out)
    }
}

#[derive(Clone, Debug)]
pub enum ScriptedOutcome {
    /// Plans `horizon` knots that all equal the goal, spaced 0.1 apart from the start time.
    Succeed,
    Fail,
    Error(OptimaError)
}

/// A solver that plays back a script of outcomes (then keeps succeeding) and records every goal
/// it was asked to reach.
pub struct ScriptedSolver {
    script: VecDeque<ScriptedOutcome>,
    horizon: usize,
    delay: Duration,
    pub goals: Vec<LocomotionState>,
    pub init_calls: usize,
    pub num_costs: usize,
    pub num_constraints: usize,
    trajectory: LocomotionTrajectory
}
impl ScriptedSolver {
    pub fn new(script: Vec<ScriptedOutcome>) -> Self {
        Self {
            script: script.into(),
            horizon: 0,
            delay: Duration::from_millis(0),
            goals: vec![],
            init_calls: 0,
            num_costs: 0,
            num_constraints: 0,
            trajectory: LocomotionTrajectory::new()
        }
    }
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
    pub fn handle(self) -> Arc<Mutex<ScriptedSolver>> {
        Arc::new(Mutex::new(self))
    }
}
impl Solver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn init(&mut self, problem: &PlanningProblem) -> Result<(), OptimaError> {
        self.init_calls += 1;
        self.horizon = problem.horizon;
        self.num_costs = problem.costs.len();
        self.num_constraints = problem.constraints.len();
        Ok(())
    }

    fn compute(&mut self, start: &LocomotionState, goal: &LocomotionState, _computation_time: Option<Duration>) -> Result<bool, OptimaError> {
        self.goals.push(goal.clone());
        if !self.delay.is_zero() { std::thread::sleep(self.delay); }
        return match self.script.pop_front().unwrap_or(ScriptedOutcome::Succeed) {
            ScriptedOutcome::Succeed => {
                let knots = (0..self.horizon).map(|k| {
                    let mut knot = goal.clone();
                    knot.time = start.time + 0.1 * k as f64;
                    knot
                }).collect();
                self.trajectory = LocomotionTrajectory::new_from_knots(knots)?;
                Ok(true)
            }
            ScriptedOutcome::Fail => { Ok(false) }
            ScriptedOutcome::Error(e) => { Err(e) }
        }
    }

    fn whole_body_trajectory(&self) -> &LocomotionTrajectory {
        &self.trajectory
    }
}

/// A state whose every channel holds `value`.
pub fn uniform_state(num_joints: usize, value: f64) -> LocomotionState {
    let mut s = LocomotionState::new_uniform(num_joints, value);
    s.time = 0.0;
    s
}
