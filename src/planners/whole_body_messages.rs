use serde::{Serialize, Deserialize};
use crate::locomotion::locomotion_state::{Coords6d, LocomotionState};
use crate::locomotion::locomotion_trajectory::LocomotionTrajectory;
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;

/// One measured joint, as delivered by a state feed.  The name may refer to an actuated joint or
/// to an active floating-base joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointStateSample {
    pub name: String,
    pub position: f64,
    pub velocity: f64,
    pub effort: f64
}
impl JointStateSample {
    pub fn new(name: &str, position: f64, velocity: f64, effort: f64) -> Self {
        Self { name: name.to_string(), position, velocity, effort }
    }
}

/// A batch of joint samples taken at the same time, in arbitrary order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointStateMessage {
    pub time: f64,
    pub samples: Vec<JointStateSample>
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseStateEntry {
    pub name: String,
    pub id: Coords6d,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointStateEntry {
    pub name: String,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub effort: f64
}

/// A state laid out by name: one entry per active floating-base coordinate and one per joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WholeBodyStateMessage {
    pub time: f64,
    pub base: Vec<BaseStateEntry>,
    pub joints: Vec<JointStateEntry>
}
impl WholeBodyStateMessage {
    pub fn new_from_state(state: &LocomotionState, system: &FloatingBaseSystem) -> Self {
        let mut base = vec![];
        for joint in system.floating_base_joints() {
            if !joint.active { continue; }
            if let Ok(id) = Coords6d::from_idx(joint.id) {
                base.push(BaseStateEntry {
                    name: joint.name.clone(),
                    id,
                    position: state.base_pos[joint.id],
                    velocity: state.base_vel[joint.id],
                    acceleration: state.base_acc[joint.id]
                });
            }
        }

        let joints = system.ordered_joint_names().iter().enumerate().filter(|(i, _)| *i < state.num_joints()).map(|(i, name)| {
            JointStateEntry {
                name: name.clone(),
                position: state.joint_pos[i],
                velocity: state.joint_vel[i],
                acceleration: state.joint_acc[i],
                effort: state.joint_eff[i]
            }
        }).collect();

        Self { time: state.time, base, joints }
    }
}

/// The measured state a plan started from, followed by every planned knot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WholeBodyTrajectoryMessage {
    pub actual: WholeBodyStateMessage,
    pub trajectory: Vec<WholeBodyStateMessage>
}
impl WholeBodyTrajectoryMessage {
    pub fn new(actual: &LocomotionState, trajectory: &LocomotionTrajectory, system: &FloatingBaseSystem) -> Self {
        Self {
            actual: WholeBodyStateMessage::new_from_state(actual, system),
            trajectory: trajectory.iter().map(|knot| WholeBodyStateMessage::new_from_state(knot, system)).collect()
        }
    }
}

/// Receives planned trajectories.  Nothing is built when no one is listening.
pub trait TrajectoryObserver {
    fn has_subscribers(&self) -> bool;
    fn publish(&mut self, message: WholeBodyTrajectoryMessage);
}

/// Source of measured joint states.  `poll` returns `None` when nothing new arrived.
pub trait JointStateFeed {
    fn poll(&mut self) -> Option<JointStateMessage>;
}
