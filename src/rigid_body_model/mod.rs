//! The narrow interface through which the planner consults a robot's rigid-body numerics.  Models
//! are loaded once (typically from a URDF via `FloatingBaseSystem::new_from_urdf_file`) and shared
//! across constraints behind an `Arc`.

pub mod floating_base_system;

use std::collections::BTreeMap;
use nalgebra::{DVector, Vector3};
use crate::locomotion::locomotion_state::LocomotionState;
use crate::rigid_body_model::floating_base_system::FloatingBaseSystem;
use crate::utils::utils_errors::OptimaError;

/// Names of a set of bodies (e.g., the end-effectors currently in contact).
pub type BodySelector = Vec<String>;

/// A 3D quantity per named body.
pub type BodyVector = BTreeMap<String, Vector3<f64>>;

pub trait RigidBodyModel: Send + Sync {
    fn floating_base_system(&self) -> &FloatingBaseSystem;

    /// Joint generalized forces (length `joint_dof`) needed to realize the position, velocity and
    /// acceleration channels of `state` while the `active_contacts` are held by the environment.
    /// Effort channels of `state` are ignored.
    fn constrained_inverse_dynamics(&self, state: &LocomotionState, active_contacts: &BodySelector) -> Result<DVector<f64>, OptimaError>;

    /// Linear velocity, in the world frame, of each named body given the position and velocity
    /// channels of `state`.
    fn forward_velocity_kinematics(&self, state: &LocomotionState, bodies: &BodySelector) -> Result<BodyVector, OptimaError>;

    fn joint_dof(&self) -> usize {
        self.floating_base_system().joint_dof()
    }
    fn system_dof(&self) -> usize {
        self.floating_base_system().system_dof()
    }
}
