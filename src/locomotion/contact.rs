use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

/// A planned foothold of a single end-effector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub end_effector: usize,
    pub position: Vector3<f64>
}
impl Contact {
    pub fn new(end_effector: usize, position: Vector3<f64>) -> Self {
        Self { end_effector, position }
    }
}

/// Position and (roll, pitch, yaw) orientation of the body, used when assembling contact sequences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub position: Vector3<f64>,
    pub orientation: Vector3<f64>
}
impl BodyPose {
    pub fn new(position: Vector3<f64>, orientation: Vector3<f64>) -> Self {
        Self { position, orientation }
    }
}
