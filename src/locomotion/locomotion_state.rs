use nalgebra::{DVector, Vector6};
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;

/// Number of floating-base coordinates (three linear followed by three angular).
pub const FLOATING_BASE_COORDS: usize = 6;

/// Coordinates of the floating base, in the order they appear in every base vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coords6d {
    LX,
    LY,
    LZ,
    AX,
    AY,
    AZ
}
impl Coords6d {
    pub fn all() -> [Coords6d; FLOATING_BASE_COORDS] {
        [Coords6d::LX, Coords6d::LY, Coords6d::LZ, Coords6d::AX, Coords6d::AY, Coords6d::AZ]
    }
    pub fn idx(&self) -> usize {
        match self {
            Coords6d::LX => { 0 }
            Coords6d::LY => { 1 }
            Coords6d::LZ => { 2 }
            Coords6d::AX => { 3 }
            Coords6d::AY => { 4 }
            Coords6d::AZ => { 5 }
        }
    }
    pub fn from_idx(idx: usize) -> Result<Self, OptimaError> {
        OptimaError::new_check_for_idx_out_of_bound_error(idx, FLOATING_BASE_COORDS, file!(), line!())?;
        Ok(Self::all()[idx])
    }
    pub fn name(&self) -> &'static str {
        match self {
            Coords6d::LX => { "LX" }
            Coords6d::LY => { "LY" }
            Coords6d::LZ => { "LZ" }
            Coords6d::AX => { "AX" }
            Coords6d::AY => { "AY" }
            Coords6d::AZ => { "AZ" }
        }
    }
    pub fn is_linear(&self) -> bool {
        self.idx() < 3
    }
}

/// Which groups of state channels a constraint (or a solver) treats as decision variables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocomotionVariables {
    pub position: bool,
    pub velocity: bool,
    pub acceleration: bool,
    pub effort: bool
}
impl LocomotionVariables {
    pub fn union(&self, other: &LocomotionVariables) -> Self {
        Self {
            position: self.position || other.position,
            velocity: self.velocity || other.velocity,
            acceleration: self.acceleration || other.acceleration,
            effort: self.effort || other.effort
        }
    }
    /// Indices of the selected channels in a vectorized state with `num_joints` joints (see
    /// `LocomotionState::vectorize`).  Base coordinates have no effort channel.
    pub fn vectorized_indices(&self, num_joints: usize) -> Vec<usize> {
        let b = FLOATING_BASE_COORDS;
        let n = num_joints;
        let o = 3 * b;
        let mut out = vec![];
        if self.position { out.extend(0..b); }
        if self.velocity { out.extend(b..2*b); }
        if self.acceleration { out.extend(2*b..3*b); }
        if self.position { out.extend(o..o+n); }
        if self.velocity { out.extend(o+n..o+2*n); }
        if self.acceleration { out.extend(o+2*n..o+3*n); }
        if self.effort { out.extend(o+3*n..o+4*n); }
        out.sort_unstable();
        out
    }
}

/// A whole-body state of a floating-base robot at a single instant.
///
/// Base channels always hold six coordinates (see `Coords6d`).  The four joint channels share the
/// same length, the joint DOF of the robot model the state belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocomotionState {
    pub time: f64,
    pub base_pos: Vector6<f64>,
    pub base_vel: Vector6<f64>,
    pub base_acc: Vector6<f64>,
    pub joint_pos: DVector<f64>,
    pub joint_vel: DVector<f64>,
    pub joint_acc: DVector<f64>,
    pub joint_eff: DVector<f64>
}
impl LocomotionState {
    pub fn new(num_joints: usize) -> Self {
        Self {
            time: 0.0,
            base_pos: Vector6::zeros(),
            base_vel: Vector6::zeros(),
            base_acc: Vector6::zeros(),
            joint_pos: DVector::zeros(num_joints),
            joint_vel: DVector::zeros(num_joints),
            joint_acc: DVector::zeros(num_joints),
            joint_eff: DVector::zeros(num_joints)
        }
    }
    /// A state with every channel set to the same value.  Mostly useful for building weight vectors.
    pub fn new_uniform(num_joints: usize, value: f64) -> Self {
        Self {
            time: 0.0,
            base_pos: Vector6::repeat(value),
            base_vel: Vector6::repeat(value),
            base_acc: Vector6::repeat(value),
            joint_pos: DVector::from_element(num_joints, value),
            joint_vel: DVector::from_element(num_joints, value),
            joint_acc: DVector::from_element(num_joints, value),
            joint_eff: DVector::from_element(num_joints, value)
        }
    }
    pub fn num_joints(&self) -> usize {
        self.joint_pos.len()
    }
    /// Returns true if all four joint channels have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.joint_pos.len();
        self.joint_vel.len() == n && self.joint_acc.len() == n && self.joint_eff.len() == n
    }
    pub fn check_num_joints(&self, expected_num_joints: usize, file: &str, line: u32) -> Result<(), OptimaError> {
        if !self.is_consistent() {
            return Err(OptimaError::new_generic_error_str(&format!("Locomotion state has joint channels of different lengths ({}, {}, {}, {}).", self.joint_pos.len(), self.joint_vel.len(), self.joint_acc.len(), self.joint_eff.len()), file, line));
        }
        if self.num_joints() != expected_num_joints {
            return Err(OptimaError::new_generic_error_str(&format!("Locomotion state has {} joints, but {} were expected.", self.num_joints(), expected_num_joints), file, line));
        }
        Ok(())
    }
    /// Length of the vectorized representation of a state with `num_joints` joints.
    pub fn state_dimension(num_joints: usize) -> usize {
        3 * FLOATING_BASE_COORDS + 4 * num_joints
    }
    /// Stacks every channel (time excluded) as
    /// `[base_pos, base_vel, base_acc, joint_pos, joint_vel, joint_acc, joint_eff]`.
    pub fn vectorize(&self) -> DVector<f64> {
        let n = self.num_joints();
        let mut out = DVector::zeros(Self::state_dimension(n));
        self.write_vectorized(out.as_mut_slice());
        out
    }
    pub fn write_vectorized(&self, out: &mut [f64]) {
        let n = self.num_joints();
        let b = FLOATING_BASE_COORDS;
        out[0..b].copy_from_slice(self.base_pos.as_slice());
        out[b..2*b].copy_from_slice(self.base_vel.as_slice());
        out[2*b..3*b].copy_from_slice(self.base_acc.as_slice());
        let o = 3*b;
        out[o..o+n].copy_from_slice(self.joint_pos.as_slice());
        out[o+n..o+2*n].copy_from_slice(self.joint_vel.as_slice());
        out[o+2*n..o+3*n].copy_from_slice(self.joint_acc.as_slice());
        out[o+3*n..o+4*n].copy_from_slice(self.joint_eff.as_slice());
    }
    pub fn from_vectorized(v: &[f64], num_joints: usize, time: f64) -> Result<Self, OptimaError> {
        let expected = Self::state_dimension(num_joints);
        if v.len() != expected {
            return Err(OptimaError::new_generic_error_str(&format!("Vectorized state has length {}, but {} was expected.", v.len(), expected), file!(), line!()));
        }
        let n = num_joints;
        let b = FLOATING_BASE_COORDS;
        let o = 3*b;
        Ok(Self {
            time,
            base_pos: Vector6::from_column_slice(&v[0..b]),
            base_vel: Vector6::from_column_slice(&v[b..2*b]),
            base_acc: Vector6::from_column_slice(&v[2*b..3*b]),
            joint_pos: DVector::from_column_slice(&v[o..o+n]),
            joint_vel: DVector::from_column_slice(&v[o+n..o+2*n]),
            joint_acc: DVector::from_column_slice(&v[o+2*n..o+3*n]),
            joint_eff: DVector::from_column_slice(&v[o+3*n..o+4*n])
        })
    }
    /// Zeroes the base position, velocity and acceleration.
    pub fn set_base_zero(&mut self) {
        self.base_pos.fill(0.0);
        self.base_vel.fill(0.0);
        self.base_acc.fill(0.0);
    }
}
