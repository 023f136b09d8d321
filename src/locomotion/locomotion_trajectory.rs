use serde::{Serialize, Deserialize};
use crate::locomotion::locomotion_state::LocomotionState;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::interpolation::{get_range, SimpleInterpolationUtils};

/// An ordered sequence of knots with non-decreasing time.  All knots share the same joint DOF.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocomotionTrajectory {
    knots: Vec<LocomotionState>
}
impl LocomotionTrajectory {
    pub fn new() -> Self {
        Self { knots: vec![] }
    }
    pub fn new_from_knots(knots: Vec<LocomotionState>) -> Result<Self, OptimaError> {
        let mut out_self = Self::new();
        for k in knots { out_self.push(k)?; }
        Ok(out_self)
    }
    pub fn push(&mut self, knot: LocomotionState) -> Result<(), OptimaError> {
        if !knot.time.is_finite() {
            return Err(OptimaError::new_generic_error_str("Trajectory knots must have a finite time.", file!(), line!()));
        }
        if let Some(last) = self.knots.last() {
            if knot.time < last.time {
                return Err(OptimaError::new_generic_error_str(&format!("Trajectory knot at time {} comes after a knot at time {}.", knot.time, last.time), file!(), line!()));
            }
            knot.check_num_joints(last.num_joints(), file!(), line!())?;
        }
        self.knots.push(knot);
        Ok(())
    }
    pub fn knots(&self) -> &Vec<LocomotionState> {
        &self.knots
    }
    pub fn iter(&self) -> std::slice::Iter<'_, LocomotionState> {
        self.knots.iter()
    }
    pub fn len(&self) -> usize {
        self.knots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }
    pub fn first(&self) -> Option<&LocomotionState> {
        self.knots.first()
    }
    pub fn last(&self) -> Option<&LocomotionState> {
        self.knots.last()
    }
    /// Resamples the trajectory every `dt` time units by linear interpolation of every channel,
    /// starting at the first knot and ending exactly at the last one.  A non-positive `dt` returns
    /// the knots unchanged.
    pub fn interpolate(&self, dt: f64) -> LocomotionTrajectory {
        if dt <= 0.0 || self.knots.len() < 2 { return self.clone(); }

        let t0 = self.knots[0].time;
        let t_end = self.knots[self.knots.len() - 1].time;

        let mut out_knots = vec![];
        let mut segment_idx = 0;
        for t in get_range(t0, t_end, dt) {
            while segment_idx + 2 < self.knots.len() && self.knots[segment_idx + 1].time <= t {
                segment_idx += 1;
            }
            let a = &self.knots[segment_idx];
            let b = &self.knots[segment_idx + 1];
            out_knots.push(Self::interpolate_knots(a, b, t));
        }

        Self { knots: out_knots }
    }
    fn interpolate_knots(a: &LocomotionState, b: &LocomotionState, t: f64) -> LocomotionState {
        let span = b.time - a.time;
        let u = if span <= 0.0 { 1.0 } else { ((t - a.time) / span).clamp(0.0, 1.0) };

        LocomotionState {
            time: t,
            base_pos: a.base_pos + u * (b.base_pos - a.base_pos),
            base_vel: a.base_vel + u * (b.base_vel - a.base_vel),
            base_acc: a.base_acc + u * (b.base_acc - a.base_acc),
            joint_pos: SimpleInterpolationUtils::linear_interpolation_at(&a.joint_pos, &b.joint_pos, u),
            joint_vel: SimpleInterpolationUtils::linear_interpolation_at(&a.joint_vel, &b.joint_vel, u),
            joint_acc: SimpleInterpolationUtils::linear_interpolation_at(&a.joint_acc, &b.joint_acc, u),
            joint_eff: SimpleInterpolationUtils::linear_interpolation_at(&a.joint_eff, &b.joint_eff, u)
        }
    }
}
impl<'a> IntoIterator for &'a LocomotionTrajectory {
    type Item = &'a LocomotionState;
    type IntoIter = std::slice::Iter<'a, LocomotionState>;

    fn into_iter(self) -> Self::IntoIter {
        self.knots.iter()
    }
}
