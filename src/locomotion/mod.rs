//! Value types shared by every planning component: whole-body states, trajectories of them, and the
//! contact/pose records a plan hands back to its caller.

pub mod contact;
pub mod locomotion_state;
pub mod locomotion_trajectory;
