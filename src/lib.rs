
//! Optima Locomotion is a whole-body motion planning toolbox for legged and other floating-base robots.
//! Planning is posed as a nonlinear program over a discretized state trajectory: named constraints
//! (most importantly the contact-constrained dynamics of the robot) and named costs are registered on
//! a `PlanningOfMotionSequences`, which hands them to a pluggable `Solver`.  A transcription backend
//! built on `optimization_engine` is included.

pub mod constraints;
pub mod costs;
pub mod locomotion;
pub mod planners;
pub mod planning;
pub mod rigid_body_model;
pub mod solvers;
pub mod utils;
