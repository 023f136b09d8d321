//! Application-level planners built on `PlanningOfMotionSequences`.

pub mod constrained_whole_body_planner;
pub mod whole_body_messages;
pub mod whole_body_planner_config;
