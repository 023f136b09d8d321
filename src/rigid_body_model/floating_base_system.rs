use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use nalgebra::{DVector, Vector6};
use serde::{Serialize, Deserialize};
use urdf_rs::{JointType, Robot};
use crate::locomotion::locomotion_state::{Coords6d, FLOATING_BASE_COORDS};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

/// One of the six coordinates of the floating base.  Inactive coordinates are not degrees of
/// freedom of the system (e.g., a robot on a vertical slider only has LZ active).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingBaseJoint {
    pub active: bool,
    pub id: usize,
    pub name: String
}
impl FloatingBaseJoint {
    pub fn new_inactive(coord: Coords6d) -> Self {
        Self { active: false, id: coord.idx(), name: String::new() }
    }
    pub fn new_active(coord: Coords6d, name: &str) -> Self {
        Self { active: true, id: coord.idx(), name: name.to_string() }
    }
}

/// The DOF layout of a floating-base robot.
///
/// The system DOF is laid out as the active floating-base coordinates (in `Coords6d` order)
/// followed by the actuated joints.  Joint indices handed out by this struct (e.g. by `joint_idx`)
/// are indices into the joint channels of a `LocomotionState`, i.e. system index minus the
/// floating-base DOF.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatingBaseSystem {
    robot_name: String,
    floating_base_joints: Vec<FloatingBaseJoint>,
    floating_base_dof: usize,
    ordered_joint_names: Vec<String>,
    joint_name_to_idx: BTreeMap<String, usize>,
    body_names: BTreeSet<String>
}
impl FloatingBaseSystem {
    pub fn new(robot_name: &str, floating_base_joints: Vec<FloatingBaseJoint>, ordered_joint_names: Vec<String>, body_names: Vec<String>) -> Result<Self, OptimaError> {
        if floating_base_joints.len() != FLOATING_BASE_COORDS {
            return Err(OptimaError::new_model_loading_error(&format!("Expected {} floating base joints, got {}.", FLOATING_BASE_COORDS, floating_base_joints.len()), file!(), line!()));
        }
        for (i, j) in floating_base_joints.iter().enumerate() {
            if j.id != i {
                return Err(OptimaError::new_model_loading_error(&format!("Floating base joint {:?} is stored at coordinate {}.", j, i), file!(), line!()));
            }
        }

        let mut joint_name_to_idx = BTreeMap::new();
        for (i, name) in ordered_joint_names.iter().enumerate() {
            if joint_name_to_idx.insert(name.clone(), i).is_some() {
                return Err(OptimaError::new_model_loading_error(&format!("Joint name {:?} appears twice.", name), file!(), line!()));
            }
        }

        let floating_base_dof = floating_base_joints.iter().filter(|j| j.active).count();

        Ok(Self {
            robot_name: robot_name.to_string(),
            floating_base_joints,
            floating_base_dof,
            ordered_joint_names,
            joint_name_to_idx,
            body_names: body_names.into_iter().collect()
        })
    }
    /// Convenience constructor: the given base coordinates are active and named after the coordinate.
    pub fn new_with_active_coords(robot_name: &str, active_coords: &[Coords6d], ordered_joint_names: Vec<String>, body_names: Vec<String>) -> Result<Self, OptimaError> {
        let floating_base_joints = Coords6d::all().iter().map(|c| {
            if active_coords.contains(c) { FloatingBaseJoint::new_active(*c, &format!("base_{}", c.name())) } else { FloatingBaseJoint::new_inactive(*c) }
        }).collect();
        Self::new(robot_name, floating_base_joints, ordered_joint_names, body_names)
    }
    pub fn new_from_urdf_file(path: &Path) -> Result<Self, OptimaError> {
        let urdf_robot = match urdf_rs::read_file(path) {
            Ok(r) => { r }
            Err(e) => {
                return Err(OptimaError::new_model_loading_error(&format!("Error when parsing urdf file {:?}: {}", path, e), file!(), line!()));
            }
        };
        Self::new_from_urdf_robot(&urdf_robot)
    }
    pub fn new_from_urdf_string(urdf: &str) -> Result<Self, OptimaError> {
        let urdf_robot = match urdf_rs::read_from_string(urdf) {
            Ok(r) => { r }
            Err(e) => {
                return Err(OptimaError::new_model_loading_error(&format!("Error when parsing urdf string: {}", e), file!(), line!()));
            }
        };
        Self::new_from_urdf_robot(&urdf_robot)
    }
    /// Floating-base detection: a `floating` joint leaving the root makes all six coordinates
    /// active.  Otherwise the chain of prismatic/revolute joints that hangs from the root through
    /// massless (virtual) links is read as the floating base, each joint taking the coordinate of
    /// its dominant axis.  Every other non-fixed joint is an actuated joint.
    pub fn new_from_urdf_robot(urdf_robot: &Robot) -> Result<Self, OptimaError> {
        let child_links: BTreeSet<&str> = urdf_robot.joints.iter().map(|j| j.child.link.as_str()).collect();
        let root = match urdf_robot.links.iter().find(|l| !child_links.contains(l.name.as_str())) {
            Some(l) => { l.name.clone() }
            None => { return Err(OptimaError::new_model_loading_error("The urdf does not have a root link.", file!(), line!())); }
        };

        let link_mass = |name: &str| -> f64 {
            urdf_robot.links.iter().find(|l| l.name == name).map(|l| l.inertial.mass.value).unwrap_or(0.0)
        };

        let mut floating_base_joints: Vec<FloatingBaseJoint> = Coords6d::all().iter().map(|c| FloatingBaseJoint::new_inactive(*c)).collect();
        let mut floating_base_joint_names = BTreeSet::new();

        let mut curr_link = root;
        while link_mass(&curr_link) == 0.0 {
            let outgoing: Vec<&urdf_rs::Joint> = urdf_robot.joints.iter().filter(|j| j.parent.link == curr_link).collect();
            if outgoing.len() != 1 { break; }
            let joint = outgoing[0];

            match &joint.joint_type {
                JointType::Floating => {
                    for c in Coords6d::all() {
                        floating_base_joints[c.idx()] = FloatingBaseJoint::new_active(c, &format!("{}_{}", joint.name, c.name()));
                    }
                    floating_base_joint_names.insert(joint.name.clone());
                    break;
                }
                JointType::Prismatic | JointType::Revolute | JointType::Continuous => {
                    let coord = Self::coordinate_from_axis(&joint.joint_type, [joint.axis.xyz[0], joint.axis.xyz[1], joint.axis.xyz[2]]);
                    if floating_base_joints[coord.idx()].active {
                        return Err(OptimaError::new_model_loading_error(&format!("Floating base coordinate {} is driven by more than one joint.", coord.name()), file!(), line!()));
                    }
                    floating_base_joints[coord.idx()] = FloatingBaseJoint::new_active(coord, &joint.name);
                    floating_base_joint_names.insert(joint.name.clone());
                }
                JointType::Fixed => { }
                _ => { break; }
            }

            curr_link = joint.child.link.clone();
        }

        let mut ordered_joint_names = vec![];
        for j in &urdf_robot.joints {
            if floating_base_joint_names.contains(&j.name) { continue; }
            match &j.joint_type {
                JointType::Fixed => { }
                JointType::Revolute | JointType::Continuous | JointType::Prismatic => { ordered_joint_names.push(j.name.clone()); }
                other => {
                    optima_print(&format!("Joint {} of type {:?} is not supported as an actuated joint and will be ignored.", j.name, other), PrintMode::Println, PrintColor::Yellow, true);
                }
            }
        }

        let body_names = urdf_robot.links.iter().map(|l| l.name.clone()).collect();

        Self::new(&urdf_robot.name, floating_base_joints, ordered_joint_names, body_names)
    }
    fn coordinate_from_axis(joint_type: &JointType, axis: [f64; 3]) -> Coords6d {
        let mut max_idx = 0;
        for i in 1..3 {
            if axis[i].abs() > axis[max_idx].abs() { max_idx = i; }
        }
        match joint_type {
            JointType::Prismatic => { Coords6d::all()[max_idx] }
            _ => { Coords6d::all()[3 + max_idx] }
        }
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn floating_base_dof(&self) -> usize {
        self.floating_base_dof
    }
    pub fn joint_dof(&self) -> usize {
        self.ordered_joint_names.len()
    }
    pub fn system_dof(&self) -> usize {
        self.floating_base_dof + self.joint_dof()
    }
    pub fn floating_base_joint(&self, coord: Coords6d) -> &FloatingBaseJoint {
        &self.floating_base_joints[coord.idx()]
    }
    pub fn floating_base_joints(&self) -> &Vec<FloatingBaseJoint> {
        &self.floating_base_joints
    }
    /// Returns the coordinate of the active floating-base joint with the given name, if any.
    pub fn floating_base_coord_from_name(&self, name: &str) -> Option<Coords6d> {
        for j in &self.floating_base_joints {
            if j.active && j.name == name { return Coords6d::from_idx(j.id).ok(); }
        }
        None
    }
    pub fn ordered_joint_names(&self) -> &Vec<String> {
        &self.ordered_joint_names
    }
    /// Joint-channel index of the given actuated joint.
    pub fn joint_idx(&self, joint_name: &str) -> Option<usize> {
        self.joint_name_to_idx.get(joint_name).copied()
    }
    /// Joint name to system index (joint-channel index offset by the floating-base DOF).
    pub fn joints(&self) -> BTreeMap<String, usize> {
        self.joint_name_to_idx.iter().map(|(k, v)| (k.clone(), v + self.floating_base_dof)).collect()
    }
    pub fn has_body(&self, body_name: &str) -> bool {
        self.body_names.contains(body_name)
    }
    /// Packs a base vector (6 coordinates) and a joint vector into a generalized vector of length
    /// `system_dof`, keeping only the active base coordinates.
    pub fn to_generalized_joint_state(&self, base_state: &Vector6<f64>, joint_state: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        if joint_state.len() != self.joint_dof() {
            return Err(OptimaError::new_generic_error_str(&format!("Joint vector has length {}, but the system has {} joints.", joint_state.len(), self.joint_dof()), file!(), line!()));
        }

        let mut out = DVector::zeros(self.system_dof());
        let mut bookmark = 0;
        for j in &self.floating_base_joints {
            if j.active {
                out[bookmark] = base_state[j.id];
                bookmark += 1;
            }
        }
        out.rows_mut(bookmark, self.joint_dof()).copy_from(joint_state);

        Ok(out)
    }
    /// Inverse of `to_generalized_joint_state`.  Inactive base coordinates come back as zero.
    pub fn from_generalized_joint_state(&self, generalized_state: &DVector<f64>) -> Result<(Vector6<f64>, DVector<f64>), OptimaError> {
        if generalized_state.len() != self.system_dof() {
            return Err(OptimaError::new_generic_error_str(&format!("Generalized vector has length {}, but the system has {} DOF.", generalized_state.len(), self.system_dof()), file!(), line!()));
        }

        let mut base_state = Vector6::zeros();
        let mut bookmark = 0;
        for j in &self.floating_base_joints {
            if j.active {
                base_state[j.id] = generalized_state[bookmark];
                bookmark += 1;
            }
        }
        let joint_state = generalized_state.rows(bookmark, self.joint_dof()).into_owned();

        Ok((base_state, joint_state))
    }
}
