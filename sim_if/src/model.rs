//! # Host model capability traits
//!
//! The host simulation owns the rigid-body model, its joints and the PID
//! actuation step. The controller is handed non-owning capability objects
//! implementing these traits at load time and holds them for the lifetime of
//! the plugin instance.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A proportional-integral-derivative gain triple.
///
/// Gains are set on the host's joint controller once at load and are
/// immutable afterwards.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kinematic type of a joint.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum JointType {
    /// Zero degrees of freedom - cannot be actuated or sensibly reported
    Fixed,
    /// Single rotational degree of freedom with limits
    Revolute,
    /// Single rotational degree of freedom without limits
    Continuous,
    /// Single translational degree of freedom
    Prismatic,
}

/// How a PID target value is interpreted by the host's actuation step.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum CtrlMode {
    /// The target is an absolute position (radians or meters)
    Position,
    /// The target is a rate (radians/second or meters/second)
    Velocity,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single host-owned joint.
pub trait Joint {
    /// The joint's name within the model
    fn name(&self) -> &str;

    /// The joint's kinematic type
    fn joint_type(&self) -> JointType;

    /// The joint's current position (radians or meters depending on type)
    fn position(&self) -> f64;
}

/// The host-owned model containing the joints.
pub trait Model {
    /// The model's name, used as the default channel namespace
    fn name(&self) -> &str;

    /// All joints in the model, in the model's own order
    fn joints(&self) -> Vec<Rc<dyn Joint>>;

    /// Look up a joint by name
    fn joint(&self, name: &str) -> Option<Rc<dyn Joint>>;
}

/// The host-owned joint controller which runs the PID actuation step.
///
/// Methods take `&self` since mutability of the underlying controller is the
/// host's concern, allowing the plugin to hold a plain shared reference.
pub trait JointCtrl {
    /// Set the position-mode PID gains for the named joint
    fn set_position_pid(&self, joint: &str, gains: PidGains);

    /// Set the velocity-mode PID gains for the named joint
    fn set_velocity_pid(&self, joint: &str, gains: PidGains);

    /// Set the position target for the named joint
    fn set_position_target(&self, joint: &str, target: f64);

    /// Set the velocity target for the named joint
    fn set_velocity_target(&self, joint: &str, target: f64);
}

/// The host-owned world, providing simulation time.
pub trait World {
    /// Current simulation time in seconds
    fn sim_time_s(&self) -> f64;
}
