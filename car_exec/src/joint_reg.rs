//! # Joint registry
//!
//! Resolves the host model's joints into logical vehicle roles (steer, shock
//! and axle positions) and records the set of non-fixed joints for telemetry.
//! The registry is built once at load time and is read-only afterwards.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

// Internal
use sim_if::model::{JointType, Model};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Logical roles of all actuator joints on the vehicle.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointRole {
    /// Front left steer axis
    StrFL,
    /// Front right steer axis
    StrFR,
    /// Front left suspension shock
    ShockFL,
    /// Front right suspension shock
    ShockFR,
    /// Back left suspension shock
    ShockBL,
    /// Back right suspension shock
    ShockBR,
    /// Front left wheel axle (free-rolling)
    AxleFL,
    /// Front right wheel axle (free-rolling)
    AxleFR,
    /// Back left wheel axle (driven)
    AxleBL,
    /// Back right wheel axle (driven)
    AxleBR,
}

/// Possible errors raised while building the registry.
#[derive(Debug, Error)]
pub enum JointRegError {
    #[error("Joint \"{name}\" (role {role:?}) is not present in the host model")]
    JointNotFound { role: JointRole, name: &'static str },
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All joint roles, in bank seeding order.
pub const ALL_ROLES: [JointRole; 10] = [
    JointRole::StrFL,
    JointRole::StrFR,
    JointRole::ShockFL,
    JointRole::ShockFR,
    JointRole::ShockBL,
    JointRole::ShockBR,
    JointRole::AxleFL,
    JointRole::AxleFR,
    JointRole::AxleBL,
    JointRole::AxleBR,
];

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Mapping from logical joint roles to host model joints.
#[derive(Default)]
pub struct JointReg {
    /// Joint name for each role, validated against the model at build time
    by_role: HashMap<JointRole, &'static str>,

    /// Names of all non-fixed joints in the model, in discovery order
    discovered: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl JointRole {
    /// The name of the joint fulfilling this role in the host model.
    pub fn joint_name(&self) -> &'static str {
        match self {
            JointRole::StrFL => "front_left_wheel_steer_joint",
            JointRole::StrFR => "front_right_wheel_steer_joint",
            JointRole::ShockFL => "front_left_shock_joint",
            JointRole::ShockFR => "front_right_shock_joint",
            JointRole::ShockBL => "back_left_shock_joint",
            JointRole::ShockBR => "back_right_shock_joint",
            JointRole::AxleFL => "front_left_wheel_joint",
            JointRole::AxleFR => "front_right_wheel_joint",
            JointRole::AxleBL => "back_left_wheel_joint",
            JointRole::AxleBR => "back_right_wheel_joint",
        }
    }
}

impl JointReg {
    /// Build the registry from the host model.
    ///
    /// Every role must resolve to a joint present in the model, otherwise the
    /// build fails and plugin load must be aborted. Building twice over the
    /// same model fails (or succeeds) identically.
    pub fn build(model: &dyn Model) -> Result<Self, JointRegError> {
        let mut by_role = HashMap::new();

        for role in ALL_ROLES.iter() {
            let name = role.joint_name();

            match model.joint(name) {
                Some(_) => {
                    by_role.insert(*role, name);
                }
                None => return Err(JointRegError::JointNotFound { role: *role, name }),
            }
        }

        // Discover all non-fixed joints for telemetry, keeping the model's
        // own ordering
        let mut discovered = Vec::new();

        debug!("Got joints:");
        for joint in model.joints() {
            if joint.joint_type() == JointType::Fixed {
                continue;
            }

            debug!("    {}", joint.name());
            discovered.push(joint.name().to_string());
        }

        Ok(JointReg {
            by_role,
            discovered,
        })
    }

    /// Get the name of the joint fulfilling the given role.
    ///
    /// Roles are validated at build time so this cannot fail afterwards.
    pub fn resolve(&self, role: JointRole) -> &'static str {
        self.by_role
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.joint_name())
    }

    /// All non-fixed joints in the model, in discovery order.
    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim_model::SimModel;
    use sim_if::model::JointType;

    #[test]
    fn test_build_resolves_all_roles() {
        let model = SimModel::fake_car();
        let reg = JointReg::build(&model).unwrap();

        for role in ALL_ROLES.iter() {
            assert_eq!(reg.resolve(*role), role.joint_name());
        }
    }

    #[test]
    fn test_missing_joint_is_fatal_and_idempotent() {
        let mut model = SimModel::new("broken_car");

        // All joints except the back right wheel
        for role in ALL_ROLES.iter() {
            if *role != JointRole::AxleBR {
                model.add_joint(role.joint_name(), JointType::Revolute);
            }
        }

        for _ in 0..2 {
            match JointReg::build(&model) {
                Err(JointRegError::JointNotFound { role, name }) => {
                    assert_eq!(role, JointRole::AxleBR);
                    assert_eq!(name, "back_right_wheel_joint");
                }
                Ok(_) => panic!("expected build to fail"),
            }
        }
    }

    #[test]
    fn test_fixed_joints_excluded_from_discovery() {
        let mut model = SimModel::fake_car();
        model.add_joint("chassis_weld_joint", JointType::Fixed);

        let reg = JointReg::build(&model).unwrap();

        assert_eq!(reg.discovered().len(), ALL_ROLES.len());
        assert!(!reg.discovered().iter().any(|n| n == "chassis_weld_joint"));
    }
}
