//! # PID controller bank
//!
//! Holds one controller entry (gain triple, mode, target) per actuated
//! joint, keyed by logical role. The bank is a pure data store: the PID
//! integration itself is run by the host's actuation step, this module only
//! sets parameters and targets on the host joint controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::collections::HashMap;
use thiserror::Error;

// Internal
use crate::joint_reg::JointRole;
use sim_if::model::{CtrlMode, JointCtrl, PidGains};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Position gains for the steer axes - fast stiff response.
pub const STEER_GAINS: PidGains = PidGains {
    p: 1.0,
    i: 0.0,
    d: 0.0,
};

/// Position gains for the suspension shocks - stiff spring, light damping.
pub const SHOCK_GAINS: PidGains = PidGains {
    p: 200.0,
    i: 0.0,
    d: 2.0,
};

/// Velocity gains for the driven rear axles - damped integrator for speed
/// tracking.
pub const AXLE_GAINS: PidGains = PidGains {
    p: 0.1,
    i: 0.01,
    d: 0.0,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A single joint's controller parameters and current target.
#[derive(Debug, Clone)]
pub struct ControllerEntry {
    /// Name of the controlled joint in the host model
    pub joint: &'static str,

    /// PID gain triple, immutable once set
    pub gains: PidGains,

    /// Whether the target is a position or a velocity
    pub mode: CtrlMode,

    /// Current target value.
    ///
    /// Units: radians/meters for `Position`, radians/second for `Velocity`
    pub target: f64,
}

/// Role-keyed store of controller entries.
#[derive(Default)]
pub struct PidBank {
    entries: HashMap<JointRole, ControllerEntry>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by the bank.
#[derive(Debug, Error)]
pub enum PidBankError {
    #[error("No controller entry for role {0:?}")]
    NoEntry(JointRole),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PidBank {
    /// Register or replace the controller entry for a role.
    pub fn set(
        &mut self,
        role: JointRole,
        joint: &'static str,
        gains: PidGains,
        mode: CtrlMode,
        target: f64,
    ) {
        self.entries.insert(
            role,
            ControllerEntry {
                joint,
                gains,
                mode,
                target,
            },
        );
    }

    /// Update only the target of an existing entry.
    pub fn set_target(&mut self, role: JointRole, target: f64) -> Result<(), PidBankError> {
        match self.entries.get_mut(&role) {
            Some(entry) => {
                entry.target = target;
                Ok(())
            }
            None => Err(PidBankError::NoEntry(role)),
        }
    }

    /// Get the entry for a role, if one is registered.
    pub fn entry(&self, role: JointRole) -> Option<&ControllerEntry> {
        self.entries.get(&role)
    }

    /// Push every entry's gains to the host joint controller.
    ///
    /// Called once at load, after which gains are immutable.
    pub fn apply_gains_to(&self, jc: &dyn JointCtrl) {
        for entry in self.entries.values() {
            match entry.mode {
                CtrlMode::Position => jc.set_position_pid(entry.joint, entry.gains),
                CtrlMode::Velocity => jc.set_velocity_pid(entry.joint, entry.gains),
            }
        }
    }

    /// Push one entry's current target to the host joint controller.
    pub fn push_target(&self, role: JointRole, jc: &dyn JointCtrl) -> Result<(), PidBankError> {
        let entry = self
            .entries
            .get(&role)
            .ok_or(PidBankError::NoEntry(role))?;

        match entry.mode {
            CtrlMode::Position => jc.set_position_target(entry.joint, entry.target),
            CtrlMode::Velocity => jc.set_velocity_target(entry.joint, entry.target),
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_target_keeps_gains() {
        let mut bank = PidBank::default();
        bank.set(
            JointRole::StrFL,
            JointRole::StrFL.joint_name(),
            STEER_GAINS,
            CtrlMode::Position,
            0.0,
        );

        bank.set_target(JointRole::StrFL, 0.25).unwrap();

        let entry = bank.entry(JointRole::StrFL).unwrap();
        assert_eq!(entry.target, 0.25);
        assert_eq!(entry.gains, STEER_GAINS);
        assert_eq!(entry.mode, CtrlMode::Position);
    }

    #[test]
    fn test_set_target_unknown_role() {
        let mut bank = PidBank::default();

        assert!(matches!(
            bank.set_target(JointRole::AxleBL, 1.0),
            Err(PidBankError::NoEntry(JointRole::AxleBL))
        ));
    }
}
