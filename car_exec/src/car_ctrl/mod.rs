//! Car controller orchestrator module
//!
//! Ties the registry, bank, translator, clock and publisher together into the
//! per-step sequence driven by the host's update callback.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::joint_reg::JointRegError;
use crate::pid_bank::PidBankError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during CarCtrl initialisation.
///
/// All of these are fatal: the host must abort plugin registration.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid robot namespace {0:?}: only [A-Za-z0-9_/] is allowed")]
    InvalidNamespace(String),

    #[error("Failed to build the joint registry: {0}")]
    JointReg(#[from] JointRegError),

    #[error("Failed to seed the controller bank: {0}")]
    PidBank(#[from] PidBankError),
}

/// Possible errors that can occur during CarCtrl cyclic processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("CarCtrl has not been initialised")]
    NotInitialised,

    #[error("Simulation time is not finite: {0}")]
    NonFiniteSimTime(f64),

    #[error("Controller bank rejected a target: {0}")]
    PidBank(#[from] PidBankError),
}
