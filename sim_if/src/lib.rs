//! # Simulation interface library
//!
//! Defines the boundary between the car controller and its host simulation:
//! capability traits for the host-owned model (joints, joint controller,
//! world clock) and the typed messages exchanged over the command/telemetry
//! channels.
//!
//! The controller core never talks to a concrete simulator or transport, only
//! to these traits, so both can be substituted with test doubles.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Channel endpoint traits - typed send points for telemetry emission
pub mod chan;

/// Host model capability traits - joints, joint controller and world clock
pub mod model;

/// Message types exchanged over the command and telemetry channels
pub mod msg;
