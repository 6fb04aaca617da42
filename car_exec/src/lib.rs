//! # Car controller library.
//!
//! This library binds a host simulation's vehicle model (joints and PID
//! actuation) to an external command/telemetry interface: a fixed-cadence
//! closed-loop joint-control and telemetry core driven by the host's per-step
//! update callback.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Controller orchestrator - drives the per-step control and telemetry sequence
pub mod car_ctrl;

/// Command translator - converts joystick/drive messages into per-joint targets
pub mod cmd_trans;

/// Joint registry - resolves actuator joints by logical role
pub mod joint_reg;

/// PID controller bank - per-joint gains, mode and target store
pub mod pid_bank;

/// Simulation clock adapter - fixed-period telemetry gating over sim time
pub mod sim_clock;

/// Mock simulation host - first-order joint model for the demo and tests
pub mod sim_model;

/// Telemetry publisher - joint state snapshots and odometry counters
pub mod telem_pub;
