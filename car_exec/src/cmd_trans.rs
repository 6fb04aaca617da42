//! # Command translator
//!
//! Converts external drive inputs (raw joystick axes or structured drive
//! demands) into the unified [`DriveCommand`] shape, and derives the per-role
//! joint targets from it. Malformed inputs are rejected here so that
//! non-finite values never reach the controller bank.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::sync::{Arc, Mutex};
use thiserror::Error;

// Internal
use crate::joint_reg::JointRole;
use sim_if::msg::{AckermannDemandMsg, JoyMsg};
use util::maths::{clamp, deadzone};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Joystick axis mapped to the steering angle.
pub const JOY_STEER_AXIS: usize = 0;

/// Joystick axis mapped to the speed demand.
pub const JOY_SPEED_AXIS: usize = 1;

/// Deadzone applied to both joystick axes.
pub const JOY_DEADZONE: f64 = 0.05;

/// Steer angle demanded at full joystick deflection.
///
/// Units: radians
pub const JOY_MAX_STEER_RAD: f64 = 0.6;

/// Speed demanded at full joystick deflection.
///
/// Units: meters/second
pub const JOY_MAX_SPEED_MS: f64 = 8.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The unified drive command both input sources are translated into.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DriveCommand {
    /// Demanded steer angle for both front wheels.
    ///
    /// Units: radians, positive to the left
    pub steering_angle_rad: f64,

    /// Demanded speed, passed through as the rear wheel velocity target.
    ///
    /// Units: meters/second, positive forwards
    pub speed_ms: f64,
}

/// Latest-wins mailbox between the transport's dispatch thread and the step.
///
/// The transport writes each validated command here from its own thread; the
/// orchestrator drains it under the same lock on the next step.
#[derive(Clone, Default)]
pub struct CmdBuffer {
    inner: Arc<Mutex<Option<DriveCommand>>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised while translating an input.
#[derive(Debug, Error)]
pub enum CmdTransError {
    #[error("Input contains a non-finite value: {0}")]
    NonFiniteInput(f64),

    #[error("Joystick message has {found} axes, need at least {needed}")]
    MissingAxes { needed: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveCommand {
    /// Determine if the command is valid (i.e. all values are finite).
    pub fn is_valid(&self) -> bool {
        self.steering_angle_rad.is_finite() && self.speed_ms.is_finite()
    }
}

impl CmdBuffer {
    /// Store a command, replacing any not-yet-consumed one.
    pub fn push(&self, cmd: DriveCommand) {
        *self.lock() = Some(cmd);
    }

    /// Take the buffered command, if any.
    pub fn take(&self) -> Option<DriveCommand> {
        self.lock().take()
    }

    fn lock(&self) -> std::sync::MutexGuard<Option<DriveCommand>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A writer panicking mid-store cannot leave a partial command,
            // the slot always holds either the old or the new value
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Translate a raw joystick message into a drive command.
///
/// Applies the deadzone and scales full deflection to the maximum steer angle
/// and speed.
pub fn from_joy(msg: &JoyMsg) -> Result<DriveCommand, CmdTransError> {
    let needed = JOY_STEER_AXIS.max(JOY_SPEED_AXIS) + 1;

    if msg.axes.len() < needed {
        return Err(CmdTransError::MissingAxes {
            needed,
            found: msg.axes.len(),
        });
    }

    let steer_axis = validate(msg.axes[JOY_STEER_AXIS])?;
    let speed_axis = validate(msg.axes[JOY_SPEED_AXIS])?;

    let steer_axis = clamp(&deadzone(steer_axis, JOY_DEADZONE), &-1.0, &1.0);
    let speed_axis = clamp(&deadzone(speed_axis, JOY_DEADZONE), &-1.0, &1.0);

    Ok(DriveCommand {
        steering_angle_rad: steer_axis * JOY_MAX_STEER_RAD,
        speed_ms: speed_axis * JOY_MAX_SPEED_MS,
    })
}

/// Translate a structured drive demand into a drive command.
pub fn from_drive_msg(msg: &AckermannDemandMsg) -> Result<DriveCommand, CmdTransError> {
    Ok(DriveCommand {
        steering_angle_rad: validate(msg.steering_angle_rad)?,
        speed_ms: validate(msg.speed_ms)?,
    })
}

/// Derive the per-role joint targets from a drive command.
///
/// Both front steer joints get the same steer angle (no Ackermann
/// correction), both rear axles get the same speed (no differential). Shocks
/// and the free-rolling front axles are never driven by commands.
pub fn apply(cmd: &DriveCommand) -> [(JointRole, f64); 4] {
    [
        (JointRole::StrFL, cmd.steering_angle_rad),
        (JointRole::StrFR, cmd.steering_angle_rad),
        (JointRole::AxleBL, cmd.speed_ms),
        (JointRole::AxleBR, cmd.speed_ms),
    ]
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn validate(value: f64) -> Result<f64, CmdTransError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CmdTransError::NonFiniteInput(value))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_apply_targets() {
        let cmd = DriveCommand {
            steering_angle_rad: 0.3,
            speed_ms: 1.5,
        };

        assert_eq!(
            apply(&cmd),
            [
                (JointRole::StrFL, 0.3),
                (JointRole::StrFR, 0.3),
                (JointRole::AxleBL, 1.5),
                (JointRole::AxleBR, 1.5),
            ]
        );
    }

    #[test]
    fn test_from_drive_msg_rejects_non_finite() {
        let msg = AckermannDemandMsg {
            stamp: Utc::now(),
            steering_angle_rad: f64::NAN,
            speed_ms: 1.0,
        };

        assert!(matches!(
            from_drive_msg(&msg),
            Err(CmdTransError::NonFiniteInput(_))
        ));

        let msg = AckermannDemandMsg {
            stamp: Utc::now(),
            steering_angle_rad: 0.1,
            speed_ms: f64::INFINITY,
        };

        assert!(matches!(
            from_drive_msg(&msg),
            Err(CmdTransError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn test_from_joy_deadzone_and_scaling() {
        // Inside the deadzone - no demand
        let cmd = from_joy(&JoyMsg {
            axes: vec![0.02, -0.02],
        })
        .unwrap();
        assert_eq!(cmd.steering_angle_rad, 0.0);
        assert_eq!(cmd.speed_ms, 0.0);

        // Full deflection - maximum demand
        let cmd = from_joy(&JoyMsg {
            axes: vec![1.0, -1.0],
        })
        .unwrap();
        assert_eq!(cmd.steering_angle_rad, JOY_MAX_STEER_RAD);
        assert_eq!(cmd.speed_ms, -JOY_MAX_SPEED_MS);
    }

    #[test]
    fn test_from_joy_too_few_axes() {
        assert!(matches!(
            from_joy(&JoyMsg { axes: vec![0.5] }),
            Err(CmdTransError::MissingAxes { needed: 2, found: 1 })
        ));
    }

    #[test]
    fn test_from_joy_non_finite_axis() {
        assert!(matches!(
            from_joy(&JoyMsg {
                axes: vec![f64::NAN, 0.0]
            }),
            Err(CmdTransError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn test_cmd_buffer_latest_wins() {
        let buf = CmdBuffer::default();

        buf.push(DriveCommand {
            steering_angle_rad: 0.1,
            speed_ms: 1.0,
        });
        buf.push(DriveCommand {
            steering_angle_rad: 0.2,
            speed_ms: 2.0,
        });

        assert_eq!(
            buf.take(),
            Some(DriveCommand {
                steering_angle_rad: 0.2,
                speed_ms: 2.0,
            })
        );
        assert_eq!(buf.take(), None);
    }
}
