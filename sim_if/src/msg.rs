//! # Command and telemetry message types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint state telemetry emitted at the fixed update cadence.
///
/// `name` and `position` are parallel arrays in joint discovery order, taken
/// at one instant. Fixed joints are never included.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JointStateMsg {
    /// Time at which the snapshot was taken
    pub stamp: DateTime<Utc>,

    /// Joint names, in discovery order
    pub name: Vec<String>,

    /// Joint positions.
    ///
    /// Units: radians (revolute/continuous) or meters (prismatic)
    pub position: Vec<f64>,
}

/// A structured drive demand.
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct AckermannDemandMsg {
    /// Time at which the demand was issued
    pub stamp: DateTime<Utc>,

    /// Demanded steer angle for the front wheels.
    ///
    /// Units: radians, positive to the left
    pub steering_angle_rad: f64,

    /// Demanded speed of the vehicle body.
    ///
    /// Units: meters/second, positive forwards
    pub speed_ms: f64,
}

/// A raw joystick input.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JoyMsg {
    /// Normalised axis values in the range [-1, +1]
    pub axes: Vec<f64>,
}

/// A scalar odometry counter, emitted best-effort per wheel.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub struct OdoMsg {
    /// Accumulated encoder ticks, signed so reverse motion counts down
    pub ticks: i32,
}
