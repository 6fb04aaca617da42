//! # Channel endpoint traits
//!
//! The transport layer (whatever messaging middleware the host integration
//! provides) implements these traits and hands the endpoints to the
//! controller at load time. Delivery is at-most-once per send from the
//! controller's point of view: a failed send is dropped, never retried.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A typed telemetry send point.
pub trait TmSender<M> {
    /// Send a message over the channel.
    ///
    /// Must not block the caller. Failure reports are advisory only, the
    /// controller drops the message either way.
    fn send(&self, msg: &M) -> Result<(), ChanError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by channel endpoints.
#[derive(Debug, Error)]
pub enum ChanError {
    #[error("The channel endpoint is not connected")]
    NotConnected,

    #[error("The transport rejected the message: {0}")]
    SendError(String),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a channel topic name from a namespace prefix and a base name.
///
/// An empty namespace yields `/base`, otherwise `/ns/base`.
pub fn topic(namespace: &str, base: &str) -> String {
    let ns = namespace.trim_matches('/');

    if ns.is_empty() {
        format!("/{}", base)
    } else {
        format!("/{}/{}", ns, base)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_topic() {
        assert_eq!(topic("", "joint_states"), "/joint_states");
        assert_eq!(topic("car", "odo_fl"), "/car/odo_fl");
        assert_eq!(topic("/car/", "cmd_ackermann"), "/car/cmd_ackermann");
    }
}
