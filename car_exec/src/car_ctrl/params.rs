//! Parameters structure for CarCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::sim_clock::DEF_UPDATE_PERIOD_MS;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the car controller.
///
/// These are the only externally configurable values; all PID gains are
/// compile-time constants per role class.
#[derive(Debug, Deserialize)]
pub struct Params {
    /// Namespace prefix applied to all channel topic names.
    ///
    /// May be empty. Only `[A-Za-z0-9_/]` characters are accepted.
    #[serde(default)]
    pub robot_namespace: String,

    /// Telemetry update period.
    ///
    /// Units: milliseconds
    #[serde(default = "def_update_period_ms")]
    pub update_period_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            robot_namespace: String::new(),
            update_period_ms: DEF_UPDATE_PERIOD_MS,
        }
    }
}

impl Params {
    /// Determine if the namespace prefix is well formed.
    pub fn namespace_is_valid(&self) -> bool {
        self.robot_namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/')
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn def_update_period_ms() -> u64 {
    DEF_UPDATE_PERIOD_MS
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: Params = util::params::from_str("").unwrap();

        assert_eq!(params.robot_namespace, "");
        assert_eq!(params.update_period_ms, DEF_UPDATE_PERIOD_MS);
    }

    #[test]
    fn test_namespace_validation() {
        let mut params = Params::default();
        assert!(params.namespace_is_valid());

        params.robot_namespace = String::from("fake_car");
        assert!(params.namespace_is_valid());

        params.robot_namespace = String::from("fake car!");
        assert!(!params.namespace_is_valid());
    }
}
