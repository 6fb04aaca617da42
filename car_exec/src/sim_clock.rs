//! # Simulation clock adapter
//!
//! Tracks simulation time across the host's update callbacks and decides when
//! a fixed-period telemetry tick is due, independent of the (typically much
//! faster) simulation step cadence.

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default telemetry update period, roughly 125 Hz.
///
/// Units: milliseconds
pub const DEF_UPDATE_PERIOD_MS: u64 = 8;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One-shot clock state: the first invocation only seeds the time baselines.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ClockState {
    Uninitialized,
    Running,
}

impl Default for ClockState {
    fn default() -> Self {
        ClockState::Uninitialized
    }
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Fixed-period telemetry gate over simulation time.
#[derive(Debug)]
pub struct SimClock {
    state: ClockState,

    /// Simulation time at the previous invocation.
    ///
    /// Units: seconds
    last_sim_time_s: f64,

    /// Simulation time at which telemetry last fired.
    ///
    /// Units: seconds
    last_update_time_s: f64,

    /// Telemetry period.
    ///
    /// Units: milliseconds
    update_period_ms: u64,
}

/// The result of advancing the clock by one invocation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockStep {
    /// Simulation time elapsed since the previous invocation.
    ///
    /// Informational, available for future integrators.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// True if a telemetry tick is due on this invocation.
    pub telem_due: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for SimClock {
    fn default() -> Self {
        SimClock::new(DEF_UPDATE_PERIOD_MS)
    }
}

impl SimClock {
    /// Create a new clock with the given telemetry period in milliseconds.
    pub fn new(update_period_ms: u64) -> Self {
        SimClock {
            state: ClockState::Uninitialized,
            last_sim_time_s: 0.0,
            last_update_time_s: 0.0,
            update_period_ms,
        }
    }

    /// Advance the clock to the given simulation time.
    ///
    /// The very first invocation seeds both time baselines and returns `None`:
    /// no delta can be computed against an unseeded clock and no telemetry may
    /// fire. Every later invocation returns the elapsed delta and whether a
    /// telemetry tick is due, resetting the telemetry baseline when it fires.
    pub fn advance(&mut self, cur_time_s: f64) -> Option<ClockStep> {
        if self.state == ClockState::Uninitialized {
            self.last_sim_time_s = cur_time_s;
            self.last_update_time_s = cur_time_s;
            self.state = ClockState::Running;
            return None;
        }

        let dt_s = cur_time_s - self.last_sim_time_s;
        let update_dt_s = cur_time_s - self.last_update_time_s;

        let telem_due = update_dt_s * 1000.0 >= self.update_period_ms as f64;
        if telem_due {
            self.last_update_time_s = cur_time_s;
        }

        self.last_sim_time_s = cur_time_s;

        Some(ClockStep { dt_s, telem_due })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_invocation_only_seeds() {
        let mut clock = SimClock::default();

        assert_eq!(clock.advance(5.0), None);

        // Second invocation computes a delta against the seeded baseline, not
        // against zero
        let step = clock.advance(5.004).unwrap();
        assert!((step.dt_s - 0.004).abs() < 1e-12);
        assert!(!step.telem_due);
    }

    #[test]
    fn test_fires_every_second_5ms_tick_at_8ms_period() {
        let mut clock = SimClock::new(8);

        assert_eq!(clock.advance(0.0), None);

        // 5 ms ticks: cumulative 5, 10, 5, 10, ... ms since the last fire
        let expected = [false, true, false, true, false, true];

        for (i, expect_due) in expected.iter().enumerate() {
            let t = 0.005 * (i + 1) as f64;
            let step = clock.advance(t).unwrap();
            assert_eq!(step.telem_due, *expect_due, "tick at t = {}", t);
        }
    }

    #[test]
    fn test_at_most_once_below_period() {
        let mut clock = SimClock::new(8);

        clock.advance(0.010);

        // Three times each spaced below the period: at most one fire in total
        let fires = [0.013, 0.016, 0.019]
            .iter()
            .filter(|t| clock.advance(**t).unwrap().telem_due)
            .count();

        assert!(fires <= 1);
    }

    #[test]
    fn test_exact_period_boundary_fires() {
        let mut clock = SimClock::new(8);

        clock.advance(0.0);
        assert!(clock.advance(0.008).unwrap().telem_due);

        // Baseline reset on fire: the next 4 ms tick is not due
        assert!(!clock.advance(0.012).unwrap().telem_due);
    }
}
