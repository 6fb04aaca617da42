//! # Telemetry publisher
//!
//! Snapshots the live positions of all discovered joints and emits them as a
//! joint state message, plus derived odometry tick counters for the front
//! wheels. Emission is fire-and-forget: a failed send is logged and dropped,
//! never retried.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::warn;

// Internal
use crate::joint_reg::{JointReg, JointRole};
use sim_if::chan::TmSender;
use sim_if::model::Model;
use sim_if::msg::{JointStateMsg, OdoMsg};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Encoder ticks per full wheel revolution for the odometry counters.
pub const ODO_TICKS_PER_REV: f64 = 24.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The telemetry channel endpoints handed over by the transport at load time.
pub struct TelemChans {
    /// Joint state channel (reliable, last value retained by the transport)
    pub joint_states: Box<dyn TmSender<JointStateMsg>>,

    /// Front left odometry counter channel, best-effort
    pub odo_fl: Option<Box<dyn TmSender<OdoMsg>>>,

    /// Front right odometry counter channel, best-effort
    pub odo_fr: Option<Box<dyn TmSender<OdoMsg>>>,
}

/// Telemetry publisher module.
pub struct TelemPub {
    chans: TelemChans,
}

/// Per-publish report of what was actually emitted.
#[derive(Debug, Default, Copy, Clone)]
pub struct PublishReport {
    /// True if the joint state message was accepted by the transport
    pub joint_states_sent: bool,

    /// Number of odometry messages accepted by the transport
    pub odo_sent: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TelemPub {
    /// Create the publisher over the given channel endpoints.
    pub fn new(chans: TelemChans) -> Self {
        TelemPub { chans }
    }

    /// Snapshot all discovered joints and publish the telemetry.
    pub fn publish(
        &self,
        reg: &JointReg,
        model: &dyn Model,
        stamp: DateTime<Utc>,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        let mut msg = JointStateMsg {
            stamp,
            name: Vec::with_capacity(reg.discovered().len()),
            position: Vec::with_capacity(reg.discovered().len()),
        };

        // Read every position at this one instant, in discovery order
        for name in reg.discovered() {
            if let Some(joint) = model.joint(name) {
                msg.name.push(name.clone());
                msg.position.push(joint.position());
            }
        }

        match self.chans.joint_states.send(&msg) {
            Ok(()) => report.joint_states_sent = true,
            Err(e) => warn!("Failed to publish joint states, dropping: {}", e),
        }

        // Odometry counters for the free-rolling front wheels
        if let Some(sender) = &self.chans.odo_fl {
            if Self::send_odo(sender.as_ref(), reg, model, JointRole::AxleFL) {
                report.odo_sent += 1;
            }
        }
        if let Some(sender) = &self.chans.odo_fr {
            if Self::send_odo(sender.as_ref(), reg, model, JointRole::AxleFR) {
                report.odo_sent += 1;
            }
        }

        report
    }

    fn send_odo(
        sender: &dyn TmSender<OdoMsg>,
        reg: &JointReg,
        model: &dyn Model,
        role: JointRole,
    ) -> bool {
        let joint = match model.joint(reg.resolve(role)) {
            Some(j) => j,
            None => return false,
        };

        let msg = OdoMsg {
            ticks: position_to_ticks(joint.position()),
        };

        match sender.send(&msg) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to publish odometry for {:?}, dropping: {}", role, e);
                false
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert an axle position into an accumulated encoder tick count.
///
/// Signed, so reverse motion counts down.
pub fn position_to_ticks(pos_rad: f64) -> i32 {
    (pos_rad / std::f64::consts::TAU * ODO_TICKS_PER_REV).floor() as i32
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim_model::SimModel;
    use sim_if::chan::ChanError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sender double which records every message it is given.
    struct RecordingSender<M: Clone> {
        sent: Rc<RefCell<Vec<M>>>,
        fail: bool,
    }

    impl<M: Clone> TmSender<M> for RecordingSender<M> {
        fn send(&self, msg: &M) -> Result<(), ChanError> {
            if self.fail {
                return Err(ChanError::NotConnected);
            }
            self.sent.borrow_mut().push(msg.clone());
            Ok(())
        }
    }

    fn chans(
        fail: bool,
    ) -> (
        TelemChans,
        Rc<RefCell<Vec<JointStateMsg>>>,
        Rc<RefCell<Vec<OdoMsg>>>,
    ) {
        let js_sent = Rc::new(RefCell::new(Vec::new()));
        let odo_sent = Rc::new(RefCell::new(Vec::new()));

        let chans = TelemChans {
            joint_states: Box::new(RecordingSender {
                sent: js_sent.clone(),
                fail,
            }),
            odo_fl: Some(Box::new(RecordingSender {
                sent: odo_sent.clone(),
                fail,
            })),
            odo_fr: Some(Box::new(RecordingSender {
                sent: odo_sent.clone(),
                fail,
            })),
        };

        (chans, js_sent, odo_sent)
    }

    #[test]
    fn test_snapshot_excludes_fixed_joints() {
        let model = SimModel::fake_car();
        let reg = JointReg::build(&model).unwrap();
        let (chans, js_sent, _odo) = chans(false);

        let report = TelemPub::new(chans).publish(&reg, &model, Utc::now());

        assert!(report.joint_states_sent);
        assert_eq!(report.odo_sent, 2);

        let sent = js_sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name.len(), 10);
        assert!(!sent[0].name.iter().any(|n| n == "chassis_joint"));
        assert_eq!(sent[0].name.len(), sent[0].position.len());
    }

    #[test]
    fn test_publish_failure_is_dropped() {
        let model = SimModel::fake_car();
        let reg = JointReg::build(&model).unwrap();
        let (chans, js_sent, odo_sent) = chans(true);

        let report = TelemPub::new(chans).publish(&reg, &model, Utc::now());

        assert!(!report.joint_states_sent);
        assert_eq!(report.odo_sent, 0);
        assert!(js_sent.borrow().is_empty());
        assert!(odo_sent.borrow().is_empty());
    }

    #[test]
    fn test_position_to_ticks() {
        assert_eq!(position_to_ticks(0.0), 0);
        assert_eq!(position_to_ticks(std::f64::consts::TAU), 24);
        assert_eq!(position_to_ticks(std::f64::consts::PI), 12);
        assert_eq!(position_to_ticks(-std::f64::consts::TAU), -24);
    }

    #[test]
    fn test_snapshot_reads_live_positions() {
        let model = SimModel::fake_car();
        let reg = JointReg::build(&model).unwrap();
        let (chans, js_sent, _odo) = chans(false);

        model.set_joint_position("front_left_wheel_steer_joint", 0.42);

        TelemPub::new(chans).publish(&reg, &model, Utc::now());

        let sent = js_sent.borrow();
        let idx = sent[0]
            .name
            .iter()
            .position(|n| n == "front_left_wheel_steer_joint")
            .unwrap();
        assert_eq!(sent[0].position[idx], 0.42);
    }
}
