//! Implementations for the CarCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::{debug, info};
use std::rc::Rc;

// Internal
use super::{InitError, Params, ProcError};
use crate::cmd_trans::{self, CmdBuffer};
use crate::joint_reg::{JointReg, JointRole};
use crate::pid_bank::{PidBank, AXLE_GAINS, SHOCK_GAINS, STEER_GAINS};
use crate::sim_clock::SimClock;
use crate::telem_pub::{TelemChans, TelemPub};
use sim_if::model::{CtrlMode, JointCtrl, Model};
use util::{module::State, session::Session};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Suspension shocks regulate toward this rest position for the whole run.
const SHOCK_REST_POS: f64 = 0.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Car controller module state.
#[derive(Default)]
pub struct CarCtrl {
    params: Params,

    model: Option<Rc<dyn Model>>,
    joint_ctrl: Option<Rc<dyn JointCtrl>>,

    joint_reg: Option<JointReg>,
    pid_bank: PidBank,
    clock: SimClock,
    telem_pub: Option<TelemPub>,

    cmd_buffer: CmdBuffer,
}

/// Data required to initialise CarCtrl.
pub struct CarCtrlInitData {
    /// Controller parameters, loaded by the host integration
    pub params: Params,

    /// The host model capability object
    pub model: Rc<dyn Model>,

    /// The host joint controller capability object
    pub joint_ctrl: Rc<dyn JointCtrl>,

    /// Telemetry channel endpoints
    pub chans: TelemChans,
}

/// Input data for one CarCtrl step.
#[derive(Default)]
pub struct InputData {
    /// Current simulation time.
    ///
    /// Units: seconds
    pub sim_time_s: f64,
}

/// Output of one CarCtrl step.
#[derive(Debug, Default, Clone)]
pub struct OutputData {
    /// The per-role targets applied this step, if a command was pending
    pub targets_applied: Option<[(JointRole, f64); 4]>,

    /// True if joint state telemetry was emitted this step
    pub telem_published: bool,
}

/// Status report for CarCtrl processing.
#[derive(Debug, Default, Copy, Clone)]
pub struct StatusReport {
    /// True if a telemetry tick was due but the transport rejected the
    /// joint state message
    pub telem_dropped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for CarCtrl {
    type InitData = CarCtrlInitData;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ProcError;

    /// Initialise the car controller against the host model.
    ///
    /// Resolves every joint role, seeds the controller bank with the per-role
    /// gain sets and pushes them to the host joint controller. Any failure
    /// here is fatal and must abort plugin registration.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        info!("Loading car controller");

        if !init_data.params.namespace_is_valid() {
            return Err(InitError::InvalidNamespace(
                init_data.params.robot_namespace.clone(),
            ));
        }

        let model = init_data.model;
        let jc = init_data.joint_ctrl;

        info!("Connected to model {}", model.name());

        // Resolve all roles, fatal if any joint is missing
        let joint_reg = JointReg::build(model.as_ref())?;

        // Seed the bank: position control for steering and suspension,
        // velocity control for the driven rear axles. The free-rolling front
        // axles get no entry.
        for role in [JointRole::StrFL, JointRole::StrFR].iter() {
            self.pid_bank.set(
                *role,
                joint_reg.resolve(*role),
                STEER_GAINS,
                CtrlMode::Position,
                0.0,
            );
        }

        for role in [
            JointRole::ShockFL,
            JointRole::ShockFR,
            JointRole::ShockBL,
            JointRole::ShockBR,
        ]
        .iter()
        {
            self.pid_bank.set(
                *role,
                joint_reg.resolve(*role),
                SHOCK_GAINS,
                CtrlMode::Position,
                SHOCK_REST_POS,
            );
        }

        for role in [JointRole::AxleBL, JointRole::AxleBR].iter() {
            self.pid_bank.set(
                *role,
                joint_reg.resolve(*role),
                AXLE_GAINS,
                CtrlMode::Velocity,
                0.0,
            );
        }

        self.pid_bank.apply_gains_to(jc.as_ref());

        // The shocks hold their rest target for the whole run
        for role in [
            JointRole::ShockFL,
            JointRole::ShockFR,
            JointRole::ShockBL,
            JointRole::ShockBR,
        ]
        .iter()
        {
            self.pid_bank.push_target(*role, jc.as_ref())?;
        }

        self.clock = SimClock::new(init_data.params.update_period_ms);
        self.telem_pub = Some(TelemPub::new(init_data.chans));
        self.joint_reg = Some(joint_reg);
        self.model = Some(model);
        self.joint_ctrl = Some(jc);
        self.params = init_data.params;

        info!(
            "Car controller loaded, telemetry period {} ms",
            self.params.update_period_ms
        );

        Ok(())
    }

    /// Perform cyclic processing of the car controller.
    ///
    /// Invoked once per simulation step by the host. Applies any buffered
    /// drive command to the bank immediately, and emits telemetry when the
    /// clock reports a tick due. Never blocks.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut output = OutputData::default();
        let mut report = StatusReport::default();

        if !input_data.sim_time_s.is_finite() {
            return Err(ProcError::NonFiniteSimTime(input_data.sim_time_s));
        }

        let model = self.model.as_ref().ok_or(ProcError::NotInitialised)?;
        let jc = self.joint_ctrl.as_ref().ok_or(ProcError::NotInitialised)?;
        let joint_reg = self.joint_reg.as_ref().ok_or(ProcError::NotInitialised)?;
        let telem_pub = self.telem_pub.as_ref().ok_or(ProcError::NotInitialised)?;

        // First invocation only seeds the clock, no control or publish action
        let step = match self.clock.advance(input_data.sim_time_s) {
            Some(s) => s,
            None => return Ok((output, report)),
        };

        // Command application is not gated by the telemetry clock
        if let Some(cmd) = self.cmd_buffer.take() {
            let targets = cmd_trans::apply(&cmd);

            debug!(
                "Applying drive command: steer {} rad, speed {} m/s",
                cmd.steering_angle_rad, cmd.speed_ms
            );

            for (role, target) in targets.iter() {
                self.pid_bank.set_target(*role, *target)?;
                self.pid_bank.push_target(*role, jc.as_ref())?;
            }

            output.targets_applied = Some(targets);
        }

        if step.telem_due {
            let pub_report = telem_pub.publish(joint_reg, model.as_ref(), Utc::now());
            output.telem_published = pub_report.joint_states_sent;
            report.telem_dropped = !pub_report.joint_states_sent;
        }

        Ok((output, report))
    }
}

impl CarCtrl {
    /// A handle on the command mailbox for the transport's dispatch thread.
    ///
    /// Validated commands pushed here are applied on the next step. The
    /// handle only exists once init has succeeded, which is what makes
    /// receiving a command before load impossible.
    pub fn cmd_buffer(&self) -> CmdBuffer {
        self.cmd_buffer.clone()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd_trans::DriveCommand;
    use crate::sim_model::SimModel;
    use sim_if::chan::{ChanError, TmSender};
    use sim_if::msg::JointStateMsg;
    use std::cell::Cell;

    /// Sender double which counts accepted messages.
    struct CountingSender {
        count: Rc<Cell<u32>>,
    }

    impl<M> TmSender<M> for CountingSender {
        fn send(&self, _msg: &M) -> Result<(), ChanError> {
            self.count.set(self.count.get() + 1);
            Ok(())
        }
    }

    fn test_session() -> Session {
        Session {
            session_root: ".".into(),
            log_file_path: "test.log".into(),
        }
    }

    fn init_ctrl(model: &Rc<SimModel>) -> (CarCtrl, Rc<Cell<u32>>) {
        let js_count = Rc::new(Cell::new(0));

        let chans = TelemChans {
            joint_states: Box::new(CountingSender {
                count: js_count.clone(),
            }) as Box<dyn TmSender<JointStateMsg>>,
            odo_fl: None,
            odo_fr: None,
        };

        let mut ctrl = CarCtrl::default();
        ctrl.init(
            CarCtrlInitData {
                params: Params::default(),
                model: model.clone(),
                joint_ctrl: model.clone(),
                chans,
            },
            &test_session(),
        )
        .unwrap();

        (ctrl, js_count)
    }

    #[test]
    fn test_init_seeds_gains_and_shock_targets() {
        let model = Rc::new(SimModel::fake_car());
        let _ = init_ctrl(&model);

        assert_eq!(
            model.pos_gains("front_left_wheel_steer_joint"),
            Some(STEER_GAINS)
        );
        assert_eq!(model.pos_gains("back_right_shock_joint"), Some(SHOCK_GAINS));
        assert_eq!(model.vel_gains("back_left_wheel_joint"), Some(AXLE_GAINS));

        // Shock rest targets pushed at load, steering targets only on command
        assert_eq!(model.pos_target("front_left_shock_joint"), Some(0.0));
        assert_eq!(model.pos_target("front_left_wheel_steer_joint"), None);

        // The free-rolling front axles are unactuated
        assert_eq!(model.vel_target("front_left_wheel_joint"), None);
        assert_eq!(model.pos_target("front_left_wheel_joint"), None);
    }

    #[test]
    fn test_init_fails_on_missing_joint() {
        let model = Rc::new(SimModel::new("empty_car"));

        let chans = TelemChans {
            joint_states: Box::new(CountingSender {
                count: Rc::new(Cell::new(0)),
            }),
            odo_fl: None,
            odo_fr: None,
        };

        let mut ctrl = CarCtrl::default();
        let result = ctrl.init(
            CarCtrlInitData {
                params: Params::default(),
                model: model.clone(),
                joint_ctrl: model,
                chans,
            },
            &test_session(),
        );

        assert!(matches!(result, Err(InitError::JointReg(_))));
    }

    #[test]
    fn test_init_fails_on_malformed_namespace() {
        let model = Rc::new(SimModel::fake_car());

        let chans = TelemChans {
            joint_states: Box::new(CountingSender {
                count: Rc::new(Cell::new(0)),
            }),
            odo_fl: None,
            odo_fr: None,
        };

        let mut ctrl = CarCtrl::default();
        let result = ctrl.init(
            CarCtrlInitData {
                params: Params {
                    robot_namespace: String::from("bad ns"),
                    ..Params::default()
                },
                model: model.clone(),
                joint_ctrl: model,
                chans,
            },
            &test_session(),
        );

        assert!(matches!(result, Err(InitError::InvalidNamespace(_))));
    }

    #[test]
    fn test_command_applied_immediately_telemetry_gated() {
        let model = Rc::new(SimModel::fake_car());
        let (mut ctrl, js_count) = init_ctrl(&model);

        // Seeding step: no control, no telemetry
        let (output, _) = ctrl.proc(&InputData { sim_time_s: 0.0 }).unwrap();
        assert!(output.targets_applied.is_none());
        assert_eq!(js_count.get(), 0);

        // Command buffered, applied on the very next step even though the
        // 8 ms telemetry period has not elapsed
        ctrl.cmd_buffer().push(DriveCommand {
            steering_angle_rad: 0.3,
            speed_ms: 1.5,
        });

        let (output, _) = ctrl.proc(&InputData { sim_time_s: 0.004 }).unwrap();
        assert!(output.targets_applied.is_some());
        assert!(!output.telem_published);
        assert_eq!(js_count.get(), 0);

        assert_eq!(
            model.pos_target("front_left_wheel_steer_joint"),
            Some(0.3)
        );
        assert_eq!(
            model.pos_target("front_right_wheel_steer_joint"),
            Some(0.3)
        );
        assert_eq!(model.vel_target("back_left_wheel_joint"), Some(1.5));
        assert_eq!(model.vel_target("back_right_wheel_joint"), Some(1.5));

        // Shock targets untouched by the command
        assert_eq!(model.pos_target("back_left_shock_joint"), Some(0.0));

        // Telemetry fires once the period has elapsed
        let (output, report) = ctrl.proc(&InputData { sim_time_s: 0.008 }).unwrap();
        assert!(output.telem_published);
        assert!(!report.telem_dropped);
        assert_eq!(js_count.get(), 1);
    }

    #[test]
    fn test_no_command_leaves_targets_unchanged() {
        let model = Rc::new(SimModel::fake_car());
        let (mut ctrl, _) = init_ctrl(&model);

        ctrl.proc(&InputData { sim_time_s: 0.0 }).unwrap();
        ctrl.cmd_buffer().push(DriveCommand {
            steering_angle_rad: 0.3,
            speed_ms: 1.5,
        });
        ctrl.proc(&InputData { sim_time_s: 0.002 }).unwrap();

        // A rejected (non-finite) input never reaches the buffer, so further
        // steps keep the previous valid targets
        ctrl.proc(&InputData { sim_time_s: 0.004 }).unwrap();
        assert_eq!(
            model.pos_target("front_left_wheel_steer_joint"),
            Some(0.3)
        );
        assert_eq!(model.vel_target("back_left_wheel_joint"), Some(1.5));
    }

    #[test]
    fn test_non_finite_sim_time_is_an_error() {
        let model = Rc::new(SimModel::fake_car());
        let (mut ctrl, _) = init_ctrl(&model);

        assert!(matches!(
            ctrl.proc(&InputData {
                sim_time_s: f64::NAN
            }),
            Err(ProcError::NonFiniteSimTime(_))
        ));
    }

    #[test]
    fn test_proc_before_init_is_an_error() {
        let mut ctrl = CarCtrl::default();

        assert!(matches!(
            ctrl.proc(&InputData { sim_time_s: 0.0 }),
            Err(ProcError::NotInitialised)
        ));
    }
}
