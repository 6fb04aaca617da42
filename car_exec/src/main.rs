//! Car controller demonstration executable.
//!
//! # Architecture
//!
//! Stands in for the host simulation: builds the mock vehicle model, loads
//! the car controller against it exactly as a host integration would, then
//! drives the controller's step function from a fixed-step simulation loop
//! while injecting scripted drive commands.
//!
//! The controller itself never sees this executable, only the `sim_if`
//! capability traits and channel endpoints it is handed at load.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, trace, warn};
use std::cell::Cell;
use std::rc::Rc;

// Internal
use car_lib::{
    car_ctrl::{CarCtrl, CarCtrlInitData, InputData, Params},
    cmd_trans,
    sim_model::SimModel,
    telem_pub::TelemChans,
};
use sim_if::{
    chan::{self, ChanError, TmSender},
    model::{Model, World},
    msg::{AckermannDemandMsg, JoyMsg},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Simulation step period.
///
/// Units: seconds
const SIM_STEP_S: f64 = 0.002;

/// Number of simulation steps to run.
const NUM_STEPS: u64 = 1500;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Demo channel endpoint: logs each message at trace level and counts sends.
struct LogSender {
    topic: String,
    count: Rc<Cell<u64>>,
}

impl<M: std::fmt::Debug> TmSender<M> for LogSender {
    fn send(&self, msg: &M) -> Result<(), ChanError> {
        trace!("{} <- {:?}", self.topic, msg);
        self.count.set(self.count.get() + 1);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Car Controller Demo Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params =
        util::params::load("car_ctrl.toml").wrap_err("Could not load car_ctrl params")?;

    info!("Exec parameters loaded");

    // ---- BUILD THE MOCK HOST ----

    let model = Rc::new(SimModel::fake_car());

    let namespace = if params.robot_namespace.is_empty() {
        model.name().to_string()
    } else {
        params.robot_namespace.clone()
    };

    let joint_states_count = Rc::new(Cell::new(0));
    let odo_count = Rc::new(Cell::new(0));

    let chans = TelemChans {
        joint_states: Box::new(LogSender {
            topic: chan::topic(&namespace, "joint_states"),
            count: joint_states_count.clone(),
        }),
        odo_fl: Some(Box::new(LogSender {
            topic: chan::topic(&namespace, "odo_fl"),
            count: odo_count.clone(),
        })),
        odo_fr: Some(Box::new(LogSender {
            topic: chan::topic(&namespace, "odo_fr"),
            count: odo_count.clone(),
        })),
    };

    // ---- INITIALISE THE CONTROLLER ----

    let mut car_ctrl = CarCtrl::default();

    car_ctrl
        .init(
            CarCtrlInitData {
                params,
                model: model.clone(),
                joint_ctrl: model.clone(),
                chans,
            },
            &session,
        )
        .wrap_err("Failed to initialise CarCtrl")?;

    info!("CarCtrl init complete\n");

    // Command subscriptions only exist from this point on
    let cmd_buffer = car_ctrl.cmd_buffer();

    // ---- MAIN LOOP ----

    for step in 0..NUM_STEPS {
        model.step(SIM_STEP_S);

        // Scripted inputs: a structured drive demand early on, a malformed
        // demand which must be rejected, then a joystick input
        match step {
            250 => {
                let msg = AckermannDemandMsg {
                    stamp: *util::session::get_epoch(),
                    steering_angle_rad: 0.3,
                    speed_ms: 1.5,
                };
                match cmd_trans::from_drive_msg(&msg) {
                    Ok(cmd) => cmd_buffer.push(cmd),
                    Err(e) => warn!("Rejecting drive command: {}", e),
                }
            }
            750 => {
                let msg = AckermannDemandMsg {
                    stamp: *util::session::get_epoch(),
                    steering_angle_rad: f64::NAN,
                    speed_ms: 2.0,
                };
                match cmd_trans::from_drive_msg(&msg) {
                    Ok(cmd) => cmd_buffer.push(cmd),
                    Err(e) => warn!("Rejecting drive command: {}", e),
                }
            }
            1000 => {
                let msg = JoyMsg {
                    axes: vec![-0.5, 0.25],
                };
                match cmd_trans::from_joy(&msg) {
                    Ok(cmd) => cmd_buffer.push(cmd),
                    Err(e) => warn!("Rejecting joystick input: {}", e),
                }
            }
            _ => (),
        }

        car_ctrl
            .proc(&InputData {
                sim_time_s: model.sim_time_s(),
            })
            .wrap_err("CarCtrl processing failed")?;
    }

    // ---- SUMMARY ----

    info!("Demo complete after {:.3} s of simulation", model.sim_time_s());
    info!(
        "    Joint state messages: {} ({} odometry)",
        joint_states_count.get(),
        odo_count.get()
    );

    if let Some(joint) = model.joint("front_left_wheel_steer_joint") {
        info!("    Front left steer position: {:.4} rad", joint.position());
    }
    if let Some(joint) = model.joint("back_left_wheel_joint") {
        info!("    Back left wheel position: {:.4} rad", joint.position());
    }

    Ok(())
}
