//! # Mock simulation host
//!
//! A minimal stand-in for the host simulation engine, implementing the
//! `sim_if` capability traits over a first-order joint model: position-mode
//! joints track their target exponentially (emulating the host's PID
//! actuation step) and velocity-mode joints integrate their rate target.
//!
//! Used by the demonstration binary and by tests; never by the controller
//! core itself, which only sees the traits.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// Internal
use sim_if::model::{Joint, JointCtrl, JointType, Model, PidGains, World};
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Position tracking rate of the emulated actuation step.
///
/// Units: 1/seconds
const POS_TRACK_RATE: f64 = 20.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A single mock joint.
pub struct SimJoint {
    name: String,
    jtype: JointType,
    pos: Cell<f64>,
}

/// Per-joint demands stored by the mock joint controller.
#[derive(Default, Clone, Copy)]
struct JointDemand {
    pos_gains: Option<PidGains>,
    vel_gains: Option<PidGains>,
    pos_target: Option<f64>,
    vel_target: Option<f64>,
}

/// A mock model/joint-controller/world rolled into one.
pub struct SimModel {
    name: String,
    joints: Vec<Rc<SimJoint>>,
    demands: RefCell<HashMap<String, JointDemand>>,
    sim_time_s: Cell<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Joint for SimJoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn joint_type(&self) -> JointType {
        self.jtype
    }

    fn position(&self) -> f64 {
        self.pos.get()
    }
}

impl SimModel {
    /// Create an empty model with the given name.
    pub fn new(name: &str) -> Self {
        SimModel {
            name: name.to_string(),
            joints: Vec::new(),
            demands: RefCell::new(HashMap::new()),
            sim_time_s: Cell::new(0.0),
        }
    }

    /// Add a joint to the model.
    pub fn add_joint(&mut self, name: &str, jtype: JointType) {
        self.joints.push(Rc::new(SimJoint {
            name: name.to_string(),
            jtype,
            pos: Cell::new(0.0),
        }));
    }

    /// Build the standard test vehicle: two steer joints, four shocks, four
    /// wheel axles and a fixed chassis weld.
    pub fn fake_car() -> Self {
        let mut model = SimModel::new("fake_car");

        model.add_joint("chassis_joint", JointType::Fixed);
        model.add_joint("front_left_wheel_steer_joint", JointType::Revolute);
        model.add_joint("front_right_wheel_steer_joint", JointType::Revolute);
        model.add_joint("front_left_shock_joint", JointType::Prismatic);
        model.add_joint("front_right_shock_joint", JointType::Prismatic);
        model.add_joint("back_left_shock_joint", JointType::Prismatic);
        model.add_joint("back_right_shock_joint", JointType::Prismatic);
        model.add_joint("front_left_wheel_joint", JointType::Continuous);
        model.add_joint("front_right_wheel_joint", JointType::Continuous);
        model.add_joint("back_left_wheel_joint", JointType::Continuous);
        model.add_joint("back_right_wheel_joint", JointType::Continuous);

        model
    }

    /// Advance the simulation by one step.
    pub fn step(&self, dt_s: f64) {
        let demands = self.demands.borrow();

        for joint in &self.joints {
            let demand = match demands.get(&joint.name) {
                Some(d) => *d,
                None => continue,
            };

            if let Some(target) = demand.vel_target {
                joint.pos.set(joint.pos.get() + target * dt_s);
            }

            if let Some(target) = demand.pos_target {
                let alpha = clamp(&(POS_TRACK_RATE * dt_s), &0.0, &1.0);
                let pos = joint.pos.get();
                joint.pos.set(pos + (target - pos) * alpha);
            }
        }

        self.sim_time_s.set(self.sim_time_s.get() + dt_s);
    }

    /// Directly set a joint's position, bypassing the actuation emulation.
    pub fn set_joint_position(&self, name: &str, pos: f64) {
        if let Some(joint) = self.joints.iter().find(|j| j.name == name) {
            joint.pos.set(pos);
        }
    }

    /// The position target last demanded for a joint, if any.
    pub fn pos_target(&self, name: &str) -> Option<f64> {
        self.demands.borrow().get(name).and_then(|d| d.pos_target)
    }

    /// The velocity target last demanded for a joint, if any.
    pub fn vel_target(&self, name: &str) -> Option<f64> {
        self.demands.borrow().get(name).and_then(|d| d.vel_target)
    }

    /// The position-mode gains last set for a joint, if any.
    pub fn pos_gains(&self, name: &str) -> Option<PidGains> {
        self.demands.borrow().get(name).and_then(|d| d.pos_gains)
    }

    /// The velocity-mode gains last set for a joint, if any.
    pub fn vel_gains(&self, name: &str) -> Option<PidGains> {
        self.demands.borrow().get(name).and_then(|d| d.vel_gains)
    }

    fn demand_mut(&self, name: &str) -> std::cell::RefMut<HashMap<String, JointDemand>> {
        let mut demands = self.demands.borrow_mut();
        demands.entry(name.to_string()).or_default();
        demands
    }
}

impl Model for SimModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn joints(&self) -> Vec<Rc<dyn Joint>> {
        self.joints
            .iter()
            .map(|j| j.clone() as Rc<dyn Joint>)
            .collect()
    }

    fn joint(&self, name: &str) -> Option<Rc<dyn Joint>> {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .map(|j| j.clone() as Rc<dyn Joint>)
    }
}

impl JointCtrl for SimModel {
    fn set_position_pid(&self, joint: &str, gains: PidGains) {
        if let Some(d) = self.demand_mut(joint).get_mut(joint) {
            d.pos_gains = Some(gains);
        }
    }

    fn set_velocity_pid(&self, joint: &str, gains: PidGains) {
        if let Some(d) = self.demand_mut(joint).get_mut(joint) {
            d.vel_gains = Some(gains);
        }
    }

    fn set_position_target(&self, joint: &str, target: f64) {
        if let Some(d) = self.demand_mut(joint).get_mut(joint) {
            d.pos_target = Some(target);
        }
    }

    fn set_velocity_target(&self, joint: &str, target: f64) {
        if let Some(d) = self.demand_mut(joint).get_mut(joint) {
            d.vel_target = Some(target);
        }
    }
}

impl World for SimModel {
    fn sim_time_s(&self) -> f64 {
        self.sim_time_s.get()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_velocity_integration() {
        let model = SimModel::fake_car();

        model.set_velocity_target("back_left_wheel_joint", 2.0);

        for _ in 0..100 {
            model.step(0.01);
        }

        let pos = model.joint("back_left_wheel_joint").unwrap().position();
        assert!((pos - 2.0).abs() < 1e-9);
        assert!((model.sim_time_s() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_tracking_converges() {
        let model = SimModel::fake_car();

        model.set_position_target("front_left_wheel_steer_joint", 0.3);

        for _ in 0..200 {
            model.step(0.01);
        }

        let pos = model
            .joint("front_left_wheel_steer_joint")
            .unwrap()
            .position();
        assert!((pos - 0.3).abs() < 1e-6);
    }
}
