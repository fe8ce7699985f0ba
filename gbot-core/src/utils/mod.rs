//! Utility re-exports for the gesture bot.
//!
//! - `config`: compile-time tunables shared by both nodes
//! - `gesture`: sensor samples, gesture labels and the threshold classifier
//! - `connection`: broker session state machine, publisher, receiver and the
//!   wire tokens exchanged between nodes
//! - `controllers`: IMU and motor capabilities, their I2C adapters, the
//!   actuation step, and the glove/robot node drivers

pub mod config;
pub mod connection;
pub mod controllers;
pub mod gesture;

pub use config::Timing;
pub use connection::{
    publisher::CommandPublisher,
    receiver::{Command, CommandReceiver, CommandSlot},
    session::{ConnectionState, Session},
    MessageBus, NetworkLink,
};
pub use controllers::{
    actuation::ActuationLoop,
    node::{halt, GloveNode, RobotNode, SelfTestFailed},
    Imu, MotorActuator,
};
pub use embassy_time::{Delay, Duration};
pub use gesture::{classify, Gesture, GestureSample};
