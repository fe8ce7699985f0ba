//! Hardware-facing capabilities and the loops that drive them.
//!
//! - `imu`: ICM-42670 adapter implementing [`Imu`]
//! - `motor`: PCA9685 H-bridge adapter implementing [`MotorActuator`]
//! - `actuation`: robot-side command-to-motor step
//! - `node`: glove and robot node drivers

pub mod actuation;
pub mod imu;
pub mod motor;
pub mod node;

use crate::utils::gesture::GestureSample;

/// Inertial sensor on the glove.
pub trait Imu {
    /// Startup self-test. A failure is fatal for the node.
    fn self_test(&mut self) -> bool;

    /// Read one motion sample in raw counts.
    fn read_motion(&mut self) -> GestureSample;
}

/// Differential motor drive on the robot. Every call is fire-and-forget.
pub trait MotorActuator {
    fn forward(&mut self);
    fn backward(&mut self);
    fn turn_left(&mut self);
    fn turn_right(&mut self);
    fn stop(&mut self);
}

impl<M: MotorActuator + ?Sized> MotorActuator for &mut M {
    fn forward(&mut self) {
        (**self).forward()
    }

    fn backward(&mut self) {
        (**self).backward()
    }

    fn turn_left(&mut self) {
        (**self).turn_left()
    }

    fn turn_right(&mut self) {
        (**self).turn_right()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
