//! PCA9685-driven differential drive for the robot.
//!
//! Each side of the robot is one H-bridge channel pair on the PWM expander:
//! a phase channel selecting direction and an enable channel carrying the
//! duty cycle.

use embedded_hal::i2c::I2c;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::MotorActuator;
use crate::utils::config::{DRIVE_DUTY, PWM_ADDRESS, PWM_PRESCALE};

const MAX_DUTY: u16 = 4095;

/// Errors raised by the drive adapter.
#[derive(Debug)]
pub enum DriveError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
}

/// Two-sided motor drive on a PCA9685.
pub struct DifferentialDrive<P> {
    pwm: Pca9685<P>,
    /// `(phase, enable)` for the left and right side.
    sides: [(Channel, Channel); 2],
    duty: f32,
}

impl<P, E> DifferentialDrive<P>
where
    P: I2c<Error = E>,
    E: core::fmt::Debug,
{
    /// Attach to the expander at the default address.
    pub fn new(i2c: P) -> Result<Self, DriveError<E>> {
        let pwm =
            Pca9685::new(i2c, PwmAddress::from(PWM_ADDRESS)).map_err(DriveError::PwmError)?;
        Ok(Self::from_pwm(pwm))
    }

    pub fn from_pwm(pwm: Pca9685<P>) -> Self {
        Self {
            pwm,
            sides: [(Channel::C6, Channel::C7), (Channel::C2, Channel::C3)],
            duty: DRIVE_DUTY,
        }
    }

    /// Scale applied to both sides, clamped to `0.0..=1.0`.
    pub fn with_duty(
        mut self,
        duty: f32,
    ) -> Self {
        self.duty = duty.clamp(0.0, 1.0);
        self
    }

    /// Enable the expander and set its output prescale.
    pub fn configure(&mut self) -> Result<(), DriveError<E>> {
        self.pwm.enable().map_err(DriveError::PwmError)?;
        tracing::info!("PWM enabled");
        self.pwm.set_prescale(PWM_PRESCALE).map_err(DriveError::PwmError)?;
        tracing::info!(prescale = PWM_PRESCALE, "PWM prescale set");
        Ok(())
    }

    /// Apply signed side speeds in `-1.0..=1.0`; negative reverses.
    pub fn set_speeds(
        &mut self,
        left: f32,
        right: f32,
    ) -> Result<(), DriveError<E>> {
        for (&(phase, enable), speed) in self.sides.iter().zip([left, right]) {
            let magnitude = speed.abs().min(1.0);
            let reverse = speed < 0.0;
            self.pwm
                .set_channel_on_off(phase, 0, if reverse { MAX_DUTY } else { 0 })
                .map_err(DriveError::PwmError)?;
            self.pwm
                .set_channel_on_off(enable, 0, (magnitude * MAX_DUTY as f32) as u16)
                .map_err(DriveError::PwmError)?;
        }
        Ok(())
    }

    fn drive(
        &mut self,
        left: f32,
        right: f32,
    ) {
        let d = self.duty;
        if let Err(e) = self.set_speeds(left * d, right * d) {
            tracing::error!("motor command failed: {:?}", e);
        }
    }
}

impl<P, E> MotorActuator for DifferentialDrive<P>
where
    P: I2c<Error = E>,
    E: core::fmt::Debug,
{
    fn forward(&mut self) {
        self.drive(1.0, 1.0);
    }

    fn backward(&mut self) {
        self.drive(-1.0, -1.0);
    }

    fn turn_left(&mut self) {
        self.drive(-1.0, 1.0);
    }

    fn turn_right(&mut self) {
        self.drive(1.0, -1.0);
    }

    fn stop(&mut self) {
        self.drive(0.0, 0.0);
    }
}
