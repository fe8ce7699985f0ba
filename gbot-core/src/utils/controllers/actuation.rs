//! Robot-side actuation step.
//!
//! Each cycle runs strictly in order: ensure the broker session (reconnecting
//! and re-subscribing as needed), let the bus dispatch buffered messages into
//! the command slot, then issue exactly one motor call for the current
//! command. There is no command timeout; if the topic goes quiet the last
//! command keeps being re-issued.

use embedded_hal::delay::DelayNs;

use super::MotorActuator;
use crate::utils::connection::{
    receiver::{Command, CommandReceiver},
    MessageBus,
};

/// Issue the motor call for `command`. Total over [`Command`].
pub fn actuate<M: MotorActuator + ?Sized>(
    motor: &mut M,
    command: Command,
) {
    match command {
        Command::Forward => {
            motor.forward();
            tracing::info!("Moving Forward");
        }
        Command::Backward => {
            motor.backward();
            tracing::info!("Moving Backward");
        }
        Command::Left => {
            motor.turn_left();
            tracing::info!("Turning Left");
        }
        Command::Right => {
            motor.turn_right();
            tracing::info!("Turning Right");
        }
        Command::Stop => {
            motor.stop();
            tracing::info!("Stopping");
        }
    }
}

/// Couples the command receiver to a motor actuator.
pub struct ActuationLoop<B, M> {
    receiver: CommandReceiver<B>,
    motor: M,
    cycles: u32,
}

impl<B, M> ActuationLoop<B, M>
where
    B: MessageBus,
    M: MotorActuator,
{
    pub fn new(
        receiver: CommandReceiver<B>,
        motor: M,
    ) -> Self {
        Self {
            receiver,
            motor,
            cycles: 0,
        }
    }

    /// Run one cycle and return the command that was actuated.
    pub fn cycle<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Command {
        self.receiver.ensure_connected(delay);
        self.receiver.service();
        let command = self.receiver.current();
        actuate(&mut self.motor, command);
        self.cycles = self.cycles.wrapping_add(1);
        command
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn receiver(&self) -> &CommandReceiver<B> {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut CommandReceiver<B> {
        &mut self.receiver
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }
}
