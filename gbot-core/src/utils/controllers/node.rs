//! Glove and robot node drivers.
//!
//! Each node is a single blocking control loop. The only waits are the fixed
//! cycle period and the broker retry delay; neither yields to other work.

use core::fmt;

use embedded_hal::delay::DelayNs;

use super::{actuation::ActuationLoop, Imu, MotorActuator};
use crate::utils::{
    config::{sleep, Timing, GLOVE_CLIENT_ID, ROBOT_CLIENT_ID, TOPIC},
    connection::{
        publisher::CommandPublisher,
        receiver::{Command, CommandReceiver},
        session::Session,
        wait_for_link, MessageBus, NetworkLink,
    },
    gesture::{classify, Gesture},
};

/// The IMU failed its startup self-test. The node must not operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestFailed;

impl fmt::Display for SelfTestFailed {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("IMU self-test failed")
    }
}

/// Park the node forever after a fatal error.
pub fn halt<D: DelayNs>(delay: &mut D) -> ! {
    tracing::error!("node halted");
    loop {
        delay.delay_ms(1000);
    }
}

/// Wearable sensor node: read, classify, publish.
pub struct GloveNode<I, B> {
    imu: I,
    publisher: CommandPublisher<B>,
    timing: Timing,
}

impl<I, B> GloveNode<I, B>
where
    I: Imu,
    B: MessageBus,
{
    /// Self-test the IMU, wait for the network link, then connect.
    ///
    /// A failed self-test returns before anything touches the link or bus.
    pub fn start<L, D>(
        mut imu: I,
        link: &mut L,
        bus: B,
        timing: Timing,
        delay: &mut D,
    ) -> Result<Self, SelfTestFailed>
    where
        L: NetworkLink + ?Sized,
        D: DelayNs,
    {
        if !imu.self_test() {
            return Err(SelfTestFailed);
        }

        wait_for_link(link, delay, timing.link_poll);

        let session = Session::new(GLOVE_CLIENT_ID).with_retry_delay(timing.retry);
        let mut publisher = CommandPublisher::with_session(bus, session);
        publisher.ensure_connected(delay);

        Ok(Self {
            imu,
            publisher,
            timing,
        })
    }

    /// One cycle: check the session, then read, classify and publish.
    pub fn cycle<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Gesture {
        self.publisher.ensure_connected(delay);
        let sample = self.imu.read_motion();
        let gesture = classify(&sample);
        self.publisher.send(gesture);
        tracing::info!(?gesture, "Gesture");
        gesture
    }

    pub fn run<D: DelayNs>(
        mut self,
        delay: &mut D,
    ) -> ! {
        loop {
            self.cycle(delay);
            sleep(delay, self.timing.cycle);
        }
    }

    pub fn publisher(&self) -> &CommandPublisher<B> {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut CommandPublisher<B> {
        &mut self.publisher
    }

    pub fn imu_mut(&mut self) -> &mut I {
        &mut self.imu
    }
}

/// Robot node: service the topic, actuate the current command.
pub struct RobotNode<B, M> {
    actuation: ActuationLoop<B, M>,
    timing: Timing,
}

impl<B, M> RobotNode<B, M>
where
    B: MessageBus,
    M: MotorActuator,
{
    /// Put the motors in the stopped state and wait for the network link.
    ///
    /// The broker session is opened by the first cycle.
    pub fn start<L, D>(
        link: &mut L,
        bus: B,
        mut motor: M,
        timing: Timing,
        delay: &mut D,
    ) -> Self
    where
        L: NetworkLink + ?Sized,
        D: DelayNs,
    {
        motor.stop();
        wait_for_link(link, delay, timing.link_poll);

        let session = Session::subscribed(ROBOT_CLIENT_ID, TOPIC).with_retry_delay(timing.retry);
        let receiver = CommandReceiver::with_session(bus, session);

        Self {
            actuation: ActuationLoop::new(receiver, motor),
            timing,
        }
    }

    pub fn cycle<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Command {
        self.actuation.cycle(delay)
    }

    pub fn run<D: DelayNs>(
        mut self,
        delay: &mut D,
    ) -> ! {
        loop {
            self.cycle(delay);
            sleep(delay, self.timing.cycle);
        }
    }

    pub fn actuation(&self) -> &ActuationLoop<B, M> {
        &self.actuation
    }

    pub fn actuation_mut(&mut self) -> &mut ActuationLoop<B, M> {
        &mut self.actuation
    }
}
