//! Compile-time tunables for both nodes.
//!
//! Nothing here is read from storage; firmware builds use these values as-is
//! and the host simulator only shortens the periods through [`Timing`].

use embassy_time::Duration;

/// Topic both nodes agree on out of band.
pub const TOPIC: &str = "robot/commands";

/// Broker session identifier of the wearable sensor node.
pub const GLOVE_CLIENT_ID: &str = "GloveController";

/// Broker session identifier of the robot node.
pub const ROBOT_CLIENT_ID: &str = "RobotController";

/// Raw accelerometer counts an axis must exceed to register a gesture.
pub const ACCEL_THRESHOLD: i16 = 5000;

/// Delay between control-loop cycles on both nodes.
pub const CYCLE_PERIOD: Duration = Duration::from_millis(100);

/// Fixed back-off between broker connect attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Poll period while waiting for the network link to come up.
pub const LINK_POLL_PERIOD: Duration = Duration::from_millis(500);

/// Default I2C address of the PCA9685 motor PWM expander.
pub const PWM_ADDRESS: u8 = 0x55;

/// PCA9685 prescale value (~60 Hz output).
pub const PWM_PRESCALE: u8 = 100;

/// Fraction of full PWM duty applied to a driven motor side.
pub const DRIVE_DUTY: f32 = 1.0;

/// Loop timing for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub cycle: Duration,
    pub retry: Duration,
    pub link_poll: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            cycle: CYCLE_PERIOD,
            retry: RETRY_DELAY,
            link_poll: LINK_POLL_PERIOD,
        }
    }
}

/// Block for `duration` on an `embedded-hal` delay provider. Durations past
/// `u32::MAX` milliseconds saturate.
pub fn sleep<D: embedded_hal::delay::DelayNs>(
    delay: &mut D,
    duration: Duration,
) {
    delay.delay_ms(u32::try_from(duration.as_millis()).unwrap_or(u32::MAX));
}
