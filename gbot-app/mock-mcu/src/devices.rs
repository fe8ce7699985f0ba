//! Simulated glove and robot hardware.

use std::{error::Error, fs, path::Path};

use gbot_core::utils::{
    gesture::GestureSample, Command, Imu, MotorActuator, NetworkLink,
};

/// IMU that replays a fixed list of samples, looping at the end.
pub struct ScriptedImu {
    samples: Vec<GestureSample>,
    next: usize,
    healthy: bool,
}

impl ScriptedImu {
    pub fn new(
        samples: Vec<GestureSample>,
        healthy: bool,
    ) -> Self {
        Self {
            samples,
            next: 0,
            healthy,
        }
    }

    /// Load samples from a JSON array of `{ax, ay, az[, gx, gy, gz]}` objects.
    pub fn load(path: &Path) -> Result<Vec<GestureSample>, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let samples: Vec<GestureSample> = serde_json::from_str(&text)?;
        if samples.is_empty() {
            return Err(format!("{} contains no samples", path.display()).into());
        }
        Ok(samples)
    }

    /// A wrist sweep through every gesture, `hold` samples each.
    pub fn sweep(hold: usize) -> Vec<GestureSample> {
        [
            GestureSample::accel(0, 0, 16384),
            GestureSample::accel(6000, 0, 15000),
            GestureSample::accel(-6000, 0, 15000),
            GestureSample::accel(0, 7000, 14500),
            GestureSample::accel(0, -7000, 14500),
            GestureSample::accel(4800, -4800, 15500),
        ]
        .into_iter()
        .flat_map(|s| std::iter::repeat_n(s, hold.max(1)))
        .collect()
    }
}

impl Imu for ScriptedImu {
    fn self_test(&mut self) -> bool {
        self.healthy
    }

    fn read_motion(&mut self) -> GestureSample {
        let sample = self.samples.get(self.next).copied().unwrap_or_default();
        self.next = (self.next + 1) % self.samples.len().max(1);
        sample
    }
}

/// Motor that only logs what it was told to do.
#[derive(Default)]
pub struct LoggingMotor {
    pub last: Option<Command>,
    pub calls: u64,
}

impl LoggingMotor {
    fn record(
        &mut self,
        command: Command,
    ) {
        if self.last != Some(command) {
            tracing::debug!(?command, "motor direction change");
        }
        self.last = Some(command);
        self.calls += 1;
    }
}

impl MotorActuator for LoggingMotor {
    fn forward(&mut self) {
        self.record(Command::Forward);
    }

    fn backward(&mut self) {
        self.record(Command::Backward);
    }

    fn turn_left(&mut self) {
        self.record(Command::Left);
    }

    fn turn_right(&mut self) {
        self.record(Command::Right);
    }

    fn stop(&mut self) {
        self.record(Command::Stop);
    }
}

/// Host networking is always associated.
pub struct HostLink;

impl NetworkLink for HostLink {
    fn is_up(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use gbot_core::utils::{classify, Gesture};

    use super::*;

    #[test]
    fn sweep_visits_every_gesture_in_order() {
        let mut imu = ScriptedImu::new(ScriptedImu::sweep(1), true);
        let seen: Vec<_> = (0..6).map(|_| classify(&imu.read_motion())).collect();
        assert_eq!(
            seen,
            [
                Gesture::Stop,
                Gesture::Left,
                Gesture::Right,
                Gesture::Forward,
                Gesture::Backward,
                Gesture::Stop,
            ]
        );
        // wraps around
        assert_eq!(imu.read_motion(), GestureSample::accel(0, 0, 16384));
    }

    #[test]
    fn bundled_script_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts/tilt.json");
        let samples = ScriptedImu::load(&path).unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[2].gx, 120);
        assert_eq!(samples[1].gz, 0);
    }
}
