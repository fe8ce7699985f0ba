//! Hand-motion samples and the gesture labels derived from them.
//!
//! - `classifier`: first-match threshold policy mapping a sample to a gesture

pub mod classifier;

use serde::{Deserialize, Serialize};

pub use classifier::classify;

/// One inertial reading in raw sensor counts.
///
/// Read, classified and discarded every cycle. The gyroscope axes are carried
/// along but take no part in classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    #[serde(default)]
    pub gx: i16,
    #[serde(default)]
    pub gy: i16,
    #[serde(default)]
    pub gz: i16,
}

impl GestureSample {
    /// Sample with only the linear-acceleration axes populated.
    pub const fn accel(
        ax: i16,
        ay: i16,
        az: i16,
    ) -> Self {
        Self {
            ax,
            ay,
            az,
            gx: 0,
            gy: 0,
            gz: 0,
        }
    }
}

/// Sender-side classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Left,
    Right,
    Forward,
    Backward,
    Stop,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::Left,
        Gesture::Right,
        Gesture::Forward,
        Gesture::Backward,
        Gesture::Stop,
    ];
}
