//! Threshold gesture classifier.
//!
//! Rules are evaluated in priority order and the first match wins, so a
//! sample deflected past the threshold on both axes always resolves to the
//! `ax`-derived gesture. Every cycle starts from the raw sample; there is no
//! hysteresis, so readings hovering near the threshold may flap between
//! gestures from one cycle to the next.

use super::{Gesture, GestureSample};
use crate::utils::config::ACCEL_THRESHOLD;

/// Map a sample to exactly one gesture.
///
/// | rule | condition               | gesture    |
/// |------|-------------------------|------------|
/// | 1    | `ax > +ACCEL_THRESHOLD` | `Left`     |
/// | 2    | `ax < -ACCEL_THRESHOLD` | `Right`    |
/// | 3    | `ay > +ACCEL_THRESHOLD` | `Forward`  |
/// | 4    | `ay < -ACCEL_THRESHOLD` | `Backward` |
/// | 5    | otherwise               | `Stop`     |
pub fn classify(sample: &GestureSample) -> Gesture {
    classify_with(sample, ACCEL_THRESHOLD)
}

/// Same policy as [`classify`] against an explicit threshold.
pub fn classify_with(
    sample: &GestureSample,
    threshold: i16,
) -> Gesture {
    if sample.ax > threshold {
        Gesture::Left
    } else if sample.ax < threshold.saturating_neg() {
        Gesture::Right
    } else if sample.ay > threshold {
        Gesture::Forward
    } else if sample.ay < threshold.saturating_neg() {
        Gesture::Backward
    } else {
        Gesture::Stop
    }
}
