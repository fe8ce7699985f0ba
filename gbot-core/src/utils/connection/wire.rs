//! Text tokens carried on the command topic.
//!
//! A payload is one of `left`, `right`, `forward`, `backward` or `stop` with
//! no framing beyond the broker's own message boundary. This is the only
//! module that knows about both [`Gesture`] and [`Command`], so either side
//! can evolve without touching the other.

use crate::utils::{connection::receiver::Command, gesture::Gesture};

pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const FORWARD: &str = "forward";
pub const BACKWARD: &str = "backward";
pub const STOP: &str = "stop";

/// Wire token published for a gesture.
pub const fn encode(gesture: Gesture) -> &'static str {
    match gesture {
        Gesture::Left => LEFT,
        Gesture::Right => RIGHT,
        Gesture::Forward => FORWARD,
        Gesture::Backward => BACKWARD,
        Gesture::Stop => STOP,
    }
}

/// Decode a payload by exact token match.
///
/// Returns `None` for anything that is not valid UTF-8 or not one of the five
/// tokens; callers drop such payloads without changing state.
pub fn decode(payload: &[u8]) -> Option<Command> {
    let text = core::str::from_utf8(payload).ok()?;
    match text {
        LEFT => Some(Command::Left),
        RIGHT => Some(Command::Right),
        FORWARD => Some(Command::Forward),
        BACKWARD => Some(Command::Backward),
        STOP => Some(Command::Stop),
        _ => None,
    }
}
