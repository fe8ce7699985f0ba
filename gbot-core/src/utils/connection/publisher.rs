//! Glove-side gesture publisher.

use embedded_hal::delay::DelayNs;

use super::{session::Session, wire, MessageBus};
use crate::utils::{
    config::{GLOVE_CLIENT_ID, TOPIC},
    gesture::Gesture,
};

/// Publishes the classified gesture to the command topic once per cycle.
///
/// Owns the glove's broker session. Every publish re-sends the full current
/// gesture, so a lost message is corrected by the next cycle.
pub struct CommandPublisher<B> {
    bus: B,
    session: Session,
    published: u32,
}

impl<B: MessageBus> CommandPublisher<B> {
    pub fn new(bus: B) -> Self {
        Self::with_session(bus, Session::new(GLOVE_CLIENT_ID))
    }

    pub fn with_session(
        bus: B,
        session: Session,
    ) -> Self {
        Self {
            bus,
            session,
            published: 0,
        }
    }

    /// Block until the broker session is up.
    pub fn ensure_connected<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> bool {
        self.session.ensure_connected(&mut self.bus, delay)
    }

    /// Ensure connectivity, then publish `gesture`'s wire token.
    pub fn publish<D: DelayNs>(
        &mut self,
        gesture: Gesture,
        delay: &mut D,
    ) {
        self.ensure_connected(delay);
        self.send(gesture);
    }

    /// Publish on the current session without checking it first.
    ///
    /// The publish itself is not checked or retried; a dropped link shows up
    /// at the next cycle's connectivity check.
    pub fn send(
        &mut self,
        gesture: Gesture,
    ) {
        self.bus.publish(TOPIC, wire::encode(gesture).as_bytes());
        self.published = self.published.wrapping_add(1);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of publishes issued since start.
    pub fn published(&self) -> u32 {
        self.published
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
