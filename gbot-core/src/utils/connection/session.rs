//! Broker session lifecycle shared by the glove and the robot.
//!
//! ```text
//! Disconnected --begin attempt-----------------> Connecting
//! Connecting   --connect ok (+ re-subscribe)---> Connected
//! Connecting   --connect failed----------------> Disconnected (after retry delay)
//! Connected    --session lost------------------> Disconnected
//! ```
//!
//! [`Session::poll`] performs exactly one transition so the sequence can be
//! stepped in tests; [`Session::ensure_connected`] drives it to `Connected`,
//! blocking on the fixed retry delay between failed attempts. There is no cap
//! on attempts and no exponential back-off.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use serde::Serialize;

use super::MessageBus;
use crate::utils::config::{sleep, RETRY_DELAY};

/// Per-node broker connection state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Outcome of a single [`Session::poll`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session is usable; nothing changed.
    Ready,
    /// A connect attempt is about to be made.
    Attempting,
    /// Connect succeeded (and the topic, if any, was re-subscribed).
    Established,
    /// Connect failed; wait the retry delay before the next attempt.
    Backoff,
    /// A previously live session was found dead.
    Lost,
}

/// Connection state machine for one node.
#[derive(Debug)]
pub struct Session {
    client_id: &'static str,
    subscription: Option<&'static str>,
    state: ConnectionState,
    retry_delay: Duration,
    attempts: u32,
    established: u32,
}

impl Session {
    /// Session that only publishes.
    pub fn new(client_id: &'static str) -> Self {
        Self {
            client_id,
            subscription: None,
            state: ConnectionState::Disconnected,
            retry_delay: RETRY_DELAY,
            attempts: 0,
            established: 0,
        }
    }

    /// Session that re-subscribes to `topic` after every successful connect,
    /// since losing the broker session also loses the subscription.
    pub fn subscribed(
        client_id: &'static str,
        topic: &'static str,
    ) -> Self {
        Self {
            subscription: Some(topic),
            ..Self::new(client_id)
        }
    }

    /// Override the fixed back-off between connect attempts.
    pub fn with_retry_delay(
        mut self,
        retry_delay: Duration,
    ) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn client_id(&self) -> &'static str {
        self.client_id
    }

    /// Total connect attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Number of times a session has been established (initial + reconnects).
    pub fn established(&self) -> u32 {
        self.established
    }

    /// Perform one state transition against `bus`.
    pub fn poll<B: MessageBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> SessionEvent {
        match self.state {
            ConnectionState::Connected => {
                if bus.is_connected() {
                    SessionEvent::Ready
                } else {
                    tracing::warn!(client = self.client_id, "broker session lost");
                    self.state = ConnectionState::Disconnected;
                    SessionEvent::Lost
                }
            }
            ConnectionState::Disconnected => {
                tracing::info!(client = self.client_id, "Connecting to MQTT...");
                self.state = ConnectionState::Connecting;
                SessionEvent::Attempting
            }
            ConnectionState::Connecting => {
                self.attempts = self.attempts.wrapping_add(1);
                if bus.connect(self.client_id) {
                    if let Some(topic) = self.subscription {
                        bus.subscribe(topic);
                        tracing::info!(client = self.client_id, topic, "subscribed");
                    }
                    tracing::info!(client = self.client_id, "Connected to MQTT broker");
                    self.state = ConnectionState::Connected;
                    self.established = self.established.wrapping_add(1);
                    SessionEvent::Established
                } else {
                    tracing::warn!(
                        client = self.client_id,
                        attempt = self.attempts,
                        "broker connect failed, retrying"
                    );
                    self.state = ConnectionState::Disconnected;
                    SessionEvent::Backoff
                }
            }
        }
    }

    /// Drive the session to `Connected`, blocking on `delay` between failed
    /// attempts. Returns `true` if a new session had to be established.
    pub fn ensure_connected<B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
    ) -> bool
    where
        B: MessageBus + ?Sized,
        D: DelayNs,
    {
        loop {
            match self.poll(bus) {
                SessionEvent::Ready => return false,
                SessionEvent::Established => return true,
                SessionEvent::Backoff => sleep(delay, self.retry_delay),
                SessionEvent::Attempting | SessionEvent::Lost => {}
            }
        }
    }
}
