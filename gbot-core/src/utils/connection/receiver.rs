//! Robot-side command receiver and the current-command slot.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embedded_hal::delay::DelayNs;
use serde::Serialize;

use super::{session::Session, wire, MessageBus};
use crate::utils::config::{ROBOT_CLIENT_ID, TOPIC};

/// Actuation directive decoded from the wire.
///
/// Mirrors the sender's `Gesture` on purpose but is a separate type, so the
/// wire format can change without touching actuation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    #[default]
    Stop,
    Forward,
    Backward,
    Left,
    Right,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Stop,
        Command::Forward,
        Command::Backward,
        Command::Left,
        Command::Right,
    ];
}

/// The single current command on the robot.
///
/// Written only by the inbound-message handler, read only by the actuation
/// step. Newer commands overwrite older ones; nothing is queued. Backed by a
/// critical-section mutex so the handler may also run off the main loop.
pub struct CommandSlot {
    current: Mutex<CriticalSectionRawMutex, Cell<Command>>,
}

impl CommandSlot {
    pub const fn new() -> Self {
        Self {
            current: Mutex::new(Cell::new(Command::Stop)),
        }
    }

    pub fn get(&self) -> Command {
        self.current.lock(|c| c.get())
    }

    /// Overwrite the current command, returning the previous one.
    pub fn set(
        &self,
        command: Command,
    ) -> Command {
        self.current.lock(|c| c.replace(command))
    }
}

impl Default for CommandSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes inbound messages into the [`CommandSlot`].
///
/// Owns the robot's broker session and re-subscribes to the command topic
/// after every (re)connect.
pub struct CommandReceiver<B> {
    bus: B,
    session: Session,
    slot: CommandSlot,
    ignored: u32,
}

impl<B: MessageBus> CommandReceiver<B> {
    pub fn new(bus: B) -> Self {
        Self::with_session(bus, Session::subscribed(ROBOT_CLIENT_ID, TOPIC))
    }

    pub fn with_session(
        bus: B,
        session: Session,
    ) -> Self {
        Self {
            bus,
            session,
            slot: CommandSlot::new(),
            ignored: 0,
        }
    }

    /// Block until the broker session is up and subscribed.
    pub fn ensure_connected<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> bool {
        self.session.ensure_connected(&mut self.bus, delay)
    }

    /// Let the bus dispatch whatever it has buffered into the slot.
    pub fn service(&mut self) {
        let slot = &self.slot;
        let ignored = &mut self.ignored;
        self.bus.service_incoming(&mut |topic: &str, payload: &[u8]| {
            if !handle_message(slot, topic, payload) {
                *ignored = ignored.wrapping_add(1);
            }
        });
    }

    /// Current command as last written by the message handler.
    pub fn current(&self) -> Command {
        self.slot.get()
    }

    pub fn slot(&self) -> &CommandSlot {
        &self.slot
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Payloads dropped because they did not decode to a command.
    pub fn ignored(&self) -> u32 {
        self.ignored
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

/// Inbound-message handler: decode `payload` and overwrite the slot.
///
/// Returns `false` when the message was dropped (other topic, or not one of
/// the command tokens); the slot is left untouched in that case.
pub fn handle_message(
    slot: &CommandSlot,
    topic: &str,
    payload: &[u8],
) -> bool {
    if topic != TOPIC {
        return false;
    }
    match wire::decode(payload) {
        Some(command) => {
            tracing::info!(?command, "Received message");
            slot.set(command);
            true
        }
        None => {
            tracing::debug!(len = payload.len(), "ignoring unrecognized payload");
            false
        }
    }
}
