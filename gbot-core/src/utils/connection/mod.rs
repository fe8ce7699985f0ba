//! Broker-mediated transport between the glove and the robot.
//!
//! - `session`: connect / re-subscribe state machine shared by both nodes
//! - `publisher`: glove-side gesture publishing
//! - `receiver`: robot-side decoding into the current-command slot
//! - `wire`: the text tokens carried on the topic

pub mod publisher;
pub mod receiver;
pub mod session;
pub mod wire;

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::utils::config::sleep;

/// Publish/subscribe broker client as seen by one node.
///
/// Implementations own their transport; the pipeline only drives the session
/// and never inspects transport errors directly.
pub trait MessageBus {
    /// Open a broker session under `client_id`. Returns `true` on success.
    fn connect(
        &mut self,
        client_id: &str,
    ) -> bool;

    /// Whether the broker session is currently alive.
    fn is_connected(&mut self) -> bool;

    /// Subscribe the current session to `topic`.
    fn subscribe(
        &mut self,
        topic: &str,
    );

    /// Fire-and-forget publish; no acknowledgment is awaited.
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    );

    /// Dispatch buffered inbound messages synchronously to `handler` as
    /// `(topic, payload)` pairs.
    fn service_incoming(
        &mut self,
        handler: &mut dyn FnMut(&str, &[u8]),
    );
}

/// Network association underneath the broker session.
pub trait NetworkLink {
    fn is_up(&mut self) -> bool;
}

impl<B: MessageBus + ?Sized> MessageBus for &mut B {
    fn connect(
        &mut self,
        client_id: &str,
    ) -> bool {
        (**self).connect(client_id)
    }

    fn is_connected(&mut self) -> bool {
        (**self).is_connected()
    }

    fn subscribe(
        &mut self,
        topic: &str,
    ) {
        (**self).subscribe(topic)
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) {
        (**self).publish(topic, payload)
    }

    fn service_incoming(
        &mut self,
        handler: &mut dyn FnMut(&str, &[u8]),
    ) {
        (**self).service_incoming(handler)
    }
}

/// Block until `link` reports up, polling every `period`.
///
/// Returns the number of polls that found the link down.
pub fn wait_for_link<L, D>(
    link: &mut L,
    delay: &mut D,
    period: Duration,
) -> u32
where
    L: NetworkLink + ?Sized,
    D: DelayNs,
{
    let mut waited = 0;
    while !link.is_up() {
        if waited == 0 {
            tracing::info!("Waiting for network link...");
        }
        waited += 1;
        sleep(delay, period);
    }
    tracing::info!("Network link up");
    waited
}
