//! In-process stand-in for the MQTT broker.
//!
//! Each node gets its own [`BrokerClient`]; all clients share one
//! [`LocalBroker`]. Sessions are clean: reconnecting drops prior
//! subscriptions and queued messages. Delivery is at-most-once to clients
//! that are online and subscribed at publish time.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use gbot_core::utils::MessageBus;

/// Fault injection knobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    /// Kick every session offline after this many accepted publishes.
    pub drop_every: Option<u64>,
    /// Refuse this many connect attempts before accepting any.
    pub refuse_connects: u32,
}

#[derive(Default)]
struct ClientSession {
    online: bool,
    topics: HashSet<String>,
    inbox: VecDeque<(String, Vec<u8>)>,
}

#[derive(Default)]
struct BrokerState {
    sessions: HashMap<String, ClientSession>,
    faults: Faults,
    publishes: u64,
    delivered: u64,
    drops: u64,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct BrokerStats {
    pub publishes: u64,
    pub delivered: u64,
    pub session_drops: u64,
}

#[derive(Clone, Default)]
pub struct LocalBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl LocalBroker {
    pub fn new(faults: Faults) -> Self {
        let state = BrokerState {
            faults,
            ..BrokerState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn client(&self) -> BrokerClient {
        BrokerClient {
            broker: self.clone(),
            client_id: None,
        }
    }

    pub fn stats(&self) -> BrokerStats {
        let state = self.lock();
        BrokerStats {
            publishes: state.publishes,
            delivered: state.delivered,
            session_drops: state.drops,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        // poisoned only if a node thread panicked mid-call
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One node's connection to the [`LocalBroker`].
pub struct BrokerClient {
    broker: LocalBroker,
    client_id: Option<String>,
}

impl BrokerClient {
    fn with_session<R>(
        &self,
        f: impl FnOnce(&mut ClientSession) -> R,
    ) -> Option<R> {
        let id = self.client_id.as_ref()?;
        let mut state = self.broker.lock();
        state.sessions.get_mut(id).filter(|s| s.online).map(f)
    }
}

impl MessageBus for BrokerClient {
    fn connect(
        &mut self,
        client_id: &str,
    ) -> bool {
        let mut state = self.broker.lock();
        if state.faults.refuse_connects > 0 {
            state.faults.refuse_connects -= 1;
            tracing::debug!(client_id, "broker refusing connection");
            return false;
        }
        state.sessions.insert(
            client_id.to_string(),
            ClientSession {
                online: true,
                ..ClientSession::default()
            },
        );
        self.client_id = Some(client_id.to_string());
        true
    }

    fn is_connected(&mut self) -> bool {
        self.with_session(|_| ()).is_some()
    }

    fn subscribe(
        &mut self,
        topic: &str,
    ) {
        self.with_session(|s| s.topics.insert(topic.to_string()));
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) {
        if !self.is_connected() {
            return;
        }
        let mut state = self.broker.lock();
        state.publishes += 1;

        let mut delivered = 0;
        for session in state.sessions.values_mut() {
            if session.online && session.topics.contains(topic) {
                session.inbox.push_back((topic.to_string(), payload.to_vec()));
                delivered += 1;
            }
        }
        state.delivered += delivered;

        if let Some(n) = state.faults.drop_every {
            if n > 0 && state.publishes % n == 0 {
                tracing::warn!(after = state.publishes, "broker dropping all sessions");
                state.drops += 1;
                for session in state.sessions.values_mut() {
                    session.online = false;
                }
            }
        }
    }

    fn service_incoming(
        &mut self,
        handler: &mut dyn FnMut(&str, &[u8]),
    ) {
        let pending = self
            .with_session(|s| std::mem::take(&mut s.inbox))
            .unwrap_or_default();
        for (topic, payload) in pending {
            handler(&topic, &payload);
        }
    }
}
