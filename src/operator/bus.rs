use super::OperatorEvent;
use crate::registry::Outbox;
use crate::registry::Push;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fan-out for operator sockets. A separate world from game rooms: its
/// own socket set, its own vocabulary, shared hosting process only.
pub struct OperatorBus {
    sockets: RwLock<HashMap<String, Arc<Outbox>>>,
    key: Option<String>,
    capacity: usize,
}

impl OperatorBus {
    pub fn new(key: Option<String>, capacity: usize) -> Self {
        Self {
            sockets: RwLock::new(HashMap::new()),
            key,
            capacity,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Register a fresh operator socket and greet it.
    pub async fn attach(&self) -> (String, Arc<Outbox>) {
        let id = crate::play::socket_id();
        let outbox = Arc::new(Outbox::new(self.capacity));
        outbox.push(OperatorEvent::Connected.envelope(), false);
        self.sockets.write().await.insert(id.clone(), outbox.clone());
        log::info!("operator socket {} connected", id);
        (id, outbox)
    }

    pub async fn detach(&self, id: &str) {
        if let Some(outbox) = self.sockets.write().await.remove(id) {
            outbox.close();
            log::info!("operator socket {} detached", id);
        }
    }

    /// Deliver one event to every operator socket. Subscribers that
    /// cannot take a terminal message are dropped from the set.
    pub async fn broadcast(&self, event: &OperatorEvent) {
        let envelope = event.envelope();
        let terminal = event.is_terminal();
        let mut sockets = self.sockets.write().await;
        let mut doomed = Vec::new();
        for (id, outbox) in sockets.iter() {
            match outbox.push(envelope.clone(), terminal) {
                Push::Queued => {}
                Push::Shed => log::warn!("operator socket {} backpressure", id),
                Push::Refused => doomed.push(id.clone()),
            }
        }
        for id in doomed {
            if let Some(outbox) = sockets.remove(&id) {
                outbox.close();
                log::warn!("operator socket {} closed on refusal", id);
            }
        }
    }

    pub async fn count(&self) -> usize {
        self.sockets.read().await.len()
    }
}
