use super::Outbox;
use std::sync::Arc;

/// Which bus a socket belongs to, derived from its path at accept
/// time. The two sets never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Game,
    Operator,
}

/// One live connection. Game sockets are bound to a room and player;
/// operator sockets to neither. The outbox is the only way anything
/// writes to the peer.
pub struct SocketHandle {
    pub id: String,
    pub channel: Channel,
    pub room: Option<String>,
    pub player: Option<String>,
    pub last_seen: u64,
    pub outbox: Arc<Outbox>,
}

impl SocketHandle {
    pub fn game(room: String, player: String, capacity: usize) -> Self {
        Self {
            id: crate::play::socket_id(),
            channel: Channel::Game,
            room: Some(room),
            player: Some(player),
            last_seen: crate::now_ms(),
            outbox: Arc::new(Outbox::new(capacity)),
        }
    }

    pub fn operator(capacity: usize) -> Self {
        Self {
            id: crate::play::socket_id(),
            channel: Channel::Operator,
            room: None,
            player: None,
            last_seen: crate::now_ms(),
            outbox: Arc::new(Outbox::new(capacity)),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = crate::now_ms();
    }

    pub fn stale(&self, now: u64, threshold_ms: u64) -> bool {
        now.saturating_sub(self.last_seen) > threshold_ms
    }
}
