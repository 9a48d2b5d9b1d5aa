use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;

/// What became of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Queued,
    /// Accepted, but an older non-terminal message was shed to make
    /// room, or the new non-terminal message itself had to be dropped.
    Shed,
    /// A terminal message could not be queued; the socket must close.
    Refused,
}

/// Per-socket outbound buffer. Bounded; writes into it never block, a
/// single writer task drains it in order. Terminal messages are never
/// shed: if one cannot fit, the push is refused and the socket dies.
pub struct Outbox {
    queue: Mutex<VecDeque<(String, bool)>>,
    bell: Notify,
    capacity: usize,
    closed: AtomicBool,
}

impl Outbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            bell: Notify::new(),
            capacity,
            closed: AtomicBool::new(false),
        }
    }

    pub fn push(&self, payload: String, terminal: bool) -> Push {
        if self.is_closed() {
            return Push::Refused;
        }
        let mut queue = self.queue.lock().expect("outbox lock");
        if queue.len() < self.capacity {
            queue.push_back((payload, terminal));
            self.bell.notify_one();
            return Push::Queued;
        }
        match queue.iter().position(|(_, terminal)| !terminal) {
            Some(oldest) => {
                let _ = queue.remove(oldest);
                queue.push_back((payload, terminal));
                self.bell.notify_one();
                Push::Shed
            }
            // buffer solid with terminal messages
            None if terminal => Push::Refused,
            None => Push::Shed,
        }
    }

    /// Next payload in order; None once the outbox is closed and
    /// drained dry.
    pub async fn next(&self) -> Option<String> {
        loop {
            if let Some((payload, _)) = self.queue.lock().expect("outbox lock").pop_front() {
                return Some(payload);
            }
            if self.is_closed() {
                return None;
            }
            self.bell.notified().await;
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.bell.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().expect("outbox lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
