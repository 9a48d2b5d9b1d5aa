use super::Arena;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The periodic sweep: idle rooms, stale sockets, oversized caches.
/// One task per process, owned by the server for its lifetime.
pub struct Reaper;

impl Reaper {
    pub fn spawn(arena: Arc<Arena>) -> JoinHandle<()> {
        let interval = arena.config.reap_interval;
        log::info!("reaper sweeping every {:?}", interval);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            // the immediate first tick would sweep an empty registry
            tick.tick().await;
            loop {
                tick.tick().await;
                arena.reap().await;
            }
        })
    }
}
