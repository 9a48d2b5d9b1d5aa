use crate::error::ApiError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fixed-window request counter per client key. Windows expire lazily;
/// the map is swept when it grows past a few thousand keys.
pub struct Limiter {
    windows: Mutex<HashMap<String, (u64, u32)>>,
    limit: u32,
    window_ms: u64,
}

impl Limiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit,
            window_ms: window.as_millis() as u64,
        }
    }

    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        let now = crate::now_ms();
        let mut windows = self.windows.lock().expect("limiter lock");
        if windows.len() > 4096 {
            let window_ms = self.window_ms;
            windows.retain(|_, (start, _)| now.saturating_sub(*start) < window_ms);
        }
        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.saturating_sub(entry.0) >= self.window_ms {
            *entry = (now, 0);
        }
        entry.1 += 1;
        if entry.1 > self.limit {
            log::warn!("rate limited {}", key);
            return Err(ApiError::RateLimited);
        }
        Ok(())
    }
}
