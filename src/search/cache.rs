use crate::board::Position;
use std::collections::HashMap;
use std::sync::Mutex;

/// A root-level search result worth remembering.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub depth: u8,
    pub score: i64,
    pub best: Position,
}

/// Bounded transposition mapping from fingerprint to evaluation and
/// best reply. Eviction is a bulk clear once the ceiling is crossed;
/// the reaper calls `trim` between searches as well.
pub struct Cache {
    map: Mutex<HashMap<u64, Hit>>,
    ceiling: usize,
}

impl Cache {
    pub fn new(ceiling: usize) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            ceiling,
        }
    }

    pub fn get(&self, key: u64) -> Option<Hit> {
        self.map.lock().expect("cache lock").get(&key).copied()
    }

    pub fn put(&self, key: u64, hit: Hit) {
        let mut map = self.map.lock().expect("cache lock");
        if map.len() >= self.ceiling {
            log::warn!("transposition cache hit ceiling {}, clearing", self.ceiling);
            map.clear();
        }
        map.insert(key, hit);
    }

    pub fn len(&self) -> usize {
        self.map.lock().expect("cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reaper hook: bulk clear once oversize.
    pub fn trim(&self) {
        let mut map = self.map.lock().expect("cache lock");
        if map.len() > self.ceiling {
            log::warn!("reaping transposition cache of {} entries", map.len());
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(score: i64) -> Hit {
        Hit {
            depth: 2,
            score,
            best: Position::new(7, 7),
        }
    }

    #[test]
    fn stores_and_returns_hits() {
        let cache = Cache::new(8);
        assert!(cache.get(1).is_none());
        cache.put(1, hit(42));
        assert_eq!(cache.get(1).expect("hit").score, 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bulk_clears_at_the_ceiling() {
        let cache = Cache::new(4);
        for key in 0..4 {
            cache.put(key, hit(key as i64));
        }
        assert_eq!(cache.len(), 4);
        // the fifth insert crosses the ceiling and wipes the table first
        cache.put(99, hit(99));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(0).is_none());
        assert_eq!(cache.get(99).expect("hit").score, 99);
    }

    #[test]
    fn size_never_exceeds_ceiling_across_trim() {
        let cache = Cache::new(4);
        for key in 0..12 {
            cache.put(key, hit(key as i64));
            assert!(cache.len() <= 4);
        }
        cache.trim();
        assert!(cache.len() <= 4);
    }
}
