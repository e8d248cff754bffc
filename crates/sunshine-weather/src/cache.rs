//! Lock-protected weather state.
//!
//! The condition, icon, high and low are written and read as one unit so the
//! render path never sees a half-applied update.

use parking_lot::RwLock;

use crate::types::{WeatherPatch, WeatherSnapshot};

#[derive(Debug, Default)]
pub struct WeatherCache {
    state: RwLock<WeatherSnapshot>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> WeatherSnapshot {
        *self.state.read()
    }

    pub fn is_unsynced(&self) -> bool {
        self.state.read().is_unsynced()
    }

    /// Apply every present field of `patch` under a single write lock.
    /// Returns the state after the update.
    pub fn apply(&self, patch: WeatherPatch) -> WeatherSnapshot {
        let mut state = self.state.write();
        patch.apply_to(&mut state);
        tracing::trace!(?patch, "Applied weather patch");
        *state
    }

    /// Replace the whole triple
    pub fn store(&self, weather_id: i32, high: f64, low: f64) -> WeatherSnapshot {
        self.apply(WeatherPatch {
            weather_id: Some(weather_id),
            high: Some(high),
            low: Some(low),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IconCategory;
    use std::sync::Arc;

    #[test]
    fn test_new_cache_is_unsynced() {
        let cache = WeatherCache::new();
        assert!(cache.is_unsynced());
    }

    #[test]
    fn test_store_classifies_condition() {
        let cache = WeatherCache::new();
        let after = cache.store(800, 75.0, 50.0);
        assert_eq!(after.icon, Some(IconCategory::Clear));
        assert_eq!(cache.snapshot(), after);
        assert!(!cache.is_unsynced());
    }

    #[test]
    fn test_readers_never_see_half_updates() {
        // Writers alternate between two complete triples; every snapshot
        // must be exactly one of them.
        let cache = Arc::new(WeatherCache::new());
        cache.store(800, 10.0, 1.0);

        let writer = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..2_000 {
                    if i % 2 == 0 {
                        cache.store(500, 20.0, 2.0);
                    } else {
                        cache.store(800, 10.0, 1.0);
                    }
                }
            })
        };

        for _ in 0..2_000 {
            let s = cache.snapshot();
            let a = (Some(500), 20.0, 2.0);
            let b = (Some(800), 10.0, 1.0);
            let seen = (s.weather_id, s.high, s.low);
            assert!(seen == a || seen == b, "torn read: {:?}", seen);
        }

        writer.join().unwrap();
    }
}
