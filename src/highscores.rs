//! Best survival time
//!
//! A single value: the longest elapsed time of any finished game. Persisted
//! through a [`KeyValueStore`] so it survives a page reload.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScore {
    /// Best elapsed time in ms
    pub best_ms: f32,
}

impl HighScore {
    const STORAGE_KEY: &'static str = "vibeycat_high_score";

    pub fn new(best_ms: f32) -> Self {
        Self {
            best_ms: best_ms.max(0.0),
        }
    }

    /// Check if a finished game beats the record
    pub fn qualifies(&self, elapsed_ms: f32) -> bool {
        elapsed_ms > self.best_ms
    }

    /// Keep `elapsed_ms` if it is a new record. Returns true if it was.
    pub fn record(&mut self, elapsed_ms: f32) -> bool {
        if !self.qualifies(elapsed_ms) {
            return false;
        }
        self.best_ms = elapsed_ms;
        true
    }

    /// Load from the store, starting fresh if nothing usable is there
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<HighScore>(store, Self::STORAGE_KEY) {
            Ok(Some(score)) if score.best_ms.is_finite() => {
                log::info!("Loaded high score {}", format_time(score.best_ms));
                Self::new(score.best_ms)
            }
            Ok(_) => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored high score: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High score saved ({})", format_time(self.best_ms)),
            Err(e) => log::warn!("Could not save high score: {}", e),
        }
    }
}

/// Format milliseconds as `MM:SS`
pub fn format_time(ms: f32) -> String {
    let total_seconds = (ms / 1000.0).floor().max(0.0) as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_record_keeps_best() {
        let mut hs = HighScore::default();
        assert!(hs.record(12_000.0));
        assert!(!hs.record(11_000.0));
        assert!(!hs.record(12_000.0));
        assert_eq!(hs.best_ms, 12_000.0);
    }

    #[test]
    fn test_persists_through_store() {
        let mut store = MemoryStore::new();
        assert_eq!(HighScore::load(&store), HighScore::default());

        HighScore::new(65_400.0).save(&mut store);
        assert_eq!(HighScore::load(&store).best_ms, 65_400.0);
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let mut store = MemoryStore::new();
        store.set("vibeycat_high_score", "garbage").unwrap();
        assert_eq!(HighScore::load(&store), HighScore::default());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65_400.0), "01:05");
        assert_eq!(format_time(-5.0), "00:00");
    }
}
