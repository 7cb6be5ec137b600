//! Trigger suppression per (driver, station) pair.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DriverId, StationId};

/// Remembers the last trigger time per (driver, station) pair and
/// suppresses re-triggers inside the window.
///
/// Ephemeral by design: lost on restart, costing at most one extra
/// trigger per pair. Owned by one detector instance; there is no global
/// ledger.
pub struct DebounceLedger {
    window: Duration,
    last_trigger: Mutex<HashMap<(DriverId, StationId), DateTime<Utc>>>,
}

impl DebounceLedger {
    /// Create a ledger with the given suppression window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: Mutex::new(HashMap::new()),
        }
    }

    /// Atomic check-and-set: returns `true` (suppress, state unchanged)
    /// when a trigger for this pair fired less than the window ago;
    /// otherwise records `now` as the new last-trigger time and returns
    /// `false` (allow).
    ///
    /// The single lock spans both the read and the write, so two
    /// near-simultaneous samples for the same pair cannot both pass. A
    /// `now` earlier than the recorded entry (clock skew on the sample
    /// source) is suppressed without rewinding the entry.
    pub fn should_suppress(
        &self,
        driver: &DriverId,
        station: &StationId,
        now: DateTime<Utc>,
    ) -> bool {
        let mut last_trigger = self.last_trigger.lock().unwrap();
        let key = (driver.clone(), station.clone());

        if let Some(last) = last_trigger.get(&key) {
            if now - *last < self.window {
                return true;
            }
        }

        last_trigger.insert(key, now);
        false
    }

    /// Number of tracked pairs (for monitoring).
    pub fn entry_count(&self) -> usize {
        self.last_trigger.lock().unwrap().len()
    }
}
