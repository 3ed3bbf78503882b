//! Cooldown and dedup state for emitted alerts
//!
//! One record per (instrument, direction, class) holding the last emission
//! time. Every operation goes through the same mutex, so the
//! check-then-write in [`CooldownManager::admit`] is a single critical
//! section and two evaluations of the same key can never both be admitted.

use crate::config::CooldownConfig;
use crate::models::{CooldownKey, ScoredSignal, SignalClass, SignalDirection};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Read-only copy of one cooldown record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooldownEntry {
    pub instrument: String,
    pub direction: SignalDirection,
    pub class: SignalClass,
    pub last_emitted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CooldownEntry {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

pub struct CooldownManager {
    config: CooldownConfig,
    records: Mutex<HashMap<CooldownKey, DateTime<Utc>>>,
}

impl CooldownManager {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self, class: SignalClass) -> Duration {
        match class {
            SignalClass::Base => self.config.base,
            SignalClass::Confirmed => self.config.confirmed,
        }
    }

    /// Admit or suppress a scored signal; on admission `now` becomes the
    /// key's last emission time
    pub fn admit(&self, signal: &ScoredSignal, now: DateTime<Utc>) -> bool {
        let key = signal.cooldown_key();
        let cooldown = self.cooldown(key.class);

        let mut records = self.records.lock();
        if let Some(&last) = records.get(&key) {
            if now - last < cooldown {
                debug!(
                    instrument = %key.instrument,
                    direction = %key.direction,
                    class = %key.class,
                    remaining_seconds = cooldown
                        .checked_sub(&(now - last))
                        .map_or(i64::MAX, |d| d.num_seconds()),
                    "CooldownManager: suppressed {} {} {} signal",
                    key.instrument,
                    key.direction,
                    key.class
                );
                return false;
            }
        }

        records.insert(key, now);
        true
    }

    /// Remove records for `instrument`, optionally narrowed by direction and
    /// class. Returns how many were removed.
    pub fn clear(
        &self,
        instrument: &str,
        direction: Option<SignalDirection>,
        class: Option<SignalClass>,
    ) -> usize {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|key, _| {
            !(key.instrument == instrument
                && direction.map_or(true, |d| d == key.direction)
                && class.map_or(true, |c| c == key.class))
        });
        let removed = before - records.len();

        info!(
            instrument = %instrument,
            direction = ?direction,
            class = ?class,
            removed = removed,
            "CooldownManager: cleared {} cooldown record(s) for {}",
            removed,
            instrument
        );
        removed
    }

    pub fn clear_all(&self) -> usize {
        let mut records = self.records.lock();
        let removed = records.len();
        records.clear();
        info!(removed = removed, "CooldownManager: cleared all {} cooldown record(s)", removed);
        removed
    }

    /// Owned copy of every record, sorted by key
    pub fn snapshot(&self) -> Vec<CooldownEntry> {
        let records = self.records.lock();
        let mut entries: Vec<(CooldownKey, DateTime<Utc>)> =
            records.iter().map(|(k, &t)| (k.clone(), t)).collect();
        drop(records);

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|(key, last)| CooldownEntry {
                expires_at: last
                    .checked_add_signed(self.cooldown(key.class))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
                instrument: key.instrument,
                direction: key.direction,
                class: key.class,
                last_emitted_at: last,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
