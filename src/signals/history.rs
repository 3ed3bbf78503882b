//! Bounded in-memory record of emitted alerts (inspection only)

use crate::models::Alert;
use parking_lot::Mutex;
use std::collections::VecDeque;

pub struct AlertHistory {
    capacity: usize,
    alerts: Mutex<VecDeque<Alert>>,
}

impl AlertHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            alerts: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append, evicting the oldest alert once full
    pub fn push(&self, alert: Alert) {
        let mut alerts = self.alerts.lock();
        while alerts.len() >= self.capacity {
            alerts.pop_front();
        }
        alerts.push_back(alert);
    }

    /// Most recent `limit` alerts, oldest first, optionally for one instrument
    pub fn recent(&self, limit: usize, instrument: Option<&str>) -> Vec<Alert> {
        let alerts = self.alerts.lock();
        let mut selected: Vec<Alert> = alerts
            .iter()
            .rev()
            .filter(|a| instrument.map_or(true, |i| a.instrument == i))
            .take(limit)
            .cloned()
            .collect();
        selected.reverse();
        selected
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
