//! Strength and confidence scoring of raw crossover signals

use crate::config::ScoringConfig;
use crate::models::{Confirmation, RawSignal, ScoredSignal, SignalClass};

/// Normalize EMA separation to 0..1, saturating at `saturation`
pub fn normalize_separation(separation: f64, saturation: f64) -> f64 {
    if !separation.is_finite() || saturation <= 0.0 {
        return 0.0;
    }
    (separation.abs() / saturation).min(1.0)
}

/// Credit earned by one confirmation: full when volume-backed, partial when
/// detected without volume, none otherwise
pub fn confirmation_credit(confirmation: &Confirmation, unbacked_credit: f64) -> f64 {
    match (confirmation.detected, confirmation.volume_backed) {
        (true, true) => 1.0,
        (true, false) => unbacked_credit,
        _ => 0.0,
    }
}

pub struct SignalScorer {
    config: ScoringConfig,
}

impl SignalScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Weighted strength clamped to [0, 1]
    pub fn strength(&self, raw: &RawSignal) -> f64 {
        let c = &self.config;
        let total = c.separation_weight
            * normalize_separation(raw.separation, c.separation_saturation)
            + c.bos_weight * confirmation_credit(&raw.bos, c.unbacked_credit)
            + c.choch_weight * confirmation_credit(&raw.choch, c.unbacked_credit);
        total.clamp(0.0, 1.0)
    }

    /// Tier 0..=5: one per strength step reached plus one per volume-backed
    /// confirmation
    pub fn confidence(&self, strength: f64, volume_backed: u8) -> u8 {
        let tier = self
            .config
            .confidence_steps
            .iter()
            .filter(|&&step| strength >= step)
            .count() as u8;
        (tier + volume_backed.min(2)).min(5)
    }

    /// Score a raw signal; `None` when there is no crossover or the strength
    /// is below the configured minimum
    pub fn score(&self, raw: &RawSignal) -> Option<ScoredSignal> {
        if raw.direction.is_none() {
            return None;
        }

        let strength = self.strength(raw);
        if strength < self.config.min_signal_strength {
            return None;
        }

        let volume_backed = raw.volume_backed_confirmations();
        let class = if volume_backed > 0 {
            SignalClass::Confirmed
        } else {
            SignalClass::Base
        };

        Some(ScoredSignal {
            raw: raw.clone(),
            strength,
            confidence: self.confidence(strength, volume_backed),
            class,
        })
    }
}

impl Default for SignalScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
