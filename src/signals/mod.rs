//! Signal scoring, cooldown admission and alert history.

pub mod cooldown;
pub mod history;
pub mod scoring;

pub use cooldown::{CooldownEntry, CooldownManager};
pub use history::AlertHistory;
pub use scoring::*;
