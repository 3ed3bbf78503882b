//! Shared data models spanning the engine layers.

pub mod bar;
pub mod signal;

pub use bar::Bar;
pub use signal::{
    Alert, Confirmation, CooldownKey, RawSignal, ScoredSignal, SignalClass, SignalDirection,
};
