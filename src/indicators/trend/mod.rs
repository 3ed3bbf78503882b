//! Trend indicators: EMA and EMA crossover

pub mod ema;

pub use ema::*;
