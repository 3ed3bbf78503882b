//! Small numeric helpers shared by the indicators.

pub mod math;
