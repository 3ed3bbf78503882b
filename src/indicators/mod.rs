pub mod engine;
pub mod error;
pub mod parser;
pub mod validation;

pub mod structure;
pub mod trend;

pub use engine::IndicatorEngine;
pub use error::IndicatorError;
pub use parser::*;
pub use validation::*;
