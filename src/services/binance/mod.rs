pub mod provider;

pub use provider::{parse_klines, BinanceMarketDataProvider};
