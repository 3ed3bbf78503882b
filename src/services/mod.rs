pub mod binance;
pub mod market_data;
pub mod notifications;

pub use market_data::{MarketDataError, MarketDataProvider, StaticMarketDataProvider};
