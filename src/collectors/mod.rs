//! Сборщики рыночного контекста рядом с ценами.

pub mod coingecko;
pub mod fear_greed;

pub use coingecko::{CoinGeckoClient, CoinInfo, IconCache, IconSize};
pub use fear_greed::{FearGreedClient, FearGreedIndex, Sentiment};
