pub mod client;
pub mod gateway;

use async_trait::async_trait;

use crate::error::Result;
use crate::exchanges::AccountOverlay;
use crate::models::Ticker;

pub use gateway::{join_prices, PriceGateway};

/// Источник данных для шлюза цен. Реализован `UpbitClient`,
/// в тестах подменяется заглушками.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_tickers(&self, markets: &[&str]) -> Result<Vec<Ticker>>;

    /// Данные портфеля; пустые, если ключи не настроены.
    async fn fetch_account_overlay(&self) -> Result<AccountOverlay>;
}
