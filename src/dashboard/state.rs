use std::sync::Arc;

use crate::api::PriceGateway;
use crate::collectors::{CoinGeckoClient, FearGreedClient, IconCache};
use crate::error::Result;
use crate::exchanges::UpbitClient;
use crate::models::CRYPTO_MARKETS;
use crate::utils::config::Settings;

/// Общее состояние обработчиков. Изменяется только кеш иконок.
#[derive(Clone)]
pub struct AppState {
    pub prices: Arc<PriceGateway>,
    pub fear_greed: Arc<FearGreedClient>,
    pub coingecko: Arc<CoinGeckoClient>,
    pub icons: Arc<IconCache>,
}

impl AppState {
    pub fn new(prices: PriceGateway, fear_greed: FearGreedClient, coingecko: CoinGeckoClient) -> Self {
        Self {
            prices: Arc::new(prices),
            fear_greed: Arc::new(fear_greed),
            coingecko: Arc::new(coingecko),
            icons: Arc::new(IconCache::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = settings.request_timeout();
        let upbit = UpbitClient::new(
            settings.upbit.base_url.clone(),
            settings.upbit.quote_currency.clone(),
            settings.credentials(),
            timeout,
        )?;
        let fear_greed = FearGreedClient::new(settings.fear_greed.base_url.clone(), timeout)?;
        let coingecko = CoinGeckoClient::new(settings.coingecko.base_url.clone(), timeout)?;

        Ok(Self::new(
            PriceGateway::new(Arc::new(upbit), CRYPTO_MARKETS),
            fear_greed,
            coingecko,
        ))
    }
}
