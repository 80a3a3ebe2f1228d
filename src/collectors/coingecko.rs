//! Метаданные CoinGecko: только URL иконок монет.
//! Любая ошибка означает "без иконки".

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::api::client::{build_http_client, read_json};
use crate::error::Result;
use crate::exchanges::endpoints::CoinGeckoRest;

const SERVICE: &str = "CoinGecko";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    #[default]
    Small,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinImage {
    pub small: String,
    pub large: String,
}

impl CoinImage {
    pub fn get(&self, size: IconSize) -> &str {
        match size {
            IconSize::Small => &self.small,
            IconSize::Large => &self.large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinInfo {
    pub id: String,
    pub name: String,
    pub image: CoinImage,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Sizes {
        #[serde(default)]
        thumb: Option<String>,
        #[serde(default)]
        small: Option<String>,
        #[serde(default)]
        large: Option<String>,
    },
}

impl RawImage {
    fn resolve(self) -> Option<CoinImage> {
        match self {
            RawImage::Url(url) if !url.is_empty() => Some(CoinImage {
                small: url.clone(),
                large: url,
            }),
            RawImage::Url(_) => None,
            RawImage::Sizes { thumb, small, large } => {
                let small = small.or(thumb);
                match (small, large) {
                    (Some(small), Some(large)) => Some(CoinImage { small, large }),
                    (Some(one), None) | (None, Some(one)) => Some(CoinImage {
                        small: one.clone(),
                        large: one,
                    }),
                    (None, None) => None,
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct MarketCoin {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
}

pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }

    pub async fn fetch_coin_info(&self, coin_id: &str) -> Option<CoinInfo> {
        match self.try_fetch_coin_info(coin_id).await {
            Ok(info) => info,
            Err(e) => {
                error!("[CoinGecko API] coin lookup failed ({}): {}", coin_id, e);
                None
            }
        }
    }

    pub async fn try_fetch_coin_info(&self, coin_id: &str) -> Result<Option<CoinInfo>> {
        if !is_coin_id(coin_id) {
            warn!("[CoinGecko API] rejected coin id {:?}", coin_id);
            return Ok(None);
        }
        let url = format!("{}{}/{}", self.base_url, CoinGeckoRest::COINS, coin_id);
        debug!("[CoinGecko API] GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "false"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;
        let detail: CoinDetail = read_json(SERVICE, response).await?;

        let Some(image) = detail.image.and_then(RawImage::resolve) else {
            warn!("[CoinGecko API] no image for {}", coin_id);
            return Ok(None);
        };
        Ok(Some(CoinInfo {
            id: detail.id,
            name: detail.name,
            image,
        }))
    }

    /// Пакетный запрос по id. Монеты без картинки пропускаются,
    /// при ошибке запроса - пустая карта.
    pub async fn fetch_multiple_coin_info(&self, coin_ids: &[&str]) -> HashMap<String, CoinInfo> {
        match self.try_fetch_multiple_coin_info(coin_ids).await {
            Ok(map) => map,
            Err(e) => {
                error!("[CoinGecko API] bulk lookup failed: {}", e);
                HashMap::new()
            }
        }
    }

    pub async fn try_fetch_multiple_coin_info(&self, coin_ids: &[&str]) -> Result<HashMap<String, CoinInfo>> {
        let url = format!("{}{}", self.base_url, CoinGeckoRest::MARKETS);
        let ids = coin_ids.join(",");
        debug!("[CoinGecko API] GET {}?ids={}", url, ids);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", CoinGeckoRest::VS_CURRENCY),
                ("ids", ids.as_str()),
                ("sparkline", "false"),
            ])
            .send()
            .await?;
        let coins: Vec<MarketCoin> = read_json(SERVICE, response).await?;

        let mut map = HashMap::with_capacity(coins.len());
        for coin in coins {
            match coin.image.filter(|url| !url.is_empty()) {
                Some(url) => {
                    map.insert(
                        coin.id.clone(),
                        CoinInfo {
                            id: coin.id,
                            name: coin.name,
                            image: CoinImage {
                                small: url.clone(),
                                large: url,
                            },
                        },
                    );
                }
                None => warn!("[CoinGecko API] no image for {}", coin.id),
            }
        }

        debug!("[CoinGecko API] icon map built: {}", map.len());
        Ok(map)
    }
}

/// Id CoinGecko: строчные ASCII-слова через `-`. Всё остальное попало бы
/// в путь запроса.
pub fn is_coin_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// (id, размер) → URL иконки. Без ограничения размера, живёт вместе с владельцем;
/// хранятся только успешные ответы.
#[derive(Debug, Default)]
pub struct IconCache {
    entries: Mutex<HashMap<(String, IconSize), String>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coin_id: &str, size: IconSize) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&(coin_id.to_string(), size)).cloned()
    }

    pub fn insert(&self, coin_id: &str, size: IconSize, url: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((coin_id.to_string(), size), url);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn icon_url(&self, client: &CoinGeckoClient, coin_id: &str, size: IconSize) -> Option<String> {
        if let Some(url) = self.get(coin_id, size) {
            debug!("[CoinGecko API] icon cache hit: {}", coin_id);
            return Some(url);
        }

        let info = client.fetch_coin_info(coin_id).await?;
        let url = info.image.get(size);
        if url.is_empty() {
            warn!("[CoinGecko API] empty icon URL for {}", coin_id);
            return None;
        }

        self.insert(coin_id, size, url.to_string());
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(raw: &str) -> Option<CoinImage> {
        serde_json::from_str::<RawImage>(raw).ok().and_then(RawImage::resolve)
    }

    #[test]
    fn image_fallbacks() {
        let img = image(r#"{"thumb":"t.png","small":"s.png","large":"l.png"}"#).unwrap();
        assert_eq!(img.get(IconSize::Small), "s.png");
        assert_eq!(img.get(IconSize::Large), "l.png");

        let img = image(r#"{"thumb":"t.png"}"#).unwrap();
        assert_eq!(img.small, "t.png");
        assert_eq!(img.large, "t.png");

        let img = image(r#""https://x/coin.png""#).unwrap();
        assert_eq!(img.small, img.large);

        assert!(image("{}").is_none());
    }

    #[test]
    fn detail_without_image() {
        let detail: CoinDetail = serde_json::from_str(r#"{"id":"bitcoin","name":"Bitcoin"}"#).unwrap();
        assert!(detail.image.is_none());
    }

    #[test]
    fn coin_id_charset() {
        assert!(is_coin_id("shiba-inu"));
        assert!(is_coin_id("bitcoin"));
        assert!(!is_coin_id(""));
        assert!(!is_coin_id("../coins/markets"));
        assert!(!is_coin_id("bitcoin?tickers=true"));
        assert!(!is_coin_id("Bitcoin"));
    }

    #[tokio::test]
    async fn bad_coin_id_never_hits_network() {
        // адрес недоступен: реальный запрос дал бы Transport, а не Ok(None)
        let client = CoinGeckoClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(client.try_fetch_coin_info("..%2Fcoins").await.unwrap().is_none());
    }

    #[test]
    fn cache_is_keyed_by_size() {
        let cache = IconCache::new();
        assert!(cache.is_empty());
        cache.insert("bitcoin", IconSize::Small, "s.png".to_string());
        assert_eq!(cache.get("bitcoin", IconSize::Small).as_deref(), Some("s.png"));
        assert!(cache.get("bitcoin", IconSize::Large).is_none());
        assert_eq!(cache.len(), 1);
    }
}
