use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;

use super::accounts::{AccountOverlay, RawAccount};
use crate::api::client::{build_http_client, read_json};
use crate::api::PriceSource;
use crate::auth::{authorization_header, Credentials, NonceSource};
use crate::error::Result;
use crate::exchanges::endpoints::UpbitRest;
use crate::models::Ticker;

const SERVICE: &str = "Upbit";

/// REST-клиент Upbit: публичные тикеры и подписанный `/v1/accounts`.
pub struct UpbitClient {
    base_url: String,
    quote_currency: String,
    credentials: Option<Credentials>,
    nonces: NonceSource,
    client: reqwest::Client,
}

impl UpbitClient {
    pub fn new(
        base_url: impl Into<String>,
        quote_currency: impl Into<String>,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            quote_currency: quote_currency.into(),
            credentials,
            nonces: NonceSource::new(),
            client: build_http_client(timeout)?,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    pub async fn get_tickers(&self, markets: &[&str]) -> Result<Vec<Ticker>> {
        let url = format!("{}{}", self.base_url, UpbitRest::TICKER);
        let joined = markets.join(",");
        debug!("[Upbit] GET {}?markets={}", url, joined);

        let response = self
            .client
            .get(&url)
            .query(&[("markets", joined.as_str())])
            .send()
            .await?;

        let tickers: Vec<Ticker> = read_json(SERVICE, response).await?;
        debug!("[Upbit] {} tickers received", tickers.len());
        Ok(tickers)
    }

    /// Сырые строки `/v1/accounts`. Без ключей - ошибка конфигурации.
    pub async fn get_accounts(&self) -> Result<Vec<RawAccount>> {
        let url = format!("{}{}", self.base_url, UpbitRest::ACCOUNTS);
        let authorization = authorization_header(self.credentials.as_ref(), &self.nonces, "")?;
        debug!("[Upbit] GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        read_json(SERVICE, response).await
    }
}

#[async_trait]
impl PriceSource for UpbitClient {
    async fn fetch_tickers(&self, markets: &[&str]) -> Result<Vec<Ticker>> {
        self.get_tickers(markets).await
    }

    async fn fetch_account_overlay(&self) -> Result<AccountOverlay> {
        if !self.has_credentials() {
            warn!("⚠️ Upbit API keys are not configured, skipping average buy prices");
            return Ok(AccountOverlay::default());
        }

        let accounts = self.get_accounts().await?;
        info!("💼 Upbit accounts loaded: {}", accounts.len());
        Ok(AccountOverlay::from_accounts(&self.quote_currency, &accounts))
    }
}
