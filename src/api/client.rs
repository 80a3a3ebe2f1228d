// Общий HTTP-слой для всех внешних API дашборда

use std::time::Duration;

use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{DashboardError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("coin_dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(DashboardError::from)
}

/// Не-2xx ответ превращается в `Upstream`, иначе тело разбирается как JSON.
pub async fn read_json<T: DeserializeOwned>(service: &'static str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(DashboardError::Upstream {
            service,
            status,
            body,
        });
    }

    let body = response.text().await?;
    debug!("[{}] response: {} bytes", service, body.len());
    serde_json::from_str(&body).map_err(|e| DashboardError::MalformedResponse {
        service,
        reason: e.to_string(),
    })
}
