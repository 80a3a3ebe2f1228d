//! Общий тип ошибок для клиента биржи, сборщиков и шлюза цен.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Внешний API ответил неуспешным статусом.
    #[error("{service} API error: HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Ответ 2xx, но тело не разобралось.
    #[error("{service} returned malformed response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl DashboardError {
    /// true для ошибок на стороне внешнего API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::MalformedResponse { .. } | Self::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
