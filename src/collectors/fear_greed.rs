//! Индекс страха и жадности (alternative.me).
//! Независим от цен: ошибки логируются и превращаются в `None`.

use std::time::Duration;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::{build_http_client, read_json};
use crate::error::Result;
use crate::exchanges::endpoints::FearGreedRest;
use crate::utils::json::parse_integer;

const SERVICE: &str = "Fear & Greed";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FearGreedIndex {
    /// 0..=100
    pub value: i64,
    pub value_classification: String,
    /// Unix-время в секундах.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_until_update: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: Value,
    #[serde(default)]
    value_classification: String,
    timestamp: Value,
    #[serde(default)]
    time_until_update: Option<Value>,
}

impl FngEntry {
    fn into_index(self) -> Option<FearGreedIndex> {
        Some(FearGreedIndex {
            value: parse_integer(&self.value)?,
            value_classification: self.value_classification,
            timestamp: parse_integer(&self.timestamp)?,
            time_until_update: self.time_until_update.as_ref().and_then(parse_integer),
        })
    }
}

pub struct FearGreedClient {
    base_url: String,
    client: reqwest::Client,
}

impl FearGreedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }

    /// Последнее значение; `None`, если API недоступен или данных нет.
    pub async fn fetch_index(&self) -> Option<FearGreedIndex> {
        match self.try_fetch_index().await {
            Ok(index) => index,
            Err(e) => {
                error!("[Fear & Greed API] fetch failed: {}", e);
                None
            }
        }
    }

    pub async fn try_fetch_index(&self) -> Result<Option<FearGreedIndex>> {
        let url = format!("{}{}", self.base_url, FearGreedRest::INDEX);
        debug!("[Fear & Greed API] GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body: FngResponse = read_json(SERVICE, response).await?;

        let Some(latest) = body.data.into_iter().next() else {
            warn!("[Fear & Greed API] empty data array");
            return Ok(None);
        };
        Ok(latest.into_index())
    }
}

/// Пять зон индекса, только по значению.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Sentiment {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Sentiment {
    pub fn from_value(value: i64) -> Self {
        match value {
            v if v >= 75 => Self::ExtremeGreed,
            v if v >= 55 => Self::Greed,
            v if v >= 45 => Self::Neutral,
            v if v >= 25 => Self::Fear,
            _ => Self::ExtremeFear,
        }
    }

    pub fn text_class(self) -> &'static str {
        match self {
            Self::ExtremeGreed => "text-red-600",
            Self::Greed => "text-orange-500",
            Self::Neutral => "text-yellow-500",
            Self::Fear => "text-blue-500",
            Self::ExtremeFear => "text-red-800",
        }
    }

    pub fn fill_class(self) -> &'static str {
        match self {
            Self::ExtremeGreed => "fill-red-600",
            Self::Greed => "fill-orange-500",
            Self::Neutral => "fill-yellow-500",
            Self::Fear => "fill-blue-500",
            Self::ExtremeFear => "fill-red-800",
        }
    }

    pub fn bg_class(self) -> &'static str {
        match self {
            Self::ExtremeGreed => "bg-red-100",
            Self::Greed => "bg-orange-100",
            Self::Neutral => "bg-yellow-100",
            Self::Fear => "bg-blue-100",
            Self::ExtremeFear => "bg-red-200",
        }
    }

    /// Цвет стрелки (SVG).
    pub fn hex_color(self) -> &'static str {
        match self {
            Self::ExtremeGreed => "#ef4444",
            Self::Greed => "#f97316",
            Self::Neutral => "#eab308",
            Self::Fear => "#84cc16",
            Self::ExtremeFear => "#22c55e",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeSegment {
    pub start: u32,
    pub end: u32,
    pub color: &'static str,
}

/// Half-circle gauge split into five 36° bands.
pub const GAUGE_SEGMENTS: [GaugeSegment; 5] = [
    GaugeSegment { start: 0, end: 36, color: "#ef4444" },
    GaugeSegment { start: 36, end: 72, color: "#f97316" },
    GaugeSegment { start: 72, end: 108, color: "#eab308" },
    GaugeSegment { start: 108, end: 144, color: "#84cc16" },
    GaugeSegment { start: 144, end: 180, color: "#22c55e" },
];

/// Корейская подпись для английской классификации; неизвестные идут как есть.
pub fn korean_description(classification: &str) -> String {
    match classification {
        "Extreme Fear" => "극단적 공포",
        "Fear" => "공포",
        "Neutral" => "중립",
        "Greed" => "탐욕",
        "Extreme Greed" => "극단적 탐욕",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_with_string_fields() {
        let raw = r#"{"name":"Fear and Greed Index","data":[{"value":"27","value_classification":"Fear","timestamp":"1704067200","time_until_update":"3600"}]}"#;
        let body: FngResponse = serde_json::from_str(raw).unwrap();
        let index = body.data.into_iter().next().unwrap().into_index().unwrap();
        assert_eq!(index.value, 27);
        assert_eq!(index.value_classification, "Fear");
        assert_eq!(index.timestamp, 1_704_067_200);
        assert_eq!(index.time_until_update, Some(3600));
    }

    #[test]
    fn missing_update_countdown_is_none() {
        let raw = r#"{"data":[{"value":"80","value_classification":"Extreme Greed","timestamp":"1"}]}"#;
        let body: FngResponse = serde_json::from_str(raw).unwrap();
        let index = body.data.into_iter().next().unwrap().into_index().unwrap();
        assert_eq!(index.time_until_update, None);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(Sentiment::from_value(75), Sentiment::ExtremeGreed);
        assert_eq!(Sentiment::from_value(74), Sentiment::Greed);
        assert_eq!(Sentiment::from_value(55), Sentiment::Greed);
        assert_eq!(Sentiment::from_value(45), Sentiment::Neutral);
        assert_eq!(Sentiment::from_value(44), Sentiment::Fear);
        assert_eq!(Sentiment::from_value(25), Sentiment::Fear);
        assert_eq!(Sentiment::from_value(24), Sentiment::ExtremeFear);
        assert_eq!(Sentiment::from_value(0).hex_color(), "#22c55e");
        assert_eq!(Sentiment::from_value(50).text_class(), "text-yellow-500");
    }

    #[test]
    fn segments_cover_half_circle() {
        assert_eq!(GAUGE_SEGMENTS[0].start, 0);
        assert_eq!(GAUGE_SEGMENTS[4].end, 180);
        assert!(GAUGE_SEGMENTS.windows(2).all(|w| w[0].end == w[1].start));
    }

    #[test]
    fn korean_labels() {
        assert_eq!(korean_description("Extreme Fear"), "극단적 공포");
        assert_eq!(korean_description("Greed"), "탐욕");
        assert_eq!(korean_description("Unknown"), "Unknown");
    }
}
