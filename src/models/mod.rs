use serde::{Deserialize, Serialize};

/// Запись справочника рынков, вшита в бинарник.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub market: &'static str,
    pub name: &'static str,
    pub coin_gecko_id: &'static str,
}

/// Рынки, запрашиваемые при каждом обновлении. Новые монеты добавлять как
/// `KRW-<code>` с названием и CoinGecko id для иконки.
pub const CRYPTO_MARKETS: &[Market] = &[
    Market { market: "KRW-BTC", name: "비트코인", coin_gecko_id: "bitcoin" },
    Market { market: "KRW-ETH", name: "이더리움", coin_gecko_id: "ethereum" },
    Market { market: "KRW-NEAR", name: "니어프로토콜", coin_gecko_id: "near" },
    Market { market: "KRW-DOGE", name: "도지코인", coin_gecko_id: "dogecoin" },
    Market { market: "KRW-SUI", name: "SUI", coin_gecko_id: "sui" },
    Market { market: "KRW-XRP", name: "XRP", coin_gecko_id: "ripple" },
    Market { market: "KRW-SHIB", name: "SHIB", coin_gecko_id: "shiba-inu" },
    Market { market: "KRW-SOL", name: "SOL", coin_gecko_id: "solana" },
];

pub fn find_market(code: &str) -> Option<&'static Market> {
    CRYPTO_MARKETS.iter().find(|m| m.market == code)
}

pub fn find_by_coin_gecko_id(id: &str) -> Option<&'static Market> {
    CRYPTO_MARKETS.iter().find(|m| m.coin_gecko_id == id)
}

pub fn market_codes(markets: &[Market]) -> Vec<&'static str> {
    markets.iter().map(|m| m.market).collect()
}

/// Направление последней сделки относительно прошлого закрытия.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Change {
    Rise,
    Fall,
    Even,
}

/// Снимок тикера из `GET /v1/ticker`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker {
    pub market: String,
    pub trade_price: f64,
    pub change: Change,
    #[serde(default)]
    pub change_price: f64,
    pub change_rate: f64,
    pub signed_change_price: f64,
    #[serde(default)]
    pub signed_change_rate: f64,
    #[serde(default)]
    pub trade_volume: f64,
    #[serde(default)]
    pub acc_trade_price_24h: f64,
    #[serde(default)]
    pub acc_trade_volume_24h: f64,
    #[serde(default)]
    pub timestamp: i64,
}

/// P/L, который прислала сама биржа.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedProfitLoss {
    pub amount: f64,
    pub rate: Option<f64>,
}

/// Позиция по одной валюте из `/v1/accounts`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountPosition {
    pub market: String,
    pub average_buy_price: Option<f64>,
    pub balance: Option<f64>,
    pub profit_loss: Option<ReportedProfitLoss>,
}

/// Тикер, соединённый с позицией. Единственная форма, которую
/// отображает дашборд.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPrice {
    pub market: String,
    pub name: String,
    pub price: f64,
    pub change: Change,
    pub change_price: f64,
    pub change_rate: f64,
    pub trade_volume: f64,
    pub acc_trade_price_24h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_buy_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss_rate: Option<f64>,
}
