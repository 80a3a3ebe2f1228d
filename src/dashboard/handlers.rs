use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::state::AppState;
use crate::collectors::fear_greed::{korean_description, GaugeSegment, GAUGE_SEGMENTS};
use crate::collectors::{FearGreedIndex, IconSize, Sentiment};
use crate::models::{find_by_coin_gecko_id, find_market, DisplayPrice, Market, CRYPTO_MARKETS};
use crate::strategy::{
    format_issues, submit_settings, ActionResult, ToggleTradingRule, TradeSide, TradingRule,
    TradingRulePatch,
};

pub const PRICES_FAILED: &str = "암호화폐 가격을 불러오는데 실패했습니다.";
pub const MARKET_NOT_FOUND: &str = "해당 코인 정보를 찾을 수 없습니다.";

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const DASHBOARD_HTML: &str = include_str!("../../templates/dashboard.html");
const MARKET_HTML: &str = include_str!("../../templates/market.html");
const TRADE_HTML: &str = include_str!("../../templates/trade.html");

// ---- страницы ----

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub async fn market_page(Path(market): Path<String>) -> Response {
    known_market_page(&market, MARKET_HTML)
}

pub async fn trade_page(Path(market): Path<String>) -> Response {
    known_market_page(&market, TRADE_HTML)
}

fn known_market_page(market: &str, page: &'static str) -> Response {
    match find_market(market) {
        Some(_) => Html(page).into_response(),
        None => (StatusCode::NOT_FOUND, MARKET_NOT_FOUND).into_response(),
    }
}

// ---- цены ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketsResponse {
    pub markets: &'static [Market],
    pub coin_icon_map: HashMap<String, String>,
}

pub async fn get_markets(State(state): State<AppState>) -> Json<MarketsResponse> {
    let ids: Vec<&str> = CRYPTO_MARKETS.iter().map(|m| m.coin_gecko_id).collect();
    let infos = state.coingecko.fetch_multiple_coin_info(&ids).await;

    let mut coin_icon_map = HashMap::with_capacity(infos.len());
    for (id, info) in infos {
        state.icons.insert(&id, IconSize::Small, info.image.small.clone());
        coin_icon_map.insert(id, info.image.small);
    }

    Json(MarketsResponse {
        markets: CRYPTO_MARKETS,
        coin_icon_map,
    })
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub prices: Vec<DisplayPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

pub async fn get_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    match state.prices.fetch_crypto_prices().await {
        Ok(prices) => Json(PricesResponse { prices, error: None }),
        Err(e) => {
            error!("❌ Failed to fetch crypto prices: {}", e);
            Json(PricesResponse {
                prices: Vec::new(),
                error: Some(PRICES_FAILED),
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: Option<DisplayPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

pub async fn get_price(State(state): State<AppState>, Path(market): Path<String>) -> Json<PriceResponse> {
    let (price, error) = match state.prices.fetch_crypto_price(&market).await {
        Ok(Some(price)) => (Some(price), None),
        Ok(None) => (None, Some(MARKET_NOT_FOUND)),
        Err(e) => {
            error!("❌ Failed to fetch crypto price for {}: {}", market, e);
            (None, Some(PRICES_FAILED))
        }
    };
    Json(PriceResponse { price, error })
}

// ---- настройки и правила ----

pub async fn submit_buy(Path(market): Path<String>, Form(form): Form<HashMap<String, String>>) -> Json<ActionResult> {
    Json(submit_settings(TradeSide::Buy, &market, form.get("settings").map(String::as_str)))
}

pub async fn submit_sell(Path(market): Path<String>, Form(form): Form<HashMap<String, String>>) -> Json<ActionResult> {
    Json(submit_settings(TradeSide::Sell, &market, form.get("settings").map(String::as_str)))
}

pub async fn create_trading_rule(Form(form): Form<HashMap<String, String>>) -> Response {
    let rule = TradingRule::from_form(&form);
    match rule.validate() {
        Ok(()) => {
            info!("📝 Trading rule accepted for {}", rule.market);
            Json(json!({ "success": true, "rule": rule })).into_response()
        }
        Err(issues) => rule_rejected(format_issues(&issues)),
    }
}

pub async fn update_trading_rule(Json(patch): Json<TradingRulePatch>) -> Response {
    match patch.validate() {
        Ok(()) => Json(json!({ "success": true, "rule": patch })).into_response(),
        Err(issues) => rule_rejected(format_issues(&issues)),
    }
}

pub async fn toggle_trading_rule(Json(toggle): Json<ToggleTradingRule>) -> Response {
    match toggle.validate() {
        Ok(()) => Json(json!({ "success": true, "id": toggle.id, "enabled": toggle.enabled })).into_response(),
        Err(issues) => rule_rejected(format_issues(&issues)),
    }
}

fn rule_rejected(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

// ---- рыночный контекст ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentView {
    pub level: Sentiment,
    pub description: String,
    pub text_class: &'static str,
    pub fill_class: &'static str,
    pub bg_class: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FearGreedResponse {
    pub index: Option<FearGreedIndex>,
    pub sentiment: Option<SentimentView>,
    pub gauge: &'static [GaugeSegment],
}

pub async fn get_fear_greed(State(state): State<AppState>) -> Json<FearGreedResponse> {
    let index = state.fear_greed.fetch_index().await;
    let sentiment = index.as_ref().map(|index| {
        let level = Sentiment::from_value(index.value);
        SentimentView {
            level,
            description: korean_description(&index.value_classification),
            text_class: level.text_class(),
            fill_class: level.fill_class(),
            bg_class: level.bg_class(),
            color: level.hex_color(),
        }
    });

    Json(FearGreedResponse {
        index,
        sentiment,
        gauge: &GAUGE_SEGMENTS,
    })
}

#[derive(Debug, Deserialize)]
pub struct IconQuery {
    #[serde(default)]
    pub size: IconSize,
}

pub async fn get_icon(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(query): Query<IconQuery>,
) -> Json<serde_json::Value> {
    // иконки только для монет из справочника
    let url = match find_by_coin_gecko_id(&coin_id) {
        Some(market) => state.icons.icon_url(&state.coingecko, market.coin_gecko_id, query.size).await,
        None => None,
    };
    Json(json!({ "url": url }))
}
