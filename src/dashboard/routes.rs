use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index_page))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/crypto/:market", get(handlers::market_page))
        .route("/crypto/:market/buy", get(handlers::trade_page))
        .route("/crypto/:market/sell", get(handlers::trade_page))
        .route("/api/markets", get(handlers::get_markets))
        .route("/api/prices", get(handlers::get_prices))
        .route("/api/prices/:market", get(handlers::get_price))
        .route("/api/crypto/:market/buy", post(handlers::submit_buy))
        .route("/api/crypto/:market/sell", post(handlers::submit_sell))
        .route(
            "/api/trading-rules",
            post(handlers::create_trading_rule).patch(handlers::update_trading_rule),
        )
        .route("/api/trading-rules/toggle", patch(handlers::toggle_trading_rule))
        .route("/api/fear-greed", get(handlers::get_fear_greed))
        .route("/api/icons/:coin_id", get(handlers::get_icon))
        .with_state(state)
}
