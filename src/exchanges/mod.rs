//! Интеграции с биржами
//!
//! Upbit REST: публичные тикеры и подписанный эндпоинт счетов.

pub mod endpoints;
pub mod upbit;

pub use upbit::{AccountOverlay, UpbitClient};
