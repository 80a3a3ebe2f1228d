// Ядро: клиент биржи, соединение цен, рыночный контекст
pub mod api;
pub mod auth;
pub mod collectors;
pub mod error;
pub mod exchanges;
pub mod models;
pub mod utils;

// Настройки покупки/продажи и проверка правил
pub mod strategy;

// Веб-дашборд (axum)
#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use error::{DashboardError, Result};
