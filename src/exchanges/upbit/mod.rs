pub mod accounts;
pub mod client;

pub use accounts::{AccountOverlay, RawAccount, PROFIT_LOSS_FIELDS, PROFIT_LOSS_RATE_FIELDS};
pub use client::UpbitClient;
