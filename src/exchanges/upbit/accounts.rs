use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};

use crate::models::{AccountPosition, ReportedProfitLoss};
use crate::utils::json::parse_number;

/// Элемент массива `/v1/accounts`. Хранится как карта: набор полей
/// зависит от типа счёта.
pub type RawAccount = Map<String, Value>;

// Не подтверждено документацией; берётся первое не-null числовое поле.
pub const PROFIT_LOSS_FIELDS: &[&str] = &[
    "unrealized_pnl",
    "profit_loss",
    "eval_profit_loss",
    "evaluation_profit_loss",
    "pnl",
];

pub const PROFIT_LOSS_RATE_FIELDS: &[&str] = &[
    "unrealized_pnl_rate",
    "profit_loss_rate",
    "eval_profit_loss_rate",
    "evaluation_profit_loss_rate",
    "pnl_rate",
];

pub fn probe_number(account: &RawAccount, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|key| account.get(*key))
        .filter(|v| !v.is_null())
        .find_map(parse_number)
}

/// Данные портфеля по коду рынка (`KRW-BTC`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountOverlay {
    pub average_buy_prices: HashMap<String, f64>,
    pub balances: HashMap<String, f64>,
    pub profit_losses: HashMap<String, ReportedProfitLoss>,
}

impl AccountOverlay {
    pub fn from_accounts(quote_currency: &str, accounts: &[RawAccount]) -> Self {
        let mut overlay = Self::default();

        for account in accounts {
            let Some(currency) = account.get("currency").and_then(Value::as_str) else {
                continue;
            };
            if currency.is_empty() || currency == quote_currency {
                continue;
            }
            let market = format!("{}-{}", quote_currency, currency);

            if let Some(avg) = account.get("avg_buy_price").and_then(parse_number) {
                if avg > 0.0 {
                    overlay.average_buy_prices.insert(market.clone(), avg);
                }
            }

            if let Some(balance) = account.get("balance").and_then(parse_number) {
                if balance > 0.0 {
                    overlay.balances.insert(market.clone(), balance);
                }
            }

            if let Some(amount) = probe_number(account, PROFIT_LOSS_FIELDS) {
                let rate = probe_number(account, PROFIT_LOSS_RATE_FIELDS);
                overlay
                    .profit_losses
                    .insert(market.clone(), ReportedProfitLoss { amount, rate });
            }
        }

        debug!(
            "account overlay: {} avg prices, {} balances, {} reported P/L",
            overlay.average_buy_prices.len(),
            overlay.balances.len(),
            overlay.profit_losses.len()
        );
        overlay
    }

    pub fn is_empty(&self) -> bool {
        self.average_buy_prices.is_empty() && self.balances.is_empty() && self.profit_losses.is_empty()
    }

    /// Позиция по рынку. Без ненулевого баланса её нет, если только биржа
    /// не прислала P/L; одна оставшаяся средняя цена не считается.
    pub fn position(&self, market: &str) -> Option<AccountPosition> {
        let balance = self.balances.get(market).copied().filter(|b| *b > 0.0);
        let profit_loss = self.profit_losses.get(market).copied();
        if balance.is_none() && profit_loss.is_none() {
            return None;
        }
        Some(AccountPosition {
            market: market.to_string(),
            average_buy_price: self.average_buy_prices.get(market).copied(),
            balance,
            profit_loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accounts(value: Value) -> Vec<RawAccount> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn builds_market_keyed_maps() {
        let raw = accounts(json!([
            {"currency": "KRW", "balance": "150000.0", "locked": "0", "avg_buy_price": "0", "unit_currency": "KRW"},
            {"currency": "BTC", "balance": "0.5", "locked": "0", "avg_buy_price": "40000", "unit_currency": "KRW"},
            {"currency": "ETH", "balance": "0", "locked": "0", "avg_buy_price": "3000000", "unit_currency": "KRW"}
        ]));

        let overlay = AccountOverlay::from_accounts("KRW", &raw);

        assert_eq!(overlay.average_buy_prices.get("KRW-BTC"), Some(&40000.0));
        assert_eq!(overlay.balances.get("KRW-BTC"), Some(&0.5));
        assert_eq!(overlay.average_buy_prices.get("KRW-ETH"), Some(&3_000_000.0));
        assert!(overlay.balances.get("KRW-ETH").is_none());
        assert!(!overlay.average_buy_prices.contains_key("KRW-KRW"));
        assert!(overlay.profit_losses.is_empty());
    }

    #[test]
    fn probe_takes_first_parseable_candidate() {
        let raw = accounts(json!([{
            "currency": "SOL",
            "balance": "3",
            "avg_buy_price": "200000",
            "unrealized_pnl": null,
            "profit_loss": "n/a",
            "eval_profit_loss": "12000.5",
            "pnl": 1,
            "pnl_rate": 2.0
        }]));

        let overlay = AccountOverlay::from_accounts("KRW", &raw);
        let reported = overlay.profit_losses["KRW-SOL"];
        assert_eq!(reported.amount, 12000.5);
        assert_eq!(reported.rate, Some(2.0));
    }

    #[test]
    fn position_view() {
        let raw = accounts(json!([{"currency": "XRP", "balance": "10", "avg_buy_price": "700"}]));
        let overlay = AccountOverlay::from_accounts("KRW", &raw);

        let pos = overlay.position("KRW-XRP").unwrap();
        assert_eq!(pos.average_buy_price, Some(700.0));
        assert_eq!(pos.balance, Some(10.0));
        assert!(overlay.position("KRW-BTC").is_none());
        assert!(AccountOverlay::default().is_empty());
    }

    #[test]
    fn zero_balance_has_no_position() {
        let raw = accounts(json!([
            {"currency": "ETH", "balance": "0", "avg_buy_price": "3000000"},
            {"currency": "DOGE", "balance": "0", "avg_buy_price": "100", "pnl": "-50"}
        ]));
        let overlay = AccountOverlay::from_accounts("KRW", &raw);

        assert!(overlay.position("KRW-ETH").is_none());

        let doge = overlay.position("KRW-DOGE").unwrap();
        assert_eq!(doge.balance, None);
        assert_eq!(doge.average_buy_price, Some(100.0));
        assert_eq!(doge.profit_loss.map(|p| p.amount), Some(-50.0));
    }
}
