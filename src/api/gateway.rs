// Шлюз цен: тикеры + необязательные данные счёта

use std::sync::Arc;

use log::{debug, error, warn};

use super::PriceSource;
use crate::error::{DashboardError, Result};
use crate::exchanges::AccountOverlay;
use crate::models::{market_codes, DisplayPrice, Market, Ticker};
use crate::utils::format::{format_change_rate, format_price, format_trade_price};

pub struct PriceGateway {
    source: Arc<dyn PriceSource>,
    markets: &'static [Market],
}

impl PriceGateway {
    pub fn new(source: Arc<dyn PriceSource>, markets: &'static [Market]) -> Self {
        Self { source, markets }
    }

    pub fn markets(&self) -> &'static [Market] {
        self.markets
    }

    /// Тикеры и счёт запрашиваются параллельно. Ошибка тикеров сразу валит
    /// весь вызов, ошибка счёта только убирает данные портфеля.
    pub async fn fetch_crypto_prices(&self) -> Result<Vec<DisplayPrice>> {
        let codes = market_codes(self.markets);

        let overlay = async {
            let overlay = match self.source.fetch_account_overlay().await {
                Ok(overlay) => overlay,
                Err(e) => {
                    warn!("⚠️ Average buy price lookup failed: {}", e);
                    AccountOverlay::default()
                }
            };
            Ok::<_, DashboardError>(overlay)
        };

        let (tickers, overlay) =
            tokio::try_join!(self.source.fetch_tickers(&codes), overlay).inspect_err(|e| {
                if e.is_upstream() {
                    error!("❌ Crypto price fetch failed upstream: {}", e);
                } else {
                    error!("❌ Crypto price fetch failed: {}", e);
                }
            })?;

        let prices = join_prices(&tickers, &overlay, self.markets);
        for p in &prices {
            debug!(
                "📈 {} {} ({}) vol {}",
                p.market,
                format_price(p.price),
                format_change_rate(p.change_rate),
                format_trade_price(p.acc_trade_price_24h)
            );
        }
        Ok(prices)
    }

    /// Один рынок из полного обновления; `None`, если биржа его не вернула.
    pub async fn fetch_crypto_price(&self, market: &str) -> Result<Option<DisplayPrice>> {
        let prices = self.fetch_crypto_prices().await?;
        Ok(prices.into_iter().find(|p| p.market == market))
    }
}

/// Тот же размер и порядок, что у `tickers`.
pub fn join_prices(tickers: &[Ticker], overlay: &AccountOverlay, markets: &[Market]) -> Vec<DisplayPrice> {
    tickers
        .iter()
        .map(|ticker| {
            let name = markets
                .iter()
                .find(|m| m.market == ticker.market)
                .map(|m| m.name.to_string())
                .unwrap_or_else(|| ticker.market.clone());
            derive_price(ticker, overlay, name)
        })
        .collect()
}

fn derive_price(ticker: &Ticker, overlay: &AccountOverlay, name: String) -> DisplayPrice {
    let price = ticker.trade_price;
    let position = overlay.position(&ticker.market);
    let (average_buy_price, balance, reported) = match &position {
        Some(p) => (p.average_buy_price, p.balance, p.profit_loss),
        None => (None, None, None),
    };

    let profit_loss = reported.map(|r| r.amount).or_else(|| match (average_buy_price, balance) {
        (Some(avg), Some(qty)) if avg > 0.0 && qty > 0.0 => Some((price - avg) * qty),
        _ => None,
    });

    let profit_loss_rate = reported.and_then(|r| r.rate).or_else(|| match (average_buy_price, profit_loss) {
        (Some(avg), Some(_)) if avg > 0.0 => Some((price - avg) / avg * 100.0),
        _ => None,
    });

    DisplayPrice {
        market: ticker.market.clone(),
        name,
        price,
        change: ticker.change,
        change_price: ticker.signed_change_price,
        change_rate: ticker.change_rate,
        trade_volume: ticker.trade_volume,
        acc_trade_price_24h: ticker.acc_trade_price_24h,
        average_buy_price,
        balance,
        profit_loss,
        profit_loss_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Change, ReportedProfitLoss, CRYPTO_MARKETS};
    use async_trait::async_trait;
    use std::time::Duration;

    fn ticker(market: &str, price: f64) -> Ticker {
        Ticker {
            market: market.to_string(),
            trade_price: price,
            change: Change::Even,
            change_price: 0.0,
            change_rate: 0.0,
            signed_change_price: 0.0,
            signed_change_rate: 0.0,
            trade_volume: 0.0,
            acc_trade_price_24h: 0.0,
            acc_trade_volume_24h: 0.0,
            timestamp: 0,
        }
    }

    fn overlay_for(market: &str, avg: f64, balance: f64) -> AccountOverlay {
        let mut overlay = AccountOverlay::default();
        overlay.average_buy_prices.insert(market.to_string(), avg);
        overlay.balances.insert(market.to_string(), balance);
        overlay
    }

    #[test]
    fn computes_profit_loss_and_rate() {
        let tickers = vec![ticker("KRW-BTC", 50000.0)];
        let overlay = overlay_for("KRW-BTC", 40000.0, 0.5);

        let prices = join_prices(&tickers, &overlay, CRYPTO_MARKETS);
        assert_eq!(prices[0].profit_loss, Some(5000.0));
        assert_eq!(prices[0].profit_loss_rate, Some(25.0));
        assert_eq!(prices[0].name, "비트코인");
    }

    #[test]
    fn reported_profit_loss_wins() {
        let tickers = vec![ticker("KRW-BTC", 50000.0)];
        let mut overlay = overlay_for("KRW-BTC", 40000.0, 0.5);
        overlay.profit_losses.insert(
            "KRW-BTC".to_string(),
            ReportedProfitLoss { amount: 4321.0, rate: None },
        );

        let prices = join_prices(&tickers, &overlay, CRYPTO_MARKETS);
        assert_eq!(prices[0].profit_loss, Some(4321.0));
        // процент считается по средней цене, если биржа его не дала
        assert_eq!(prices[0].profit_loss_rate, Some(25.0));
    }

    #[test]
    fn reported_rate_is_kept() {
        let tickers = vec![ticker("KRW-ETH", 100.0)];
        let mut overlay = AccountOverlay::default();
        overlay.profit_losses.insert(
            "KRW-ETH".to_string(),
            ReportedProfitLoss { amount: -5.0, rate: Some(-1.5) },
        );

        let prices = join_prices(&tickers, &overlay, CRYPTO_MARKETS);
        assert_eq!(prices[0].profit_loss, Some(-5.0));
        assert_eq!(prices[0].profit_loss_rate, Some(-1.5));
        assert_eq!(prices[0].average_buy_price, None);
    }

    #[test]
    fn no_profit_loss_without_balance() {
        let tickers = vec![ticker("KRW-XRP", 800.0)];
        let mut overlay = AccountOverlay::default();
        overlay.average_buy_prices.insert("KRW-XRP".to_string(), 700.0);

        let prices = join_prices(&tickers, &overlay, CRYPTO_MARKETS);
        // всё продано: позиции нет, старая средняя цена тоже скрыта
        assert_eq!(prices[0].average_buy_price, None);
        assert_eq!(prices[0].balance, None);
        assert_eq!(prices[0].profit_loss, None);
        assert_eq!(prices[0].profit_loss_rate, None);
    }

    #[test]
    fn unknown_market_keeps_code_as_name_and_order() {
        let tickers = vec![ticker("KRW-ZZZ", 1.0), ticker("KRW-ETH", 2.0)];
        let prices = join_prices(&tickers, &AccountOverlay::default(), CRYPTO_MARKETS);
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].name, "KRW-ZZZ");
        assert_eq!(prices[1].market, "KRW-ETH");
    }

    struct CannedSource {
        fail_tickers: bool,
        account: std::result::Result<AccountOverlay, ()>,
        account_delay: Duration,
    }

    #[async_trait]
    impl PriceSource for CannedSource {
        async fn fetch_tickers(&self, markets: &[&str]) -> Result<Vec<Ticker>> {
            if self.fail_tickers {
                return Err(DashboardError::MalformedResponse {
                    service: "test",
                    reason: "boom".to_string(),
                });
            }
            Ok(markets.iter().map(|m| ticker(m, 10.0)).collect())
        }

        async fn fetch_account_overlay(&self) -> Result<AccountOverlay> {
            tokio::time::sleep(self.account_delay).await;
            self.account
                .clone()
                .map_err(|()| DashboardError::Configuration("no keys".to_string()))
        }
    }

    fn gateway(source: CannedSource) -> PriceGateway {
        PriceGateway::new(Arc::new(source), CRYPTO_MARKETS)
    }

    #[tokio::test]
    async fn account_failure_degrades_to_ticker_only() {
        let gw = gateway(CannedSource {
            fail_tickers: false,
            account: Err(()),
            account_delay: Duration::ZERO,
        });

        let prices = gw.fetch_crypto_prices().await.unwrap();
        assert_eq!(prices.len(), CRYPTO_MARKETS.len());
        assert!(prices.iter().all(|p| p.average_buy_price.is_none()
            && p.balance.is_none()
            && p.profit_loss.is_none()));
    }

    #[tokio::test]
    async fn ticker_failure_fails_fast() {
        let gw = gateway(CannedSource {
            fail_tickers: true,
            account: Ok(AccountOverlay::default()),
            account_delay: Duration::from_secs(30),
        });

        let started = std::time::Instant::now();
        let res = gw.fetch_crypto_prices().await;
        assert!(res.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn one_entry_per_requested_market() {
        let gw = gateway(CannedSource {
            fail_tickers: false,
            account: Ok(overlay_for("KRW-SOL", 5.0, 2.0)),
            account_delay: Duration::ZERO,
        });

        let prices = gw.fetch_crypto_prices().await.unwrap();
        let codes: Vec<&str> = prices.iter().map(|p| p.market.as_str()).collect();
        assert_eq!(codes, market_codes(CRYPTO_MARKETS));

        let sol = gw.fetch_crypto_price("KRW-SOL").await.unwrap().unwrap();
        assert_eq!(sol.profit_loss, Some(10.0));
        assert!(gw.fetch_crypto_price("KRW-NOPE").await.unwrap().is_none());
    }
}
