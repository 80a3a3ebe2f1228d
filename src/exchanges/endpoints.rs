// REST-эндпоинты, которые использует дашборд

pub struct UpbitRest;

impl UpbitRest {
    pub const BASE: &'static str = "https://api.upbit.com/v1";
    pub const TICKER: &'static str = "/ticker";
    pub const ACCOUNTS: &'static str = "/accounts";
    pub const QUOTE_CURRENCY: &'static str = "KRW";
}

pub struct FearGreedRest;

impl FearGreedRest {
    pub const BASE: &'static str = "https://api.alternative.me";
    pub const INDEX: &'static str = "/fng/";
}

pub struct CoinGeckoRest;

impl CoinGeckoRest {
    pub const BASE: &'static str = "https://api.coingecko.com/api/v3";
    pub const COINS: &'static str = "/coins";
    pub const MARKETS: &'static str = "/coins/markets";
    pub const VS_CURRENCY: &'static str = "krw";
}
