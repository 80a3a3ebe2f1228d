//! Проверка торговых правил (создание, частичное обновление, вкл/выкл).
//! Правила только проверяются, хранилища нет.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Одна проваленная проверка. Выводится как `path: message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

pub fn format_issues(issues: &[RuleIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

struct NumberLimit {
    path: &'static str,
    min: (f64, &'static str),
    max: Option<(f64, &'static str)>,
    positive: Option<&'static str>,
}

const NOT_A_NUMBER: &str = "Expected number, received nan";
const MARKET_REQUIRED: &str = "마켓을 선택해주세요";
const RULE_ID_REQUIRED: &str = "규칙 ID가 필요합니다";

const SELL_INTERVAL: NumberLimit = NumberLimit {
    path: "sellIntervalMinutes",
    min: (1.0, "매도 간격은 최소 1분 이상이어야 합니다"),
    max: Some((1440.0, "매도 간격은 최대 1440분(24시간)을 초과할 수 없습니다")),
    positive: None,
};

const SELL_QUANTITY: NumberLimit = NumberLimit {
    path: "sellQuantity",
    min: (0.0001, "매도 수량은 최소 0.0001 이상이어야 합니다"),
    max: None,
    positive: Some("매도 수량은 양수여야 합니다"),
};

const SELL_THRESHOLD: NumberLimit = NumberLimit {
    path: "sellPercentThreshold",
    min: (0.01, "매도 임계값은 최소 0.01% 이상이어야 합니다"),
    max: Some((100.0, "매도 임계값은 최대 100%를 초과할 수 없습니다")),
    positive: None,
};

const BUY_INTERVAL: NumberLimit = NumberLimit {
    path: "buyIntervalMinutes",
    min: (1.0, "매수 간격은 최소 1분 이상이어야 합니다"),
    max: Some((1440.0, "매수 간격은 최대 1440분(24시간)을 초과할 수 없습니다")),
    positive: None,
};

const BUY_AMOUNT: NumberLimit = NumberLimit {
    path: "buyAmount",
    min: (1000.0, "매수 금액은 최소 1,000원 이상이어야 합니다"),
    max: None,
    positive: Some("매수 금액은 양수여야 합니다"),
};

const BUY_THRESHOLD: NumberLimit = NumberLimit {
    path: "buyPercentThreshold",
    min: (0.01, "매수 임계값은 최소 0.01% 이상이어야 합니다"),
    max: Some((100.0, "매수 임계값은 최대 100%를 초과할 수 없습니다")),
    positive: None,
};

impl NumberLimit {
    fn check(&self, value: f64, issues: &mut Vec<RuleIssue>) {
        let mut push = |message: &str| {
            issues.push(RuleIssue {
                path: self.path.to_string(),
                message: message.to_string(),
            })
        };

        if value.is_nan() {
            push(NOT_A_NUMBER);
            return;
        }
        if value < self.min.0 {
            push(self.min.1);
        }
        if let Some((max, message)) = self.max {
            if value > max {
                push(message);
            }
        }
        if let Some(message) = self.positive {
            if value <= 0.0 {
                push(message);
            }
        }
    }
}

fn check_market(market: &str, issues: &mut Vec<RuleIssue>) {
    if market.is_empty() {
        issues.push(RuleIssue {
            path: "market".to_string(),
            message: MARKET_REQUIRED.to_string(),
        });
    }
}

fn into_result(issues: Vec<RuleIssue>) -> Result<(), Vec<RuleIssue>> {
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingRule {
    pub market: String,
    #[serde(default)]
    pub sell_enabled: bool,
    pub sell_interval_minutes: f64,
    pub sell_quantity: f64,
    pub sell_percent_threshold: f64,
    #[serde(default)]
    pub buy_enabled: bool,
    pub buy_interval_minutes: f64,
    pub buy_amount: f64,
    pub buy_percent_threshold: f64,
    #[serde(default)]
    pub enabled: bool,
}

impl TradingRule {
    /// Правило из сырых полей формы. Пустые числа дают 0,
    /// нечисловые NaN; оба случая ловит `validate`.
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let flag = |key: &str| form.get(key).map(String::as_str) == Some("true");
        let number = |key: &str| form_number(form.get(key).map(String::as_str));

        TradingRule {
            market: form.get("market").cloned().unwrap_or_default(),
            sell_enabled: flag("sellEnabled"),
            sell_interval_minutes: number("sellIntervalMinutes"),
            sell_quantity: number("sellQuantity"),
            sell_percent_threshold: number("sellPercentThreshold"),
            buy_enabled: flag("buyEnabled"),
            buy_interval_minutes: number("buyIntervalMinutes"),
            buy_amount: number("buyAmount"),
            buy_percent_threshold: number("buyPercentThreshold"),
            enabled: flag("enabled"),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<RuleIssue>> {
        let mut issues = Vec::new();
        check_market(&self.market, &mut issues);
        SELL_INTERVAL.check(self.sell_interval_minutes, &mut issues);
        SELL_QUANTITY.check(self.sell_quantity, &mut issues);
        SELL_THRESHOLD.check(self.sell_percent_threshold, &mut issues);
        BUY_INTERVAL.check(self.buy_interval_minutes, &mut issues);
        BUY_AMOUNT.check(self.buy_amount, &mut issues);
        BUY_THRESHOLD.check(self.buy_percent_threshold, &mut issues);
        into_result(issues)
    }
}

/// Частичное обновление: проверяются только переданные поля.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradingRulePatch {
    pub market: Option<String>,
    pub sell_enabled: Option<bool>,
    pub sell_interval_minutes: Option<f64>,
    pub sell_quantity: Option<f64>,
    pub sell_percent_threshold: Option<f64>,
    pub buy_enabled: Option<bool>,
    pub buy_interval_minutes: Option<f64>,
    pub buy_amount: Option<f64>,
    pub buy_percent_threshold: Option<f64>,
    pub enabled: Option<bool>,
}

impl TradingRulePatch {
    pub fn validate(&self) -> Result<(), Vec<RuleIssue>> {
        let mut issues = Vec::new();
        if let Some(market) = &self.market {
            check_market(market, &mut issues);
        }
        let numbers = [
            (&SELL_INTERVAL, self.sell_interval_minutes),
            (&SELL_QUANTITY, self.sell_quantity),
            (&SELL_THRESHOLD, self.sell_percent_threshold),
            (&BUY_INTERVAL, self.buy_interval_minutes),
            (&BUY_AMOUNT, self.buy_amount),
            (&BUY_THRESHOLD, self.buy_percent_threshold),
        ];
        for (limit, value) in numbers {
            if let Some(value) = value {
                limit.check(value, &mut issues);
            }
        }
        into_result(issues)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleTradingRule {
    pub id: String,
    pub enabled: bool,
}

impl ToggleTradingRule {
    pub fn validate(&self) -> Result<(), Vec<RuleIssue>> {
        if self.id.is_empty() {
            return Err(vec![RuleIssue {
                path: "id".to_string(),
                message: RULE_ID_REQUIRED.to_string(),
            }]);
        }
        Ok(())
    }
}

/// Число из формы: пусто → 0, мусор → NaN.
fn form_number(raw: Option<&str>) -> f64 {
    let trimmed = raw.unwrap_or("").trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
