//! Настройки расписания покупок/продаж: интервал → cron, приём формы.
//! Ничего не сохраняется, принятые настройки только логируются.

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::utils::json::leading_integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    #[default]
    Hours,
    Minutes,
}

impl IntervalType {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalType::Hours => "hours",
            IntervalType::Minutes => "minutes",
        }
    }
}

/// `("minutes", "30")` → `*/30 * * * *`, `("hours", "2")` → `0 */2 * * *`.
/// Пустой ввод, нечисловое значение или ≤ 0 дают пустую строку.
/// Любой тип кроме `minutes` считается часами. Значение больше `i64`
/// тоже отклоняется.
pub fn convert_to_cron(interval_type: &str, interval_value: &str) -> String {
    if interval_type.is_empty() || interval_value.is_empty() {
        return String::new();
    }
    let value = match leading_integer(interval_value) {
        Some(v) if v > 0 => v,
        _ => return String::new(),
    };

    if interval_type == IntervalType::Minutes.as_str() {
        format!("*/{} * * * *", value)
    } else {
        format!("0 */{} * * *", value)
    }
}

pub trait IntervalSetting {
    fn interval_type(&self) -> IntervalType;
    fn interval_value(&self) -> &str;

    fn cron_time(&self) -> String {
        convert_to_cron(self.interval_type().as_str(), self.interval_value())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuySetting {
    pub id: String,
    pub interval_type: IntervalType,
    pub interval_value: String,
    /// Сумма в KRW за одно срабатывание.
    pub amount: String,
    /// Покупать, когда цена на столько процентов ниже средней.
    pub percent_below: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellSetting {
    pub id: String,
    pub interval_type: IntervalType,
    pub interval_value: String,
    pub coin_quantity: String,
    /// Порог со знаком, например `+5` или `-5`.
    pub percent_value: String,
}

impl IntervalSetting for BuySetting {
    fn interval_type(&self) -> IntervalType {
        self.interval_type
    }

    fn interval_value(&self) -> &str {
        &self.interval_value
    }
}

impl IntervalSetting for SellSetting {
    fn interval_type(&self) -> IntervalType {
        self.interval_type
    }

    fn interval_value(&self) -> &str {
        &self.interval_value
    }
}

/// Настройка с вычисленным cron, в таком виде уходит в лог.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduled<T> {
    #[serde(flatten)]
    pub setting: T,
    pub cron_time: String,
}

pub fn schedule<T: IntervalSetting>(settings: Vec<T>) -> Vec<Scheduled<T>> {
    settings
        .into_iter()
        .map(|setting| Scheduled {
            cron_time: setting.cron_time(),
            setting,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn label(self) -> &'static str {
        match self {
            TradeSide::Buy => "구매",
            TradeSide::Sell => "판매",
        }
    }

    fn saved_message(self) -> String {
        format!("{} 설정이 저장되었습니다.", self.label())
    }

    fn failed_message(self) -> String {
        format!("{} 설정 저장에 실패했습니다.", self.label())
    }
}

pub const MISSING_SETTINGS: &str = "설정 데이터가 없습니다.";

/// Результат отправки формы настроек.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResult {
    Saved { success: bool, message: String },
    Failed { error: String },
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Saved { success: true, .. })
    }
}

/// Обработка поля формы `settings` (JSON-массив) для одного рынка.
pub fn submit_settings(side: TradeSide, market: &str, settings_json: Option<&str>) -> ActionResult {
    let Some(raw) = settings_json.filter(|s| !s.is_empty()) else {
        return ActionResult::Failed {
            error: MISSING_SETTINGS.to_string(),
        };
    };

    let logged = match side {
        TradeSide::Buy => serde_json::from_str::<Vec<BuySetting>>(raw)
            .and_then(|s| serde_json::to_string(&schedule(s))),
        TradeSide::Sell => serde_json::from_str::<Vec<SellSetting>>(raw)
            .and_then(|s| serde_json::to_string(&schedule(s))),
    };

    match logged {
        Ok(settings) => {
            info!("📝 {} settings saved: market={} settings={}", side.label(), market, settings);
            ActionResult::Saved {
                success: true,
                message: side.saved_message(),
            }
        }
        Err(e) => {
            error!("❌ {} settings rejected for {}: {}", side.label(), market, e);
            ActionResult::Failed {
                error: side.failed_message(),
            }
        }
    }
}
