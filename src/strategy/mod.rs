//! Расписание покупок/продаж: настройки, перевод в cron, проверка правил.
//! Ордера здесь не выставляются.

pub mod rules;
pub mod schedule;

pub use rules::{format_issues, RuleIssue, ToggleTradingRule, TradingRule, TradingRulePatch};
pub use schedule::{
    convert_to_cron, submit_settings, ActionResult, BuySetting, IntervalType, SellSetting, TradeSide,
};
