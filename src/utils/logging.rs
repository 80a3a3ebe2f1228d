//! Система логирования с настройкой уровней через переменные окружения
//! Использует env_logger для гибкого управления логами

use env_logger::Env;

/// Инициализация системы логирования
///
/// Уровень по умолчанию `info`, переопределяется через RUST_LOG:
/// - RUST_LOG=debug - тела ответов upstream и попадания в кеш иконок
/// - RUST_LOG=coin_dashboard::exchanges=debug - только клиент биржи
///
/// Повторный вызов безопасен (второй init игнорируется).
pub fn init_logging() {
    let initialized = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(true)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!("✅ Система логирования инициализирована");
        log::info!("📝 Уровень логирования: {}", get_log_level());
    }
}

/// Получить текущий уровень логирования
pub fn get_log_level() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init_logging();
        init_logging();
        assert!(!get_log_level().is_empty());
    }
}
