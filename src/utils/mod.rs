// Конфигурация, логирование и мелкие помощники
pub mod config;
pub mod format;
pub mod json;
pub mod logging;
