// Конфигурация дашборда: необязательный YAML, затем переменные окружения
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::api::client::DEFAULT_TIMEOUT;
use crate::auth::Credentials;
use crate::error::{DashboardError, Result};
use crate::exchanges::endpoints::{CoinGeckoRest, FearGreedRest, UpbitRest};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.yaml";

pub const ENV_ACCESS_KEY: &str = "UPBIT_OPEN_API_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "UPBIT_OPEN_API_SECRET_KEY";
pub const ENV_BIND: &str = "DASHBOARD_BIND";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpbitSettings {
    pub base_url: String,
    pub quote_currency: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for UpbitSettings {
    fn default() -> Self {
        UpbitSettings {
            base_url: UpbitRest::BASE.to_string(),
            quote_currency: UpbitRest::QUOTE_CURRENCY.to_string(),
            access_key: None,
            secret_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FearGreedSettings {
    pub base_url: String,
}

impl Default for FearGreedSettings {
    fn default() -> Self {
        FearGreedSettings {
            base_url: FearGreedRest::BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinGeckoSettings {
    pub base_url: String,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        CoinGeckoSettings {
            base_url: CoinGeckoRest::BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub upbit: UpbitSettings,
    pub fear_greed: FearGreedSettings,
    pub coingecko: CoinGeckoSettings,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings::default(),
            upbit: UpbitSettings::default(),
            fear_greed: FearGreedSettings::default(),
            coingecko: CoinGeckoSettings::default(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Явный путь обязан существовать; без него берётся путь по умолчанию, если есть.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| DashboardError::Configuration(format!("invalid config: {}", e)))
    }

    /// Окружение важнее файла. Пустые значения игнорируются.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_ACCESS_KEY) {
            self.upbit.access_key = Some(key);
        }
        if let Some(key) = get(ENV_SECRET_KEY) {
            self.upbit.secret_key = Some(key);
        }
        if let Some(bind) = get(ENV_BIND) {
            self.server.bind = bind;
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.upbit.access_key.clone(), self.upbit.secret_key.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_public_apis() {
        let settings = Settings::default();
        assert_eq!(settings.upbit.base_url, "https://api.upbit.com/v1");
        assert_eq!(settings.upbit.quote_currency, "KRW");
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
        assert!(settings.credentials().is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml_str(
            "server:\n  bind: 127.0.0.1:3000\nrequest_timeout_secs: 3\n",
        )
        .unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:3000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.fear_greed.base_url, "https://api.alternative.me");
        assert!(Settings::from_yaml_str("").is_ok());
    }

    #[test]
    fn bad_yaml_is_configuration_error() {
        let err = Settings::from_yaml_str("server: [").unwrap_err();
        assert!(matches!(err, DashboardError::Configuration(_)));
    }

    #[test]
    fn env_overrides_credentials_and_bind() {
        let env: HashMap<&str, &str> = [
            (ENV_ACCESS_KEY, "ak"),
            (ENV_SECRET_KEY, "sk"),
            (ENV_BIND, " "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        let creds = settings.credentials().unwrap();
        assert_eq!(creds.access_key, "ak");
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn missing_explicit_file_fails() {
        let err = Settings::load(Some(Path::new("does/not/exist.yaml"))).unwrap_err();
        assert!(matches!(err, DashboardError::Configuration(_)));
    }
}
