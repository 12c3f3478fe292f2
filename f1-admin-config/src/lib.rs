use core::fmt::{Debug, Display};
use core::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "f1-admin.toml";
pub const ENV_PREFIX: &str = "F1_ADMIN_";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5251/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5_000;

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base url of the REST backend, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// How long a notification stays visible before it expires on its own.
    pub notification_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub const fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout())
            .field("notification_duration", &self.notification_duration())
            .finish()
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("config error: {0} must be greater than zero")]
    Zero(&'static str),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn get_config() -> Result<Config, ConfigError> {
    from_figment(&figment())
}

pub fn from_figment(figment: &Figment) -> Result<Config, ConfigError> {
    let mut config: Config = figment.extract()?;
    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Zero("request_timeout_ms"));
    }
    if config.notification_duration_ms == 0 {
        return Err(ConfigError::Zero("notification_duration_ms"));
    }
    while config.api_base_url.ends_with('/') {
        config.api_base_url.pop();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config = get_config().unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.request_timeout(), Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                api_base_url = "http://backend:8080/api/"
                request_timeout_ms = 2500
                "#,
            )?;
            jail.set_env("F1_ADMIN_REQUEST_TIMEOUT_MS", "500");

            let config = get_config().unwrap();
            assert_eq!(config.api_base_url, "http://backend:8080/api");
            assert_eq!(config.request_timeout(), Duration::from_millis(500));
            assert_eq!(config.notification_duration_ms, 5_000);
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("F1_ADMIN_NOTIFICATION_DURATION_MS", "0");
            let error = get_config().unwrap_err();
            assert_eq!(
                error.to_string(),
                "config error: notification_duration_ms must be greater than zero"
            );
            Ok(())
        });
    }
}
