use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Identity provider connection settings (admin API).
#[derive(Clone, Debug, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    pub pool_id: String,
    pub client_id: String,
}

/// Order service connection settings (client registry).
#[derive(Clone, Debug, Deserialize)]
pub struct OrderServiceConfig {
    pub base_url: String,
}

/// Token issuance settings.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    /// Lifetime of issued bearer tokens, in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Timeout applied to every outbound HTTP call, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    pub identity: IdentityConfig,
    pub order_service: OrderServiceConfig,
    pub auth: AuthConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_token_ttl_secs() -> i64 {
    3600
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variable override convention: any var matching the key path
/// separated by double underscores (e.g. `IDENTITY__BASE_URL`, `AUTH__TOKEN_SECRET`)
/// overrides the file value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.auth.token_secret.len() < 32 {
        return Err(ConfigError::Validation(
            "auth.token_secret must be at least 32 characters".into(),
        ));
    }
    if app.auth.token_ttl_secs <= 0 {
        return Err(ConfigError::Validation(
            "auth.token_ttl_secs must be > 0".into(),
        ));
    }
    if app.identity.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "identity.base_url must not be empty".into(),
        ));
    }
    if app.order_service.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "order_service.base_url must not be empty".into(),
        ));
    }
    Ok(())
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            bind_addr: default_bind_addr(),
            http_timeout_secs: default_http_timeout_secs(),
            identity: IdentityConfig {
                base_url: "http://identity.internal".into(),
                pool_id: "pool-1".into(),
                client_id: "client-1".into(),
            },
            order_service: OrderServiceConfig {
                base_url: "http://orders.internal".into(),
            },
            auth: AuthConfig {
                token_secret: "0123456789abcdef0123456789abcdef".into(),
                token_ttl_secs: default_token_ttl_secs(),
            },
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn rejects_short_token_secret() {
        let mut cfg = base_config();
        cfg.auth.token_secret = "too-short".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let mut cfg = base_config();
        cfg.auth.token_ttl_secs = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_empty_base_urls() {
        let mut cfg = base_config();
        cfg.identity.base_url = String::new();
        assert!(validate(&cfg).is_err());

        let mut cfg = base_config();
        cfg.order_service.base_url = String::new();
        assert!(validate(&cfg).is_err());
    }
}
