//! Process configuration, read once at start-up and injected from there.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::ledger::LedgerOptions;
use crate::orders::OrderPolicy;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: true,
            filter: "info".to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub log: LogConfig,
    pub ledger: LedgerOptions,
    pub orders: OrderPolicy,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("log", &self.log)
            .field("ledger", &self.ledger)
            .field("orders", &self.orders)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            log: LogConfig::default(),
            ledger: LedgerOptions::default(),
            orders: OrderPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("SALESDESK_BIND_ADDR") {
            cfg.bind_addr = parse("SALESDESK_BIND_ADDR", &v)?;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            if v.is_empty() {
                return Err(invalid("JWT_SECRET", &v, "must not be empty"));
            }
            cfg.jwt_secret = v;
        }
        if let Some(v) = lookup("SALESDESK_LOG_JSON") {
            cfg.log.json = parse_bool("SALESDESK_LOG_JSON", &v)?;
        }
        if let Some(v) = lookup("RUST_LOG") {
            cfg.log.filter = v;
        }
        if let Some(v) = lookup("SALESDESK_LEDGER_MAX_ATTEMPTS") {
            let attempts: u32 = parse("SALESDESK_LEDGER_MAX_ATTEMPTS", &v)?;
            if attempts == 0 {
                return Err(invalid("SALESDESK_LEDGER_MAX_ATTEMPTS", &v, "must be at least 1"));
            }
            cfg.ledger.max_attempts = attempts;
        }
        if let Some(v) = lookup("SALESDESK_RESTORE_STOCK_ON_RELEASE") {
            cfg.orders.restore_stock_on_release = parse_bool("SALESDESK_RESTORE_STOCK_ON_RELEASE", &v)?;
        }

        Ok(cfg)
    }

    /// Still signing with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| invalid(key, value, e.to_string()))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = from(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.uses_default_secret());
        assert_eq!(cfg.ledger.max_attempts, 64);
        assert!(!cfg.orders.restore_stock_on_release);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = from(&[
            ("SALESDESK_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("SALESDESK_LOG_JSON", "false"),
            ("RUST_LOG", "debug"),
            ("SALESDESK_LEDGER_MAX_ATTEMPTS", "8"),
            ("SALESDESK_RESTORE_STOCK_ON_RELEASE", "yes"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert!(!cfg.log.json);
        assert_eq!(cfg.log.filter, "debug");
        assert_eq!(cfg.ledger.max_attempts, 8);
        assert!(cfg.orders.restore_stock_on_release);
        assert!(!cfg.uses_default_secret());
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = from(&[("SALESDESK_LEDGER_MAX_ATTEMPTS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SALESDESK_LEDGER_MAX_ATTEMPTS", .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(from(&[("SALESDESK_BIND_ADDR", "nowhere")]).is_err());
        assert!(from(&[("SALESDESK_LOG_JSON", "maybe")]).is_err());
        assert!(from(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let cfg = from(&[("JWT_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
