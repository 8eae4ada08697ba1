//! Process configuration, read once at startup.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Initial administrator account, created at startup when missing.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// Header carrying the bearer token, lowercase.
    pub auth_header: String,
    /// `None` selects the in-memory repositories.
    pub database_url: Option<String>,
    pub recover_token_ttl: Duration,
    pub admin: Option<AdminSeed>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("auth_header", &self.auth_header)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("recover_token_ttl", &self.recover_token_ttl)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3535)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl: Duration::hours(72),
            auth_header: "authorization".to_string(),
            database_url: None,
            recover_token_ttl: Duration::hours(24),
            admin: None,
        }
    }
}

fn hours(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(h) if h > 0 => Ok(Duration::hours(h)),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a positive number of hours, got '{raw}'"),
        }),
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("BIND_ADDR") {
            config.bind_addr = raw.parse().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{e}"),
            })?;
        }

        match get("JWT_SECRET") {
            Some(secret) => config.jwt_secret = secret,
            None => warn!("JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(raw) = get("JWT_TTL_HOURS") {
            config.jwt_ttl = hours("JWT_TTL_HOURS", &raw)?;
        }
        if let Some(raw) = get("RECOVER_TOKEN_TTL_HOURS") {
            config.recover_token_ttl = hours("RECOVER_TOKEN_TTL_HOURS", &raw)?;
        }
        if let Some(header) = get("AUTH_HEADER") {
            config.auth_header = header.to_ascii_lowercase();
        }
        config.database_url = get("DATABASE_URL");

        config.admin = match (get("ADMIN_USERNAME"), get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "ADMIN_USERNAME",
                    reason: "ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together"
                        .to_string(),
                });
            }
        };

        Ok(config)
    }
}

/// Convenience for tests: config from literal pairs.
pub fn lookup_from_pairs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup_from_pairs(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.port(), 3535);
        assert_eq!(config.jwt_ttl, Duration::hours(72));
    }

    #[test]
    fn values_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from_pairs(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cr3t"),
            ("JWT_TTL_HOURS", "12"),
            ("AUTH_HEADER", "X-Access-Token"),
            ("DATABASE_URL", "postgres://localhost/shop"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cr3t");
        assert_eq!(config.jwt_ttl, Duration::hours(12));
        assert_eq!(config.auth_header, "x-access-token");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from_pairs(&[("JWT_TTL_HOURS", "-3")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_TTL_HOURS", .. }));
    }

    #[test]
    fn partial_admin_seed_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from_pairs(&[("ADMIN_USERNAME", "rootadmin")]));
        assert!(err.is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let config = AppConfig::from_lookup(lookup_from_pairs(&[
            ("JWT_SECRET", "do-not-print"),
            ("ADMIN_USERNAME", "rootadmin"),
            ("ADMIN_EMAIL", "root@example.cl"),
            ("ADMIN_PASSWORD", "hunter2hunter2"),
        ]))
        .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("do-not-print"));
        assert!(!printed.contains("hunter2"));
    }
}
