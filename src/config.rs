//! Token service configuration

use crate::auth::{AppId, AppIdError, RootSecret};
use thiserror::Error;

/// Environment variable holding the app identifier
pub const APP_ID_VAR: &str = "RTC_APP_ID";
/// Environment variable holding the root secret
pub const APP_CERTIFICATE_VAR: &str = "RTC_APP_CERTIFICATE";
/// Environment variable overriding the default token lifetime (seconds)
pub const TOKEN_TTL_VAR: &str = "RTC_TOKEN_TTL";

/// Lifetime given to role-based tokens unless configured otherwise
pub const DEFAULT_TTL_SECS: u32 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("app certificate cannot be empty")]
    EmptySecret,

    #[error("invalid app id: {0}")]
    InvalidAppId(#[from] AppIdError),

    #[error("invalid token ttl '{0}': must be a positive number of seconds")]
    InvalidTtl(String),
}

/// Whether uid 0 acts as "any user"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UidPolicy {
    /// Tokens are bound to one non-zero uid
    #[default]
    Exact,
    /// A token issued for uid 0 admits any uid
    AllowWildcard,
}

/// Configuration for an [`AccessTokenService`](crate::AccessTokenService)
#[derive(Debug)]
pub struct TokenConfig {
    /// Public app identifier written into every token
    pub app_id: AppId,

    /// Root signing secret
    pub secret: RootSecret,

    /// Lifetime of role-based tokens, in seconds
    pub default_ttl: u32,

    /// Treatment of uid 0
    pub uid_policy: UidPolicy,
}

impl TokenConfig {
    /// Create a new configuration with the default ttl and exact uid policy
    pub fn new(app_id: AppId, secret: RootSecret) -> Self {
        Self {
            app_id,
            secret,
            default_ttl: DEFAULT_TTL_SECS,
            uid_policy: UidPolicy::Exact,
        }
    }

    /// Build from raw values, validating each
    pub fn from_parts(app_id: &str, secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = RootSecret::new(secret);
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self::new(AppId::parse(app_id)?, secret))
    }

    /// Load from `RTC_APP_ID`, `RTC_APP_CERTIFICATE` and optional `RTC_TOKEN_TTL`
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_id = std::env::var(APP_ID_VAR).map_err(|_| ConfigError::Missing(APP_ID_VAR))?;
        let secret = std::env::var(APP_CERTIFICATE_VAR)
            .map_err(|_| ConfigError::Missing(APP_CERTIFICATE_VAR))?;

        let mut config = Self::from_parts(&app_id, secret.into_bytes())?;
        if let Ok(ttl) = std::env::var(TOKEN_TTL_VAR) {
            config.default_ttl = parse_ttl(&ttl)?;
        }

        Ok(config)
    }

    /// Set the lifetime of role-based tokens
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Let uid 0 act as a wildcard
    pub fn allow_wildcard_uid(mut self) -> Self {
        self.uid_policy = UidPolicy::AllowWildcard;
        self
    }
}

/// Parse a ttl in whole seconds; zero is rejected
pub fn parse_ttl(s: &str) -> Result<u32, ConfigError> {
    match s.trim().parse::<u32>() {
        Ok(ttl) if ttl > 0 => Ok(ttl),
        _ => Err(ConfigError::InvalidTtl(s.to_string())),
    }
}
