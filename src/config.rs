/*
 * Responsibility
 * - 環境変数の読み込み (SIGNING_SECRET, VALKEY_URL, HTTP limits など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::replay::valkey::DEFAULT_REPLAY_KEY_PREFIX;
use crate::services::signing::{
    Secret,
    core::{DEFAULT_MAX_SKEW_MS, SignaturePolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Transport limits applied by `middleware::http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Shared HMAC key. Never logged.
    pub signing_secret: Secret,
    pub signature_policy: SignaturePolicy,

    // None => in-memory replay store (single instance only)
    pub valkey_url: Option<String>,
    pub replay_key_prefix: String,

    pub http: HttpLimits,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("signature_policy", &self.signature_policy)
            .field("valkey", &self.valkey_url.is_some())
            .field("replay_key_prefix", &self.replay_key_prefix)
            .field("http", &self.http)
            .finish()
    }
}

fn parse_opt<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(None),
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_opt(key)?.unwrap_or(default))
}

/// Replay TTL must cover both sides of the skew window.
fn signature_policy_from(
    max_skew_ms: u64,
    replay_ttl_seconds: Option<u64>,
) -> Result<SignaturePolicy, ConfigError> {
    let policy = SignaturePolicy::new(max_skew_ms);
    match replay_ttl_seconds {
        None => Ok(policy),
        Some(ttl) if ttl < policy.replay_ttl_seconds => {
            Err(ConfigError::Invalid("REPLAY_TTL_SECONDS"))
        }
        Some(ttl) => Ok(policy.with_replay_ttl_seconds(ttl)),
    }
}

fn request_timeout(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
    }
    Ok(Duration::from_secs(secs))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let signing_secret = std::env::var("SIGNING_SECRET")
            .map(Secret::from)
            .map_err(|_| ConfigError::Missing("SIGNING_SECRET"))?;
        if signing_secret.is_empty() {
            return Err(ConfigError::Invalid("SIGNING_SECRET"));
        }

        let max_skew_ms: u64 = parse_or("SIGNATURE_MAX_SKEW_MS", DEFAULT_MAX_SKEW_MS)?;
        let signature_policy =
            signature_policy_from(max_skew_ms, parse_opt("REPLAY_TTL_SECONDS")?)?;

        let valkey_url = std::env::var("VALKEY_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let replay_key_prefix = std::env::var("REPLAY_KEY_PREFIX")
            .unwrap_or_else(|_| DEFAULT_REPLAY_KEY_PREFIX.to_string());

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: parse_or("REQUEST_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            request_timeout: request_timeout(parse_or(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout.as_secs(),
            )?)?,
        };

        Ok(Self {
            addr,
            app_env,
            signing_secret,
            signature_policy,
            valkey_url,
            replay_key_prefix,
            http,
        })
    }
}
