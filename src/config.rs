use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Path of the JSON document
    pub database_path: String,
    /// Directory served under `/app`
    pub fileserver_root: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Key the Polka billing webhook presents as `ApiKey <key>`
    pub polka_key: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

/// Upper bound for token lifetimes: 100 years
pub const MAX_TTL_SECONDS: u64 = 60 * 60 * 24 * 365 * 100;

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl_seconds: 60 * 60,            // 1 hour
            cleanup_interval_seconds: 60 * 60,      // 1 hour
            refresh_ttl_seconds: 60 * 60 * 24 * 60, // 60 days
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            database_path: "database.json".to_string(),
            fileserver_root: ".".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;
        let polka_key = required("POLKA_KEY").or_else(|_| required("POLKA"))?;

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            fileserver_root: std::env::var("FILESERVER_ROOT").unwrap_or(defaults.fileserver_root),
        };

        let defaults = TokenConfig::default();
        let tokens = TokenConfig {
            access_ttl_seconds: seconds("ACCESS_TOKEN_TTL_SECONDS", defaults.access_ttl_seconds)?,
            cleanup_interval_seconds: seconds(
                "CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval_seconds,
            )?,
            refresh_ttl_seconds: seconds(
                "REFRESH_TOKEN_TTL_SECONDS",
                defaults.refresh_ttl_seconds,
            )?,
        };

        let config = Config {
            auth: AuthConfig {
                jwt_secret,
                polka_key,
            },
            server,
            tokens,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.access_ttl_seconds == 0 || self.tokens.refresh_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "token TTLs must be greater than 0".to_string(),
            ));
        }
        if self.tokens.access_ttl_seconds > MAX_TTL_SECONDS
            || self.tokens.refresh_ttl_seconds > MAX_TTL_SECONDS
        {
            return Err(ConfigError::ValidationError(format!(
                "token TTLs must not exceed {MAX_TTL_SECONDS} seconds"
            )));
        }
        if self.tokens.cleanup_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "CLEANUP_INTERVAL_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < 32 {
            tracing::warn!("JWT_SECRET is shorter than 32 bytes; consider a longer secret");
        }

        Ok(())
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn seconds(name: &str, default: u64) -> Result<u64, ConfigError> {
    parse_seconds(name, std::env::var(name).ok(), default)
}

fn parse_seconds(name: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "{name} must be a whole number of seconds, got {value:?}"
            ))
        }),
    }
}
