//! Configuration for the session gate

use std::time::Duration;

/// Gate configuration.
///
/// Both secrets are process-wide constants: every process that issues or
/// validates tokens must be started with the same passphrase and signing
/// secret, or no token survives a process boundary. Rotation invalidates
/// all outstanding tokens immediately; there is no overlap mechanism.
#[derive(Clone)]
pub struct GateConfig {
    /// Passphrase seeding the identity-encryption key (never transmitted)
    pub passphrase: String,
    /// Base64-encoded HMAC signing secret, independent of the passphrase
    pub signing_secret_b64: String,
    /// Token lifetime; `None` means issued tokens never expire
    pub token_ttl: Option<Duration>,
}

impl GateConfig {
    /// Default token lifetime: 30 minutes
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    /// Create a new gate config with the default token lifetime
    pub fn new(passphrase: impl Into<String>, signing_secret_b64: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            signing_secret_b64: signing_secret_b64.into(),
            token_ttl: Some(Self::DEFAULT_TTL),
        }
    }

    /// Set the token lifetime (`None` disables expiry entirely)
    pub fn with_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Load configuration from environment variables
    ///
    /// * `TOLLGATE_PASSPHRASE` - identity-encryption passphrase (required)
    /// * `TOLLGATE_SIGNING_SECRET` - base64 signing secret (required)
    /// * `TOLLGATE_TOKEN_TTL_SECS` - token lifetime in seconds; a negative
    ///   value disables expiry (default 1800)
    pub fn from_env() -> Result<Self, ConfigError> {
        let passphrase = std::env::var("TOLLGATE_PASSPHRASE")
            .map_err(|_| ConfigError::Missing("TOLLGATE_PASSPHRASE"))?;

        let signing_secret_b64 = std::env::var("TOLLGATE_SIGNING_SECRET")
            .map_err(|_| ConfigError::Missing("TOLLGATE_SIGNING_SECRET"))?;

        let ttl_secs: i64 = std::env::var("TOLLGATE_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TOLLGATE_TOKEN_TTL_SECS"))?;

        // Negative TTL is the explicit "never expires" switch.
        let token_ttl = u64::try_from(ttl_secs).ok().map(Duration::from_secs);

        Ok(Self {
            passphrase,
            signing_secret_b64,
            token_ttl,
        })
    }
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
