//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `THREEWORDS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `THREEWORDS_BASE_URL` - Public URL of the site, used for OAuth callbacks and share links
//!
//! ## Optional
//! - `THREEWORDS_HOST` - Bind address (default: 127.0.0.1)
//! - `THREEWORDS_PORT` - Listen port (default: 3000)
//! - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` - Enable Google sign-in (both or neither)
//! - `SUBMISSION_RATE_LIMIT_MAX` - Submissions per address per window (default: 10)
//! - `SUBMISSION_RATE_LIMIT_WINDOW_SECS` - Window length in seconds (default: 900)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SUBMISSION_LIMIT: usize = 10;
const DEFAULT_SUBMISSION_WINDOW_SECS: u64 = 15 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct ThreeWordsConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Google OAuth credentials; sign-in is disabled when absent
    pub google: Option<GoogleOAuthConfig>,
    /// Submission rate limit policy
    pub submission_limit: SubmissionLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Google OAuth client credentials.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Sliding-window policy for the public submission endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimitConfig {
    /// Attempts allowed per address inside one window
    pub max_attempts: usize,
    /// Window length
    pub window: Duration,
}

impl Default for SubmissionLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SUBMISSION_LIMIT,
            window: Duration::from_secs(DEFAULT_SUBMISSION_WINDOW_SECS),
        }
    }
}

impl ThreeWordsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the OAuth secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("THREEWORDS_DATABASE_URL")?;
        let host = parse_env("THREEWORDS_HOST", "127.0.0.1")?;
        let port = parse_env("THREEWORDS_PORT", "3000")?;
        let base_url = parse_base_url("THREEWORDS_BASE_URL")?;

        let google = GoogleOAuthConfig::from_env()?;
        let submission_limit = SubmissionLimitConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            google,
            submission_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Public URL of a profile page.
    #[must_use]
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/u/{username}", self.base_url)
    }

    /// OAuth callback URL registered with the identity provider.
    #[must_use]
    pub fn google_callback_url(&self) -> String {
        format!("{}/api/auth/google/callback", self.base_url)
    }
}

impl GoogleOAuthConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("GOOGLE_CLIENT_ID"),
            get_optional_env("GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(_)) => Ok(Some(Self {
                client_id,
                client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "GOOGLE_CLIENT_SECRET".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("GOOGLE_CLIENT_ID".to_string())),
        }
    }
}

impl SubmissionLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_attempts: usize = parse_env(
            "SUBMISSION_RATE_LIMIT_MAX",
            &DEFAULT_SUBMISSION_LIMIT.to_string(),
        )?;
        let window_secs: u64 = parse_env(
            "SUBMISSION_RATE_LIMIT_WINDOW_SECS",
            &DEFAULT_SUBMISSION_WINDOW_SECS.to_string(),
        )?;

        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SUBMISSION_RATE_LIMIT_MAX".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if window_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SUBMISSION_RATE_LIMIT_WINDOW_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_attempts,
            window: Duration::from_secs(window_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read a public http(s) base URL and strip any trailing slash.
fn parse_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    let parsed = url::Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ThreeWordsConfig {
        ThreeWordsConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            google: None,
            submission_limit: SubmissionLimitConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_counts_characters_not_bytes() {
        // Two distinct characters, one of them two bytes wide
        assert!((shannon_entropy("éa") - 1.0).abs() < f64::EPSILON);
        assert!(shannon_entropy("ééé").abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-client-secret", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("GOCSPX-4kT9qZ2mW7xR1vB8nL3pJ6hY0c", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_submission_limit() {
        let limit = SubmissionLimitConfig::default();
        assert_eq!(limit.max_attempts, 10);
        assert_eq!(limit.window, Duration::from_secs(900));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_derived_urls() {
        let config = test_config();
        assert_eq!(config.profile_url("alice"), "http://localhost:3000/u/alice");
        assert_eq!(
            config.google_callback_url(),
            "http://localhost:3000/api/auth/google/callback"
        );
        assert!(!config.is_secure());
    }

    #[test]
    fn test_google_config_debug_redacts_secret() {
        let config = GoogleOAuthConfig {
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("super_secret_client_secret"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
    }
}
