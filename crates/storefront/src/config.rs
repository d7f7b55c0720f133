//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GIFTBOX_DATA_DIR` - Directory for local state (default: per-user data dir)
//! - `GIFTBOX_DATABASE_URL` - Account store connection string
//!   (default: `sqlite://<data dir>/accounts.db`; generic `DATABASE_URL` is
//!   honored as a fallback)
//! - `GIFTBOX_AUTH_MODE` - `self_managed` (default) or `delegated`
//! - `GIFTBOX_SESSION_TTL_DAYS` - Self-managed session lifetime (default: 7)
//! - `GIFTBOX_ARGON2_MEMORY_KIB` - Password hash memory cost (default: 19456)
//! - `GIFTBOX_ARGON2_ITERATIONS` - Password hash time cost (default: 2)
//! - `GIFTBOX_ARGON2_PARALLELISM` - Password hash lanes (default: 1)
//!
//! ## Required in delegated mode
//! - `GIFTBOX_PROVIDER_URL` - Identity provider base URL
//! - `GIFTBOX_PROVIDER_KEY` - Identity provider API key (high entropy)

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Which authentication backend the runtime uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Credentials and password hashes live in the local account store.
    #[default]
    SelfManaged,
    /// An external identity provider owns credentials; the account store
    /// only holds profile rows.
    Delegated,
}

impl AuthMode {
    /// The configuration label for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfManaged => "self_managed",
            Self::Delegated => "delegated",
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self_managed" => Ok(Self::SelfManaged),
            "delegated" => Ok(Self::Delegated),
            other => Err(format!(
                "unknown auth mode {other:?} (expected \"self_managed\" or \"delegated\")"
            )),
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argon2id work factor.
///
/// Defaults match the argon2 crate's current recommended parameters. Raise
/// the memory cost on machines that can afford it; lower it only in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations (time cost).
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Identity provider connection settings (delegated mode only).
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider base URL (e.g., `https://auth.example.com`)
    pub base_url: String,
    /// Provider API key sent as the `apikey` header
    pub api_key: SecretString,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Storefront runtime configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding the local store file and the default database
    pub data_dir: PathBuf,
    /// Account store connection URL (may contain credentials)
    pub database_url: SecretString,
    /// Which authentication backend to wire up
    pub auth_mode: AuthMode,
    /// Self-managed session lifetime in days
    pub session_ttl_days: i64,
    /// Password hashing work factor
    pub hashing: HashingConfig,
    /// Identity provider settings; present iff `auth_mode` is delegated
    pub provider: Option<ProviderConfig>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse, the delegated
    /// mode is selected without provider settings, or the provider key fails
    /// validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = match get_optional_env("GIFTBOX_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let database_url = get_database_url("GIFTBOX_DATABASE_URL", &data_dir);

        let auth_mode = get_env_or_default("GIFTBOX_AUTH_MODE", AuthMode::default().as_str())
            .parse::<AuthMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("GIFTBOX_AUTH_MODE".to_string(), e))?;

        let session_ttl_days = get_env_or_default("GIFTBOX_SESSION_TTL_DAYS", "7")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GIFTBOX_SESSION_TTL_DAYS".to_string(), e.to_string())
            })?;
        if session_ttl_days < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "GIFTBOX_SESSION_TTL_DAYS".to_string(),
                format!("must be at least 1 (got {session_ttl_days})"),
            ));
        }

        let hashing = hashing_from_env()?;

        let provider = match auth_mode {
            AuthMode::SelfManaged => None,
            AuthMode::Delegated => Some(ProviderConfig::from_env()?),
        };

        Ok(Self {
            data_dir,
            database_url,
            auth_mode,
            session_ttl_days,
            hashing,
            provider,
        })
    }

    /// Self-managed session lifetime as a duration.
    #[must_use]
    pub const fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    /// Path of the local key-value store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("local_store.json")
    }
}

impl ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("GIFTBOX_PROVIDER_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("GIFTBOX_PROVIDER_URL".to_string(), e.to_string())
        })?;

        let api_key = get_validated_secret("GIFTBOX_PROVIDER_KEY")?;

        Ok(Self { base_url, api_key })
    }
}

fn hashing_from_env() -> Result<HashingConfig, ConfigError> {
    let defaults = HashingConfig::default();
    Ok(HashingConfig {
        memory_kib: get_env_u32("GIFTBOX_ARGON2_MEMORY_KIB", defaults.memory_kib)?,
        iterations: get_env_u32("GIFTBOX_ARGON2_ITERATIONS", defaults.iterations)?,
        parallelism: get_env_u32("GIFTBOX_ARGON2_PARALLELISM", defaults.parallelism)?,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed as `u32`, with a default.
fn get_env_u32(key: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Get the account store URL with fallback to generic `DATABASE_URL`, then
/// to a `SQLite` file under the data dir.
fn get_database_url(primary_key: &str, data_dir: &std::path::Path) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(format!(
        "sqlite://{}",
        data_dir.join("accounts.db").display()
    ))
}

/// Resolve the per-user default data directory.
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    directories::ProjectDirs::from("shop", "Giftbox", "giftbox").map_or_else(
        || {
            Err(ConfigError::MissingEnvVar(
                "GIFTBOX_DATA_DIR (no home directory found)".to_string(),
            ))
        },
        |dirs| Ok(dirs.data_dir().to_path_buf()),
    )
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
    let len = s.len() as f64;
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
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
    use secrecy::ExposeSecret;

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!(
            "self_managed".parse::<AuthMode>().unwrap(),
            AuthMode::SelfManaged
        );
        assert_eq!(
            "delegated".parse::<AuthMode>().unwrap(),
            AuthMode::Delegated
        );
        assert!("supabase".parse::<AuthMode>().is_err());
    }

    #[test]
    fn test_auth_mode_default_is_self_managed() {
        assert_eq!(AuthMode::default(), AuthMode::SelfManaged);
    }

    #[test]
    fn test_hashing_defaults() {
        let config = HashingConfig::default();
        assert_eq!(config.memory_kib, 19_456);
        assert_eq!(config.iterations, 2);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn test_session_ttl_duration() {
        let config = StorefrontConfig {
            data_dir: PathBuf::from("/tmp/giftbox-test"),
            database_url: SecretString::from("sqlite::memory:"),
            auth_mode: AuthMode::SelfManaged,
            session_ttl_days: 7,
            hashing: HashingConfig::default(),
            provider: None,
        };
        assert_eq!(config.session_ttl(), chrono::Duration::days(7));
    }

    #[test]
    fn test_store_path_under_data_dir() {
        let config = StorefrontConfig {
            data_dir: PathBuf::from("/tmp/giftbox-test"),
            database_url: SecretString::from("sqlite::memory:"),
            auth_mode: AuthMode::SelfManaged,
            session_ttl_days: 7,
            hashing: HashingConfig::default(),
            provider: None,
        };
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/giftbox-test/local_store.json")
        );
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig {
            base_url: "https://auth.giftbox.shop".to_string(),
            api_key: SecretString::from("kY9mN2pQ7rT0uW4zC6aB3xJ5"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("auth.giftbox.shop"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kY9mN2pQ7rT0uW4zC6aB3xJ5"));
    }

    #[test]
    fn test_database_url_defaults_to_sqlite_under_data_dir() {
        let url = get_database_url(
            "GIFTBOX_TEST_UNSET_DATABASE_URL_1",
            std::path::Path::new("/tmp/giftbox-test"),
        );
        // DATABASE_URL may be set in dev shells; only assert the fallback shape
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(
                url.expose_secret(),
                "sqlite:///tmp/giftbox-test/accounts.db"
            );
        }
    }
}
