//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL of the shop, used in feeds, sitemap and JSON-LD
//! - `STOREFRONT_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_JWT_TTL_HOURS` - Token lifetime (default: 168)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal for free shipping in TRY (default: 500)
//! - `SHIPPING_FEE` - Flat shipping fee in TRY (default: 49.90)
//! - `WHATSAPP_NUMBER` - Number used for WhatsApp orders, digits only (e.g. 905551112233)
//! - `PAYMENT_BASE_URL`, `PAYMENT_API_KEY`, `PAYMENT_SECRET_KEY` - Card payment gateway;
//!   card checkout is disabled unless all three are set
//! - `AI_API_KEY`, `AI_MODEL` (default: gpt-4o-mini), `AI_BASE_URL`
//!   (default: <https://api.openai.com/v1>) - Supplement advisor chat
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use takviye_core::Money;
use takviye_core::shipping::ShippingPolicy;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
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
    "degistir",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL without a trailing slash
    pub base_url: String,
    /// Token signing
    pub jwt: JwtConfig,
    /// Shipping and WhatsApp ordering
    pub shop: ShopConfig,
    /// Card payment gateway, if configured
    pub payment: Option<PaymentConfig>,
    /// AI chat completion API, if configured
    pub ai: Option<AiConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: String,
}

/// JWT settings.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub ttl_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Order-side settings that are not stored in `site_settings`.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub free_shipping_threshold: Money,
    pub shipping_fee: Money,
    pub whatsapp_number: Option<String>,
}

impl ShopConfig {
    /// Shipping policy built from the configured amounts.
    #[must_use]
    pub const fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_threshold: self.free_shipping_threshold,
            flat_fee: self.shipping_fee,
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        let policy = ShippingPolicy::default();
        Self {
            free_shipping_threshold: policy.free_threshold,
            shipping_fee: policy.flat_fee,
            whatsapp_number: None,
        }
    }
}

/// Card payment gateway credentials.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub secret_key: SecretString,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// AI chat completion settings.
#[derive(Clone)]
pub struct AiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url()?;
        let host = parse_env::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let jwt_secret = get_validated_secret("STOREFRONT_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "STOREFRONT_JWT_SECRET")?;
        let jwt = JwtConfig {
            secret: jwt_secret,
            ttl_hours: parse_env::<i64>("STOREFRONT_JWT_TTL_HOURS", "168")?,
        };

        let shop = ShopConfig {
            free_shipping_threshold: get_money("FREE_SHIPPING_THRESHOLD", "500")?,
            shipping_fee: get_money("SHIPPING_FEE", "49.90")?,
            whatsapp_number: get_optional_env("WHATSAPP_NUMBER")
                .map(|n| n.chars().filter(char::is_ascii_digit).collect()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            jwt,
            shop,
            payment: PaymentConfig::from_env(),
            ai: AiConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_env_or_default("SENTRY_ENVIRONMENT", "development"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a site path such as `/urun/whey-protein`.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl PaymentConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            base_url: get_optional_env("PAYMENT_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            api_key: SecretString::from(get_optional_env("PAYMENT_API_KEY")?),
            secret_key: SecretString::from(get_optional_env("PAYMENT_SECRET_KEY")?),
        })
    }
}

impl AiConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            api_key: SecretString::from(get_optional_env("AI_API_KEY")?),
            model: get_env_or_default("AI_MODEL", "gpt-4o-mini"),
            base_url: get_env_or_default("AI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
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

/// Database URL alone, for tools that do not need the full server config.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `STOREFRONT_DATABASE_URL`
/// nor `DATABASE_URL` is set.
pub fn database_url() -> Result<SecretString, ConfigError> {
    get_database_url("STOREFRONT_DATABASE_URL")
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
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a lira amount from the environment.
fn get_money(key: &str, default: &str) -> Result<Money, ConfigError> {
    Money::parse(&get_env_or_default(key, default))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/takviye"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://takviye.com.tr".to_string(),
            jwt: JwtConfig {
                secret: SecretString::from("k9$Qw2!zR7@pL4#xV8^mN1&bT6*cY3%d"),
                ttl_hours: 168,
            },
            shop: ShopConfig::default(),
            payment: None,
            ai: None,
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy_edges() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        for candidate in ["your-jwt-key-here", "changeme123", "lutfen-degistir-bunu"] {
            let err = validate_secret_strength(candidate, "TEST_VAR").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{candidate}");
        }
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_length() {
        assert!(validate_jwt_secret(&SecretString::from("short"), "JWT").is_err());
        assert!(validate_jwt_secret(&SecretString::from("a".repeat(32)), "JWT").is_ok());
    }

    #[test]
    fn test_socket_addr_and_urls() {
        let config = test_config();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.absolute_url("/urun/kreatin"),
            "https://takviye.com.tr/urun/kreatin"
        );
        assert_eq!(config.absolute_url("blog"), "https://takviye.com.tr/blog");
    }

    #[test]
    fn test_default_shipping_policy() {
        let policy = ShopConfig::default().shipping_policy();
        assert_eq!(policy.free_threshold, Money::from_kurus(50_000));
        assert_eq!(policy.flat_fee, Money::from_kurus(4_990));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = test_config();
        config.payment = Some(PaymentConfig {
            base_url: "https://pay.example.net".to_string(),
            api_key: SecretString::from("pk_live_visible_never"),
            secret_key: SecretString::from("sk_live_visible_never"),
        });
        config.ai = Some(AiConfig {
            api_key: SecretString::from("ai_key_visible_never"),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        });

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("pay.example.net"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("visible_never"));
        assert!(!debug_output.contains("k9$Qw2"));
    }
}
