//! Shell configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHELL_BASE_URL` - Public URL for the shell (`https://` enables secure cookies)
//! - `ERP_API_URL` - Base URL of the ERP backend API
//!
//! ## Optional
//! - `SHELL_HOST` - Bind address (default: 127.0.0.1)
//! - `SHELL_PORT` - Listen port (default: 3000)
//! - `SHELL_LOCALE` - Number formatting locale (default: en-US)
//! - `ERP_API_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 10)
//! - `DASHBOARD_WINDOW_DAYS` - Trailing window for sales and finance (default: 30)
//! - `DASHBOARD_RENDER_DEADLINE_MS` - How long page renders wait for sources (default: 1500)
//! - `QUERY_CACHE_TTL_SECS` - How long fetched dashboard data stays cached (default: 300)
//! - `QUERY_RETRY_ATTEMPTS` - Retries after a failed fetch (default: 3)
//! - `QUERY_RETRY_BASE_DELAY_MS` - First retry backoff, doubled per attempt (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)
//!
//! ## Optional (TLS)
//! - `SHELL_TLS_CERT` - PEM-encoded certificate chain
//! - `SHELL_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use erp_shell_core::{DEFAULT_WINDOW_DAYS, NumberLocale};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shell application configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the shell
    pub base_url: String,
    /// ERP backend API configuration
    pub backend: BackendConfig,
    /// Dashboard data configuration
    pub dashboard: DashboardConfig,
    /// Query cache and retry configuration
    pub query: QueryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// ERP backend API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://erp.internal/`
    pub api_url: Url,
    /// Upper bound for a single request attempt
    pub timeout: Duration,
}

/// Dashboard configuration.
#[derive(Debug, Clone, Copy)]
pub struct DashboardConfig {
    /// Trailing window for sales and finance aggregates
    pub window_days: u32,
    /// Number formatting locale for currency values
    pub locale: NumberLocale,
    /// How long a page render waits before showing unsettled sources as pending
    pub render_deadline: Duration,
}

/// Query layer configuration.
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    /// How long a successful fetch stays cached
    pub cache_ttl: Duration,
    /// Retries after the first failed attempt (sources that allow retry)
    pub retry_attempts: u32,
    /// Delay before the first retry; doubled for each further retry
    pub retry_base_delay: Duration,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_lookup(env: &Lookup<'_>) -> Result<Option<Self>, ConfigError> {
        match (env.optional("SHELL_TLS_CERT"), env.optional("SHELL_TLS_KEY")) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SHELL_TLS_*".to_string(),
                "Both SHELL_TLS_CERT and SHELL_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl ShellConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(&lookup);

        let host = env.parsed_or("SHELL_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed_or("SHELL_PORT", 3000_u16)?;
        let base_url = env.required("SHELL_BASE_URL")?;

        let api_url = env.required("ERP_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ERP_API_URL".to_string(), e.to_string()))?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "ERP_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }
        let timeout_secs: u64 = env.parsed_or("ERP_API_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ERP_API_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let window_days: u32 = env.parsed_or("DASHBOARD_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?;
        if window_days == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DASHBOARD_WINDOW_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let locale = env.parsed_or("SHELL_LOCALE", NumberLocale::default())?;
        let render_deadline_ms: u64 = env.parsed_or("DASHBOARD_RENDER_DEADLINE_MS", 1500)?;

        let cache_ttl_secs: u64 = env.parsed_or("QUERY_CACHE_TTL_SECS", 300)?;
        let retry_attempts: u32 = env.parsed_or("QUERY_RETRY_ATTEMPTS", 3)?;
        let retry_base_delay_ms: u64 = env.parsed_or("QUERY_RETRY_BASE_DELAY_MS", 1000)?;

        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig {
                api_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            dashboard: DashboardConfig {
                window_days,
                locale,
                render_deadline: Duration::from_millis(render_deadline_ms),
            },
            query: QueryConfig {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                retry_attempts,
                retry_base_delay: Duration::from_millis(retry_base_delay_ms),
            },
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls: TlsConfig::from_lookup(&env)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the shell is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while loading configuration.
struct Lookup<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Lookup<'_> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ShellConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShellConfig::from_lookup(|key| map.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("SHELL_BASE_URL", "http://localhost:3000"),
        ("ERP_API_URL", "http://localhost:8000/"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.backend.timeout, Duration::from_secs(10));
        assert_eq!(config.dashboard.window_days, 30);
        assert_eq!(config.dashboard.locale, NumberLocale::EnUs);
        assert_eq!(config.dashboard.render_deadline, Duration::from_millis(1500));
        assert_eq!(config.query.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.query.retry_attempts, 3);
        assert_eq!(config.query.retry_base_delay, Duration::from_secs(1));
        assert!(config.tls.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("SHELL_BASE_URL", "http://localhost:3000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ERP_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SHELL_PORT", "not-a-port"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "SHELL_PORT"
        ));

        let mut vars = MINIMAL.to_vec();
        vars.push(("DASHBOARD_WINDOW_DAYS", "0"));
        assert!(load(&vars).is_err());

        let mut vars = MINIMAL.to_vec();
        vars.push(("SHELL_LOCALE", "xx-YY"));
        assert!(load(&vars).is_err());

        let vars = [
            ("SHELL_BASE_URL", "http://localhost:3000"),
            ("ERP_API_URL", "not a url"),
        ];
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut vars = MINIMAL.to_vec();
        vars.extend([
            ("SHELL_PORT", "8080"),
            ("SHELL_LOCALE", "de-DE"),
            ("ERP_API_TIMEOUT_SECS", "3"),
            ("QUERY_RETRY_ATTEMPTS", "0"),
            ("DASHBOARD_RENDER_DEADLINE_MS", "250"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.dashboard.render_deadline, Duration::from_millis(250));
        assert_eq!(config.port, 8080);
        assert_eq!(config.dashboard.locale, NumberLocale::DeDe);
        assert_eq!(config.backend.timeout, Duration::from_secs(3));
        assert_eq!(config.query.retry_attempts, 0);
    }

    #[test]
    fn test_tls_requires_both_parts() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SHELL_TLS_CERT", "-----BEGIN CERTIFICATE-----"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_tls_config_debug_redacts_key() {
        let config = TlsConfig {
            cert_pem: "cert".to_string(),
            key_pem: SecretString::from("super_secret_private_key"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_private_key"));
    }
}
