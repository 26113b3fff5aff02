//! Configuration for the wispay portal server.
//!
//! TOML file + `WISPAY_`-prefixed environment overrides, validated and
//! translated into `wispay_core` runtime config types. The server binary
//! is the only consumer — core crates never read config files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use wispay_core::{NotifierConfig, RouterConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub router: RouterSection,

    #[serde(default)]
    pub telegram: TelegramSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub portal: PortalSection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSection {
    /// Bind address for the HTTP service.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouterSection {
    /// Router base URL (e.g., "https://192.168.88.1").
    #[serde(default = "default_router_url")]
    pub url: String,

    /// API user (needs `api` + `rest-api` policy).
    #[serde(default = "default_router_username")]
    pub username: String,

    /// API password (plaintext — prefer the WISPAY_ROUTER__PASSWORD env var).
    #[serde(default)]
    pub password: String,

    /// Skip TLS verification (self-signed router certs).
    #[serde(default = "default_true")]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            url: default_router_url(),
            username: default_router_username(),
            password: String::new(),
            insecure: true,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TelegramSection {
    /// Bot token (plaintext — prefer the WISPAY_TELEGRAM__BOT_TOKEN env var).
    #[serde(default)]
    pub bot_token: String,

    /// Chat receiving approval requests and bot commands.
    #[serde(default)]
    pub admin_chat_id: i64,

    /// Unguessable path segment for the webhook route.
    #[serde(default)]
    pub webhook_secret: String,

    /// Bot API root override (tests / self-hosted Bot API).
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StoreSection {
    /// Spool directory for pending-request records.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PortalSection {
    /// HS256 key for portal session tokens.
    #[serde(default)]
    pub session_secret: String,

    /// Session token lifetime in minutes.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,

    /// Username prefix for generated accounts.
    #[serde(default = "default_username_prefix")]
    pub username_prefix: String,
}

impl Default for PortalSection {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_ttl_minutes: default_session_ttl(),
            username_prefix: default_username_prefix(),
        }
    }
}

fn default_listen() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default listen address")
}
fn default_router_url() -> String {
    "https://192.168.88.1".into()
}
fn default_router_username() -> String {
    "admin".into()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("pending_users")
}
fn default_session_ttl() -> u64 {
    60
}
fn default_username_prefix() -> String {
    "user".into()
}

// ── Loading ─────────────────────────────────────────────────────────

impl Config {
    /// Load configuration: defaults, then the TOML file (if present), then
    /// `WISPAY_`-prefixed env vars (`WISPAY_ROUTER__PASSWORD=...`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("WISPAY_").split("__"))
            .extract()?;
        Ok(config)
    }

    // ── Translation into core runtime config ────────────────────────

    pub fn router_config(&self) -> Result<RouterConfig, ConfigError> {
        let url: Url = self.router.url.parse().map_err(|e| ConfigError::Validation {
            field: "router.url".into(),
            reason: format!("{e}"),
        })?;
        if self.router.password.is_empty() {
            return Err(ConfigError::Validation {
                field: "router.password".into(),
                reason: "must be set (file or WISPAY_ROUTER__PASSWORD)".into(),
            });
        }

        let tls = match (&self.router.ca_cert, self.router.insecure) {
            (Some(path), _) => TlsVerification::CustomCa(path.clone()),
            (None, true) => TlsVerification::DangerAcceptInvalid,
            (None, false) => TlsVerification::SystemDefaults,
        };

        Ok(RouterConfig {
            url,
            username: self.router.username.clone(),
            password: SecretString::from(self.router.password.clone()),
            tls,
            timeout: Duration::from_secs(self.router.timeout),
        })
    }

    pub fn notifier_config(&self) -> Result<NotifierConfig, ConfigError> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Validation {
                field: "telegram.bot_token".into(),
                reason: "must be set (file or WISPAY_TELEGRAM__BOT_TOKEN)".into(),
            });
        }
        if self.telegram.admin_chat_id == 0 {
            return Err(ConfigError::Validation {
                field: "telegram.admin_chat_id".into(),
                reason: "must be set to the admin chat".into(),
            });
        }

        let api_url: Url = self
            .telegram
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_BOT_API_URL)
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "telegram.api_url".into(),
                reason: format!("{e}"),
            })?;

        Ok(NotifierConfig {
            api_url,
            bot_token: SecretString::from(self.telegram.bot_token.clone()),
            admin_chat_id: self.telegram.admin_chat_id,
            timeout: Duration::from_secs(self.router.timeout),
        })
    }

    /// Validate the pieces the server itself consumes.
    pub fn validate_server(&self) -> Result<(), ConfigError> {
        if self.telegram.webhook_secret.len() < 16 {
            return Err(ConfigError::Validation {
                field: "telegram.webhook_secret".into(),
                reason: "must be at least 16 characters".into(),
            });
        }
        if self.portal.session_secret.len() < 32 {
            return Err(ConfigError::Validation {
                field: "portal.session_secret".into(),
                reason: "must be at least 32 characters".into(),
            });
        }
        Ok(())
    }
}

const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Config;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("wispay.toml");
        std::fs::write(&path, body).expect("config written");
        path
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "");

        let config = Config::load(&path).expect("loads");
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.router.username, "admin");
        assert!(config.router.insecure);
        assert_eq!(config.portal.username_prefix, "user");
        assert_eq!(config.store.dir, std::path::PathBuf::from("pending_users"));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
            [server]
            listen = "127.0.0.1:9090"

            [router]
            url = "https://10.0.0.1"
            username = "api"
            password = "s3cret"
            insecure = false
            timeout = 10

            [telegram]
            bot_token = "123:ABC"
            admin_chat_id = 42
            webhook_secret = "0123456789abcdef"
            "#,
        );

        let config = Config::load(&path).expect("loads");
        assert_eq!(config.server.listen.port(), 9090);

        let router = config.router_config().expect("router config builds");
        assert_eq!(router.url.as_str(), "https://10.0.0.1/");
        assert_eq!(router.username, "api");
        assert_eq!(router.timeout.as_secs(), 10);
        assert_eq!(router.tls, wispay_core::TlsVerification::SystemDefaults);

        let notifier = config.notifier_config().expect("notifier config builds");
        assert_eq!(notifier.admin_chat_id, 42);
        assert_eq!(notifier.api_url.as_str(), "https://api.telegram.org/");
    }

    #[test]
    fn missing_router_password_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "[router]\nurl = \"https://10.0.0.1\"\n");

        let config = Config::load(&path).expect("loads");
        let err = config.router_config().expect_err("password required");
        assert!(err.to_string().contains("router.password"));
    }

    #[test]
    fn short_secrets_fail_server_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
            [telegram]
            webhook_secret = "short"

            [portal]
            session_secret = "short"
            "#,
        );

        let config = Config::load(&path).expect("loads");
        let err = config.validate_server().expect_err("too short");
        assert!(err.to_string().contains("webhook_secret"));
    }
}
