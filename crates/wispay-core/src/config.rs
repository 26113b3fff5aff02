// ── Runtime connection configuration ──
//
// These types describe *how* to reach the two external collaborators.
// They carry credential data and connection tuning, but never touch disk.
// The server binary constructs them (via wispay-config) and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use wispay_api::transport::{TlsMode, TransportConfig};

/// TLS verification strategy for the router connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for LAN routers.
    #[default]
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub(crate) fn to_tls_mode(&self) -> TlsMode {
        match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for connecting to the RouterOS gateway.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Router URL (e.g., `https://192.168.88.1`).
    pub url: Url,
    /// Router API user (needs `api` + `rest-api` policy).
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl RouterConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.to_tls_mode(),
            timeout: self.timeout,
        }
    }
}

/// Configuration for the Telegram approval channel.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Bot API root. Normally the public endpoint; tests point this at a
    /// mock server.
    pub api_url: Url,
    pub bot_token: SecretString,
    /// Chat that receives approval requests and bot commands.
    pub admin_chat_id: i64,
    /// Request timeout.
    pub timeout: Duration,
}

impl NotifierConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            // The public Bot API has a valid certificate chain.
            tls: TlsMode::System,
            timeout: self.timeout,
        }
    }
}
