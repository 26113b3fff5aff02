// ── Core error types ──
//
// Domain-facing errors from wispay-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<wispay_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use crate::model::RequestStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation ─────────────────────────────────────────────
    #[error("Unknown package: {name}")]
    InvalidPackage { name: String },

    #[error("Invalid contact number: {reason}")]
    InvalidContact { reason: String },

    #[error("Malformed approval token: {reason}")]
    InvalidToken { reason: String },

    // ── Workflow errors ──────────────────────────────────────────────
    #[error("Provisioning failed: {message}")]
    ProvisioningFailed { message: String },

    #[error("Admin notification failed: {message}")]
    NotificationFailed { message: String },

    #[error("A request with id {id} already exists")]
    DuplicateRequest { id: String },

    #[error("No pending request matches {id}")]
    RequestNotFound { id: String },

    #[error("Approval event matches {matches} pending requests -- refusing to guess")]
    AmbiguousCorrelation { matches: usize },

    #[error("Request {id} is already {status} -- no further transitions allowed")]
    InvalidTransition { id: String, status: RequestStatus },

    // ── Router errors ────────────────────────────────────────────────
    #[error("Hotspot account not found: {username}")]
    AccountNotFound { username: String },

    #[error("A hotspot account named {username} already exists")]
    AccountExists { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// RouterOS failure detail (e.g. "failure: already have user with this name").
        detail: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Storage / configuration ──────────────────────────────────────
    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wispay_api::Error> for CoreError {
    fn from(err: wispay_api::Error) -> Self {
        match err {
            wispay_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            wispay_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        detail: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wispay_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wispay_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            wispay_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            wispay_api::Error::RouterOs {
                status,
                message,
                detail,
            } => CoreError::Api {
                message,
                detail,
                status: Some(status),
            },
            wispay_api::Error::Telegram { description, code } => CoreError::Api {
                message: description,
                detail: None,
                status: code.and_then(|c| u16::try_from(c).ok()),
            },
            wispay_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
