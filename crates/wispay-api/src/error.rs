use thiserror::Error;

/// Top-level error type for the `wispay-api` crate.
///
/// Covers every failure mode across both API surfaces: authentication,
/// transport, the RouterOS REST API, and the Telegram Bot API.
/// `wispay-core` maps these into domain-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong router credentials, disabled API user, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── RouterOS REST API ───────────────────────────────────────────
    /// Structured error from the RouterOS REST API
    /// (parsed from the `{error, message, detail}` body).
    #[error("RouterOS error (HTTP {status}): {message}")]
    RouterOs {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    // ── Telegram Bot API ────────────────────────────────────────────
    /// Error from the Bot API (parsed from the `{ok: false, description}` envelope).
    #[error("Telegram API error: {description}")]
    Telegram {
        description: String,
        code: Option<i64>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::RouterOs { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if RouterOS refused a create because the name is taken.
    ///
    /// Duplicate adds come back as HTTP 400 with a detail string like
    /// `"failure: already have user with this name"`. Callers use this to
    /// distinguish a retryable name collision from a hard failure.
    pub fn is_name_conflict(&self) -> bool {
        match self {
            Self::RouterOs { detail, .. } => detail
                .as_deref()
                .is_some_and(|d| d.contains("already have")),
            _ => false,
        }
    }
}
