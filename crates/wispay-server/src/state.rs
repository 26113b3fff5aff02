// ── Shared application state ──

use crate::auth::SessionSigner;
use wispay_core::Orchestrator;

/// State shared by every handler, behind an `Arc`.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub sessions: SessionSigner,
    /// Unguessable path segment guarding the Telegram webhook route.
    pub webhook_secret: String,
}
