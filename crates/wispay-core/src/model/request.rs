// ── Pending top-up requests ──

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::package::Package;

/// Lifecycle status of a [`PendingRequest`].
///
/// `Pending` transitions exactly once to `Approved` or `Rejected`;
/// both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// A durable record of one top-up submission awaiting (or past) a decision.
///
/// Created at submission time, after the backing disabled account exists on
/// the router; mutated only by the approval workflow; never deleted.
#[derive(Clone, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Stable identifier -- equal to the generated username.
    pub id: String,
    pub username: String,
    /// Plaintext account password. Persisted in the record (the admin and
    /// the approval message need it); redacted from `Debug` output.
    pub password: String,
    pub package: Package,
    /// Payer's mobile-wallet number. Untrusted input.
    pub contact_number: String,
    /// Opaque reference to uploaded payment-proof evidence.
    #[serde(default)]
    pub proof_reference: Option<String>,
    /// Guest's network address at submission time, best-effort.
    #[serde(default)]
    pub source_address: Option<IpAddr>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl PendingRequest {
    /// The source address for display, `"unknown"` when absent.
    pub fn source_display(&self) -> String {
        self.source_address
            .map_or_else(|| "unknown".into(), |ip| ip.to_string())
    }
}

// Manual impl keeps the password out of logs.
impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("package", &self.package)
            .field("contact_number", &self.contact_number)
            .field("proof_reference", &self.proof_reference)
            .field("source_address", &self.source_address)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("decided_at", &self.decided_at)
            .finish()
    }
}
