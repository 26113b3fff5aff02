// ── Router-owned views ──
//
// Read-only domain views of state the router owns: hotspot accounts and
// their live sessions. wispay references these; it never stores them.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A hotspot account as seen on the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotAccount {
    pub username: String,
    pub profile: Option<String>,
    pub enabled: bool,
    /// Free-text traceability metadata (contact, expiry, scheduler id).
    pub comment: Option<String>,
    /// Remaining session time budget, as configured (`limit-uptime`).
    pub limit_uptime: Option<String>,
}

/// A live captive-portal session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub address: Option<IpAddr>,
    pub mac_address: Option<String>,
    pub uptime: Option<Duration>,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// An active session together with the account it belongs to.
#[derive(Debug, Clone)]
pub struct ActiveUser {
    pub username: String,
    pub session: SessionInfo,
}

/// Login/status view: the account plus its session, if connected.
#[derive(Debug, Clone)]
pub struct AccountStatus {
    pub account: HotspotAccount,
    pub session: Option<SessionInfo>,
}
