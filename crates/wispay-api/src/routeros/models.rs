// RouterOS REST response types
//
// Models for the RouterOS v7 REST API. RouterOS serializes everything as
// strings — booleans are `"true"`/`"false"`, counters are decimal strings —
// so wire types keep `String` fields and `wispay-core` parses them into
// strong types. Fields use `#[serde(default)]` liberally because presence
// varies across RouterOS versions and configurations.

use serde::{Deserialize, Serialize};

// ── Error body ───────────────────────────────────────────────────────

/// Failure body returned by the REST API:
/// `{ "error": 400, "message": "Bad Request", "detail": "failure: ..." }`
#[derive(Debug, Deserialize)]
pub struct RestError {
    #[serde(default)]
    pub error: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

// ── Hotspot user ─────────────────────────────────────────────────────

/// A `/ip/hotspot/user` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotUser {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    /// `"true"` / `"false"` (older versions report `"yes"` / `"no"`).
    #[serde(default)]
    pub disabled: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, rename = "limit-uptime")]
    pub limit_uptime: Option<String>,
    #[serde(default, rename = "bytes-in")]
    pub bytes_in: Option<String>,
    #[serde(default, rename = "bytes-out")]
    pub bytes_out: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `PUT /rest/ip/hotspot/user` (add).
#[derive(Debug, Clone, Serialize)]
pub struct NewHotspotUser {
    pub name: String,
    pub password: String,
    pub profile: String,
    /// `"true"` to create the account disabled.
    pub disabled: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body for `PATCH /rest/ip/hotspot/user/{id}` (set). Only present fields
/// are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HotspotUserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ── Active session ───────────────────────────────────────────────────

/// A `/ip/hotspot/active` entry — one currently connected guest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEntry {
    #[serde(rename = ".id")]
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "mac-address")]
    pub mac_address: Option<String>,
    /// RouterOS duration string, e.g. `"1h57m40s"`.
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default, rename = "bytes-in")]
    pub bytes_in: Option<String>,
    #[serde(default, rename = "bytes-out")]
    pub bytes_out: Option<String>,
    #[serde(default, rename = "login-by")]
    pub login_by: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── System script / scheduler ────────────────────────────────────────

/// A `/system/script` entry (only the fields wispay touches).
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
}

/// Body for `PUT /rest/system/script`.
#[derive(Debug, Clone, Serialize)]
pub struct NewScript {
    pub name: String,
    pub source: String,
    pub policy: String,
    #[serde(rename = "dont-require-permissions")]
    pub dont_require_permissions: String,
}

/// A `/system/scheduler` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerEntry {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "on-event")]
    pub on_event: Option<String>,
}

/// Body for `PUT /rest/system/scheduler`.
#[derive(Debug, Clone, Serialize)]
pub struct NewScheduler {
    pub name: String,
    /// MikroTik date format, e.g. `"jun/23/2025"`.
    #[serde(rename = "start-date")]
    pub start_date: String,
    /// `"HH:MM:SS"`.
    #[serde(rename = "start-time")]
    pub start_time: String,
    /// `"0"` = run once.
    pub interval: String,
    #[serde(rename = "on-event")]
    pub on_event: String,
    pub policy: String,
    pub disabled: String,
}
