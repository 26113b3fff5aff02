// ── API-to-domain type conversions ──
//
// Bridges raw `wispay_api` response types into canonical `wispay_core`
// domain types. RouterOS serializes everything as strings, so the impls
// here parse flags, counters, and duration strings into strong types,
// filling sensible defaults for missing optional data.

use std::time::Duration;

use wispay_api::routeros::models::{ActiveEntry, HotspotUser};

use crate::model::account::{HotspotAccount, SessionInfo};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a RouterOS boolean string. Current firmware reports
/// `"true"`/`"false"`; older versions use `"yes"`/`"no"`.
fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw, Some("true" | "yes"))
}

/// Parse a decimal counter string, treating absent/garbage as zero.
fn parse_counter(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Parse a RouterOS duration string.
///
/// Uptimes come in unit-suffixed form (`"1d2h3m4s"`, `"2w1d"`, `"57s"`);
/// some fields use clock form (`"01:57:40"`). Unparseable input yields
/// `None` rather than a bogus zero.
pub(crate) fn parse_routeros_duration(raw: &str) -> Option<Duration> {
    if raw.is_empty() {
        return None;
    }

    // Clock form: HH:MM:SS
    if raw.contains(':') {
        let mut parts = raw.split(':');
        let hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u64 = parts.next()?.parse().ok()?;
        let seconds: u64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        return Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds));
    }

    // Unit-suffixed form: [Nw][Nd][Nh][Nm][Ns]
    let mut total_secs: u64 = 0;
    let mut number = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }
        let value: u64 = number.parse().ok()?;
        number.clear();
        let unit_secs = match ch {
            'w' => 604_800,
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total_secs += value * unit_secs;
    }
    if !number.is_empty() {
        // Trailing digits without a unit
        return None;
    }
    Some(Duration::from_secs(total_secs))
}

// ── Hotspot account ────────────────────────────────────────────────

impl From<HotspotUser> for HotspotAccount {
    fn from(u: HotspotUser) -> Self {
        Self {
            username: u.name,
            profile: u.profile,
            enabled: !parse_flag(u.disabled.as_deref()),
            comment: u.comment,
            limit_uptime: u.limit_uptime,
        }
    }
}

// ── Active session ─────────────────────────────────────────────────

impl From<ActiveEntry> for SessionInfo {
    fn from(e: ActiveEntry) -> Self {
        Self {
            address: e.address.as_deref().and_then(|s| s.parse().ok()),
            mac_address: e.mac_address,
            uptime: e.uptime.as_deref().and_then(parse_routeros_duration),
            bytes_in: parse_counter(e.bytes_in.as_deref()),
            bytes_out: parse_counter(e.bytes_out.as_deref()),
        }
    }
}
