// ── Display formatting ──

use std::time::Duration;

use bytesize::ByteSize;

/// Human-readable byte count in binary units, e.g. `"1.0 MiB"`.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string_as(true)
}

/// Human-readable duration, e.g. `"1h 57m 40s"`.
pub fn format_uptime(uptime: Duration) -> String {
    humantime::format_duration(uptime).to_string()
}
