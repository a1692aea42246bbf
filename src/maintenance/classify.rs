//! Row classification predicates for the `app_options` table.
//!
//! Pure functions; every decision about which rows the maintenance passes may
//! touch lives here. The transient data prefix is a strict string-prefix of
//! the timeout prefix, so the more specific timeout pattern is always tested
//! first.

use crate::db::OptionRow;

/// Option holding the host application's serialized rewrite rules; large and
/// rarely read, so it never needs to be autoloaded.
pub const REWRITE_RULES: &str = "rewrite_rules";

/// Prefix shared by all transient rows (data rows and expiry markers).
pub const TRANSIENT_PREFIX: &str = "_transient_";

/// Prefix of expiry markers; the value is a Unix timestamp in seconds.
pub const TRANSIENT_TIMEOUT_PREFIX: &str = "_transient_timeout_";

/// Transient rows with values larger than this stay out of the autoload set.
pub const AUTOLOAD_VALUE_LIMIT: usize = 1000;

/// Whether the daily optimizer should clear this row's autoload flag.
///
/// Matches only `rewrite_rules` and oversized transient rows, and only while
/// the flag is still set.
pub fn should_disable_autoload(row: &OptionRow) -> bool {
    if !row.autoload {
        return false;
    }
    row.name == REWRITE_RULES
        || (row.name.starts_with(TRANSIENT_PREFIX) && row.value.len() > AUTOLOAD_VALUE_LIMIT)
}

pub fn is_expiry_marker(name: &str) -> bool {
    name.starts_with(TRANSIENT_TIMEOUT_PREFIX)
}

pub fn is_transient_data_key(name: &str) -> bool {
    name.starts_with(TRANSIENT_PREFIX) && !is_expiry_marker(name)
}

/// Identifier shared by a data row and its expiry marker.
///
/// Explicit prefix stripping, timeout prefix first; `None` for rows outside
/// the transient namespace.
pub fn pair_name(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix(TRANSIENT_TIMEOUT_PREFIX) {
        return Some(rest);
    }
    name.strip_prefix(TRANSIENT_PREFIX)
}

/// Whether an expiry marker value is past due at `now`.
///
/// Policy for malformed (non-numeric) values: treat as already expired.
/// Transients are caches, so deleting an unreadable one is always safe.
pub fn marker_expired(value: &str, now: i64) -> bool {
    match value.trim().parse::<i64>() {
        Ok(deadline) => deadline < now,
        Err(_) => true,
    }
}
