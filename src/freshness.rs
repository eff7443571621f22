//! Staleness rules for cached series values.
//!
//! A value is stale once strictly more than the frequency's threshold has
//! elapsed since the last successful refresh. Monthly thresholds depend on the
//! month and year of `now`, not of the cached observation.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::frequency::Frequency;

/// Whether a series with `frequency`, last refreshed at `last_refresh`, should
/// be fetched again at `now`.
pub fn needs_refresh(
    frequency: Frequency,
    last_refresh: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let Some(last_refresh) = last_refresh else {
        return true;
    };

    match threshold(frequency, now) {
        Some(threshold) => now > last_refresh + threshold,
        None => true,
    }
}

/// Refresh interval for `frequency` evaluated at `now`; `None` for unknown
/// frequencies, which are always stale.
pub fn threshold(frequency: Frequency, now: DateTime<Utc>) -> Option<Duration> {
    let threshold = match frequency {
        Frequency::Daily => Duration::hours(24),
        Frequency::Weekly => Duration::days(7),
        Frequency::Biweekly => Duration::days(14),
        Frequency::Monthly => Duration::days(monthly_threshold_days(now.month(), now.year())),
        Frequency::Quarterly => Duration::days(91),
        Frequency::Semiannual => Duration::days(182),
        Frequency::Annual => Duration::days(365),
        Frequency::Unknown => return None,
    };
    Some(threshold)
}

fn monthly_threshold_days(month: u32, year: i32) -> i64 {
    match month {
        4 | 6 | 9 | 11 => 30,
        // February's thresholds are inverted relative to its length.
        2 if is_leap_year(year) => 28,
        2 => 29,
        _ => 31,
    }
}

/// Proleptic Gregorian leap year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
