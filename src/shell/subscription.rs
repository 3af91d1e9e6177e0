//! Subscription countdown shown in the sidebar.

use chrono::{DateTime, NaiveDate, Utc};

use crate::backend::UserProfile;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days_remaining: i64,
    pub show_upgrade: bool,
    /// The value is the configured placeholder, not a computed one.
    pub placeholder: bool,
}

impl Countdown {
    /// Countdown for `profile`, or the placeholder when no end date is known.
    pub fn for_profile(
        profile: Option<&UserProfile>,
        now: DateTime<Utc>,
        upgrade_threshold_days: i64,
        placeholder_days: i64,
    ) -> Self {
        let end = profile
            .and_then(|p| p.subscription.as_ref())
            .and_then(|s| s.end_date.as_deref())
            .and_then(parse_end_date);

        match end {
            Some(end) => {
                let days_remaining = remaining_days(end, now);
                Self {
                    days_remaining,
                    show_upgrade: days_remaining <= upgrade_threshold_days,
                    placeholder: false,
                }
            }
            None => Self {
                days_remaining: placeholder_days,
                show_upgrade: false,
                placeholder: true,
            },
        }
    }
}

/// Whole days until `end`, rounded up and never negative.
pub fn remaining_days(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Accept RFC 3339 timestamps and bare dates (midnight UTC).
pub fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
