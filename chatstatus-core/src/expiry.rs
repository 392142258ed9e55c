//! Status expiry
//!
//! Decides whether a stored status is still active, computes the expiry
//! instant for each duration choice, and builds the "Until Today at 5:30 PM"
//! label. The current time and timezone are always supplied by the caller;
//! nothing here reads a clock.
//!
//! Label rules, applied in order:
//! 1. Time of day is dropped when the expiry is exactly the end of today, or
//!    later than the end of tomorrow.
//! 2. A weekday name replaces the date when the expiry is less than six days
//!    away.
//! 3. "Today" and "Tomorrow" replace either when the calendar day matches.

use crate::format::{format_timestamp, DateStyle, RelativeDay, TimestampOptions};
use crate::types::{CustomStatus, CustomStatusDuration};
use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike,
    Utc,
};

/// Prefix used when an expiry label is shown on its own.
pub const EXPIRY_PREFIX: &str = "Until";

/// True when `status` should be shown at `now`.
///
/// Statuses without expiry are always active. Otherwise the status is
/// active strictly before `expires_at`; a missing or unparsable expiry
/// counts as expired.
pub fn is_active<Tz: TimeZone>(status: &CustomStatus, now: &DateTime<Tz>) -> bool {
    if !status.duration.expires() {
        return true;
    }

    match status.expires_at_time() {
        Some(expires_at) => now.with_timezone(&Utc) < expires_at.with_timezone(&Utc),
        None => {
            tracing::debug!(
                expires_at = ?status.expires_at,
                "Hiding status with unparsable expiry"
            );
            false
        }
    }
}

/// The status if it is still active at `now`.
pub fn visible_status<Tz: TimeZone>(
    status: Option<CustomStatus>,
    now: &DateTime<Tz>,
) -> Option<CustomStatus> {
    status.filter(|s| is_active(s, now))
}

// ============================================
// Expiry computation
// ============================================

/// Map a local wall-clock time to an instant, preferring the later reading
/// on DST overlaps and falling back to UTC inside a gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, later) => later,
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}

fn end_of_date<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
    resolve_local(tz, naive)
}

/// Last millisecond of `now`'s calendar day.
pub fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    end_of_date(&now.timezone(), now.date_naive())
}

/// Last millisecond of `now`'s week, with weeks starting on Sunday.
pub fn end_of_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let days_left = 6 - now.weekday().num_days_from_sunday();
    let date = now.date_naive();
    let saturday = date
        .checked_add_days(Days::new(days_left as u64))
        .unwrap_or(date);
    end_of_date(&now.timezone(), saturday)
}

fn truncate_to_minute<Tz: TimeZone>(dt: DateTime<Tz>) -> DateTime<Tz> {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Default time offered by the custom date picker: the next half hour.
pub fn rounded_custom_time<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let minutes_to_add = 30 - (now.minute() % 30);
    truncate_to_minute(now.clone() + Duration::minutes(minutes_to_add as i64))
}

/// Expiry instant for a status set at `now` with `duration`.
///
/// `custom` is used for [`CustomStatusDuration::CustomDateTime`]; without it
/// the next half hour is chosen.
pub fn calculate_expires_at<Tz: TimeZone>(
    duration: CustomStatusDuration,
    now: &DateTime<Tz>,
    custom: Option<&DateTime<Tz>>,
) -> Option<DateTime<Tz>> {
    match duration {
        CustomStatusDuration::DontClear => None,
        CustomStatusDuration::ThirtyMinutes => {
            Some(truncate_to_minute(now.clone() + Duration::minutes(30)))
        }
        CustomStatusDuration::OneHour => Some(truncate_to_minute(now.clone() + Duration::hours(1))),
        CustomStatusDuration::FourHours => {
            Some(truncate_to_minute(now.clone() + Duration::hours(4)))
        }
        CustomStatusDuration::Today => Some(end_of_day(now)),
        CustomStatusDuration::ThisWeek => Some(end_of_week(now)),
        CustomStatusDuration::CustomDateTime => Some(
            custom
                .cloned()
                .unwrap_or_else(|| rounded_custom_time(now)),
        ),
    }
}

// ============================================
// Expiry label
// ============================================

/// The decisions that shape an expiry label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryFormat {
    /// Include the time of day
    pub use_time: bool,
    /// Use a weekday name instead of a numeric date
    pub use_weekday: bool,
    /// "Today" / "Tomorrow" when the calendar day matches
    pub relative: Option<RelativeDay>,
}

impl ExpiryFormat {
    fn timestamp_options(&self) -> TimestampOptions {
        TimestampOptions {
            relative: self.relative,
            date_style: if self.use_weekday {
                DateStyle::Weekday
            } else {
                DateStyle::MonthDay
            },
            use_time: self.use_time,
        }
    }
}

/// Decide how to render `expires_at` as seen at `now`.
pub fn expiry_format<Tz: TimeZone>(expires_at: &DateTime<Tz>, now: &DateTime<Tz>) -> ExpiryFormat {
    let today_end = end_of_day(now);
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or_else(|| now.date_naive());
    let tomorrow_end = end_of_date(&now.timezone(), tomorrow);

    let exact_end_of_today = expires_at.timestamp_millis() == today_end.timestamp_millis();
    let use_time = !(exact_end_of_today || *expires_at > tomorrow_end);

    let use_weekday = *expires_at < now.clone() + Duration::days(6);

    let expiry_date = expires_at.date_naive();
    let relative = if expiry_date == now.date_naive() {
        Some(RelativeDay::Today)
    } else if expiry_date == tomorrow {
        Some(RelativeDay::Tomorrow)
    } else {
        None
    };

    ExpiryFormat {
        use_time,
        use_weekday,
        relative,
    }
}

/// Render `expires_at` in `now`'s timezone, e.g. "Tomorrow at 9:00 AM".
pub fn format_expiry<Tz: TimeZone, Tz2: TimeZone>(
    expires_at: &DateTime<Tz2>,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = expires_at.with_timezone(&now.timezone());
    let format = expiry_format(&local, now);
    format_timestamp(&local, now, &format.timestamp_options())
}

/// Label for a status's raw `expires_at`, optionally prefixed with "Until".
///
/// Returns `None` when the timestamp cannot be parsed.
pub fn display_expiry<Tz: TimeZone>(
    expires_at: &str,
    now: &DateTime<Tz>,
    with_prefix: bool,
) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let parsed = DateTime::parse_from_rfc3339(expires_at).ok()?;
    let label = format_expiry(&parsed, now);
    Some(if with_prefix {
        format!("{} {}", EXPIRY_PREFIX, label)
    } else {
        label
    })
}

/// Expiry label for a status, or `None` if it never expires.
pub fn status_expiry_label<Tz: TimeZone>(status: &CustomStatus, now: &DateTime<Tz>) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    if !status.duration.expires() {
        return None;
    }
    status
        .expires_at
        .as_deref()
        .and_then(|s| display_expiry(s, now, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Weekday};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn expiring(duration: CustomStatusDuration, expires_at: &str) -> CustomStatus {
        CustomStatus {
            duration,
            expires_at: Some(expires_at.to_string()),
            ..CustomStatus::new("calendar", "In a meeting")
        }
    }

    #[test]
    fn test_active_boundary_is_exclusive() {
        let status = expiring(CustomStatusDuration::ThirtyMinutes, "2024-01-01T12:30:00Z");
        assert!(is_active(&status, &utc("2024-01-01T12:29:59Z")));
        assert!(!is_active(&status, &utc("2024-01-01T12:30:00Z")));
        assert!(!is_active(&status, &utc("2024-01-01T13:00:00Z")));
    }

    #[test]
    fn test_dont_clear_always_active() {
        let mut status = CustomStatus::new("house", "WFH");
        assert!(is_active(&status, &utc("2099-01-01T00:00:00Z")));

        // A stale expiry is ignored
        status.expires_at = Some("2000-01-01T00:00:00Z".to_string());
        assert!(is_active(&status, &utc("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_missing_or_bad_expiry_is_expired() {
        let mut status = CustomStatus::new("house", "WFH");
        status.duration = CustomStatusDuration::Today;
        assert!(!is_active(&status, &utc("2024-01-01T00:00:00Z")));

        status.expires_at = Some("soon".to_string());
        assert!(!is_active(&status, &utc("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_active_across_timezones() {
        let status = expiring(CustomStatusDuration::OneHour, "2024-01-01T12:00:00+02:00");
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 1, 1, 4, 59, 0).unwrap(); // 09:59 UTC
        assert!(is_active(&status, &now));
        let now = tz.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap(); // 10:00 UTC
        assert!(!is_active(&status, &now));
    }

    #[test]
    fn test_visible_status() {
        let status = expiring(CustomStatusDuration::OneHour, "2024-01-01T12:00:00Z");
        assert!(visible_status(Some(status.clone()), &utc("2024-01-01T11:00:00Z")).is_some());
        assert!(visible_status(Some(status.clone()), &utc("2024-01-01T12:00:00Z")).is_none());
        assert!(visible_status(None, &utc("2024-01-01T11:00:00Z")).is_none());
    }

    #[test]
    fn test_calculate_fixed_durations() {
        let now = utc("2024-01-03T12:10:42.500Z");
        let exp = |d| calculate_expires_at(d, &now, None).unwrap();

        assert_eq!(exp(CustomStatusDuration::ThirtyMinutes), utc("2024-01-03T12:40:00Z"));
        assert_eq!(exp(CustomStatusDuration::OneHour), utc("2024-01-03T13:10:00Z"));
        assert_eq!(exp(CustomStatusDuration::FourHours), utc("2024-01-03T16:10:00Z"));
        assert_eq!(exp(CustomStatusDuration::Today), utc("2024-01-03T23:59:59.999Z"));
        // 2024-01-03 is a Wednesday; the week ends Saturday
        assert_eq!(exp(CustomStatusDuration::ThisWeek), utc("2024-01-06T23:59:59.999Z"));
        assert!(calculate_expires_at(CustomStatusDuration::DontClear, &now, None).is_none());
    }

    #[test]
    fn test_end_of_week_on_saturday() {
        let now = utc("2024-01-06T08:00:00Z");
        assert_eq!(now.weekday(), Weekday::Sat);
        assert_eq!(end_of_week(&now), utc("2024-01-06T23:59:59.999Z"));
    }

    #[test]
    fn test_end_of_day_in_local_timezone() {
        let tz = chrono_tz::America::New_York;
        let now = utc("2024-01-03T03:00:00Z").with_timezone(&tz); // Jan 2, 22:00 local
        let end = end_of_day(&now);
        assert_eq!(end.with_timezone(&Utc), utc("2024-01-03T04:59:59.999Z"));
    }

    #[test]
    fn test_custom_date_time() {
        let now = utc("2024-01-03T12:10:42Z");
        let chosen = utc("2024-02-01T09:00:00Z");
        assert_eq!(
            calculate_expires_at(CustomStatusDuration::CustomDateTime, &now, Some(&chosen)),
            Some(chosen)
        );
        assert_eq!(
            calculate_expires_at(CustomStatusDuration::CustomDateTime, &now, None),
            Some(utc("2024-01-03T12:30:00Z"))
        );
    }

    #[test]
    fn test_rounded_custom_time() {
        assert_eq!(
            rounded_custom_time(&utc("2024-01-03T12:00:00Z")),
            utc("2024-01-03T12:30:00Z")
        );
        assert_eq!(
            rounded_custom_time(&utc("2024-01-03T12:45:10Z")),
            utc("2024-01-03T13:00:00Z")
        );
    }

    #[test]
    fn test_end_of_today_suppresses_time() {
        let now = utc("2024-01-03T10:00:00Z");
        let format = expiry_format(&end_of_day(&now), &now);
        assert!(!format.use_time);
        assert_eq!(format.relative, Some(RelativeDay::Today));
        assert_eq!(format_expiry(&end_of_day(&now), &now), "Today");
    }

    #[test]
    fn test_later_today_keeps_time() {
        let now = utc("2024-01-03T10:00:00Z");
        assert_eq!(
            format_expiry(&utc("2024-01-03T10:30:00Z"), &now),
            "Today at 10:30 AM"
        );
    }

    #[test]
    fn test_tomorrow_keeps_time() {
        let now = utc("2024-01-03T10:00:00Z");
        let format = expiry_format(&utc("2024-01-04T15:00:00Z"), &now);
        assert!(format.use_time);
        assert_eq!(
            format_expiry(&utc("2024-01-04T15:00:00Z"), &now),
            "Tomorrow at 3:00 PM"
        );
    }

    #[test]
    fn test_three_days_uses_weekday() {
        let now = utc("2024-01-03T10:00:00Z");
        let expires = utc("2024-01-06T12:00:00Z");
        let format = expiry_format(&expires, &now);
        assert!(format.use_weekday);
        assert!(!format.use_time);
        assert_eq!(format.relative, None);
        assert_eq!(format_expiry(&expires, &now), "Saturday");
    }

    #[test]
    fn test_ten_days_uses_date() {
        let now = utc("2024-01-03T10:00:00Z");
        let expires = utc("2024-01-13T12:00:00Z");
        let format = expiry_format(&expires, &now);
        assert!(!format.use_weekday);
        assert!(!format.use_time);
        assert_eq!(format_expiry(&expires, &now), "January 13");
    }

    #[test]
    fn test_label_uses_viewer_timezone() {
        let tz = chrono_tz::Asia::Tokyo;
        let now = utc("2024-01-03T10:00:00Z").with_timezone(&tz); // 19:00 local
        let expires = utc("2024-01-03T14:30:00Z"); // 23:30 local
        assert_eq!(format_expiry(&expires, &now), "Today at 11:30 PM");
    }

    #[test]
    fn test_display_expiry() {
        let now = utc("2024-01-03T10:00:00Z");
        assert_eq!(
            display_expiry("2024-01-03T10:30:00Z", &now, true).as_deref(),
            Some("Until Today at 10:30 AM")
        );
        assert_eq!(
            display_expiry("2024-01-03T10:30:00Z", &now, false).as_deref(),
            Some("Today at 10:30 AM")
        );
        assert!(display_expiry("garbage", &now, true).is_none());
    }

    #[test]
    fn test_status_expiry_label() {
        let now = utc("2024-01-03T10:00:00Z");
        let status = expiring(CustomStatusDuration::OneHour, "2024-01-03T11:00:00Z");
        assert_eq!(
            status_expiry_label(&status, &now).as_deref(),
            Some("Until Today at 11:00 AM")
        );
        assert!(status_expiry_label(&CustomStatus::new("house", "WFH"), &now).is_none());
    }
}
