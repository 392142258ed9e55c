//! Timestamp formatting helpers shared by the library and the CLI.
//!
//! [`format_timestamp`] is the generic renderer the expiry evaluator hands
//! its decisions to; it knows nothing about statuses.

use chrono::{DateTime, Datelike, TimeZone};

/// Named day ranges a timestamp may be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
}

impl RelativeDay {
    pub fn label(&self) -> &'static str {
        match self {
            RelativeDay::Today => "Today",
            RelativeDay::Tomorrow => "Tomorrow",
        }
    }
}

/// How to render the day portion when no relative range applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// "Wednesday"
    Weekday,
    /// "October 27", with the year appended outside the current year
    MonthDay,
}

/// Rendering options for [`format_timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampOptions {
    pub relative: Option<RelativeDay>,
    pub date_style: DateStyle,
    pub use_time: bool,
}

/// Render `ts` relative to `now`, both in the same timezone.
///
/// Produces "Today", "Tomorrow at 3:00 PM", "Saturday", "October 27 at 9:15 AM"
/// and so on.
pub fn format_timestamp<Tz: TimeZone>(
    ts: &DateTime<Tz>,
    now: &DateTime<Tz>,
    options: &TimestampOptions,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = match options.relative {
        Some(relative) => relative.label().to_string(),
        None => match options.date_style {
            DateStyle::Weekday => ts.format("%A").to_string(),
            DateStyle::MonthDay if ts.year() == now.year() => ts.format("%B %-d").to_string(),
            DateStyle::MonthDay => ts.format("%B %-d, %Y").to_string(),
        },
    };

    if options.use_time {
        format!("{} at {}", day, format_time_of_day(ts))
    } else {
        day
    }
}

/// 12-hour clock time, e.g. "5:30 PM".
pub fn format_time_of_day<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format("%-I:%M %p").to_string()
}

/// Format the time left until `ts` (e.g., "in 25m").
pub fn format_time_remaining<Tz: TimeZone>(ts: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let duration = ts.clone().signed_duration_since(now.clone());

    if duration.num_seconds() <= 0 {
        "expired".to_string()
    } else if duration.num_seconds() < 60 {
        format!("in {}s", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("in {}m", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("in {}h", duration.num_hours())
    } else {
        format!("in {}d", duration.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_relative_day_with_time() {
        let now = at(2024, 1, 3, 10, 0);
        let opts = TimestampOptions {
            relative: Some(RelativeDay::Today),
            date_style: DateStyle::MonthDay,
            use_time: true,
        };
        assert_eq!(
            format_timestamp(&at(2024, 1, 3, 17, 30), &now, &opts),
            "Today at 5:30 PM"
        );
    }

    #[test]
    fn test_weekday_without_time() {
        let now = at(2024, 1, 3, 10, 0);
        let opts = TimestampOptions {
            relative: None,
            date_style: DateStyle::Weekday,
            use_time: false,
        };
        assert_eq!(format_timestamp(&at(2024, 1, 6, 9, 0), &now, &opts), "Saturday");
    }

    #[test]
    fn test_month_day_and_year() {
        let now = at(2024, 12, 20, 10, 0);
        let opts = TimestampOptions {
            relative: None,
            date_style: DateStyle::MonthDay,
            use_time: false,
        };
        assert_eq!(format_timestamp(&at(2024, 12, 31, 9, 0), &now, &opts), "December 31");
        assert_eq!(format_timestamp(&at(2025, 1, 2, 9, 0), &now, &opts), "January 2, 2025");
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(format_time_of_day(&at(2024, 1, 1, 0, 5)), "12:05 AM");
        assert_eq!(format_time_of_day(&at(2024, 1, 1, 12, 0)), "12:00 PM");
    }

    #[test]
    fn test_time_remaining() {
        let now = at(2024, 1, 1, 12, 0);
        assert_eq!(format_time_remaining(&(now + Duration::seconds(30)), &now), "in 30s");
        assert_eq!(format_time_remaining(&(now + Duration::minutes(25)), &now), "in 25m");
        assert_eq!(format_time_remaining(&(now + Duration::hours(4)), &now), "in 4h");
        assert_eq!(format_time_remaining(&(now + Duration::days(3)), &now), "in 3d");
        assert_eq!(format_time_remaining(&(now - Duration::minutes(1)), &now), "expired");
    }
}
