use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Turns a backend timestamp into the text shown next to a comment
pub trait TimestampFormatter {
    fn format(&self, timestamp: &str) -> String;
}

impl<F: Fn(&str) -> String> TimestampFormatter for F {
    fn format(&self, timestamp: &str) -> String {
        self(timestamp)
    }
}

/// "just now", "5m ago", "3h ago", "2d ago", then the calendar date in `tz`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelativeTime {
    tz: chrono_tz::Tz,

    /// Reference point, the current time if unset
    now: Option<DateTime<Utc>>,
}

impl RelativeTime {
    pub fn new(tz: chrono_tz::Tz) -> RelativeTime {
        RelativeTime { tz, now: None }
    }

    pub fn at(self, now: DateTime<Utc>) -> RelativeTime {
        RelativeTime {
            now: Some(now),
            ..self
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// Parses RFC 3339, or the zone-less form postgres emits for `timestamp` columns (taken as UTC)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| Utc.from_utc_datetime(&t))
}

impl TimestampFormatter for RelativeTime {
    fn format(&self, timestamp: &str) -> String {
        let Some(t) = parse_timestamp(timestamp) else {
            tracing::debug!(?timestamp, "unparseable timestamp, showing it raw");
            return String::from(timestamp);
        };
        let age = self.now() - t;
        if age < Duration::minutes(1) {
            // also covers timestamps slightly in the future, due to clock skew
            String::from("just now")
        } else if age < Duration::hours(1) {
            format!("{}m ago", age.num_minutes())
        } else if age < Duration::days(1) {
            format!("{}h ago", age.num_hours())
        } else if age < Duration::days(7) {
            format!("{}d ago", age.num_days())
        } else {
            t.with_timezone(&self.tz).format("%b %-d, %Y").to_string()
        }
    }
}
