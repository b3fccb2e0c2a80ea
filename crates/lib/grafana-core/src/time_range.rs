//! RFC3339 time-range parsing with a last-hour default.

use chrono::{DateTime, Duration, Utc};

use crate::error::GrafanaError;

pub const DEFAULT_LOOKBACK_SECS: i64 = 3600;

/// A resolved query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Resolves optional RFC3339 bounds. A missing start defaults to one hour
    /// before now and a missing end to now; blank strings count as missing.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a malformed timestamp.
    pub fn resolve(start: Option<&str>, end: Option<&str>) -> Result<Self, GrafanaError> {
        Self::resolve_at(start, end, Utc::now())
    }

    /// Like [`TimeRange::resolve`] with an explicit clock.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a malformed timestamp.
    pub fn resolve_at(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, GrafanaError> {
        let start = match present(start) {
            Some(value) => parse_rfc3339("start", value)?,
            None => now - Duration::seconds(DEFAULT_LOOKBACK_SECS),
        };
        let end = match present(end) {
            Some(value) => parse_rfc3339("end", value)?,
            None => now,
        };
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start_secs(&self) -> i64 {
        self.start.timestamp()
    }

    #[must_use]
    pub fn end_secs(&self) -> i64 {
        self.end.timestamp()
    }

    /// Start and end as Unix nanoseconds.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] if a bound is outside the
    /// representable nanosecond range (roughly 1677 to 2262).
    pub fn as_nanos(&self) -> Result<(i64, i64), GrafanaError> {
        let nanos = |time: DateTime<Utc>, name: &str| {
            time.timestamp_nanos_opt().ok_or_else(|| {
                GrafanaError::invalid_input(format!("{name} time {time} is out of range"))
            })
        };
        Ok((nanos(self.start, "start")?, nanos(self.end, "end")?))
    }

    /// Query parameters with bounds in Unix seconds.
    #[must_use]
    pub fn seconds_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.start_secs().to_string()),
            ("end", self.end_secs().to_string()),
        ]
    }

    /// Query parameters with bounds in Unix nanoseconds.
    ///
    /// # Errors
    /// See [`TimeRange::as_nanos`].
    pub fn nanos_params(&self) -> Result<Vec<(&'static str, String)>, GrafanaError> {
        let (start, end) = self.as_nanos()?;
        Ok(vec![("start", start.to_string()), ("end", end.to_string())])
    }
}

/// Parses one RFC3339 timestamp.
///
/// # Errors
/// Returns [`GrafanaError::InvalidInput`] naming `field`.
pub fn parse_rfc3339(field: &str, value: &str) -> Result<DateTime<Utc>, GrafanaError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|time| time.with_timezone(&Utc))
        .map_err(|err| GrafanaError::invalid_input(format!("parsing {field} time: {err}")))
}

pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> DateTime<Utc> {
        parse_rfc3339("now", "2024-05-01T12:00:00Z").expect("valid clock")
    }

    #[test]
    fn missing_bounds_default_to_the_last_hour() {
        let range = TimeRange::resolve_at(None, Some(""), clock()).expect("defaults resolve");
        assert_eq!(range.end_secs() - range.start_secs(), 3600);
        assert_eq!(range.end, clock());
    }

    #[test]
    fn explicit_bounds_convert_to_seconds_and_nanos() {
        let range = TimeRange::resolve_at(
            Some("2024-05-01T10:00:00+02:00"),
            Some("2024-05-01T09:00:00Z"),
            clock(),
        )
        .expect("bounds parse");

        assert_eq!(range.start_secs(), 1_714_550_400);
        let (start, end) = range.as_nanos().expect("within nanosecond range");
        assert_eq!(start, 1_714_550_400_000_000_000);
        assert_eq!(end - start, 3_600_000_000_000);
    }

    #[test]
    fn malformed_timestamp_is_invalid_input() {
        let err = TimeRange::resolve_at(Some("yesterday"), None, clock())
            .expect_err("must reject");
        assert!(matches!(err, GrafanaError::InvalidInput(ref message) if message.starts_with("parsing start time")));
    }
}
