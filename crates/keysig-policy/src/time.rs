//! Absolute timestamps in allowed-signers options: `YYYYMMDD[HHMM[SS]][Z]`.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use regex::Regex;
use thiserror::Error;

const TIME_PATTERN: &str = r"^(\d{4})(\d{2})(\d{2})(?:(\d{2})(\d{2})(\d{2})?)?(Z)?$";

/// Errors raised while parsing an absolute time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Text does not have the `YYYYMMDD[HHMM[SS]][Z]` shape.
    #[error("invalid time format: \"{0}\"")]
    Format(String),
    /// Fields are in range syntactically but name no real instant.
    #[error("invalid time: \"{0}\"")]
    OutOfRange(String),
}

/// Parses `YYYYMMDD[HHMM[SS]]`, in local time unless suffixed with `Z`.
///
/// Returns seconds since the Unix epoch.
pub fn parse_absolute_time(text: &str) -> Result<u64, TimeError> {
    let re = Regex::new(TIME_PATTERN).map_err(|_| TimeError::Format(text.to_string()))?;
    let caps = re
        .captures(text)
        .ok_or_else(|| TimeError::Format(text.to_string()))?;

    let field = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let out_of_range = || TimeError::OutOfRange(text.to_string());

    let year = i32::try_from(field(1)).map_err(|_| out_of_range())?;
    let naive = NaiveDate::from_ymd_opt(year, field(2), field(3))
        .and_then(|date| date.and_hms_opt(field(4), field(5), field(6)))
        .ok_or_else(out_of_range)?;

    let seconds = if caps.get(7).is_some() {
        Utc.from_utc_datetime(&naive).timestamp()
    } else {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(out_of_range)?
            .timestamp()
    };
    u64::try_from(seconds).map_err(|_| out_of_range())
}

/// Current time in seconds since the Unix epoch.
pub fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_date_only() {
        assert_eq!(parse_absolute_time("20240101Z").unwrap(), 1_704_067_200);
    }

    #[test]
    fn utc_with_minutes_and_seconds() {
        assert_eq!(parse_absolute_time("202401011230Z").unwrap(), 1_704_112_200);
        assert_eq!(parse_absolute_time("20240101123045Z").unwrap(), 1_704_112_245);
    }

    #[test]
    fn local_time_parses() {
        let local = parse_absolute_time("20240101").unwrap();
        let utc = parse_absolute_time("20240101Z").unwrap();
        // Every real UTC offset lies within a day.
        assert!(local.abs_diff(utc) <= 26 * 3600);
    }

    #[test]
    fn rejects_bad_shapes() {
        for text in ["", "2024", "2024010", "202401011", "20240101123", "2024-01-01", "20240101z"] {
            assert!(
                matches!(parse_absolute_time(text), Err(TimeError::Format(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(matches!(
            parse_absolute_time("20241301Z"),
            Err(TimeError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_absolute_time("202402302500Z"),
            Err(TimeError::OutOfRange(_))
        ));
    }

    #[test]
    fn rejects_pre_epoch() {
        assert!(matches!(
            parse_absolute_time("19600101Z"),
            Err(TimeError::OutOfRange(_))
        ));
    }
}
