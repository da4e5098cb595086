use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::AppError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Rejects absent or whitespace-only strings.
pub fn required(value: &str, _context: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("is required"));
    }
    Ok(())
}

/// Rejects passwords shorter than [`MIN_PASSWORD_CHARS`].
pub fn min_password(value: &str, _context: &()) -> garde::Result {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        return Err(garde::Error::new(format!(
            "must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

/// Rejects values [`parse_deadline`] cannot read.
pub fn valid_deadline(value: &str, _context: &()) -> garde::Result {
    if parse_deadline(value).is_none() {
        return Err(garde::Error::new("is not a valid date"));
    }
    Ok(())
}

/// Parses a deadline and normalizes it to UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]` and
/// `YYYY-MM-DD`. Values without an offset are read as UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Turns a garde report into a single 400 message, first failure first.
pub fn report_to_error(report: garde::Report) -> AppError {
    let message = report
        .iter()
        .next()
        .map(|(path, error)| format!("{} {}", path, error))
        .unwrap_or_else(|| "Invalid request".to_string());

    AppError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use super::valid_deadline as deadline;

    #[test]
    fn required_rejects_blank_values() {
        assert!(required("", &()).is_err());
        assert!(required("   \t", &()).is_err());
        assert!(required(" x ", &()).is_ok());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(min_password("12345", &()).is_err());
        assert!(min_password("123456", &()).is_ok());
        assert!(min_password("ééééé", &()).is_err());
    }

    #[test]
    fn parses_accepted_deadline_formats() {
        let rfc = parse_deadline("2030-05-01T12:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 10);

        let local = parse_deadline("2030-05-01T12:30").unwrap();
        assert_eq!((local.hour(), local.minute()), (12, 30));

        let spaced = parse_deadline("2030-05-01 08:00:00").unwrap();
        assert_eq!(spaced.hour(), 8);

        let date_only = parse_deadline(" 2030-05-01 ").unwrap();
        assert_eq!((date_only.year(), date_only.month(), date_only.day()), (2030, 5, 1));
        assert_eq!(date_only.hour(), 0);
    }

    #[test]
    fn rejects_unparseable_deadlines() {
        for raw in ["", "tomorrow", "2030-13-01", "2030-02-30", "01/05/2030"] {
            assert!(parse_deadline(raw).is_none(), "{} should be rejected", raw);
            assert!(deadline(raw, &()).is_err());
        }
    }
}
