//! Human-readable duration parsing for timeouts.

use std::time::Duration;

use crate::error::ConfigError;

/// Parses a duration such as `"500ms"`, `"30s"` or `"2m"`.
///
/// A bare number is read as seconds. Zero durations are rejected because a
/// zero timeout would fail every run.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDuration {
        value: s.to_string(),
        reason,
    };

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty duration string".to_string()));
    }

    let digit_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digit_end == 0 {
        return Err(invalid("no numeric value".to_string()));
    }

    let number: u64 = trimmed[..digit_end]
        .parse()
        .map_err(|_| invalid("number out of range".to_string()))?;

    let duration = match trimmed[digit_end..].trim() {
        "ms" => Duration::from_millis(number),
        "" | "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(number.saturating_mul(60)),
        other => return Err(invalid(format!("unknown unit '{other}'"))),
    };

    if duration.is_zero() {
        return Err(invalid("duration must be greater than zero".to_string()));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_duration("5").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn whitespace_tolerated() {
        assert_eq!(parse_duration(" 10 s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_duration("fast"),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10h").is_err());
    }

    #[test]
    fn rejects_zero() {
        assert!(parse_duration("0s").is_err());
    }
}
