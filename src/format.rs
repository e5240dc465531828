use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::ParseError;

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;

/// A solve duration with centisecond precision.
///
/// Stored as whole centiseconds so that equality and ordering are exact;
/// everything that enters the type is rounded first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolveTime {
    centis: u64,
}

impl SolveTime {
    pub const fn from_centis(centis: u64) -> Self {
        Self { centis }
    }

    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        let centis = if secs.is_finite() && secs > 0.0 {
            (secs * CENTIS_PER_SECOND as f64).round() as u64
        } else {
            0
        };
        Self { centis }
    }

    pub fn from_duration(elapsed: Duration) -> Self {
        Self::from_secs_f64(elapsed.as_secs_f64())
    }

    pub const fn centis(self) -> u64 {
        self.centis
    }

    pub fn as_secs_f64(self) -> f64 {
        self.centis as f64 / CENTIS_PER_SECOND as f64
    }
}

impl fmt::Display for SolveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.centis < CENTIS_PER_MINUTE {
            write!(
                f,
                "{}.{:02}",
                self.centis / CENTIS_PER_SECOND,
                self.centis % CENTIS_PER_SECOND
            )
        } else {
            let minutes = self.centis / CENTIS_PER_MINUTE;
            let rest = self.centis % CENTIS_PER_MINUTE;
            write!(
                f,
                "{}:{:02}.{:02}",
                minutes,
                rest / CENTIS_PER_SECOND,
                rest % CENTIS_PER_SECOND
            )
        }
    }
}

impl FromStr for SolveTime {
    type Err = ParseError;

    /// Accepts `s.cc` and `m:ss.cc`, the two shapes produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptyTime);
        }
        let invalid = || ParseError::InvalidTime(s.to_string());

        match s.split_once(':') {
            Some((minutes, seconds)) => {
                if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
                let seconds = parse_seconds(seconds).ok_or_else(invalid)?;
                if seconds.centis >= CENTIS_PER_MINUTE {
                    return Err(invalid());
                }
                minutes
                    .checked_mul(CENTIS_PER_MINUTE)
                    .and_then(|centis| centis.checked_add(seconds.centis))
                    .map(Self::from_centis)
                    .ok_or_else(invalid)
            }
            None => parse_seconds(s).ok_or_else(invalid),
        }
    }
}

fn parse_seconds(s: &str) -> Option<SolveTime> {
    let digits_and_dot = s.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    if s.is_empty() || !digits_and_dot || s.bytes().filter(|&b| b == b'.').count() > 1 {
        return None;
    }
    let secs: f64 = s.parse().ok()?;
    // Anything that does not fit in u64 centiseconds would saturate.
    if secs * CENTIS_PER_SECOND as f64 >= u64::MAX as f64 {
        return None;
    }
    Some(SolveTime::from_secs_f64(secs))
}

impl Serialize for SolveTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Canonical display string for a duration in seconds; `None` passes through.
pub fn format_time(seconds: Option<f64>) -> Option<String> {
    seconds.map(|secs| SolveTime::from_secs_f64(secs).to_string())
}

/// Countdown display: two digits, zero padded.
pub fn format_countdown(remaining: u8) -> String {
    format!("{:02}", remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_none() {
        assert_eq!(format_time(None), None);
    }

    #[test]
    fn test_format_below_a_minute() {
        assert_eq!(format_time(Some(9.534)), Some("9.53".to_string()));
        assert_eq!(format_time(Some(0.0)), Some("0.00".to_string()));
        assert_eq!(format_time(Some(59.99)), Some("59.99".to_string()));
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_time(Some(65.321)), Some("1:05.32".to_string()));
        assert_eq!(format_time(Some(600.0)), Some("10:00.00".to_string()));
        assert_eq!(format_time(Some(125.5)), Some("2:05.50".to_string()));
    }

    #[test]
    fn test_format_rounds_before_minute_split() {
        assert_eq!(format_time(Some(59.999)), Some("1:00.00".to_string()));
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(SolveTime::from_secs_f64(-3.0), SolveTime::from_centis(0));
        assert_eq!(SolveTime::from_secs_f64(f64::NAN), SolveTime::from_centis(0));
    }

    #[test]
    fn test_from_duration() {
        let t = SolveTime::from_duration(Duration::from_millis(12_340));
        assert_eq!(t.centis(), 1234);
        assert_eq!(t.to_string(), "12.34");

        let t = SolveTime::from_duration(Duration::from_millis(12_342));
        assert_eq!(t.centis(), 1234);
    }

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!("9.53".parse::<SolveTime>(), Ok(SolveTime::from_centis(953)));
        assert_eq!(" 10.20 ".parse::<SolveTime>(), Ok(SolveTime::from_centis(1020)));
        assert_eq!("9.5".parse::<SolveTime>(), Ok(SolveTime::from_centis(950)));
        assert_eq!("12".parse::<SolveTime>(), Ok(SolveTime::from_centis(1200)));
    }

    #[test]
    fn test_parse_minute_form() {
        assert_eq!(
            "1:05.32".parse::<SolveTime>(),
            Ok(SolveTime::from_centis(6532))
        );
        assert_eq!(
            "10:00.00".parse::<SolveTime>().map(|t| t.to_string()),
            Ok("10:00.00".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<SolveTime>(), Err(ParseError::EmptyTime));
        assert!("abc".parse::<SolveTime>().is_err());
        assert!("-1.00".parse::<SolveTime>().is_err());
        assert!("1.2.3".parse::<SolveTime>().is_err());
        assert!("1:75.00".parse::<SolveTime>().is_err());
        assert!(":05.00".parse::<SolveTime>().is_err());
        assert!("inf".parse::<SolveTime>().is_err());
        assert!("DNF".parse::<SolveTime>().is_err());
    }

    #[test]
    fn test_parse_rejects_values_beyond_range() {
        let huge_minutes = "99999999999999999:00.00";
        assert_eq!(
            huge_minutes.parse::<SolveTime>(),
            Err(ParseError::InvalidTime(huge_minutes.to_string()))
        );
        assert!("307445734561825861:00.00".parse::<SolveTime>().is_err());
        assert!("99999999999999999999999".parse::<SolveTime>().is_err());
        assert!("1e400".parse::<SolveTime>().is_err());

        // Large but representable values still parse.
        assert_eq!(
            "1000:00.00".parse::<SolveTime>(),
            Ok(SolveTime::from_centis(6_000_000))
        );
    }

    #[test]
    fn test_ordering_is_exact() {
        let a: SolveTime = "9.53".parse().unwrap();
        let b = SolveTime::from_secs_f64(9.534);
        assert_eq!(a, b);
        assert!(SolveTime::from_centis(999) < SolveTime::from_centis(1000));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(15), "15");
        assert_eq!(format_countdown(9), "09");
        assert_eq!(format_countdown(1), "01");
    }

    #[test]
    fn test_serializes_as_display_string() {
        let json = serde_json::to_string(&SolveTime::from_centis(6532)).unwrap();
        assert_eq!(json, "\"1:05.32\"");
    }
}
