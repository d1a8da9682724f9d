//! Readout formatting for the remaining time

use std::fmt;
use std::time::Duration;

use meetclock_types::DisplayFormat;

/// Text shown in the time readout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readout {
    /// `MM:SS`, minutes may exceed 59
    Clock { minutes: String, seconds: String },
    /// Whole seconds or a percentage
    Single(String),
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Clock { minutes, seconds } => write!(f, "{}:{}", minutes, seconds),
            Readout::Single(text) => f.write_str(text),
        }
    }
}

/// Whole seconds, rounded up so "00:00" only shows once time is out
pub fn ceil_secs(remaining: Duration) -> u64 {
    let ms = remaining.as_millis() as u64;
    ms.div_ceil(1000)
}

pub fn format_remaining(format: DisplayFormat, remaining: Duration, total: Duration) -> Readout {
    match format {
        DisplayFormat::MinSec => {
            let secs = ceil_secs(remaining);
            Readout::Clock {
                minutes: format!("{:02}", secs / 60),
                seconds: format!("{:02}", secs % 60),
            }
        }
        DisplayFormat::Seconds => Readout::Single(ceil_secs(remaining).to_string()),
        DisplayFormat::Percent => {
            let percent = if total.is_zero() {
                0.0
            } else {
                remaining.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            Readout::Single(format!("{:.1}%", percent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(m: u64) -> Duration {
        Duration::from_millis(m)
    }

    #[test]
    fn test_min_sec_rounds_up() {
        let readout = format_remaining(DisplayFormat::MinSec, ms(59_001), ms(300_000));
        assert_eq!(readout.to_string(), "01:00");

        let readout = format_remaining(DisplayFormat::MinSec, ms(299_500), ms(300_000));
        assert_eq!(
            readout,
            Readout::Clock {
                minutes: "05".to_string(),
                seconds: "00".to_string()
            }
        );
    }

    #[test]
    fn test_min_sec_over_an_hour() {
        let readout = format_remaining(DisplayFormat::MinSec, ms(3_725_000), ms(3_725_000));
        assert_eq!(readout.to_string(), "62:05");
    }

    #[test]
    fn test_zero_shows_zero() {
        let readout = format_remaining(DisplayFormat::MinSec, Duration::ZERO, ms(1000));
        assert_eq!(readout.to_string(), "00:00");
        let readout = format_remaining(DisplayFormat::Seconds, Duration::ZERO, ms(1000));
        assert_eq!(readout.to_string(), "0");
    }

    #[test]
    fn test_seconds_format() {
        let readout = format_remaining(DisplayFormat::Seconds, ms(61_200), ms(300_000));
        assert_eq!(readout, Readout::Single("62".to_string()));
    }

    #[test]
    fn test_percent_format() {
        let readout = format_remaining(DisplayFormat::Percent, ms(150_000), ms(300_000));
        assert_eq!(readout.to_string(), "50.0%");
        let readout = format_remaining(DisplayFormat::Percent, ms(100_000), ms(300_000));
        assert_eq!(readout.to_string(), "33.3%");
    }

    #[test]
    fn test_percent_with_zero_total() {
        let readout = format_remaining(DisplayFormat::Percent, Duration::ZERO, Duration::ZERO);
        assert_eq!(readout.to_string(), "0.0%");
    }
}
