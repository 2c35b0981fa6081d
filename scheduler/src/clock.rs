use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockTimeError {
    #[error("expected a time formatted as HH:MM, got {0:?}")]
    Format(String),
    #[error("time {0:?} is outside of 00:00..=23:59")]
    OutOfRange(String),
}

/// A start time on the event calendar, kept as minutes since midnight.
///
/// Serialized as a zero-padded `HH:MM` string, so ordering on the wrapped
/// value and ordering on the text agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    /// First minute that counts as afternoon for day-part preferences.
    pub const AFTERNOON_START: ClockTime = ClockTime(13 * MINUTES_PER_HOUR);

    pub fn from_hm(hours: u32, minutes: u32) -> Result<Self, ClockTimeError> {
        if hours >= 24 || minutes >= MINUTES_PER_HOUR {
            return Err(ClockTimeError::OutOfRange(format!("{hours:02}:{minutes:02}")));
        }
        Ok(Self(hours * MINUTES_PER_HOUR + minutes))
    }

    pub const fn minutes(self) -> u32 {
        self.0
    }

    pub const fn hours(self) -> u32 {
        self.0 / MINUTES_PER_HOUR
    }

    /// Minutes since midnight once `duration` minutes have passed.
    ///
    /// The result may exceed [`MINUTES_PER_DAY`]; it is never wrapped back
    /// onto the same day.
    pub const fn minutes_after(self, duration: u32) -> u32 {
        self.0.saturating_add(duration)
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || ClockTimeError::Format(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(format_err)?;

        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(hours) || hours.len() > 2 || !is_digits(minutes) || minutes.len() != 2 {
            return Err(format_err());
        }

        let hours: u32 = hours.parse().map_err(|_| format_err())?;
        let minutes: u32 = minutes.parse().map_err(|_| format_err())?;
        Self::from_hm(hours, minutes).map_err(|_| ClockTimeError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / MINUTES_PER_HOUR, self.0 % MINUTES_PER_HOUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_padded_times() {
        let time: ClockTime = "09:05".parse().unwrap();
        assert_eq!(time.minutes(), 9 * 60 + 5);
        assert_eq!(time.hours(), 9);
        assert_eq!(time.to_string(), "09:05");
    }

    #[test]
    fn accepts_single_digit_hours() {
        let time: ClockTime = "9:30".parse().unwrap();
        assert_eq!(time.to_string(), "09:30");
    }

    #[test]
    fn rejects_malformed_times() {
        for input in ["", "0900", "09:5", "09:60", "24:00", "ab:cd", "09:00:00", "-1:00"] {
            assert!(input.parse::<ClockTime>().is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn ordering_matches_text_ordering() {
        let early: ClockTime = "09:00".parse().unwrap();
        let late: ClockTime = "13:00".parse().unwrap();
        assert!(early < late);
        assert!(early.to_string() < late.to_string());
        assert_eq!(late, ClockTime::AFTERNOON_START);
    }

    #[test]
    fn minutes_after_does_not_wrap_past_midnight() {
        let time: ClockTime = "23:00".parse().unwrap();
        assert_eq!(time.minutes_after(90), 23 * 60 + 90);
        assert!(time.minutes_after(90) > MINUTES_PER_DAY);
    }

    #[test]
    fn serde_round_trips_through_text() {
        let time: ClockTime = serde_json::from_str("\"11:00\"").unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"11:00\"");
        assert!(serde_json::from_str::<ClockTime>("\"11h00\"").is_err());
    }
}
