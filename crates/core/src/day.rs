//! Calendar days.
//!
//! Days travel as strict ISO-8601 dates. Anything that is not exactly
//! `YYYY-MM-DD` is rejected rather than guessed at.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A single calendar day in a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    /// Parse a strict `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        // chrono accepts "2026-2-3"; the wire format does not.
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(CoreError::InvalidDay(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Day)
            .map_err(|_| CoreError::InvalidDay(s.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Day)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Day of month, 1-based.
    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    /// Month, 1-based.
    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for Day {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::parse(s)
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Day::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_iso() {
        let day = Day::parse("2026-02-03").unwrap();
        assert_eq!(day.day_of_month(), 3);
        assert_eq!(day.month(), 2);
        assert_eq!(day.weekday(), Weekday::Tue);
        assert_eq!(day.to_string(), "2026-02-03");
    }

    #[test]
    fn test_parse_rejects_loose_forms() {
        for bad in ["2026-2-3", "2026-02-3", "20260203", "", "2026-02-30", "2026/02/03", "2026-02-03T00:00"] {
            assert!(Day::parse(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_days_order_chronologically() {
        let a = Day::parse("2025-12-31").unwrap();
        let b = Day::parse("2026-01-01").unwrap();
        assert!(a < b);
    }
}
