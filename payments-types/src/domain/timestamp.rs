//! Date-time values that remember how they were tagged.
//!
//! Incoming dates arrive in three shapes: explicitly UTC (`...Z`), carrying
//! some other offset, or with no zone information at all (`2024-05-01`).
//! The services treat these differently, so the tag is kept in the type.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when text cannot be read as a [`Timestamp`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date-time: {0}")]
pub struct InvalidTimestamp(pub String);

/// A point in time together with its zone tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Explicitly UTC
    Utc(DateTime<Utc>),
    /// Carries a non-UTC offset (display/local time)
    Local(DateTime<FixedOffset>),
    /// No zone information
    Unspecified(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    pub fn is_utc(&self) -> bool {
        matches!(self, Timestamp::Utc(_))
    }

    /// Brings the value into UTC for filtering.
    ///
    /// Zone-less values are re-tagged as UTC without shifting the wall-clock
    /// reading; offset-carrying values become the same instant in UTC.
    pub fn retag_utc(self) -> DateTime<Utc> {
        match self {
            Timestamp::Utc(t) => t,
            Timestamp::Local(t) => t.with_timezone(&Utc),
            Timestamp::Unspecified(naive) => naive.and_utc(),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Utc(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Timestamp::Local(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Timestamp::Unspecified(t) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl std::str::FromStr for Timestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Ok(if s.ends_with(['Z', 'z']) {
                Timestamp::Utc(t.with_timezone(&Utc))
            } else {
                Timestamp::Local(t)
            });
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Timestamp::Unspecified(naive));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|date| Timestamp::Unspecified(date.and_time(chrono::NaiveTime::MIN)))
            .map_err(|_| InvalidTimestamp(s.to_string()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(t: DateTime<Utc>) -> Self {
        Timestamp::Utc(t)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
