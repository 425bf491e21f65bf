//! Display time zone conversion.
//!
//! Stored dates are always UTC. Responses show them in one fixed display
//! offset chosen at start-up; inbound text can be parsed against that offset.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

use payments_types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unrecognized date-time: {0}")]
    Format(String),
}

/// Date patterns tried by free-form parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateLocale {
    /// `yyyy-MM-dd[ HH:mm[:ss]]`
    #[default]
    Iso,
    /// `MM/dd/yyyy[ HH:mm[:ss]]`
    EnUs,
    /// `dd.MM.yyyy[ HH:mm[:ss]]`
    TrTr,
}

impl DateLocale {
    fn date_time_patterns(self) -> &'static [&'static str] {
        match self {
            DateLocale::Iso => &[
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M",
            ],
            DateLocale::EnUs => &[
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%Y %I:%M:%S %p",
                "%m/%d/%Y %H:%M",
                "%m/%d/%Y %I:%M %p",
            ],
            DateLocale::TrTr => &["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"],
        }
    }

    fn date_pattern(self) -> &'static str {
        match self {
            DateLocale::Iso => "%Y-%m-%d",
            DateLocale::EnUs => "%m/%d/%Y",
            DateLocale::TrTr => "%d.%m.%Y",
        }
    }
}

impl std::str::FromStr for DateLocale {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "iso" | "invariant" => Ok(DateLocale::Iso),
            "en-us" | "en" => Ok(DateLocale::EnUs),
            "tr-tr" | "tr" => Ok(DateLocale::TrTr),
            other => Err(TimeError::InvalidInput(format!("Unknown locale: {}", other))),
        }
    }
}

/// Parses `Z`, `UTC`, `+HH:MM`, `+HHMM` or `+HH` into an offset.
pub fn parse_offset(raw: &str) -> Result<FixedOffset, TimeError> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let invalid = || TimeError::InvalidInput(format!("Invalid UTC offset: {}", raw));
    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().map_err(|_| invalid())?, 0),
        4 => (
            digits[..2].parse::<i32>().map_err(|_| invalid())?,
            digits[2..].parse::<i32>().map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Converts between UTC and the display offset.
#[derive(Debug, Clone, Copy)]
pub struct TimeZoneConverter {
    offset: FixedOffset,
}

impl Default for TimeZoneConverter {
    fn default() -> Self {
        Self::host_local()
    }
}

impl TimeZoneConverter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Uses the host's current local offset.
    pub fn host_local() -> Self {
        Self::new(Local::now().offset().fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Shows a stored UTC instant in the display offset.
    pub fn display(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.offset)
    }

    /// Fails unless `t` is tagged UTC.
    pub fn utc_to_local(&self, t: Timestamp) -> Result<DateTime<FixedOffset>, TimeError> {
        match t {
            Timestamp::Utc(t) => Ok(self.display(t)),
            other => Err(TimeError::InvalidInput(format!(
                "Expected a UTC date-time, got {}",
                other
            ))),
        }
    }

    /// Fails if `t` is already tagged UTC. Zone-less values are read as
    /// display-offset wall-clock time.
    pub fn local_to_utc(&self, t: Timestamp) -> Result<DateTime<Utc>, TimeError> {
        match t {
            Timestamp::Utc(t) => Err(TimeError::InvalidInput(format!(
                "Expected a local date-time, got UTC {}",
                t
            ))),
            Timestamp::Local(t) => Ok(t.with_timezone(&Utc)),
            Timestamp::Unspecified(naive) => Ok(self.localize(naive).with_timezone(&Utc)),
        }
    }

    /// Parses `text`, exactly against `format` when one is given.
    ///
    /// Without a format, RFC 3339 is tried first (tagged UTC for a `Z`
    /// suffix), then the locale's patterns, then ISO patterns. Values without
    /// an offset are taken as display-offset local time.
    pub fn parse(
        &self,
        text: &str,
        format: Option<&str>,
        locale: Option<DateLocale>,
    ) -> Result<Timestamp, TimeError> {
        let text = text.trim();
        match format {
            Some(format) => self.parse_exact(text, format),
            None => self.parse_free(text, locale.unwrap_or_default()),
        }
    }

    fn localize(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        // A fixed offset has exactly one mapping for every wall-clock time.
        self.offset.from_utc_datetime(&(naive - self.offset))
    }

    fn tag(&self, t: DateTime<FixedOffset>) -> Timestamp {
        if t.offset().local_minus_utc() == 0 {
            Timestamp::Utc(t.with_timezone(&Utc))
        } else {
            Timestamp::Local(t)
        }
    }

    fn parse_exact(&self, text: &str, format: &str) -> Result<Timestamp, TimeError> {
        let format_error = || TimeError::Format(format!("'{}' does not match '{}'", text, format));

        if format.contains("%z") || format.contains("%:z") || format.contains("%#z") {
            return DateTime::parse_from_str(text, format)
                .map(|t| self.tag(t))
                .map_err(|_| format_error());
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Timestamp::Local(self.localize(naive)));
        }
        NaiveDate::parse_from_str(text, format)
            .map(|date| Timestamp::Local(self.localize(date.and_time(NaiveTime::MIN))))
            .map_err(|_| format_error())
    }

    fn parse_free(&self, text: &str, locale: DateLocale) -> Result<Timestamp, TimeError> {
        if let Ok(t) = DateTime::parse_from_rfc3339(text) {
            return Ok(if text.ends_with(['Z', 'z']) {
                Timestamp::Utc(t.with_timezone(&Utc))
            } else {
                Timestamp::Local(t)
            });
        }

        let mut locales = vec![locale];
        if locale != DateLocale::Iso {
            locales.push(DateLocale::Iso);
        }

        for locale in locales {
            for pattern in locale.date_time_patterns() {
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Ok(Timestamp::Local(self.localize(naive)));
                }
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, locale.date_pattern()) {
                return Ok(Timestamp::Local(self.localize(date.and_time(NaiveTime::MIN))));
            }
        }

        Err(TimeError::Format(text.to_string()))
    }
}
