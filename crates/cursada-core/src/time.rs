//! [`CalendarTime`]: the `start`/`end` value of anything shown on the
//! calendar.
//!
//! Stored events carry their start as a free-form string written by the
//! front-end: a civil date (`2024-03-05`), a floating local date-time
//! (`2024-03-05T10:00`) or, for older records, an RFC 3339 instant. Anything
//! else is kept verbatim so legacy rows still round-trip.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A date, a date-time, or an unrecognised string passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarTime {
  /// A civil date with no time component.
  Date(NaiveDate),
  /// A wall-clock date-time with no zone; interpreted in the viewer's zone.
  Floating(NaiveDateTime),
  /// A fixed instant carrying its own UTC offset.
  Instant(DateTime<FixedOffset>),
  /// Anything that did not parse.
  Raw(String),
}

impl CalendarTime {
  /// Parse the textual form. Never fails; unknown shapes become [`Raw`].
  ///
  /// [`Raw`]: CalendarTime::Raw
  pub fn parse(input: &str) -> Self {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
      return Self::Date(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
      return Self::Instant(instant);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", SECOND_FORMAT, MINUTE_FORMAT] {
      if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Self::Floating(dt);
      }
    }
    Self::Raw(input.to_owned())
  }

  /// Combine a civil date with an `HH:MM` string.
  ///
  /// A time that does not parse is glued on textually, so the result still
  /// carries whatever the user typed.
  pub fn on(date: NaiveDate, time: &str) -> Self {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
      .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
      .map(|t| Self::Floating(date.and_time(t)))
      .unwrap_or_else(|_| Self::Raw(format!("{}T{time}", date.format(DATE_FORMAT))))
  }

  /// Whether the value carries a recognisable time of day.
  pub fn has_time(&self) -> bool {
    matches!(self, Self::Floating(_) | Self::Instant(_))
  }

  /// The civil date, as seen from `tz` for instants.
  pub fn date_in(&self, tz: Tz) -> Option<NaiveDate> {
    match self {
      Self::Date(date) => Some(*date),
      Self::Floating(dt) => Some(dt.date()),
      Self::Instant(instant) => Some(instant.with_timezone(&tz).date_naive()),
      Self::Raw(_) => None,
    }
  }

  /// The wall-clock date-time in `tz`, or `None` when there is no time.
  pub fn local_in(&self, tz: Tz) -> Option<NaiveDateTime> {
    match self {
      Self::Floating(dt) => Some(*dt),
      Self::Instant(instant) => Some(instant.with_timezone(&tz).naive_local()),
      Self::Date(_) | Self::Raw(_) => None,
    }
  }
}

impl fmt::Display for CalendarTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
      Self::Floating(dt) if dt.second() == 0 && dt.nanosecond() == 0 => {
        write!(f, "{}", dt.format(MINUTE_FORMAT))
      }
      Self::Floating(dt) => write!(f, "{}", dt.format(SECOND_FORMAT)),
      Self::Instant(instant) => f.write_str(&instant.to_rfc3339()),
      Self::Raw(raw) => f.write_str(raw),
    }
  }
}

impl From<NaiveDate> for CalendarTime {
  fn from(date: NaiveDate) -> Self { Self::Date(date) }
}

impl From<NaiveDateTime> for CalendarTime {
  fn from(dt: NaiveDateTime) -> Self { Self::Floating(dt) }
}

impl Serialize for CalendarTime {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for CalendarTime {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self::parse(&raw))
  }
}
