//! Due-date values as stored in task forms and their display labels.
//!
//! The server stores due dates as local `YYYY-MM-DD HH:MM:SS` text with
//! an empty string meaning "no due date". Badges and previews show a
//! short label instead: `Today`, `Tomorrow` or `3 Jan 25`, followed by
//! `HH:MM` unless the time is exactly midnight.

use std::fmt;

use anyhow::anyhow;
use chrono::{
  Datelike,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Timelike
};
use regex::Regex;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

use crate::datetime::add_days;

pub const DUE_FORMAT: &str =
  "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str =
  "%Y-%m-%d";

const MONTH_ABBREVIATIONS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May",
  "Jun", "Jul", "Aug", "Sep", "Oct",
  "Nov", "Dec"
];

#[must_use]
pub fn month_abbreviation(
  month: u32
) -> &'static str {
  let idx = month
    .saturating_sub(1)
    .min(11) as usize;
  MONTH_ABBREVIATIONS[idx]
}

/// Parses a stored or typed due value.
///
/// `T` and a single space are both accepted between date and time,
/// seconds and fractional seconds are optional, and a bare date is
/// read as local midnight.
#[must_use]
pub fn parse_due(
  raw: &str
) -> Option<NaiveDateTime> {
  let token = raw.trim();
  if token.is_empty() {
    return None;
  }

  let normalized =
    token.replacen(' ', "T", 1);
  for fmt in [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M"
  ] {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        &normalized,
        fmt
      )
    {
      return Some(ndt);
    }
  }

  NaiveDate::parse_from_str(
    token,
    DATE_FORMAT
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
}

/// Human label for a due value relative to `now`.
///
/// Empty input gives an empty label and anything unparsable is
/// returned as-is so corrupt data stays visible.
#[must_use]
pub fn format_due_display(
  raw: &str,
  now: NaiveDateTime
) -> String {
  if raw.is_empty() {
    return String::new();
  }
  let Some(due) = parse_due(raw) else {
    tracing::debug!(
      raw,
      "due value not parsable; showing raw text"
    );
    return raw.to_string();
  };

  let today = now.date();
  let tomorrow = add_days(today, 1);
  let day = due.date();

  let date_part = if day == today {
    "Today".to_string()
  } else if Some(day) == tomorrow {
    "Tomorrow".to_string()
  } else {
    format!(
      "{} {} {:02}",
      day.day(),
      month_abbreviation(day.month()),
      day.year().rem_euclid(100)
    )
  };

  if due.hour() == 0 && due.minute() == 0
  {
    date_part
  } else {
    format!(
      "{date_part} {:02}:{:02}",
      due.hour(),
      due.minute()
    )
  }
}

/// Builds the stored value from a picked date and an optional time.
#[must_use]
pub fn compose_due_value(
  date: Option<NaiveDate>,
  time: Option<NaiveTime>
) -> String {
  match (date, time) {
    | (Some(date), Some(time)) => {
      format!(
        "{} {}:00",
        date.format(DATE_FORMAT),
        time.format("%H:%M")
      )
    }
    | (Some(date), None) => {
      format!(
        "{} 00:00:00",
        date.format(DATE_FORMAT)
      )
    }
    | (None, _) => String::new()
  }
}

/// Reads the time input of the picker dialog.
///
/// Browsers hand back `HH:MM` (or `HH:MM:SS` with a step); typed values
/// such as `9:05` or `3:23pm` are accepted as well.
#[must_use]
pub fn parse_time_input(
  raw: &str
) -> Option<NaiveTime> {
  let time_re = Regex::new(
    r"(?i)^(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2}))?\s*(?P<ampm>[ap]m)?$",
  )
  .ok()?;
  let captures =
    time_re.captures(raw.trim())?;

  let raw_hour = captures
    .name("hour")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  let minute = captures
    .name("minute")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  let second = match captures
    .name("second")
  {
    | Some(value) => {
      value.as_str().parse::<u32>().ok()?
    }
    | None => 0
  };

  let hour = match captures.name("ampm")
  {
    | Some(ampm) => {
      if raw_hour == 0 || raw_hour > 12 {
        return None;
      }
      let pm = ampm
        .as_str()
        .eq_ignore_ascii_case("pm");
      match (raw_hour, pm) {
        | (12, false) => 0,
        | (12, true) => 12,
        | (hour, true) => hour + 12,
        | (hour, false) => hour
      }
    }
    | None => raw_hour
  };

  NaiveTime::from_hms_opt(
    hour, minute, second
  )
}

/// A validated due value; `None` is "no due date".
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
)]
pub struct DueDate(
  pub Option<NaiveDateTime>
);

impl DueDate {
  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    if raw.trim().is_empty() {
      return Ok(Self(None));
    }
    parse_due(raw)
      .map(|value| Self(Some(value)))
      .ok_or_else(|| {
        anyhow!(
          "invalid due value: {raw}"
        )
      })
  }

  #[must_use]
  pub fn is_unset(&self) -> bool {
    self.0.is_none()
  }

  #[must_use]
  pub fn to_canonical(&self) -> String {
    self
      .0
      .map(|value| {
        value
          .format(DUE_FORMAT)
          .to_string()
      })
      .unwrap_or_default()
  }

  #[must_use]
  pub fn display(
    &self,
    now: NaiveDateTime
  ) -> String {
    format_due_display(
      &self.to_canonical(),
      now
    )
  }
}

impl fmt::Display for DueDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.to_canonical())
  }
}

impl Serialize for DueDate {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer
      .serialize_str(&self.to_canonical())
  }
}

impl<'de> Deserialize<'de> for DueDate {
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    DueDate::parse(&raw)
      .map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(
      raw, DUE_FORMAT
    )
    .expect("valid fixture")
  }

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn empty_input_gives_empty_label() {
    let now = at("2025-01-03 10:00:00");
    assert_eq!(format_due_display("", now), "");
  }

  #[test]
  fn unparsable_input_is_echoed() {
    let now = at("2025-01-03 10:00:00");
    assert_eq!(
      format_due_display("next week", now),
      "next week"
    );
    assert_eq!(
      format_due_display("2025-02-30 10:00:00", now),
      "2025-02-30 10:00:00"
    );
  }

  #[test]
  fn today_and_tomorrow_labels() {
    let now = at("2025-01-03 10:00:00");
    assert_eq!(
      format_due_display(
        "2025-01-03 14:30:00",
        now
      ),
      "Today 14:30"
    );
    assert_eq!(
      format_due_display(
        "2025-01-04 00:00:00",
        now
      ),
      "Tomorrow"
    );
  }

  #[test]
  fn midnight_boundary_switches_label() {
    let now = at("2025-01-03 12:00:00");
    assert_eq!(
      format_due_display(
        "2025-01-03 23:59:59",
        now
      ),
      "Today 23:59"
    );
    assert_eq!(
      format_due_display(
        "2025-01-04 00:00:01",
        now
      ),
      "Tomorrow"
    );
  }

  #[test]
  fn other_days_use_short_date() {
    let now = at("2025-01-01 08:00:00");
    assert_eq!(
      format_due_display(
        "2025-01-03 14:30:00",
        now
      ),
      "3 Jan 25 14:30"
    );
    assert_eq!(
      format_due_display(
        "2009-11-20 00:00:00",
        now
      ),
      "20 Nov 09"
    );
    assert_eq!(
      format_due_display(
        "2024-12-31 07:05:00",
        now
      ),
      "31 Dec 24 07:05"
    );
  }

  #[test]
  fn both_separators_parse_the_same() {
    let now = at("2025-01-01 08:00:00");
    let spaced = format_due_display(
      "2025-03-09 18:45:00",
      now
    );
    let iso = format_due_display(
      "2025-03-09T18:45:00",
      now
    );
    assert_eq!(spaced, iso);
    assert_eq!(
      format_due_display("2025-03-09T18:45", now),
      "9 Mar 25 18:45"
    );
    assert_eq!(
      format_due_display("2025-03-09", now),
      "9 Mar 25"
    );
  }

  #[test]
  fn composes_stored_values() {
    let day = date(2025, 1, 3);
    let time =
      NaiveTime::from_hms_opt(14, 30, 0);
    assert_eq!(
      compose_due_value(Some(day), time),
      "2025-01-03 14:30:00"
    );
    assert_eq!(
      compose_due_value(Some(day), None),
      "2025-01-03 00:00:00"
    );
    assert_eq!(
      compose_due_value(None, time),
      ""
    );
  }

  #[test]
  fn time_input_accepts_browser_and_typed_forms()
  {
    assert_eq!(
      parse_time_input("14:30"),
      NaiveTime::from_hms_opt(14, 30, 0)
    );
    assert_eq!(
      parse_time_input("9:05"),
      NaiveTime::from_hms_opt(9, 5, 0)
    );
    assert_eq!(
      parse_time_input("3:23pm"),
      NaiveTime::from_hms_opt(15, 23, 0)
    );
    assert_eq!(
      parse_time_input("12:10 am"),
      NaiveTime::from_hms_opt(0, 10, 0)
    );
    assert_eq!(parse_time_input(""), None);
    assert_eq!(parse_time_input("25:00"), None);
  }

  #[test]
  fn due_date_serde_uses_canonical_text() {
    let due = DueDate::parse(
      "2025-01-03T14:30",
    )
    .expect("parse due");
    let encoded =
      serde_json::to_string(&due)
        .expect("encode");
    assert_eq!(
      encoded,
      "\"2025-01-03 14:30:00\""
    );

    let unset: DueDate =
      serde_json::from_str("\"\"")
        .expect("decode empty");
    assert!(unset.is_unset());
    assert!(
      serde_json::from_str::<DueDate>(
        "\"soon\""
      )
      .is_err()
    );
  }
}
