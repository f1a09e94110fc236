use chrono::{
  Datelike,
  Duration,
  Local,
  NaiveDate,
  NaiveDateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;

/// Source of the local wall-clock time.
///
/// Everything that compares against "today" takes a clock (or a `now`
/// value read from one) so that tests can pin the current instant.
pub trait Clock {
  fn now(&self) -> NaiveDateTime;

  fn today(&self) -> NaiveDate {
    self.now().date()
  }
}

/// Reads the host clock, in the host's local zone unless an explicit
/// zone is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
  timezone: Option<Tz>
}

impl SystemClock {
  #[must_use]
  pub fn new(
    timezone: Option<Tz>
  ) -> Self {
    Self { timezone }
  }

  #[must_use]
  pub fn timezone(&self) -> Option<Tz> {
    self.timezone
  }
}

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime {
    match self.timezone {
      | Some(tz) => {
        Utc::now()
          .with_timezone(&tz)
          .naive_local()
      }
      | None => Local::now().naive_local()
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime {
    self.0
  }
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured client timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

pub fn parse_week_start(
  raw: &str
) -> Option<Weekday> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | _ => None
  }
}

/// Adds calendar months the way a browser `Date#setMonth` does: the
/// day of month is kept and any overflow rolls forward into the
/// following month (Jan 31 + 1 month = Mar 2 or Mar 3). `None` when
/// the result falls outside the representable date range.
#[must_use]
pub fn add_months_rolling(
  date: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let (year, month) = shift_year_month(
    date.year(),
    date.month(),
    months
  )?;
  let overflow =
    i64::from(date.day()) - 1;
  add_days(
    first_day_of_month(year, month)?,
    overflow
  )
}

/// Moves a `(year, month)` pair by `delta` months with year rollover.
#[must_use]
pub fn shift_year_month(
  year: i32,
  month: u32,
  delta: i32
) -> Option<(i32, u32)> {
  let index = i64::from(year) * 12
    + i64::from(month)
    - 1
    + i64::from(delta);
  let shifted_year =
    i32::try_from(index.div_euclid(12))
      .ok()?;
  let shifted_month =
    u32::try_from(index.rem_euclid(12))
      .ok()?
      + 1;
  first_day_of_month(
    shifted_year,
    shifted_month
  )?;
  Some((shifted_year, shifted_month))
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  let (next_year, next_month) =
    shift_year_month(year, month, 1)?;
  add_days(
    first_day_of_month(
      next_year, next_month
    )?,
    -1
  )
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> Option<u32> {
  last_day_of_month(year, month)
    .map(|last| last.day())
}

/// `None` when `days` or the sum is outside chrono's range.
#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  Duration::try_days(days).and_then(
    |delta| date.checked_add_signed(delta)
  )
}

/// Next occurrence of `target` strictly after `from`.
#[must_use]
pub fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> Option<NaiveDate> {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  add_days(from, delta)
}
