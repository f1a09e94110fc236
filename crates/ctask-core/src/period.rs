use chrono::{
  NaiveDate,
  Weekday
};

use crate::datetime::{
  add_days,
  next_weekday_date
};

/// List filter the page was rendered with; decides the due date a new
/// task starts with.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Period {
  Today,
  Tomorrow,
  ThisWeek,
  NextWeek
}

impl Period {
  /// `None` for periods that carry no default (e.g. `overdue`). An
  /// empty key means "today".
  #[must_use]
  pub fn from_key(raw: &str) -> Option<Self> {
    match raw.trim() {
      | "" | "today" => Some(Self::Today),
      | "tomorrow" => Some(Self::Tomorrow),
      | "this_week" => Some(Self::ThisWeek),
      | "next_week" => Some(Self::NextWeek),
      | _ => None
    }
  }

  #[must_use]
  pub fn default_due(
    self,
    today: NaiveDate
  ) -> Option<NaiveDate> {
    match self {
      | Self::Today | Self::ThisWeek => {
        Some(today)
      }
      | Self::Tomorrow => add_days(today, 1),
      | Self::NextWeek => {
        next_weekday_date(today, Weekday::Mon)
      }
    }
  }
}

/// Stored due value for a new task under `period`, if any.
#[must_use]
pub fn default_due_value(
  period: &str,
  today: NaiveDate
) -> Option<String> {
  let period = Period::from_key(period)?;
  Some(crate::due::compose_due_value(
    Some(period.default_due(today)?),
    None
  ))
}
