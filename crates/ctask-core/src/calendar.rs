use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::datetime::{
  days_in_month,
  first_day_of_month,
  shift_year_month
};
use crate::due::month_abbreviation;

pub const MAX_GRID_CELLS: usize = 42;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
)]
pub struct YearMonth {
  pub year:  i32,
  pub month: u32
}

impl YearMonth {
  #[must_use]
  pub fn of(date: NaiveDate) -> Self {
    Self {
      year:  date.year(),
      month: date.month()
    }
  }

  /// `None` when the shifted month has no representable dates.
  #[must_use]
  pub fn shifted(
    self,
    delta: i32
  ) -> Option<Self> {
    let (year, month) = shift_year_month(
      self.year, self.month, delta
    )?;
    Some(Self { year, month })
  }

  #[must_use]
  pub fn first_day(
    self
  ) -> Option<NaiveDate> {
    first_day_of_month(
      self.year, self.month
    )
  }

  /// Zero for a month outside chrono's range.
  #[must_use]
  pub fn day_count(self) -> u32 {
    days_in_month(self.year, self.month)
      .unwrap_or(0)
  }

  #[must_use]
  pub fn day(
    self,
    day: u32
  ) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
      self.year, self.month, day
    )
  }

  /// `Jan 2025`
  #[must_use]
  pub fn label(self) -> String {
    format!(
      "{} {}",
      month_abbreviation(self.month),
      self.year
    )
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct DayCell {
  pub date:     NaiveDate,
  pub day:      u32,
  pub selected: bool,
  pub today:    bool
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
  Blank,
  Day(DayCell)
}

impl CalendarCell {
  #[must_use]
  pub fn as_day(&self) -> Option<&DayCell> {
    match self {
      | Self::Day(cell) => Some(cell),
      | Self::Blank => None
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct MonthGrid {
  pub month:           YearMonth,
  pub label:           String,
  pub weekday_headers: Vec<&'static str>,
  pub cells:           Vec<CalendarCell>
}

impl MonthGrid {
  pub fn days(
    &self
  ) -> impl Iterator<Item = &DayCell> {
    self
      .cells
      .iter()
      .filter_map(CalendarCell::as_day)
  }

  #[must_use]
  pub fn leading_blanks(&self) -> usize {
    self
      .cells
      .iter()
      .take_while(|cell| {
        matches!(cell, CalendarCell::Blank)
      })
      .count()
  }
}

/// Month shown in the picker dialog plus the picked day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
  displayed:  YearMonth,
  selected:   Option<NaiveDate>,
  week_start: Weekday
}

impl CalendarView {
  #[must_use]
  pub fn new(
    displayed: YearMonth,
    selected: Option<NaiveDate>
  ) -> Self {
    Self {
      displayed,
      selected,
      week_start: Weekday::Sun
    }
  }

  /// Shows the month of `selected`, or the current month when nothing
  /// is picked yet.
  #[must_use]
  pub fn seeded(
    selected: Option<NaiveDate>,
    today: NaiveDate
  ) -> Self {
    let displayed = YearMonth::of(
      selected.unwrap_or(today)
    );
    Self::new(displayed, selected)
  }

  #[must_use]
  pub fn with_week_start(
    mut self,
    week_start: Weekday
  ) -> Self {
    self.week_start = week_start;
    self
  }

  #[must_use]
  pub fn displayed(&self) -> YearMonth {
    self.displayed
  }

  #[must_use]
  pub fn selected(
    &self
  ) -> Option<NaiveDate> {
    self.selected
  }

  #[must_use]
  pub fn week_start(&self) -> Weekday {
    self.week_start
  }

  pub fn set_selected(
    &mut self,
    selected: Option<NaiveDate>
  ) {
    self.selected = selected;
  }

  /// Moves the visible month; the selection is left alone. Returns
  /// `false`, leaving the view unchanged, when the target month is out
  /// of range.
  pub fn change_month(
    &mut self,
    delta: i32
  ) -> bool {
    let Some(displayed) =
      self.displayed.shifted(delta)
    else {
      return false;
    };
    self.displayed = displayed;
    tracing::trace!(
      delta,
      year = self.displayed.year,
      month = self.displayed.month,
      "calendar month changed"
    );
    true
  }

  /// Picks `day` of the displayed month. Days outside the month are
  /// ignored.
  pub fn select_day(
    &mut self,
    day: u32
  ) -> Option<NaiveDate> {
    let picked = self.displayed.day(day)?;
    self.selected = Some(picked);
    Some(picked)
  }

  #[must_use]
  pub fn render(
    &self,
    today: NaiveDate
  ) -> MonthGrid {
    render_month(self, today)
  }
}

#[must_use]
pub fn weekday_headers(
  week_start: Weekday
) -> Vec<&'static str> {
  const LABELS: [&str; 7] = [
    "Mo", "Tu", "We", "Th", "Fr", "Sa",
    "Su"
  ];
  let start = week_start
    .num_days_from_monday()
    as usize;
  (0..7)
    .map(|offset| {
      LABELS[(start + offset) % 7]
    })
    .collect()
}

fn leading_blank_count(
  first: NaiveDate,
  week_start: Weekday
) -> usize {
  let day_idx = first
    .weekday()
    .num_days_from_monday()
    as usize;
  let start_idx = week_start
    .num_days_from_monday()
    as usize;
  (7 + day_idx - start_idx) % 7
}

#[must_use]
pub fn render_month(
  view: &CalendarView,
  today: NaiveDate
) -> MonthGrid {
  let month = view.displayed;
  let blanks =
    month.first_day().map_or(0, |first| {
      leading_blank_count(
        first,
        view.week_start
      )
    });

  let mut cells =
    Vec::with_capacity(MAX_GRID_CELLS);
  cells.extend(
    std::iter::repeat_n(
      CalendarCell::Blank,
      blanks
    )
  );
  cells.extend(
    (1..=month.day_count())
      .filter_map(|day| month.day(day))
      .map(|date| {
        CalendarCell::Day(DayCell {
          date,
          day: date.day(),
          selected: view.selected
            == Some(date),
          today: date == today
        })
      })
  );

  MonthGrid {
    month,
    label: month.label(),
    weekday_headers: weekday_headers(
      view.week_start
    ),
    cells
  }
}
