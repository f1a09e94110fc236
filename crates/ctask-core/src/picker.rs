//! The due-date picker dialog.
//!
//! A [`DueDatePicker`] is either closed or holds one [`PickerSession`]
//! describing which task field the dialog edits. All page effects go
//! through [`PickerSurface`]; the browser build implements it over the
//! DOM and tests use a recording surface. A surface whose elements are
//! missing simply does nothing.

use chrono::{
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Weekday
};

use crate::calendar::{
  CalendarView,
  MonthGrid
};
use crate::datetime::{
  add_days,
  add_months_rolling
};
use crate::due::{
  compose_due_value,
  format_due_display,
  parse_due,
  parse_time_input
};

/// The task whose due field the dialog edits.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash,
)]
pub struct TargetField {
  task_ref: String
}

impl TargetField {
  #[must_use]
  pub fn new(
    task_ref: impl Into<String>
  ) -> Self {
    Self {
      task_ref: task_ref.into()
    }
  }

  #[must_use]
  pub fn task_ref(&self) -> &str {
    &self.task_ref
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRequest {
  pub task_ref:       String,
  pub explicit_value: Option<String>,
  pub auto_save:      bool,
  pub has_subtasks:   bool
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct ShiftSubtasksControl {
  pub visible: bool,
  pub checked: bool
}

impl ShiftSubtasksControl {
  #[must_use]
  pub fn for_task(
    has_subtasks: bool
  ) -> Self {
    Self {
      visible: has_subtasks,
      checked: has_subtasks
    }
  }
}

pub trait PickerSurface {
  /// Current value of the target's due input, if the input exists.
  fn field_value(
    &self,
    target: &TargetField
  ) -> Option<String>;

  fn write_field(
    &mut self,
    target: &TargetField,
    value: &str
  );

  fn show_preview(
    &mut self,
    target: &TargetField,
    label: &str
  );

  fn hide_preview(
    &mut self,
    target: &TargetField
  );

  fn time_input(&self) -> String;

  fn set_time_input(
    &mut self,
    value: &str
  );

  /// Checkbox state, `None` when the control is not on the page.
  fn shift_checked(&self) -> Option<bool>;

  fn set_shift_control(
    &mut self,
    control: ShiftSubtasksControl
  );

  fn render_calendar(
    &mut self,
    grid: &MonthGrid
  );

  fn show_dialog(&mut self);

  fn hide_dialog(&mut self);

  /// Adds or updates the hidden `shift_subtasks` input of the target's
  /// form. Returns `false` when the target has no form.
  fn upsert_shift_flag(
    &mut self,
    target: &TargetField,
    shift: bool
  ) -> bool;

  fn submit_form(
    &mut self,
    target: &TargetField
  ) -> bool;
}

/// Moves `from` (or today) by calendar months first, then by days.
/// Month overflow rolls forward: Jan 31 + 1 month is early March.
/// `None` when the result cannot be represented as a date.
#[must_use]
pub fn shift_due_date(
  from: Option<NaiveDate>,
  days: i64,
  months: i32,
  today: NaiveDate
) -> Option<NaiveDate> {
  let mut date = from.unwrap_or(today);
  if months != 0 {
    date = add_months_rolling(date, months)?;
  }
  if days != 0 {
    date = add_days(date, days)?;
  }
  Some(date)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerSession {
  target:         TargetField,
  auto_save:      bool,
  shift_subtasks: ShiftSubtasksControl,
  calendar:       CalendarView,
  time:           Option<NaiveTime>
}

impl PickerSession {
  /// Seeds a session from the explicit value, falling back to the
  /// field's current value. Anything unparsable starts empty on the
  /// current month.
  #[must_use]
  pub fn start(
    request: PickerRequest,
    field_value: Option<String>,
    today: NaiveDate,
    week_start: Weekday
  ) -> Self {
    let seed = request
      .explicit_value
      .filter(|value| !value.is_empty())
      .or(field_value)
      .unwrap_or_default();
    let parsed = parse_due(&seed);
    if parsed.is_none() && !seed.is_empty()
    {
      tracing::warn!(
        task_ref = %request.task_ref,
        value = %seed,
        "ignoring unparsable due value"
      );
    }

    let calendar = CalendarView::seeded(
      parsed.map(|due| due.date()),
      today
    )
    .with_week_start(week_start);

    Self {
      target: TargetField::new(
        request.task_ref
      ),
      auto_save: request.auto_save,
      shift_subtasks:
        ShiftSubtasksControl::for_task(
          request.has_subtasks
        ),
      calendar,
      time: parsed.map(|due| due.time())
    }
  }

  #[must_use]
  pub fn target(&self) -> &TargetField {
    &self.target
  }

  #[must_use]
  pub fn auto_save(&self) -> bool {
    self.auto_save
  }

  #[must_use]
  pub fn shift_subtasks(
    &self
  ) -> ShiftSubtasksControl {
    self.shift_subtasks
  }

  #[must_use]
  pub fn calendar(&self) -> &CalendarView {
    &self.calendar
  }

  #[must_use]
  pub fn time(&self) -> Option<NaiveTime> {
    self.time
  }

  #[must_use]
  pub fn time_input_value(
    &self
  ) -> String {
    self
      .time
      .map(|time| {
        time.format("%H:%M").to_string()
      })
      .unwrap_or_default()
  }

  #[must_use]
  pub fn compose_value(&self) -> String {
    compose_due_value(
      self.calendar.selected(),
      self.time
    )
  }

  /// Leaves the selection alone when the shift is out of range.
  pub fn shift_selection(
    &mut self,
    days: i64,
    months: i32,
    today: NaiveDate
  ) -> Option<NaiveDate> {
    let date = shift_due_date(
      self.calendar.selected(),
      days,
      months,
      today
    )?;
    self.calendar.set_selected(Some(date));
    Some(date)
  }

  fn sync_inputs<S: PickerSurface + ?Sized>(
    &mut self,
    surface: &S
  ) {
    self.time =
      parse_time_input(&surface.time_input());
    self.shift_subtasks.checked = surface
      .shift_checked()
      .unwrap_or(false);
  }
}

/// What a confirm wrote back to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
  pub target:    TargetField,
  pub value:     String,
  pub label:     Option<String>,
  pub submitted: bool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
  Closed,
  Open(PickerSession)
}

#[derive(Debug, Clone)]
pub struct DueDatePicker {
  state:      PickerState,
  week_start: Weekday
}

impl Default for DueDatePicker {
  fn default() -> Self {
    Self::new(Weekday::Sun)
  }
}

impl DueDatePicker {
  #[must_use]
  pub fn new(week_start: Weekday) -> Self {
    Self {
      state: PickerState::Closed,
      week_start
    }
  }

  #[must_use]
  pub fn state(&self) -> &PickerState {
    &self.state
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    matches!(self.state, PickerState::Open(_))
  }

  #[must_use]
  pub fn session(
    &self
  ) -> Option<&PickerSession> {
    match &self.state {
      | PickerState::Open(session) => {
        Some(session)
      }
      | PickerState::Closed => None
    }
  }

  fn session_mut(
    &mut self,
    op: &'static str
  ) -> Option<&mut PickerSession> {
    match &mut self.state {
      | PickerState::Open(session) => {
        Some(session)
      }
      | PickerState::Closed => {
        tracing::debug!(
          op,
          "picker is closed; ignoring"
        );
        None
      }
    }
  }

  #[tracing::instrument(skip(self, surface, today), fields(task_ref = %request.task_ref))]
  pub fn open<S: PickerSurface + ?Sized>(
    &mut self,
    request: PickerRequest,
    surface: &mut S,
    today: NaiveDate
  ) {
    let target =
      TargetField::new(&request.task_ref);
    let field_value =
      surface.field_value(&target);
    let session = PickerSession::start(
      request,
      field_value,
      today,
      self.week_start
    );

    surface.set_shift_control(
      session.shift_subtasks
    );
    surface.set_time_input(
      &session.time_input_value()
    );
    surface.render_calendar(
      &session.calendar.render(today)
    );
    surface.show_dialog();

    tracing::debug!(
      selected = ?session.calendar.selected(),
      auto_save = session.auto_save,
      "due picker opened"
    );
    self.state = PickerState::Open(session);
  }

  pub fn select_day<S: PickerSurface + ?Sized>(
    &mut self,
    day: u32,
    surface: &mut S,
    today: NaiveDate
  ) -> Option<NaiveDate> {
    let session =
      self.session_mut("select_day")?;
    let picked =
      session.calendar.select_day(day)?;
    surface.render_calendar(
      &session.calendar.render(today)
    );
    Some(picked)
  }

  pub fn change_month<S: PickerSurface + ?Sized>(
    &mut self,
    delta: i32,
    surface: &mut S,
    today: NaiveDate
  ) {
    let Some(session) =
      self.session_mut("change_month")
    else {
      return;
    };
    if !session.calendar.change_month(delta) {
      tracing::warn!(
        task_ref = %session.target.task_ref(),
        delta,
        "month out of range; calendar unchanged"
      );
      return;
    }
    surface.render_calendar(
      &session.calendar.render(today)
    );
  }

  /// Writes the composed value into the target field and closes.
  #[tracing::instrument(skip_all)]
  pub fn save<S: PickerSurface + ?Sized>(
    &mut self,
    surface: &mut S,
    now: NaiveDateTime
  ) -> Option<Confirmation> {
    let session =
      self.session_mut("save")?;
    session.sync_inputs(surface);

    let value = session.compose_value();
    let target = session.target.clone();
    surface.write_field(&target, &value);

    let label = if value.is_empty() {
      surface.hide_preview(&target);
      None
    } else {
      let label =
        format_due_display(&value, now);
      surface.show_preview(&target, &label);
      Some(label)
    };

    let mut submitted = false;
    if session.auto_save {
      let shift =
        session.shift_subtasks.checked;
      if surface
        .upsert_shift_flag(&target, shift)
      {
        submitted =
          surface.submit_form(&target);
      } else {
        tracing::warn!(
          task_ref = %target.task_ref(),
          "auto-save requested but due field has no form"
        );
      }
    }

    tracing::info!(
      task_ref = %target.task_ref(),
      value = %value,
      submitted,
      "due date confirmed"
    );
    self.close(surface);

    Some(Confirmation {
      target,
      value,
      label,
      submitted
    })
  }

  /// Empties the target field and hides its preview. The form is left
  /// alone.
  pub fn clear<S: PickerSurface + ?Sized>(
    &mut self,
    surface: &mut S
  ) -> Option<TargetField> {
    let target = self
      .session_mut("clear")?
      .target
      .clone();
    surface.write_field(&target, "");
    surface.hide_preview(&target);
    self.close(surface);
    Some(target)
  }

  pub fn close<S: PickerSurface + ?Sized>(
    &mut self,
    surface: &mut S
  ) {
    surface.hide_dialog();
    self.state = PickerState::Closed;
  }

  pub fn set_today<S: PickerSurface + ?Sized>(
    &mut self,
    surface: &mut S,
    now: NaiveDateTime
  ) -> Option<Confirmation> {
    self
      .session_mut("set_today")?
      .calendar
      .set_selected(Some(now.date()));
    self.save(surface, now)
  }

  pub fn shift<S: PickerSurface + ?Sized>(
    &mut self,
    days: i64,
    months: i32,
    surface: &mut S,
    now: NaiveDateTime
  ) -> Option<Confirmation> {
    let session = self.session_mut("shift")?;
    let Some(shifted) = session
      .shift_selection(
        days,
        months,
        now.date()
      )
    else {
      tracing::warn!(
        task_ref = %session.target.task_ref(),
        days,
        months,
        "shifted due date out of range; ignoring"
      );
      return None;
    };
    tracing::debug!(
      days,
      months,
      %shifted,
      "due date shifted"
    );
    self.save(surface, now)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  #[derive(Default)]
  struct RecordingSurface {
    fields:       HashMap<String, String>,
    previews:     HashMap<String, Option<String>>,
    forms:        HashMap<String, Vec<(String, bool)>>,
    submitted:    Vec<String>,
    time:         String,
    shift:        Option<ShiftSubtasksControl>,
    grids:        Vec<MonthGrid>,
    dialog_open:  bool
  }

  impl RecordingSurface {
    fn with_field(
      task_ref: &str,
      value: &str
    ) -> Self {
      let mut surface = Self::default();
      surface.fields.insert(
        task_ref.to_string(),
        value.to_string()
      );
      surface
    }

    fn with_form(
      mut self,
      task_ref: &str
    ) -> Self {
      self
        .forms
        .insert(task_ref.to_string(), vec![]);
      self
    }
  }

  impl PickerSurface for RecordingSurface {
    fn field_value(
      &self,
      target: &TargetField
    ) -> Option<String> {
      self.fields.get(target.task_ref()).cloned()
    }

    fn write_field(
      &mut self,
      target: &TargetField,
      value: &str
    ) {
      if let Some(field) =
        self.fields.get_mut(target.task_ref())
      {
        *field = value.to_string();
      }
    }

    fn show_preview(
      &mut self,
      target: &TargetField,
      label: &str
    ) {
      self.previews.insert(
        target.task_ref().to_string(),
        Some(label.to_string())
      );
    }

    fn hide_preview(
      &mut self,
      target: &TargetField
    ) {
      self.previews.insert(
        target.task_ref().to_string(),
        None
      );
    }

    fn time_input(&self) -> String {
      self.time.clone()
    }

    fn set_time_input(
      &mut self,
      value: &str
    ) {
      self.time = value.to_string();
    }

    fn shift_checked(&self) -> Option<bool> {
      self.shift.map(|control| control.checked)
    }

    fn set_shift_control(
      &mut self,
      control: ShiftSubtasksControl
    ) {
      self.shift = Some(control);
    }

    fn render_calendar(
      &mut self,
      grid: &MonthGrid
    ) {
      self.grids.push(grid.clone());
    }

    fn show_dialog(&mut self) {
      self.dialog_open = true;
    }

    fn hide_dialog(&mut self) {
      self.dialog_open = false;
    }

    fn upsert_shift_flag(
      &mut self,
      target: &TargetField,
      shift: bool
    ) -> bool {
      let Some(form) =
        self.forms.get_mut(target.task_ref())
      else {
        return false;
      };
      match form.iter_mut().find(|(name, _)| {
        name == "shift_subtasks"
      }) {
        | Some(entry) => entry.1 = shift,
        | None => form.push((
          "shift_subtasks".to_string(),
          shift
        ))
      }
      true
    }

    fn submit_form(
      &mut self,
      target: &TargetField
    ) -> bool {
      self
        .submitted
        .push(target.task_ref().to_string());
      true
    }
  }

  fn at(raw: &str) -> NaiveDateTime {
    parse_due(raw).expect("valid fixture")
  }

  fn request(
    task_ref: &str,
    auto_save: bool,
    has_subtasks: bool
  ) -> PickerRequest {
    PickerRequest {
      task_ref: task_ref.to_string(),
      explicit_value: None,
      auto_save,
      has_subtasks
    }
  }

  #[test]
  fn opens_from_field_value() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field(
        "7",
        "2025-02-14 18:30:00"
      );
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let session =
      picker.session().expect("picker open");

    assert_eq!(
      session.calendar().selected(),
      NaiveDate::from_ymd_opt(2025, 2, 14)
    );
    assert_eq!(session.calendar().displayed().month, 2);
    assert_eq!(surface.time, "18:30");
    assert!(surface.dialog_open);
    assert_eq!(surface.grids.len(), 1);
  }

  #[test]
  fn explicit_value_overrides_field() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field(
        "7",
        "2025-02-14 18:30:00"
      );
    let mut picker = DueDatePicker::default();
    let mut req = request("7", false, false);
    req.explicit_value =
      Some("2025-06-01T09:15".to_string());
    picker.open(req, &mut surface, now.date());
    let session =
      picker.session().expect("picker open");
    assert_eq!(
      session.calendar().selected(),
      NaiveDate::from_ymd_opt(2025, 6, 1)
    );
    assert_eq!(surface.time, "09:15");
  }

  #[test]
  fn unparsable_value_opens_empty_on_current_month()
  {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "soon");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let session =
      picker.session().expect("picker open");
    assert_eq!(session.calendar().selected(), None);
    assert_eq!(session.calendar().displayed().month, 1);
    assert_eq!(surface.time, "");
  }

  #[test]
  fn shift_control_follows_subtasks() {
    let now = at("2025-01-03 10:00:00");
    let mut picker = DueDatePicker::default();

    let mut surface =
      RecordingSurface::with_field("7", "");
    picker.open(
      request("7", true, true),
      &mut surface,
      now.date()
    );
    assert_eq!(
      surface.shift,
      Some(ShiftSubtasksControl {
        visible: true,
        checked: true
      })
    );

    let mut surface =
      RecordingSurface::with_field("8", "");
    picker.open(
      request("8", true, false),
      &mut surface,
      now.date()
    );
    assert_eq!(
      surface.shift,
      Some(ShiftSubtasksControl {
        visible: false,
        checked: false
      })
    );
  }

  #[test]
  fn confirm_without_date_empties_and_hides_preview()
  {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );

    let confirmation = picker
      .save(&mut surface, now)
      .expect("picker was open");
    assert_eq!(confirmation.value, "");
    assert_eq!(confirmation.label, None);
    assert_eq!(surface.fields["7"], "");
    assert_eq!(surface.previews["7"], None);
    assert!(!picker.is_open());
    assert!(!surface.dialog_open);
  }

  #[test]
  fn confirm_with_date_only_stores_midnight() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    picker.select_day(20, &mut surface, now.date());

    let confirmation = picker
      .save(&mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2025-01-20 00:00:00"
    );
    assert_eq!(
      surface.previews["7"].as_deref(),
      Some("20 Jan 25")
    );
  }

  #[test]
  fn confirm_with_time_and_auto_save_submits_once()
  {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "")
        .with_form("7");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", true, true),
      &mut surface,
      now.date()
    );
    picker.select_day(4, &mut surface, now.date());
    surface.time = "14:30".to_string();

    let confirmation = picker
      .save(&mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2025-01-04 14:30:00"
    );
    assert_eq!(
      confirmation.label.as_deref(),
      Some("Tomorrow 14:30")
    );
    assert!(confirmation.submitted);
    assert_eq!(
      surface.forms["7"],
      vec![("shift_subtasks".to_string(), true)]
    );
    assert_eq!(surface.submitted, vec!["7"]);

    // A second save on the same form updates the flag in place.
    picker.open(
      request("7", true, true),
      &mut surface,
      now.date()
    );
    surface.shift = Some(ShiftSubtasksControl {
      visible: true,
      checked: false
    });
    picker.save(&mut surface, now);
    assert_eq!(
      surface.forms["7"],
      vec![("shift_subtasks".to_string(), false)]
    );
  }

  #[test]
  fn clear_never_touches_the_form() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field(
        "7",
        "2025-01-03 09:00:00"
      )
      .with_form("7");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", true, true),
      &mut surface,
      now.date()
    );

    let cleared = picker
      .clear(&mut surface)
      .expect("picker was open");
    assert_eq!(cleared.task_ref(), "7");
    assert_eq!(surface.fields["7"], "");
    assert_eq!(surface.previews["7"], None);
    assert!(surface.forms["7"].is_empty());
    assert!(surface.submitted.is_empty());
    assert!(!picker.is_open());
  }

  #[test]
  fn set_today_confirms_immediately() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );

    let confirmation = picker
      .set_today(&mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2025-01-03 00:00:00"
    );
    assert_eq!(
      confirmation.label.as_deref(),
      Some("Today")
    );
  }

  #[test]
  fn shift_applies_months_before_days() {
    let now = at("2024-01-10 10:00:00");
    let mut surface =
      RecordingSurface::with_field(
        "7",
        "2024-01-31 00:00:00"
      );
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let confirmation = picker
      .shift(0, 1, &mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2024-03-02 00:00:00"
    );

    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let confirmation = picker
      .shift(1, 1, &mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2024-04-03 00:00:00"
    );
  }

  #[test]
  fn shift_without_selection_starts_today() {
    let now = at("2024-01-10 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let confirmation = picker
      .shift(7, 0, &mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2024-01-17 00:00:00"
    );
  }

  #[test]
  fn missing_due_field_degrades_to_no_ops() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::default();
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    assert!(picker.is_open());
    assert_eq!(
      picker.select_day(
        20,
        &mut surface,
        now.date()
      ),
      NaiveDate::from_ymd_opt(2025, 1, 20)
    );

    let confirmation = picker
      .save(&mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2025-01-20 00:00:00"
    );
    assert!(!confirmation.submitted);
    assert!(surface.fields.is_empty());
    assert!(!picker.is_open());
    assert!(!surface.dialog_open);

    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    let cleared = picker
      .clear(&mut surface)
      .expect("picker was open");
    assert_eq!(cleared.task_ref(), "7");
    assert!(surface.fields.is_empty());
    assert!(!picker.is_open());
  }

  #[test]
  fn auto_save_without_form_skips_submit() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", true, true),
      &mut surface,
      now.date()
    );
    picker.select_day(4, &mut surface, now.date());

    let confirmation = picker
      .save(&mut surface, now)
      .expect("picker was open");
    assert_eq!(
      confirmation.value,
      "2025-01-04 00:00:00"
    );
    assert!(!confirmation.submitted);
    assert!(surface.submitted.is_empty());
    assert!(surface.forms.is_empty());
    assert_eq!(surface.fields["7"], "2025-01-04 00:00:00");
  }

  #[test]
  fn out_of_range_shift_leaves_field_alone() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field(
        "7",
        "2025-01-31 00:00:00"
      )
      .with_form("7");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", true, false),
      &mut surface,
      now.date()
    );

    assert!(
      picker
        .shift(0, 5_000_000, &mut surface, now)
        .is_none()
    );
    assert!(
      picker
        .shift(i64::MAX, 0, &mut surface, now)
        .is_none()
    );
    assert_eq!(
      surface.fields["7"],
      "2025-01-31 00:00:00"
    );
    assert!(surface.submitted.is_empty());
    assert!(picker.is_open());
    assert_eq!(
      picker
        .session()
        .and_then(|s| s.calendar().selected()),
      NaiveDate::from_ymd_opt(2025, 1, 31)
    );
  }

  #[test]
  fn out_of_range_month_change_skips_render() {
    let now = at("2025-01-03 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "");
    let mut picker = DueDatePicker::default();
    picker.open(
      request("7", false, false),
      &mut surface,
      now.date()
    );
    picker.change_month(
      5_000_000,
      &mut surface,
      now.date()
    );
    assert_eq!(surface.grids.len(), 1);
    assert_eq!(
      picker
        .session()
        .map(|s| s.calendar().displayed().label()),
      Some("Jan 2025".to_string())
    );
  }

  #[test]
  fn shift_helper_reports_overflow() {
    let today = at("2025-01-03 10:00:00").date();
    assert_eq!(
      shift_due_date(None, i64::MAX, 0, today),
      None
    );
    assert_eq!(
      shift_due_date(None, 0, i32::MAX, today),
      None
    );
    assert_eq!(
      shift_due_date(None, 1, 0, today),
      NaiveDate::from_ymd_opt(2025, 1, 4)
    );
  }

  #[test]
  fn closed_picker_ignores_operations() {
    let now = at("2024-01-10 10:00:00");
    let mut surface =
      RecordingSurface::with_field("7", "x");
    let mut picker = DueDatePicker::default();
    assert!(picker.save(&mut surface, now).is_none());
    assert!(picker.clear(&mut surface).is_none());
    assert!(
      picker
        .select_day(3, &mut surface, now.date())
        .is_none()
    );
    assert_eq!(surface.fields["7"], "x");
    assert!(surface.grids.is_empty());
  }
}
