use std::cell::RefCell;
use std::rc::{
  Rc,
  Weak
};

use ctask_core::datetime::{
  Clock,
  SystemClock
};
use ctask_core::due::format_due_display;
use ctask_core::picker::{
  DueDatePicker,
  PickerRequest
};
use wasm_bindgen::prelude::*;

use crate::config;
use crate::dom::DomPickerSurface;

struct PickerInner {
  picker:  RefCell<DueDatePicker>,
  surface: RefCell<DomPickerSurface>,
  clock:   SystemClock
}

impl PickerInner {
  fn select_day(&self, day: u32) {
    let today = self.clock.today();
    let picked =
      self.picker.borrow_mut().select_day(
        day,
        &mut *self.surface.borrow_mut(),
        today
      );
    tracing::debug!(
      day,
      ?picked,
      "calendar day clicked"
    );
  }
}

/// One due-date dialog bound to the page's picker markup.
#[wasm_bindgen]
pub struct DuePicker {
  inner: Rc<PickerInner>
}

#[wasm_bindgen]
impl DuePicker {
  #[wasm_bindgen(constructor)]
  pub fn new() -> DuePicker {
    let cfg = config::client_config();
    let inner = Rc::new_cyclic(
      |weak: &Weak<PickerInner>| {
        let weak = weak.clone();
        let on_day: Rc<dyn Fn(u32)> =
          Rc::new(move |day: u32| {
            if let Some(inner) =
              weak.upgrade()
            {
              inner.select_day(day);
            }
          });
        PickerInner {
          picker:  RefCell::new(
            DueDatePicker::new(
              cfg.week_start()
            )
          ),
          surface: RefCell::new(
            DomPickerSurface::new(on_day)
          ),
          clock:   cfg.clock()
        }
      }
    );
    DuePicker { inner }
  }

  pub fn open(
    &self,
    task_ref: String,
    explicit_value: Option<String>,
    auto_save: bool,
    has_subtasks: bool
  ) {
    let today = self.inner.clock.today();
    self.inner.picker.borrow_mut().open(
      PickerRequest {
        task_ref,
        explicit_value,
        auto_save,
        has_subtasks
      },
      &mut *self.inner.surface.borrow_mut(),
      today
    );
  }

  #[wasm_bindgen(js_name = selectDay)]
  pub fn select_day(&self, day: u32) {
    self.inner.select_day(day);
  }

  #[wasm_bindgen(js_name = changeMonth)]
  pub fn change_month(&self, delta: i32) {
    let today = self.inner.clock.today();
    self
      .inner
      .picker
      .borrow_mut()
      .change_month(
        delta,
        &mut *self.inner.surface.borrow_mut(),
        today
      );
  }

  /// Confirms the dialog. Returns the value written to the field.
  pub fn save(&self) -> Option<String> {
    let now = self.inner.clock.now();
    self
      .inner
      .picker
      .borrow_mut()
      .save(
        &mut *self.inner.surface.borrow_mut(),
        now
      )
      .map(|confirmation| confirmation.value)
  }

  pub fn clear(&self) {
    self
      .inner
      .picker
      .borrow_mut()
      .clear(
        &mut *self.inner.surface.borrow_mut()
      );
  }

  pub fn close(&self) {
    self
      .inner
      .picker
      .borrow_mut()
      .close(
        &mut *self.inner.surface.borrow_mut()
      );
  }

  #[wasm_bindgen(js_name = setToday)]
  pub fn set_today(&self) -> Option<String> {
    let now = self.inner.clock.now();
    self
      .inner
      .picker
      .borrow_mut()
      .set_today(
        &mut *self.inner.surface.borrow_mut(),
        now
      )
      .map(|confirmation| confirmation.value)
  }

  #[wasm_bindgen(js_name = shiftDate)]
  pub fn shift_date(
    &self,
    days: i32,
    months: i32
  ) -> Option<String> {
    let now = self.inner.clock.now();
    self
      .inner
      .picker
      .borrow_mut()
      .shift(
        i64::from(days),
        months,
        &mut *self.inner.surface.borrow_mut(),
        now
      )
      .map(|confirmation| confirmation.value)
  }

  #[wasm_bindgen(getter, js_name = isOpen)]
  pub fn is_open(&self) -> bool {
    self.inner.picker.borrow().is_open()
  }
}

impl Default for DuePicker {
  fn default() -> Self {
    Self::new()
  }
}

thread_local! {
  static PAGE_PICKER: DuePicker =
    DuePicker::new();
}

// Page-level entry points used by the server templates' inline
// handlers. They all drive one shared dialog.

#[wasm_bindgen(js_name = openTimeSetDialog)]
pub fn open_time_set_dialog(
  task_ref: String,
  explicit_value: Option<String>,
  auto_save: Option<bool>,
  has_subtasks: Option<bool>
) {
  PAGE_PICKER.with(|picker| {
    picker.open(
      task_ref,
      explicit_value,
      auto_save.unwrap_or(false),
      has_subtasks.unwrap_or(false)
    );
  });
}

#[wasm_bindgen(js_name = changeMonth)]
pub fn change_month(delta: i32) {
  PAGE_PICKER.with(|picker| {
    picker.change_month(delta);
  });
}

#[wasm_bindgen(js_name = saveTimeSet)]
pub fn save_time_set() {
  PAGE_PICKER.with(|picker| {
    picker.save();
  });
}

#[wasm_bindgen(js_name = clearTimeSet)]
pub fn clear_time_set() {
  PAGE_PICKER.with(DuePicker::clear);
}

#[wasm_bindgen(js_name = closeTimeSetDialog)]
pub fn close_time_set_dialog() {
  PAGE_PICKER.with(DuePicker::close);
}

#[wasm_bindgen(js_name = setDateToday)]
pub fn set_date_today() {
  PAGE_PICKER.with(|picker| {
    picker.set_today();
  });
}

#[wasm_bindgen(js_name = shiftDate)]
pub fn shift_date(
  days: i32,
  months: Option<i32>
) {
  PAGE_PICKER.with(|picker| {
    picker.shift_date(
      days,
      months.unwrap_or(0)
    );
  });
}

#[wasm_bindgen(js_name = formatDueDisplay)]
pub fn format_due(raw: &str) -> String {
  format_due_display(
    raw,
    config::clock().now()
  )
}
