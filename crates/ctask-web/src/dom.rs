//! Small `web-sys` helpers and the DOM-backed picker surface.
//!
//! Lookups return `Option` and every writer silently skips missing
//! elements, so pages that only render part of the markup keep working.

use std::rc::Rc;

use ctask_core::calendar::{
  CalendarCell,
  MonthGrid
};
use ctask_core::picker::{
  PickerSurface,
  ShiftSubtasksControl,
  TargetField
};
use ctask_web_shared::{
  SHIFT_SUBTASKS_FIELD,
  flag_value,
  hooks,
  ids
};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  HtmlElement,
  HtmlFormElement,
  HtmlInputElement
};

const DAY_ATTR: &str = "data-day";

pub fn document() -> Option<Document> {
  web_sys::window()
    .and_then(|window| window.document())
}

pub fn element_by_id(
  id: &str
) -> Option<Element> {
  document().and_then(|document| {
    document.get_element_by_id(id)
  })
}

pub fn html_element_by_id(
  id: &str
) -> Option<HtmlElement> {
  element_by_id(id).and_then(|element| {
    element.dyn_into::<HtmlElement>().ok()
  })
}

pub fn input_by_id(
  id: &str
) -> Option<HtmlInputElement> {
  element_by_id(id).and_then(|element| {
    element
      .dyn_into::<HtmlInputElement>()
      .ok()
  })
}

pub fn query_html(
  parent: &Element,
  selector: &str
) -> Option<HtmlElement> {
  parent
    .query_selector(selector)
    .ok()
    .flatten()
    .and_then(|element| {
      element.dyn_into::<HtmlElement>().ok()
    })
}

pub fn query_all(
  selector: &str
) -> Vec<Element> {
  let Some(list) = document().and_then(
    |document| {
      document
        .query_selector_all(selector)
        .ok()
    }
  ) else {
    return Vec::new();
  };

  (0..list.length())
    .filter_map(|idx| list.item(idx))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .collect()
}

pub fn elements_by_class(
  class: &str
) -> Vec<Element> {
  let Some(collection) =
    document().map(|document| {
      document
        .get_elements_by_class_name(class)
    })
  else {
    return Vec::new();
  };

  (0..collection.length())
    .filter_map(|idx| collection.item(idx))
    .collect()
}

pub fn set_display(
  element: &HtmlElement,
  value: &str
) {
  if let Err(error) = element
    .style()
    .set_property("display", value)
  {
    tracing::warn!(
      id = %element.id(),
      error = ?error,
      "failed to set display"
    );
  }
}

pub fn display_of(
  element: &HtmlElement
) -> String {
  element
    .style()
    .get_property_value("display")
    .unwrap_or_default()
}

fn create_div(
  document: &Document,
  class: &str
) -> Option<Element> {
  match document.create_element("div") {
    | Ok(div) => {
      div.set_class_name(class);
      Some(div)
    }
    | Err(error) => {
      tracing::warn!(
        error = ?error,
        "failed to create calendar cell"
      );
      None
    }
  }
}

fn target_form(
  target: &TargetField
) -> Option<HtmlFormElement> {
  input_by_id(&ids::due_input(
    target.task_ref()
  ))
  .and_then(|input| input.form())
}

/// Picker surface over the page markup.
///
/// Day cells carry their number in `data-day`; one delegated click
/// listener on the grid reports picks through `on_day`.
pub struct DomPickerSurface {
  on_day:        Rc<dyn Fn(u32)>,
  grid_listener: Option<EventListener>
}

impl DomPickerSurface {
  pub fn new(on_day: Rc<dyn Fn(u32)>) -> Self {
    Self {
      on_day,
      grid_listener: None
    }
  }

  fn ensure_grid_listener(
    &mut self,
    grid: &Element
  ) {
    if self.grid_listener.is_some() {
      return;
    }
    let on_day = Rc::clone(&self.on_day);
    let selector = format!(
      ".{}[{DAY_ATTR}]",
      hooks::CALENDAR_DAY
    );
    self.grid_listener =
      Some(EventListener::new(
        grid,
        "click",
        move |event| {
          let day = event
            .target()
            .and_then(|target| {
              target
                .dyn_into::<Element>()
                .ok()
            })
            .and_then(|element| {
              element
                .closest(&selector)
                .ok()
                .flatten()
            })
            .and_then(|cell| {
              cell.get_attribute(DAY_ATTR)
            })
            .and_then(|raw| {
              raw.parse::<u32>().ok()
            });
          if let Some(day) = day {
            on_day(day);
          }
        }
      ));
  }
}

impl PickerSurface for DomPickerSurface {
  fn field_value(
    &self,
    target: &TargetField
  ) -> Option<String> {
    input_by_id(&ids::due_input(
      target.task_ref()
    ))
    .map(|input| input.value())
  }

  fn write_field(
    &mut self,
    target: &TargetField,
    value: &str
  ) {
    match input_by_id(&ids::due_input(
      target.task_ref()
    )) {
      | Some(input) => input.set_value(value),
      | None => {
        tracing::debug!(
          task_ref = %target.task_ref(),
          "due input missing; value dropped"
        );
      }
    }
  }

  fn show_preview(
    &mut self,
    target: &TargetField,
    label: &str
  ) {
    let Some(preview) = html_element_by_id(
      &ids::due_preview(target.task_ref())
    ) else {
      return;
    };
    if let Some(text) = query_html(
      &preview,
      hooks::DUE_PREVIEW_TEXT
    ) {
      text.set_inner_text(label);
    }
    set_display(&preview, "inline-block");
  }

  fn hide_preview(
    &mut self,
    target: &TargetField
  ) {
    if let Some(preview) = html_element_by_id(
      &ids::due_preview(target.task_ref())
    ) {
      set_display(&preview, "none");
    }
  }

  fn time_input(&self) -> String {
    input_by_id(ids::DUE_TIME_INPUT)
      .map(|input| input.value())
      .unwrap_or_default()
  }

  fn set_time_input(
    &mut self,
    value: &str
  ) {
    if let Some(input) =
      input_by_id(ids::DUE_TIME_INPUT)
    {
      input.set_value(value);
    }
  }

  fn shift_checked(&self) -> Option<bool> {
    input_by_id(ids::SHIFT_SUBTASKS_CHECKBOX)
      .map(|checkbox| checkbox.checked())
  }

  fn set_shift_control(
    &mut self,
    control: ShiftSubtasksControl
  ) {
    let (
      Some(container),
      Some(checkbox)
    ) = (
      html_element_by_id(
        ids::SHIFT_SUBTASKS_CONTAINER
      ),
      input_by_id(
        ids::SHIFT_SUBTASKS_CHECKBOX
      )
    )
    else {
      return;
    };
    set_display(
      &container,
      if control.visible {
        "flex"
      } else {
        "none"
      }
    );
    checkbox.set_checked(control.checked);
  }

  fn render_calendar(
    &mut self,
    grid: &MonthGrid
  ) {
    let (Some(document), Some(grid_el)) = (
      document(),
      element_by_id(ids::CALENDAR_GRID)
    ) else {
      tracing::debug!(
        "calendar grid missing; skipping render"
      );
      return;
    };

    if let Some(label) = html_element_by_id(
      ids::CALENDAR_MONTH_YEAR
    ) {
      label.set_inner_text(&grid.label);
    }

    grid_el.set_inner_html("");
    for header in &grid.weekday_headers {
      if let Some(div) = create_div(
        &document,
        hooks::CALENDAR_DAY_HEADER
      ) {
        div.set_text_content(Some(*header));
        let _ = grid_el.append_child(&div);
      }
    }

    let pad_class = format!(
      "{} {}",
      hooks::CALENDAR_DAY,
      hooks::CALENDAR_PAD
    );
    for cell in &grid.cells {
      let div = match cell {
        | CalendarCell::Blank => {
          create_div(&document, &pad_class)
        }
        | CalendarCell::Day(day) => {
          create_div(
            &document,
            hooks::CALENDAR_DAY
          )
          .inspect(|div| {
            let number = day.day.to_string();
            div.set_text_content(Some(
              &number
            ));
            let _ = div
              .set_attribute(DAY_ATTR, &number);
            let classes = div.class_list();
            if day.selected {
              let _ =
                classes.add_1(hooks::SELECTED);
            }
            if day.today {
              let _ =
                classes.add_1(hooks::TODAY);
            }
          })
        }
      };
      if let Some(div) = div {
        let _ = grid_el.append_child(&div);
      }
    }

    self.ensure_grid_listener(&grid_el);
  }

  fn show_dialog(&mut self) {
    if let Some(dialog) = html_element_by_id(
      ids::TIME_SET_DIALOG
    ) {
      set_display(&dialog, "flex");
    }
  }

  fn hide_dialog(&mut self) {
    if let Some(dialog) = html_element_by_id(
      ids::TIME_SET_DIALOG
    ) {
      set_display(&dialog, "none");
    }
  }

  fn upsert_shift_flag(
    &mut self,
    target: &TargetField,
    shift: bool
  ) -> bool {
    let Some(form) = target_form(target)
    else {
      return false;
    };

    let selector = format!(
      "input[name=\"{SHIFT_SUBTASKS_FIELD}\"]"
    );
    let existing = form
      .query_selector(&selector)
      .ok()
      .flatten()
      .and_then(|element| {
        element
          .dyn_into::<HtmlInputElement>()
          .ok()
      });

    let hidden = match existing {
      | Some(input) => input,
      | None => {
        let created = document()
          .and_then(|document| {
            document
              .create_element("input")
              .ok()
          })
          .and_then(|element| {
            element
              .dyn_into::<HtmlInputElement>()
              .ok()
          });
        let Some(input) = created else {
          tracing::warn!(
            "failed to create shift_subtasks input"
          );
          return false;
        };
        input.set_type("hidden");
        input.set_name(SHIFT_SUBTASKS_FIELD);
        if let Err(error) =
          form.append_child(&input)
        {
          tracing::warn!(
            error = ?error,
            "failed to attach shift_subtasks input"
          );
          return false;
        }
        input
      }
    };
    hidden.set_value(flag_value(shift));
    true
  }

  fn submit_form(
    &mut self,
    target: &TargetField
  ) -> bool {
    let Some(form) = target_form(target)
    else {
      return false;
    };
    match form.submit() {
      | Ok(()) => true,
      | Err(error) => {
        tracing::error!(
          task_ref = %target.task_ref(),
          error = ?error,
          "form submit failed"
        );
        false
      }
    }
  }
}
