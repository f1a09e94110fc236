use chrono::NaiveDateTime;
use ctask_core::datetime::Clock;
use ctask_core::due::format_due_display;
use ctask_core::period::default_due_value;
use ctask_web_shared::{
  ROOT_TASK_REF,
  hooks,
  ids
};
use gloo::events::EventListener;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  HtmlElement
};

use crate::config;
use crate::dom;

const PERIOD_GLOBAL: &str =
  "globalCurrentPeriod";

pub fn run_when_ready(
  document: &Document
) {
  if document.ready_state() == "loading" {
    EventListener::once(
      document,
      "DOMContentLoaded",
      |_| init_page()
    )
    .forget();
  } else {
    init_page();
  }
}

#[tracing::instrument]
fn init_page() {
  let now = config::clock().now();
  let badges = format_badges(
    hooks::DUE_TAG,
    hooks::DUE_DISPLAY_TEXT,
    false,
    now
  );
  let previews = format_badges(
    hooks::DUE_PREVIEW,
    hooks::DUE_PREVIEW_TEXT,
    true,
    now
  );
  tracing::info!(
    badges,
    previews,
    "formatted due labels"
  );
  prefill_root_due(now);
}

/// Formats every element matching `container` that carries a raw due
/// value. Returns how many were updated.
fn format_badges(
  container: &str,
  text_selector: &str,
  reveal: bool,
  now: NaiveDateTime
) -> usize {
  let mut updated = 0;
  for element in dom::query_all(container) {
    let Some(raw) =
      element.get_attribute(hooks::DUE_AT_ATTR)
    else {
      continue;
    };
    if raw.is_empty() || raw == "None" {
      continue;
    }
    let Some(text) =
      dom::query_html(&element, text_selector)
    else {
      continue;
    };
    text.set_inner_text(&format_due_display(
      &raw, now
    ));
    if reveal
      && let Ok(element) =
        element.dyn_into::<HtmlElement>()
    {
      dom::set_display(
        &element,
        "inline-block"
      );
    }
    updated += 1;
  }
  updated
}

/// The list period the page was rendered with. `None` when the page
/// does not declare one; a null or non-string value counts as empty.
fn current_period() -> Option<String> {
  let window = web_sys::window()?;
  let value = js_sys::Reflect::get(
    &window,
    &JsValue::from_str(PERIOD_GLOBAL)
  )
  .ok()?;
  if value.is_undefined() {
    return None;
  }
  Some(value.as_string().unwrap_or_default())
}

fn prefill_root_due(now: NaiveDateTime) {
  let Some(input) = dom::input_by_id(
    &ids::due_input(ROOT_TASK_REF)
  ) else {
    return;
  };
  if !input.value().is_empty() {
    return;
  }
  let Some(period) = current_period() else {
    return;
  };

  tracing::debug!(
    period = %period,
    "prefilling new task due date"
  );
  let Some(value) =
    default_due_value(&period, now.date())
  else {
    return;
  };
  input.set_value(&value);

  if let Some(preview) =
    dom::html_element_by_id(
      &ids::due_preview(ROOT_TASK_REF)
    )
  {
    if let Some(text) = dom::query_html(
      &preview,
      hooks::DUE_PREVIEW_TEXT
    ) {
      text.set_inner_text(
        &format_due_display(&value, now)
      );
    }
    dom::set_display(
      &preview,
      "inline-block"
    );
  }
}
