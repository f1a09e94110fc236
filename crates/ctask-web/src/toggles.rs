//! Show/hide helpers called from inline handlers in the server
//! templates.

use ctask_core::folding::{
  FoldState,
  toggled_display
};
use ctask_core::menus::{
  ClickProbe,
  MenuFamily,
  MenuScope,
  families_to_close
};
use ctask_web_shared::{
  FoldingResponse,
  flag_value,
  hooks,
  ids,
  toggle_folding_path
};
use gloo::events::EventListener;
use gloo::net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
  Document,
  Element,
  Event,
  KeyboardEvent
};

use crate::config;
use crate::dom;

/// Clicked element, as seen by the menu dismissal rules.
struct ClickedElement(Option<Element>);

impl ClickProbe for ClickedElement {
  fn matches(&self, selector: &str) -> bool {
    self.0.as_ref().is_some_and(|element| {
      element
        .matches(selector)
        .unwrap_or(false)
    })
  }

  fn within(&self, selector: &str) -> bool {
    self.0.as_ref().is_some_and(|element| {
      matches!(
        element.closest(selector),
        Ok(Some(_))
      )
    })
  }
}

fn open_menus(
  family: MenuFamily
) -> Vec<Element> {
  match family.scope() {
    | MenuScope::Class(class) => {
      dom::elements_by_class(class)
    }
    | MenuScope::Id(id) => {
      dom::element_by_id(id)
        .into_iter()
        .collect()
    }
  }
}

fn close_family(family: MenuFamily) {
  let open_class = family.open_class();
  for menu in open_menus(family) {
    let _ =
      menu.class_list().remove_1(open_class);
  }
}

pub fn install_menu_dismissal(
  document: &Document
) {
  EventListener::new(
    document,
    "click",
    |event| {
      let target = ClickedElement(
        event.target().and_then(|target| {
          target.dyn_into::<Element>().ok()
        })
      );
      for family in families_to_close(&target)
      {
        close_family(family);
      }
    }
  )
  .forget();
}

/// Toggles one menu of `family` and closes the others of the family.
fn toggle_exclusive(
  family: MenuFamily,
  menu_id: &str
) {
  let open_class = family.open_class();
  for menu in open_menus(family) {
    if menu.id() != menu_id {
      let _ = menu
        .class_list()
        .remove_1(open_class);
    }
  }
  match dom::element_by_id(menu_id) {
    | Some(menu) => {
      let _ = menu
        .class_list()
        .toggle(open_class);
    }
    | None => {
      tracing::debug!(
        menu_id,
        "menu not on page"
      );
    }
  }
}

#[wasm_bindgen(js_name = toggleSidebarSection)]
pub fn toggle_sidebar_section(
  id: &str,
  icon: &Element
) {
  if let Some(section) =
    dom::element_by_id(id)
  {
    let _ = section
      .class_list()
      .toggle(hooks::SIDEBAR_OPEN);
  }
  let _ = icon
    .class_list()
    .toggle(hooks::ICON_ROTATED);
}

#[wasm_bindgen(js_name = toggleForm)]
pub fn toggle_form(id: &str) {
  if let Some(form) =
    dom::html_element_by_id(id)
  {
    let next =
      toggled_display(&dom::display_of(&form));
    dom::set_display(&form, next);
  }
}

#[wasm_bindgen(js_name = openSubtaskForm)]
pub fn open_subtask_form(
  task_ref: &str,
  run_ai: bool
) {
  if let Some(flag) =
    dom::input_by_id(&ids::run_ai(task_ref))
  {
    flag.set_value(flag_value(run_ai));
  }

  let Some(form) = dom::html_element_by_id(
    &ids::subtask_form(task_ref)
  ) else {
    return;
  };
  dom::set_display(&form, "block");
  if let Some(title) = dom::query_html(
    &form,
    "input[name=\"title\"]"
  ) {
    let _ = title.focus();
  }
}

#[wasm_bindgen(js_name = toggleHideMenu)]
pub fn toggle_hide_menu(id: &str) {
  toggle_exclusive(MenuFamily::Hide, id);
}

/// The click that opened the menu must not reach the row underneath.
#[wasm_bindgen(js_name = toggleTaskMenu)]
pub fn toggle_task_menu(
  task_ref: &str,
  event: Option<Event>
) {
  if let Some(event) = event {
    event.stop_propagation();
  }
  toggle_exclusive(
    MenuFamily::Task,
    &ids::task_menu(task_ref)
  );
}

#[wasm_bindgen(js_name = toggleSettingsMenu)]
pub fn toggle_settings_menu() {
  if let Some(menu) =
    dom::element_by_id(ids::SETTINGS_MENU)
  {
    let _ = menu.class_list().toggle(
      MenuFamily::Settings.open_class()
    );
  }
}

#[wasm_bindgen(js_name = enableEdit)]
pub fn enable_edit(id: &str) {
  if let Some(display) =
    dom::html_element_by_id(&ids::display(id))
  {
    dom::set_display(&display, "none");
  }
  if let Some(edit) =
    dom::html_element_by_id(&ids::edit(id))
  {
    dom::set_display(&edit, "block");
    if let Some(input) = dom::html_element_by_id(
      &ids::input_text(id)
    ) {
      let _ = input.focus();
    }
  }
}

#[wasm_bindgen(js_name = disableEdit)]
pub fn disable_edit(id: &str) {
  if let Some(display) =
    dom::html_element_by_id(&ids::display(id))
  {
    dom::set_display(&display, "block");
  }
  if let Some(edit) =
    dom::html_element_by_id(&ids::edit(id))
  {
    dom::set_display(&edit, "none");
  }
}

#[wasm_bindgen(js_name = handleSuggestionKey)]
pub fn handle_suggestion_key(
  event: &KeyboardEvent,
  id: &str
) {
  if event.key() == "Escape" {
    disable_edit(id);
  }
}

#[wasm_bindgen(js_name = toggleTaskFolding)]
pub fn toggle_task_folding(task_ref: &str) {
  let Some(children) =
    dom::html_element_by_id(&ids::children(
      task_ref
    ))
  else {
    return;
  };

  let folded = dom::element_by_id(
    &ids::fold_toggle(task_ref)
  )
  .and_then(|toggle| {
    toggle
      .class_list()
      .toggle(hooks::FOLDED)
      .ok()
  })
  .unwrap_or(false);
  let state = FoldState::from_folded(folded);
  dom::set_display(
    &children,
    state.children_display()
  );

  let url = toggle_folding_path(
    &config::client_config()
      .folding
      .endpoint_prefix,
    task_ref
  );
  let task_ref = task_ref.to_string();
  wasm_bindgen_futures::spawn_local(
    async move {
      if let Err(error) =
        persist_folding(&url).await
      {
        tracing::error!(
          task_ref = %task_ref,
          error = %error,
          "error persisting folding state"
        );
      }
    }
  );
}

async fn persist_folding(
  url: &str
) -> Result<(), String> {
  let response = Request::get(url)
    .send()
    .await
    .map_err(|e| {
      format!("request failed: {e}")
    })?;
  let body =
    response.text().await.map_err(|e| {
      format!("failed to read body: {e}")
    })?;
  let parsed: FoldingResponse =
    serde_json::from_str(&body).map_err(
      |e| format!("decode error: {e}")
    )?;
  if parsed.success {
    Ok(())
  } else {
    Err(
      "server reported failure"
        .to_string()
    )
  }
}
