//! Names shared by the server templates, the request handlers and the
//! browser client: element ids, CSS hooks, endpoint paths and the
//! payloads exchanged with the server.

use serde::{
  Deserialize,
  Serialize
};

pub const UPDATE_TASK_PATH: &str =
  "/update_task";
pub const TOGGLE_FOLDING_PREFIX: &str =
  "/toggle_folding/";

/// Hidden form input carrying the "move subtasks too" choice.
pub const SHIFT_SUBTASKS_FIELD: &str =
  "shift_subtasks";
pub const TASK_ID_FIELD: &str = "task_id";
pub const DESCRIPTION_FIELD: &str =
  "description";

/// Task reference used by the new-task form at the top of the list.
pub const ROOT_TASK_REF: &str = "root";

#[must_use]
pub fn flag_value(
  value: bool
) -> &'static str {
  if value { "true" } else { "false" }
}

#[must_use]
pub fn toggle_folding_path(
  prefix: &str,
  task_ref: &str
) -> String {
  format!("{prefix}{task_ref}")
}

pub mod ids {
  pub const TIME_SET_DIALOG: &str =
    "task-time-set-dialog";
  pub const DUE_TIME_INPUT: &str =
    "due-time-input";
  pub const CALENDAR_GRID: &str =
    "calendar-grid";
  pub const CALENDAR_MONTH_YEAR: &str =
    "calendar-month-year";
  pub const SHIFT_SUBTASKS_CONTAINER:
    &str = "shift-subtasks-container";
  pub const SHIFT_SUBTASKS_CHECKBOX:
    &str = "shift-subtasks-checkbox";
  pub const SAVE_STATUS: &str =
    "save-status";
  pub const DESCRIPTION_EDITOR: &str =
    "task-description-editor";
  pub const SETTINGS_MENU: &str =
    "settings-menu";

  #[must_use]
  pub fn due_input(task_ref: &str) -> String {
    format!("due-at-{task_ref}")
  }

  #[must_use]
  pub fn due_preview(
    task_ref: &str
  ) -> String {
    format!("due-preview-{task_ref}")
  }

  #[must_use]
  pub fn task_menu(task_ref: &str) -> String {
    format!("menu-{task_ref}")
  }

  #[must_use]
  pub fn fold_toggle(
    task_ref: &str
  ) -> String {
    format!("toggle-{task_ref}")
  }

  #[must_use]
  pub fn children(task_ref: &str) -> String {
    format!("children-{task_ref}")
  }

  #[must_use]
  pub fn display(id: &str) -> String {
    format!("display-{id}")
  }

  #[must_use]
  pub fn edit(id: &str) -> String {
    format!("edit-{id}")
  }

  #[must_use]
  pub fn input_text(id: &str) -> String {
    format!("input-text-{id}")
  }

  #[must_use]
  pub fn subtask_form(
    task_ref: &str
  ) -> String {
    format!("subtask-form-{task_ref}")
  }

  #[must_use]
  pub fn run_ai(task_ref: &str) -> String {
    format!("run-ai-{task_ref}")
  }
}

/// CSS classes and selectors the client reads or toggles.
pub mod hooks {
  pub const DUE_TAG: &str = ".due-tag";
  pub const DUE_DISPLAY_TEXT: &str =
    ".due-display-text";
  pub const DUE_PREVIEW: &str =
    ".due-preview";
  pub const DUE_PREVIEW_TEXT: &str =
    ".due-preview-text";
  pub const DUE_AT_ATTR: &str =
    "data-due-at";

  pub const CALENDAR_DAY: &str =
    "calendar-day";
  pub const CALENDAR_DAY_HEADER: &str =
    "calendar-day-header";
  pub const CALENDAR_PAD: &str =
    "prev-next";
  pub const SELECTED: &str = "selected";
  pub const TODAY: &str = "today";

  pub const SIDEBAR_OPEN: &str = "open";
  pub const ICON_ROTATED: &str =
    "rotated";
  pub const FOLDED: &str = "folded";
}

/// Body of `GET /toggle_folding/{id}`.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct FoldingResponse {
  #[serde(default)]
  pub success: bool
}

/// Multipart body of `POST /update_task` sent by the description
/// autosave.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DescriptionUpdate {
  pub task_id:     String,
  pub description: String
}

impl DescriptionUpdate {
  #[must_use]
  pub fn form_fields(
    &self
  ) -> [(&'static str, &str); 2] {
    [
      (TASK_ID_FIELD, self.task_id.as_str()),
      (
        DESCRIPTION_FIELD,
        self.description.as_str()
      )
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn element_ids_follow_template_names() {
    assert_eq!(ids::due_input("42"), "due-at-42");
    assert_eq!(
      ids::due_preview(ROOT_TASK_REF),
      "due-preview-root"
    );
    assert_eq!(ids::task_menu("7"), "menu-7");
    assert_eq!(
      ids::subtask_form("7"),
      "subtask-form-7"
    );
  }

  #[test]
  fn folding_response_defaults_to_failure() {
    let ok: FoldingResponse =
      serde_json::from_str(
        r#"{"success":true}"#
      )
      .expect("decode success");
    assert!(ok.success);

    let missing: FoldingResponse =
      serde_json::from_str("{}")
        .expect("decode empty");
    assert!(!missing.success);
  }

  #[test]
  fn description_update_lists_form_fields() {
    let update = DescriptionUpdate {
      task_id:     "12".to_string(),
      description: "<p>hi</p>".to_string()
    };
    assert_eq!(
      update.form_fields(),
      [
        ("task_id", "12"),
        ("description", "<p>hi</p>")
      ]
    );
  }

  #[test]
  fn folding_path_appends_task() {
    assert_eq!(
      toggle_folding_path(
        TOGGLE_FOLDING_PREFIX,
        "9"
      ),
      "/toggle_folding/9"
    );
    assert_eq!(flag_value(true), "true");
    assert_eq!(flag_value(false), "false");
  }
}
