mod config;
mod dom;
mod editor;
mod page;
mod picker;
mod toggles;

use wasm_bindgen::prelude::*;

pub use editor::DescriptionEditor;
pub use picker::DuePicker;

#[wasm_bindgen(start)]
pub fn start() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting ctask web client"
  );

  let Some(document) = dom::document()
  else {
    tracing::warn!(
      "no document; client idle"
    );
    return;
  };

  toggles::install_menu_dismissal(
    &document
  );
  page::run_when_ready(&document);
}
