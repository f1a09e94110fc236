//! Task description editor: a Quill instance wired to the autosave
//! session.
//!
//! The session in `ctask_core::autosave` decides when to save and what
//! the status label shows. This module owns the browser side of it: the
//! Quill binding, the idle and status timers, the paste/drop handlers
//! and the `POST /update_task` call.

use std::cell::RefCell;
use std::rc::{
  Rc,
  Weak
};

use ctask_core::autosave::{
  AutosaveSession,
  SaveOutcome,
  SaveRequest,
  SaveStatus,
  SaveTrigger,
  is_save_shortcut
};
use ctask_core::config::ImageConfig;
use ctask_core::debounce::{
  Ticket,
  TimerSlot
};
use ctask_core::editor::{
  ChangeHandler,
  ChangeSource,
  Embed,
  RichTextEditor,
  pdf_placeholder
};
use ctask_core::media::{
  DropKind,
  JPEG_MIME,
  data_url_bytes,
  fit_within
};
use ctask_web_shared::{
  DescriptionUpdate,
  ids
};
use gloo::events::{
  EventListener,
  EventListenerOptions,
  EventListenerPhase
};
use gloo::net::http::Request;
use gloo::timers::callback::Timeout;
use js_sys::{
  Function,
  Object,
  Reflect
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
  CanvasRenderingContext2d,
  ClipboardEvent,
  DragEvent,
  File,
  FileList,
  FormData,
  HtmlCanvasElement,
  HtmlElement,
  HtmlImageElement,
  KeyboardEvent,
  Url
};

use crate::config;
use crate::dom;

#[wasm_bindgen]
extern "C" {
  type Quill;

  #[wasm_bindgen(constructor, catch)]
  fn new(
    selector: &str,
    options: &JsValue
  ) -> Result<Quill, JsValue>;

  #[wasm_bindgen(method, getter)]
  fn root(this: &Quill) -> HtmlElement;

  #[wasm_bindgen(method, getter)]
  fn clipboard(
    this: &Quill
  ) -> QuillClipboard;

  #[wasm_bindgen(method, js_name = getSelection)]
  fn get_selection(
    this: &Quill,
    focus: bool
  ) -> JsValue;

  #[wasm_bindgen(method, js_name = getLength)]
  fn get_length(this: &Quill) -> u32;

  #[wasm_bindgen(method, js_name = setSelection)]
  fn set_selection(this: &Quill, index: u32);

  #[wasm_bindgen(method, js_name = insertText)]
  fn insert_text(
    this: &Quill,
    index: u32,
    text: &str
  );

  #[wasm_bindgen(method, js_name = insertText)]
  fn insert_formatted_text(
    this: &Quill,
    index: u32,
    text: &str,
    format: &str,
    value: &str
  );

  #[wasm_bindgen(method, js_name = insertEmbed)]
  fn insert_embed(
    this: &Quill,
    index: u32,
    kind: &str,
    value: &str
  );

  #[wasm_bindgen(method)]
  fn on(
    this: &Quill,
    event: &str,
    handler: &Function
  );

  type QuillClipboard;

  #[wasm_bindgen(method, js_name = dangerouslyPasteHTML)]
  fn paste_html(
    this: &QuillClipboard,
    html: &str
  );
}

type TextChangeClosure =
  Closure<dyn FnMut(JsValue, JsValue, JsValue)>;

fn quill_options() -> JsValue {
  let set = |target: &Object,
             key: &str,
             value: &JsValue| {
    let _ = Reflect::set(
      target,
      &JsValue::from_str(key),
      value
    );
  };

  let image_resize = Object::new();
  set(
    &image_resize,
    "displaySize",
    &JsValue::TRUE
  );
  let modules = Object::new();
  set(&modules, "imageResize", &image_resize);
  set(&modules, "toolbar", &JsValue::FALSE);

  let options = Object::new();
  set(
    &options,
    "theme",
    &JsValue::from_str("snow")
  );
  set(&options, "modules", &modules);
  options.into()
}

/// Length of `text` in the editor's index units.
fn quill_len(text: &str) -> u32 {
  u32::try_from(text.encode_utf16().count())
    .unwrap_or(u32::MAX)
}

struct QuillEditor {
  quill:     Quill,
  listeners: Vec<TextChangeClosure>
}

impl QuillEditor {
  /// Caret position, or the end of the document without a selection.
  fn caret(&self) -> u32 {
    let range = self.quill.get_selection(true);
    if range.is_object()
      && let Some(index) = Reflect::get(
        &range,
        &JsValue::from_str("index")
      )
      .ok()
      .and_then(|index| index.as_f64())
    {
      return index as u32;
    }
    self.quill.get_length().saturating_sub(1)
  }
}

impl RichTextEditor for QuillEditor {
  fn content(&self) -> String {
    self.quill.root().inner_html()
  }

  fn set_content(&mut self, html: &str) {
    self.quill.clipboard().paste_html(html);
  }

  fn insert_embed(&mut self, embed: Embed) {
    let index = self.caret();
    let inserted = match embed {
      | Embed::Image { data_url } => {
        self.quill.insert_embed(
          index, "image", &data_url
        );
        1
      }
      | Embed::Link { text, href } => {
        self.quill.insert_formatted_text(
          index, &text, "link", &href
        );
        quill_len(&text)
      }
      | Embed::Text(text) => {
        self.quill.insert_text(index, &text);
        quill_len(&text)
      }
    };
    self
      .quill
      .set_selection(
        index.saturating_add(inserted)
      );
  }

  fn on_change(
    &mut self,
    mut handler: ChangeHandler
  ) {
    let closure = TextChangeClosure::new(
      move |_delta: JsValue,
            _old: JsValue,
            source: JsValue| {
        let source = source
          .as_string()
          .unwrap_or_default();
        handler(ChangeSource::from_key(
          &source
        ));
      }
    );
    self.quill.on(
      "text-change",
      closure.as_ref().unchecked_ref()
    );
    self.listeners.push(closure);
  }
}

struct AutosaveInner {
  session:      RefCell<AutosaveSession>,
  editor:       RefCell<QuillEditor>,
  idle_timer:   RefCell<TimerSlot<Timeout>>,
  status_timer: RefCell<TimerSlot<Timeout>>,
  listeners:    RefCell<Vec<EventListener>>,
  endpoint:     String,
  images:       ImageConfig
}

fn now_ms() -> u64 {
  js_sys::Date::now().max(0.0) as u64
}

fn on_editor_change(
  inner: &Rc<AutosaveInner>,
  source: ChangeSource
) {
  let Some(ticket) = inner
    .session
    .borrow_mut()
    .on_change(source, now_ms())
  else {
    return;
  };

  let delay =
    inner.session.borrow().debounce_ms();
  let weak = Rc::downgrade(inner);
  let timeout =
    Timeout::new(delay, move || {
      if let Some(inner) = weak.upgrade() {
        fire_idle(&inner, ticket);
      }
    });
  inner.idle_timer.borrow_mut().replace(timeout);
}

fn fire_idle(
  inner: &Rc<AutosaveInner>,
  ticket: Ticket
) {
  let content =
    inner.editor.borrow().content();
  let request = inner
    .session
    .borrow_mut()
    .on_timer(ticket, content);
  if let Some(request) = request {
    dispatch(inner, request);
  }
}

fn save_now(
  inner: &Rc<AutosaveInner>,
  trigger: SaveTrigger
) {
  inner.idle_timer.borrow_mut().clear();
  let content =
    inner.editor.borrow().content();
  let request = inner
    .session
    .borrow_mut()
    .save_now(trigger, content);
  dispatch(inner, request);
}

fn render_status(status: SaveStatus) {
  let Some(label_el) =
    dom::html_element_by_id(ids::SAVE_STATUS)
  else {
    return;
  };
  match status.label() {
    | Some(label) => {
      label_el.set_inner_text(&label);
      let _ = label_el.style().set_property(
        "color",
        status.tone().color()
      );
      dom::set_display(&label_el, "inline");
    }
    | None => {
      dom::set_display(&label_el, "none");
    }
  }
}

fn dispatch(
  inner: &Rc<AutosaveInner>,
  request: SaveRequest
) {
  inner.status_timer.borrow_mut().clear();
  render_status(SaveStatus::Saving);

  let endpoint = inner.endpoint.clone();
  let weak = Rc::downgrade(inner);
  wasm_bindgen_futures::spawn_local(
    async move {
      let outcome =
        post_description(&endpoint, &request.update)
          .await;
      let Some(inner) = weak.upgrade() else {
        return;
      };
      let status = inner
        .session
        .borrow_mut()
        .finish(request.seq, &outcome);
      render_status(status);
      if status == SaveStatus::Saved {
        arm_status_clear(&inner);
      }
    }
  );
}

fn arm_status_clear(
  inner: &Rc<AutosaveInner>
) {
  let delay =
    inner.session.borrow().status_clear_ms();
  let weak = Rc::downgrade(inner);
  let timeout =
    Timeout::new(delay, move || {
      if let Some(inner) = weak.upgrade()
        && inner.session.borrow_mut().expire_saved()
      {
        render_status(SaveStatus::Hidden);
      }
    });
  inner
    .status_timer
    .borrow_mut()
    .replace(timeout);
}

async fn post_description(
  endpoint: &str,
  update: &DescriptionUpdate
) -> SaveOutcome {
  let network = |message: String| {
    SaveOutcome::Network { message }
  };

  let form = match FormData::new() {
    | Ok(form) => form,
    | Err(error) => {
      return network(format!(
        "failed to build form: {error:?}"
      ));
    }
  };
  for (name, value) in update.form_fields() {
    if let Err(error) =
      form.append_with_str(name, value)
    {
      return network(format!(
        "failed to append {name}: {error:?}"
      ));
    }
  }

  let request =
    match Request::post(endpoint).body(form) {
      | Ok(request) => request,
      | Err(error) => {
        return network(format!(
          "failed to build request: {error}"
        ));
      }
    };
  match request.send().await {
    | Ok(response) if response.ok() => {
      SaveOutcome::Stored
    }
    | Ok(response) => {
      let status = response.status();
      if let Ok(detail) =
        response.text().await
      {
        tracing::error!(
          status,
          detail = %detail,
          "update_task rejected description"
        );
      }
      SaveOutcome::Rejected { status }
    }
    | Err(error) => network(error.to_string())
  }
}

fn files_of(list: Option<FileList>) -> Vec<File> {
  let Some(list) = list else {
    return Vec::new();
  };
  (0..list.length())
    .filter_map(|idx| list.item(idx))
    .collect()
}

/// Downscales and re-encodes an image file as a JPEG data URL.
async fn compress_image(
  file: &File,
  images: &ImageConfig
) -> Result<String, String> {
  let document = dom::document()
    .ok_or_else(|| "no document".to_string())?;
  let url = Url::create_object_url_with_blob(file)
    .map_err(|e| format!("object url: {e:?}"))?;

  let image = HtmlImageElement::new()
    .map_err(|e| format!("image: {e:?}"))?;
  image.set_src(&url);
  let decoded =
    JsFuture::from(image.decode()).await;
  let _ = Url::revoke_object_url(&url);
  decoded
    .map_err(|e| format!("decode: {e:?}"))?;

  let (width, height) = fit_within(
    image.natural_width(),
    image.natural_height(),
    images.max_dimension
  );

  let canvas = document
    .create_element("canvas")
    .map_err(|e| format!("canvas: {e:?}"))?
    .dyn_into::<HtmlCanvasElement>()
    .map_err(|_| {
      "canvas element has wrong type"
        .to_string()
    })?;
  canvas.set_width(width);
  canvas.set_height(height);
  let context = canvas
    .get_context("2d")
    .map_err(|e| format!("context: {e:?}"))?
    .ok_or_else(|| {
      "2d context unavailable".to_string()
    })?
    .dyn_into::<CanvasRenderingContext2d>()
    .map_err(|_| {
      "2d context has wrong type".to_string()
    })?;
  context
    .draw_image_with_html_image_element_and_dw_and_dh(
      &image,
      0.0,
      0.0,
      f64::from(width),
      f64::from(height)
    )
    .map_err(|e| format!("draw: {e:?}"))?;

  canvas
    .to_data_url_with_type_and_encoder_options(
      JPEG_MIME,
      &JsValue::from_f64(images.jpeg_quality)
    )
    .map_err(|e| format!("encode: {e:?}"))
}

fn attach_image(
  weak: Weak<AutosaveInner>,
  file: File
) {
  wasm_bindgen_futures::spawn_local(
    async move {
      let Some(images) = weak
        .upgrade()
        .map(|inner| inner.images.clone())
      else {
        return;
      };
      tracing::debug!(
        name = %file.name(),
        original_kb = file.size() / 1024.0,
        "compressing image"
      );
      let data_url =
        match compress_image(&file, &images)
          .await
        {
          | Ok(data_url) => data_url,
          | Err(error) => {
            tracing::error!(
              name = %file.name(),
              error = %error,
              "failed to compress image"
            );
            return;
          }
        };
      tracing::debug!(
        compressed_kb =
          data_url_bytes(&data_url) / 1024,
        "image compressed"
      );

      let Some(inner) = weak.upgrade() else {
        return;
      };
      inner
        .editor
        .borrow_mut()
        .insert_embed(Embed::Image { data_url });
      save_now(&inner, SaveTrigger::Attachment);
    }
  );
}

fn attach_pdf(
  inner: &Rc<AutosaveInner>,
  file: &File
) {
  let name = file.name();
  tracing::info!(
    name = %name,
    "pdf dropped; inserting placeholder"
  );
  {
    let mut editor = inner.editor.borrow_mut();
    for embed in pdf_placeholder(&name) {
      editor.insert_embed(embed);
    }
  }
  save_now(inner, SaveTrigger::Attachment);
}

fn install_listeners(
  inner: &Rc<AutosaveInner>
) {
  let root = inner.editor.borrow().quill.root();
  let active =
    EventListenerOptions::enable_prevent_default;
  let capture = EventListenerOptions {
    phase:   EventListenerPhase::Capture,
    passive: false
  };
  let mut listeners = Vec::new();

  let weak = Rc::downgrade(inner);
  listeners.push(EventListener::new(
    &root,
    "blur",
    move |_| {
      if let Some(inner) = weak.upgrade() {
        save_now(&inner, SaveTrigger::Blur);
      }
    }
  ));

  let weak = Rc::downgrade(inner);
  listeners.push(
    EventListener::new_with_options(
      &root,
      "keydown",
      active(),
      move |event| {
        let Some(key) =
          event.dyn_ref::<KeyboardEvent>()
        else {
          return;
        };
        if !is_save_shortcut(
          &key.key(),
          key.ctrl_key(),
          key.meta_key()
        ) {
          return;
        }
        event.prevent_default();
        if let Some(inner) = weak.upgrade() {
          save_now(
            &inner,
            SaveTrigger::Shortcut
          );
        }
      }
    )
  );

  let weak = Rc::downgrade(inner);
  listeners.push(
    EventListener::new_with_options(
      &root,
      "paste",
      active(),
      move |event| {
        let files = event
          .dyn_ref::<ClipboardEvent>()
          .and_then(|paste| {
            paste.clipboard_data()
          })
          .and_then(|data| data.files());
        for file in files_of(files) {
          if DropKind::classify(&file.type_())
            == DropKind::Image
          {
            event.prevent_default();
            attach_image(weak.clone(), file);
          }
        }
      }
    )
  );

  let weak = Rc::downgrade(inner);
  listeners.push(
    EventListener::new_with_options(
      &root,
      "drop",
      capture,
      move |event| {
        event.prevent_default();
        let files = event
          .dyn_ref::<DragEvent>()
          .and_then(|drop| {
            drop.data_transfer()
          })
          .and_then(|data| data.files());
        let Some(file) =
          files_of(files).into_iter().next()
        else {
          return;
        };
        match DropKind::classify(&file.type_())
        {
          | DropKind::Pdf => {
            if let Some(inner) = weak.upgrade()
            {
              attach_pdf(&inner, &file);
            }
          }
          | DropKind::Image => {
            attach_image(weak.clone(), file);
          }
          | DropKind::Other => {
            tracing::debug!(
              mime = %file.type_(),
              "ignoring dropped file"
            );
          }
        }
      }
    )
  );

  listeners.push(
    EventListener::new_with_options(
      &root,
      "dragover",
      active(),
      |event| event.prevent_default()
    )
  );

  inner.listeners.borrow_mut().extend(listeners);
}

/// Rich-text description editor with autosave for one task.
#[wasm_bindgen]
pub struct DescriptionEditor {
  inner: Rc<AutosaveInner>
}

#[wasm_bindgen]
impl DescriptionEditor {
  #[wasm_bindgen(constructor)]
  pub fn new(
    task_id: String
  ) -> Result<DescriptionEditor, String> {
    let cfg = config::client_config();
    let quill = Quill::new(
      &format!("#{}", ids::DESCRIPTION_EDITOR),
      &quill_options()
    )
    .map_err(|e| {
      format!("failed to start editor: {e:?}")
    })?;

    tracing::info!(
      task_id = %task_id,
      debounce_ms = cfg.autosave.debounce_ms,
      "description editor ready"
    );
    let inner = Rc::new(AutosaveInner {
      session:      RefCell::new(
        AutosaveSession::new(
          task_id,
          cfg.autosave.debounce_ms,
          cfg.autosave.status_clear_ms
        )
      ),
      editor:       RefCell::new(QuillEditor {
        quill,
        listeners: Vec::new()
      }),
      idle_timer:   RefCell::default(),
      status_timer: RefCell::default(),
      listeners:    RefCell::default(),
      endpoint:     cfg.autosave.endpoint.clone(),
      images:       cfg.images.clone()
    });

    let weak = Rc::downgrade(&inner);
    inner.editor.borrow_mut().on_change(
      Box::new(move |source| {
        if let Some(inner) = weak.upgrade() {
          on_editor_change(&inner, source);
        }
      })
    );
    install_listeners(&inner);

    Ok(DescriptionEditor { inner })
  }

  /// Saves right away, as Ctrl+S does.
  pub fn save(&self) {
    save_now(&self.inner, SaveTrigger::Shortcut);
  }

  #[wasm_bindgen(getter)]
  pub fn content(&self) -> String {
    self.inner.editor.borrow().content()
  }
}

thread_local! {
  static PAGE_EDITOR: RefCell<
    Option<DescriptionEditor>
  > = const { RefCell::new(None) };
}

/// Starts the page's description editor and keeps it alive for the
/// lifetime of the page.
#[wasm_bindgen(js_name = initDescriptionEditor)]
pub fn init_description_editor(
  task_id: String
) -> Result<(), String> {
  let editor = DescriptionEditor::new(task_id)
    .inspect_err(|error| {
      tracing::error!(
        error = %error,
        "description editor unavailable"
      );
    })?;
  PAGE_EDITOR.with(|slot| {
    slot.borrow_mut().replace(editor);
  });
  Ok(())
}
