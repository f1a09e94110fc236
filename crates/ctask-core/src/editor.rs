/// Who caused an editor change. Only user edits schedule an autosave.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ChangeSource {
  User,
  Api,
  Silent
}

impl ChangeSource {
  /// Maps the source string rich-text engines report (`"user"`,
  /// `"api"`, `"silent"`).
  #[must_use]
  pub fn from_key(raw: &str) -> Self {
    match raw {
      | "user" => Self::User,
      | "silent" => Self::Silent,
      | _ => Self::Api
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
  Image { data_url: String },
  Link { text: String, href: String },
  Text(String)
}

pub type ChangeHandler =
  Box<dyn FnMut(ChangeSource)>;

/// The capabilities the description autosave needs from a rich-text
/// editor.
pub trait RichTextEditor {
  /// Current document as HTML.
  fn content(&self) -> String;

  fn set_content(&mut self, html: &str);

  /// Inserts at the caret, or at the end when nothing is selected.
  fn insert_embed(&mut self, embed: Embed);

  fn on_change(
    &mut self,
    handler: ChangeHandler
  );
}

/// Embeds standing in for a dropped PDF: a link placeholder bearing
/// the file name followed by a space.
#[must_use]
pub fn pdf_placeholder(
  file_name: &str
) -> [Embed; 2] {
  [
    Embed::Link {
      text: format!(
        "[Attached PDF: {file_name}]"
      ),
      href: "#".to_string()
    },
    Embed::Text(" ".to_string())
  ]
}
