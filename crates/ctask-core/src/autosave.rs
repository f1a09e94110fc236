//! Autosave bookkeeping for the task description editor.
//!
//! The session decides *when* to save and what the status label says;
//! the host owns the actual timers and the HTTP call and reports back
//! through [`AutosaveSession::on_timer`] and [`AutosaveSession::finish`].

use ctask_web_shared::DescriptionUpdate;

use crate::debounce::{
  Debouncer,
  Ticket
};
use crate::editor::ChangeSource;

pub const DEFAULT_DEBOUNCE_MS: u32 =
  2_000;
pub const DEFAULT_STATUS_CLEAR_MS: u32 =
  2_000;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SaveTrigger {
  Idle,
  Blur,
  Shortcut,
  Attachment
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
  pub seq:     u64,
  pub trigger: SaveTrigger,
  pub update:  DescriptionUpdate
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  Stored,
  Rejected { status: u16 },
  Network { message: String }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum StatusTone {
  Muted,
  Success,
  Error
}

impl StatusTone {
  #[must_use]
  pub fn color(self) -> &'static str {
    match self {
      | Self::Muted => "#999",
      | Self::Success => "green",
      | Self::Error => "red"
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SaveStatus {
  Hidden,
  Saving,
  Saved,
  Failed { status: Option<u16> }
}

impl SaveStatus {
  #[must_use]
  pub fn label(self) -> Option<String> {
    match self {
      | Self::Hidden => None,
      | Self::Saving => {
        Some("Saving...".to_string())
      }
      | Self::Saved => {
        Some("Saved".to_string())
      }
      | Self::Failed {
        status: Some(code)
      } => {
        Some(format!("Error saving: {code}"))
      }
      | Self::Failed { status: None } => {
        Some("Error saving".to_string())
      }
    }
  }

  #[must_use]
  pub fn tone(self) -> StatusTone {
    match self {
      | Self::Hidden | Self::Saving => {
        StatusTone::Muted
      }
      | Self::Saved => StatusTone::Success,
      | Self::Failed { .. } => {
        StatusTone::Error
      }
    }
  }
}

#[must_use]
pub fn is_save_shortcut(
  key: &str,
  ctrl: bool,
  meta: bool
) -> bool {
  (ctrl || meta)
    && key.eq_ignore_ascii_case("s")
}

#[derive(Debug, Clone)]
pub struct AutosaveSession {
  task_id:         String,
  debounce:        Debouncer,
  status:          SaveStatus,
  status_clear_ms: u32,
  next_seq:        u64
}

impl AutosaveSession {
  #[must_use]
  pub fn new(
    task_id: impl Into<String>,
    debounce_ms: u32,
    status_clear_ms: u32
  ) -> Self {
    Self {
      task_id: task_id.into(),
      debounce: Debouncer::new(
        debounce_ms
      ),
      status: SaveStatus::Hidden,
      status_clear_ms,
      next_seq: 0
    }
  }

  #[must_use]
  pub fn task_id(&self) -> &str {
    &self.task_id
  }

  #[must_use]
  pub fn status(&self) -> SaveStatus {
    self.status
  }

  #[must_use]
  pub fn debounce_ms(&self) -> u32 {
    self.debounce.delay_ms()
  }

  #[must_use]
  pub fn status_clear_ms(&self) -> u32 {
    self.status_clear_ms
  }

  #[must_use]
  pub fn pending(&self) -> Option<Ticket> {
    self.debounce.pending()
  }

  /// Arms (or re-arms) the idle timer for user edits. The host must
  /// replace its running timer with one for the returned ticket.
  pub fn on_change(
    &mut self,
    source: ChangeSource,
    now_ms: u64
  ) -> Option<Ticket> {
    if source != ChangeSource::User {
      return None;
    }
    Some(self.debounce.arm(now_ms))
  }

  pub fn on_timer(
    &mut self,
    ticket: Ticket,
    content: String
  ) -> Option<SaveRequest> {
    if !self.debounce.fire(ticket) {
      return None;
    }
    Some(
      self
        .save_now(SaveTrigger::Idle, content)
    )
  }

  /// Starts a save right away, dropping any pending idle timer.
  pub fn save_now(
    &mut self,
    trigger: SaveTrigger,
    content: String
  ) -> SaveRequest {
    self.debounce.cancel();
    self.next_seq += 1;
    self.status = SaveStatus::Saving;
    tracing::debug!(
      task_id = %self.task_id,
      seq = self.next_seq,
      ?trigger,
      "saving description"
    );
    SaveRequest {
      seq: self.next_seq,
      trigger,
      update: DescriptionUpdate {
        task_id:     self.task_id.clone(),
        description: content
      }
    }
  }

  /// Records how a save ended. Responses are applied in arrival order,
  /// so the last one to settle decides the label.
  pub fn finish(
    &mut self,
    seq: u64,
    outcome: &SaveOutcome
  ) -> SaveStatus {
    self.status = match outcome {
      | SaveOutcome::Stored => {
        tracing::info!(
          task_id = %self.task_id,
          seq,
          "description saved"
        );
        SaveStatus::Saved
      }
      | SaveOutcome::Rejected { status } => {
        tracing::error!(
          task_id = %self.task_id,
          seq,
          status,
          "failed to save description"
        );
        SaveStatus::Failed {
          status: Some(*status)
        }
      }
      | SaveOutcome::Network { message } => {
        tracing::error!(
          task_id = %self.task_id,
          seq,
          error = %message,
          "error saving description"
        );
        SaveStatus::Failed { status: None }
      }
    };
    self.status
  }

  /// Called when the "Saved" label has been visible long enough.
  /// Returns `true` if the label should be hidden now.
  pub fn expire_saved(&mut self) -> bool {
    if self.status == SaveStatus::Saved {
      self.status = SaveStatus::Hidden;
      true
    } else {
      false
    }
  }
}
