/// Single-slot debounce timer.
///
/// Arming hands out a [`Ticket`]; re-arming supersedes every earlier
/// ticket, so when several host timers fire only the most recent one is
/// honoured. Times are plain milliseconds from whatever monotonic source
/// the host uses.
#[derive(Debug, Clone)]
pub struct Debouncer {
  delay_ms:   u32,
  generation: u64,
  pending:    Option<Ticket>
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Ticket {
  generation: u64,
  due_at_ms:  u64
}

impl Ticket {
  #[must_use]
  pub fn due_at_ms(&self) -> u64 {
    self.due_at_ms
  }
}

impl Debouncer {
  #[must_use]
  pub fn new(delay_ms: u32) -> Self {
    Self {
      delay_ms,
      generation: 0,
      pending: None
    }
  }

  #[must_use]
  pub fn delay_ms(&self) -> u32 {
    self.delay_ms
  }

  #[must_use]
  pub fn pending(&self) -> Option<Ticket> {
    self.pending
  }

  pub fn arm(
    &mut self,
    now_ms: u64
  ) -> Ticket {
    self.generation =
      self.generation.wrapping_add(1);
    let ticket = Ticket {
      generation: self.generation,
      due_at_ms:  now_ms.saturating_add(
        u64::from(self.delay_ms)
      )
    };
    self.pending = Some(ticket);
    ticket
  }

  pub fn cancel(
    &mut self
  ) -> Option<Ticket> {
    self.pending.take()
  }

  /// Consumes `ticket` if it is still the armed one.
  pub fn fire(
    &mut self,
    ticket: Ticket
  ) -> bool {
    if self.pending == Some(ticket) {
      self.pending = None;
      true
    } else {
      tracing::trace!(
        generation = ticket.generation,
        "stale debounce ticket ignored"
      );
      false
    }
  }
}

/// Holds at most one host timer handle.
///
/// Handles that cancel on drop (such as browser timeout guards) make
/// replacement cancel the previous timer.
#[derive(Debug)]
pub struct TimerSlot<H> {
  handle: Option<H>
}

impl<H> Default for TimerSlot<H> {
  fn default() -> Self {
    Self { handle: None }
  }
}

impl<H> TimerSlot<H> {
  pub fn replace(
    &mut self,
    handle: H
  ) -> Option<H> {
    self.handle.replace(handle)
  }

  pub fn clear(&mut self) -> Option<H> {
    self.handle.take()
  }

  #[must_use]
  pub fn is_armed(&self) -> bool {
    self.handle.is_some()
  }
}
