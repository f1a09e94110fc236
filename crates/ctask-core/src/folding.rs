/// Collapsed/expanded state of a task's children.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FoldState {
  Expanded,
  Folded
}

impl FoldState {
  #[must_use]
  pub fn from_folded(folded: bool) -> Self {
    if folded {
      Self::Folded
    } else {
      Self::Expanded
    }
  }

  #[must_use]
  pub fn toggled(self) -> Self {
    match self {
      | Self::Expanded => Self::Folded,
      | Self::Folded => Self::Expanded
    }
  }

  #[must_use]
  pub fn is_folded(self) -> bool {
    self == Self::Folded
  }

  /// CSS `display` of the children container.
  #[must_use]
  pub fn children_display(
    self
  ) -> &'static str {
    match self {
      | Self::Expanded => "block",
      | Self::Folded => "none"
    }
  }
}

/// Flips an inline `display` between hidden and block.
#[must_use]
pub fn toggled_display(
  current: &str
) -> &'static str {
  if current.trim() == "none" {
    "block"
  } else {
    "none"
  }
}
