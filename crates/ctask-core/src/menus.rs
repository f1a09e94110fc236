//! Dropdown families and the rules for closing them on outside clicks.

use ctask_web_shared::ids;

/// Answers selector questions about the element that was clicked.
pub trait ClickProbe {
  /// The element itself matches `selector`.
  fn matches(&self, selector: &str) -> bool;

  /// The element or one of its ancestors matches `selector`.
  fn within(&self, selector: &str) -> bool;
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum MenuFamily {
  /// The "hide completed" style dropdowns in list headers.
  Hide,
  /// Per-row three-dot task menus.
  Task,
  Settings
}

/// Where the open menus of a family live in the page.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum MenuScope {
  Class(&'static str),
  Id(&'static str)
}

impl MenuFamily {
  pub const ALL: [MenuFamily; 3] = [
    MenuFamily::Hide,
    MenuFamily::Task,
    MenuFamily::Settings
  ];

  #[must_use]
  pub fn scope(self) -> MenuScope {
    match self {
      | Self::Hide => {
        MenuScope::Class("dropdown-content")
      }
      | Self::Task => {
        MenuScope::Class("menu-dropdown")
      }
      | Self::Settings => {
        MenuScope::Id(ids::SETTINGS_MENU)
      }
    }
  }

  /// Class marking an open menu of this family.
  #[must_use]
  pub fn open_class(self) -> &'static str {
    match self {
      | Self::Hide | Self::Task => "show",
      | Self::Settings => "show-dropdown"
    }
  }

  /// Whether a click on `target` leaves this family's menus open.
  #[must_use]
  pub fn spared_by<P: ClickProbe + ?Sized>(
    self,
    target: &P
  ) -> bool {
    match self {
      | Self::Hide => {
        target.matches(".icon-btn")
      }
      | Self::Task => {
        target.matches(".menu-trigger")
          || target.within(".menu-dropdown")
      }
      | Self::Settings => {
        target.within(".settings-dropdown")
      }
    }
  }
}

/// Families whose open menus a document click should close. Each family
/// is judged on its own.
#[must_use]
pub fn families_to_close<P: ClickProbe + ?Sized>(
  target: &P
) -> Vec<MenuFamily> {
  MenuFamily::ALL
    .into_iter()
    .filter(|family| {
      !family.spared_by(target)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FakeTarget {
    own:       &'static [&'static str],
    ancestors: &'static [&'static str]
  }

  impl ClickProbe for FakeTarget {
    fn matches(&self, selector: &str) -> bool {
      self.own.contains(&selector)
    }

    fn within(&self, selector: &str) -> bool {
      self.matches(selector)
        || self.ancestors.contains(&selector)
    }
  }

  #[test]
  fn plain_click_closes_every_family() {
    let target = FakeTarget {
      own:       &[".task-title"],
      ancestors: &[]
    };
    assert_eq!(
      families_to_close(&target),
      MenuFamily::ALL.to_vec()
    );
  }

  #[test]
  fn icon_button_spares_only_hide_menus() {
    let target = FakeTarget {
      own:       &[".icon-btn"],
      ancestors: &[]
    };
    assert_eq!(
      families_to_close(&target),
      vec![MenuFamily::Task, MenuFamily::Settings]
    );
  }

  #[test]
  fn clicks_inside_menus_spare_their_family() {
    let inside_task_menu = FakeTarget {
      own:       &[".menu-item"],
      ancestors: &[".menu-dropdown"]
    };
    assert_eq!(
      families_to_close(&inside_task_menu),
      vec![MenuFamily::Hide, MenuFamily::Settings]
    );

    let inside_settings = FakeTarget {
      own:       &[],
      ancestors: &[".settings-dropdown"]
    };
    assert_eq!(
      families_to_close(&inside_settings),
      vec![MenuFamily::Hide, MenuFamily::Task]
    );
  }

  #[test]
  fn families_know_their_open_class() {
    assert_eq!(MenuFamily::Task.open_class(), "show");
    assert_eq!(
      MenuFamily::Settings.scope(),
      MenuScope::Id("settings-menu")
    );
  }
}
