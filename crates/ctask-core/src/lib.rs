pub mod autosave;
pub mod calendar;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod datetime;
pub mod debounce;
pub mod due;
pub mod editor;
pub mod folding;
pub mod media;
pub mod menus;
pub mod period;
pub mod picker;
#[cfg(feature = "cli")]
pub mod render;

#[cfg(feature = "cli")]
use std::ffi::OsString;

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use tracing::{
  debug,
  info
};

#[cfg(feature = "cli")]
use crate::datetime::{
  Clock,
  FixedClock
};

#[cfg(feature = "cli")]
#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting ctask-due"
  );

  let mut cfg =
    config::ClientConfig::discover(
      cli.config.as_deref()
    )?;
  for kv in cli.rc_overrides {
    cfg
      .apply_override(&kv.key, &kv.value)
      .with_context(|| {
        format!(
          "invalid --rc override {}",
          kv.key
        )
      })?;
  }
  debug!(?cfg, "resolved client config");

  let now = match cli.now {
    | Some(fixed) => FixedClock(fixed).now(),
    | None => cfg.clock().now()
  };
  let today = now.date();
  let mut renderer =
    render::Renderer::new();

  match cli.command {
    | cli::Command::Format { value } => {
      renderer.print_line(
        &due::format_due_display(
          &value, now
        )
      )?;
    }
    | cli::Command::Shift {
      date,
      days,
      months
    } => {
      let from = match date.as_deref() {
        | None | Some("") => None,
        | Some(raw) => Some(
          due::parse_due(raw)
            .with_context(|| {
              format!(
                "invalid start date: {raw}"
              )
            })?
            .date()
        )
      };
      let shifted =
        picker::shift_due_date(
          from, days, months, today
        )
        .with_context(|| {
          format!(
            "shifting by {months} months and {days} days leaves the supported date range"
          )
        })?;
      renderer.print_line(
        &due::compose_due_value(
          Some(shifted),
          None
        )
      )?;
    }
    | cli::Command::Calendar {
      month,
      selected,
      json
    } => {
      let mut view =
        calendar::CalendarView::seeded(
          selected, today
        )
        .with_week_start(cfg.week_start());
      if let Some(month) = month {
        view = calendar::CalendarView::new(
          month, selected
        )
        .with_week_start(cfg.week_start());
      }
      let grid = view.render(today);
      if json {
        renderer.print_line(
          &serde_json::to_string_pretty(
            &grid
          )
          .context(
            "failed to encode month grid"
          )?
        )?;
      } else {
        renderer.print_month(&grid)?;
      }
    }
    | cli::Command::Period { name } => {
      if let Some(value) =
        period::default_due_value(
          &name, today
        )
      {
        renderer.print_line(&value)?;
      }
    }
  }

  info!("done");
  Ok(())
}
