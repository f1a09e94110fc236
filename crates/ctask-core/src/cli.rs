use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::calendar::YearMonth;
use crate::due::{DATE_FORMAT, parse_due};

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ctask-due",
    version,
    about = "Preview ctask due-date labels, date shifts and picker calendars"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Client config file (defaults to $CTASK_CLIENT_CONFIG or the user config dir).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    /// Pretend the local time is this instead of the system clock.
    #[arg(long = "now", value_parser = parse_now_arg, global = true)]
    pub now: Option<NaiveDateTime>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the badge label for a stored due value.
    Format { value: String },

    /// Shift a date by months, then days, and print the stored value.
    Shift {
        /// Starting date (YYYY-MM-DD or a stored value); today when omitted.
        date: Option<String>,

        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        days: i64,

        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        months: i32,
    },

    /// Print the picker's month grid.
    Calendar {
        /// Month to show as YYYY-MM; defaults to the selected or current month.
        #[arg(long, value_parser = parse_month_arg)]
        month: Option<YearMonth>,

        #[arg(long, value_parser = parse_date_arg)]
        selected: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Print the default due value a new task gets under a list period.
    Period { name: String },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn parse_now_arg(raw: &str) -> Result<NaiveDateTime, String> {
    parse_due(raw).ok_or_else(|| format!("expected YYYY-MM-DD[ HH:MM[:SS]], got: {raw}"))
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got {raw}: {e}"))
}

fn parse_month_arg(raw: &str) -> Result<YearMonth, String> {
    parse_year_month(raw).map_err(|e| format!("{e:#}"))
}

pub fn parse_year_month(raw: &str) -> anyhow::Result<YearMonth> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow!("expected YYYY-MM, got: {raw}"))?;
    let year: i32 = year.parse().context("invalid year")?;
    let month: u32 = month.parse().context("invalid month")?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("month out of range: {month}"));
    }
    let parsed = YearMonth { year, month };
    parsed
        .first_day()
        .ok_or_else(|| anyhow!("year out of range: {year}"))?;
    Ok(parsed)
}
