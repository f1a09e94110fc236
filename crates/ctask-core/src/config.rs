use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use anyhow::{
  Context,
  anyhow
};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  info,
  warn
};

use crate::autosave::{
  DEFAULT_DEBOUNCE_MS,
  DEFAULT_STATUS_CLEAR_MS
};
use crate::datetime::{
  SystemClock,
  parse_timezone,
  parse_week_start
};
use crate::media::{
  DEFAULT_JPEG_QUALITY,
  DEFAULT_MAX_DIMENSION
};

#[cfg(feature = "cli")]
const CONFIG_ENV_VAR: &str =
  "CTASK_CLIENT_CONFIG";
#[cfg(feature = "cli")]
const CONFIG_FILE_NAME: &str =
  "client.toml";

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
  Default,
)]
#[serde(default)]
pub struct ClientConfig {
  pub picker:   PickerConfig,
  pub autosave: AutosaveConfig,
  pub images:   ImageConfig,
  pub folding:  FoldingConfig
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct PickerConfig {
  pub week_start: String,
  pub timezone:   Option<String>
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct AutosaveConfig {
  pub endpoint:        String,
  pub debounce_ms:     u32,
  pub status_clear_ms: u32
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ImageConfig {
  pub max_dimension: u32,
  pub jpeg_quality:  f64
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct FoldingConfig {
  pub endpoint_prefix: String
}

fn default_week_start() -> String {
  "sunday".to_string()
}

impl Default for PickerConfig {
  fn default() -> Self {
    Self {
      week_start: default_week_start(),
      timezone:   None
    }
  }
}

impl Default for AutosaveConfig {
  fn default() -> Self {
    Self {
      endpoint:        ctask_web_shared::UPDATE_TASK_PATH
        .to_string(),
      debounce_ms:     DEFAULT_DEBOUNCE_MS,
      status_clear_ms:
        DEFAULT_STATUS_CLEAR_MS
    }
  }
}

impl Default for ImageConfig {
  fn default() -> Self {
    Self {
      max_dimension: DEFAULT_MAX_DIMENSION,
      jpeg_quality:  DEFAULT_JPEG_QUALITY
    }
  }
}

impl Default for FoldingConfig {
  fn default() -> Self {
    Self {
      endpoint_prefix:
        ctask_web_shared::TOGGLE_FOLDING_PREFIX
          .to_string()
    }
  }
}

impl ClientConfig {
  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<Self>(raw).context(
        "failed parsing client config"
      )?;
    config.sanitize();
    Ok(config)
  }

  /// Parses embedded configuration, logging and falling back to the
  /// defaults when it is malformed.
  #[must_use]
  pub fn from_toml_or_default(
    raw: &str
  ) -> Self {
    match Self::from_toml_str(raw) {
      | Ok(config) => {
        info!(
          week_start = %config.picker.week_start,
          debounce_ms = config.autosave.debounce_ms,
          "loaded client config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(
          error = %format!("{error:#}"),
          "failed parsing client config; using defaults"
        );
        Self::default()
      }
    }
  }

  #[tracing::instrument]
  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let raw = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let config = Self::from_toml_str(&raw)
      .with_context(|| {
        format!(
          "invalid client config {}",
          path.display()
        )
      })?;
    info!(
      file = %path.display(),
      "loaded client config file"
    );
    Ok(config)
  }

  /// Resolves the config for native tools: explicit path, then
  /// `$CTASK_CLIENT_CONFIG`, then `<config dir>/ctask/client.toml`,
  /// then defaults.
  #[cfg(feature = "cli")]
  pub fn discover(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    match resolve_config_path(
      override_path
    ) {
      | Some(path) => Self::load_file(&path),
      | None => {
        warn!(
          "no client config found; using \
           defaults"
        );
        Ok(Self::default())
      }
    }
  }

  /// Applies a `section.key=value` override.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let value = value.trim();
    match key.trim() {
      | "picker.week_start" => {
        self.picker.week_start =
          value.to_string();
      }
      | "picker.timezone" => {
        self.picker.timezone =
          (!value.is_empty())
            .then(|| value.to_string());
      }
      | "autosave.endpoint" => {
        self.autosave.endpoint =
          value.to_string();
      }
      | "autosave.debounce_ms" => {
        self.autosave.debounce_ms =
          value.parse().with_context(|| {
            format!(
              "invalid debounce_ms: {value}"
            )
          })?;
      }
      | "autosave.status_clear_ms" => {
        self.autosave.status_clear_ms =
          value.parse().with_context(|| {
            format!(
              "invalid status_clear_ms: \
               {value}"
            )
          })?;
      }
      | "images.max_dimension" => {
        self.images.max_dimension =
          value.parse().with_context(|| {
            format!(
              "invalid max_dimension: \
               {value}"
            )
          })?;
      }
      | "images.jpeg_quality" => {
        self.images.jpeg_quality =
          value.parse().with_context(|| {
            format!(
              "invalid jpeg_quality: {value}"
            )
          })?;
      }
      | "folding.endpoint_prefix" => {
        self.folding.endpoint_prefix =
          value.to_string();
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: {other}"
        ));
      }
    }
    self.sanitize();
    Ok(())
  }

  #[must_use]
  pub fn week_start(&self) -> Weekday {
    parse_week_start(
      &self.picker.week_start
    )
    .unwrap_or(Weekday::Sun)
  }

  #[must_use]
  pub fn timezone(&self) -> Option<Tz> {
    self.picker.timezone.as_deref().and_then(
      |raw| {
        parse_timezone(
          raw,
          "client.toml"
        )
      }
    )
  }

  #[must_use]
  pub fn clock(&self) -> SystemClock {
    SystemClock::new(self.timezone())
  }

  fn sanitize(&mut self) {
    if parse_week_start(
      &self.picker.week_start
    )
    .is_none()
    {
      warn!(
        week_start = %self.picker.week_start,
        "unknown week start; using sunday"
      );
      self.picker.week_start =
        default_week_start();
    }

    if let Some(raw) =
      self.picker.timezone.as_deref()
      && raw.trim().parse::<Tz>().is_err()
    {
      warn!(
        timezone = %raw,
        "invalid timezone; using local time"
      );
      self.picker.timezone = None;
    }

    if self.autosave.endpoint.trim().is_empty()
    {
      self.autosave.endpoint =
        AutosaveConfig::default().endpoint;
    }
    if self.autosave.debounce_ms == 0 {
      self.autosave.debounce_ms =
        DEFAULT_DEBOUNCE_MS;
    }
    if self.autosave.status_clear_ms == 0 {
      self.autosave.status_clear_ms =
        DEFAULT_STATUS_CLEAR_MS;
    }

    if self.images.max_dimension == 0 {
      self.images.max_dimension =
        DEFAULT_MAX_DIMENSION;
    }
    if !(self.images.jpeg_quality > 0.0
      && self.images.jpeg_quality <= 1.0)
    {
      warn!(
        quality = self.images.jpeg_quality,
        "jpeg quality out of range; using default"
      );
      self.images.jpeg_quality =
        DEFAULT_JPEG_QUALITY;
    }

    if self
      .folding
      .endpoint_prefix
      .trim()
      .is_empty()
    {
      self.folding.endpoint_prefix =
        FoldingConfig::default()
          .endpoint_prefix;
    }
  }
}

#[cfg(feature = "cli")]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(trimmed));
    }
  }

  let candidate = dirs::config_dir()?
    .join("ctask")
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}
