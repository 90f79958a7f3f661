use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

const CONFIG_ENV_VAR: &str =
  "TAQVIM_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "TAQVIM_TIMEZONE";
const CONFIG_DIR_NAME: &str = "taqvim";
const CONFIG_FILE_NAME: &str =
  "config.toml";

const DEFAULT_BASE_URL: &str =
  "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TIMEZONE: &str =
  "Asia/Tehran";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum Locale {
  #[default]
  En,
  Fa
}

impl Locale {
  fn parse(raw: &str) -> Option<Self> {
    match raw
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "en" | "english" => Some(Locale::En),
      | "fa" | "persian" | "farsi" => {
        Some(Locale::Fa)
      }
      | _ => None
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub base_url:     String,
  pub timeout_secs: u64,
  /// Raw `Cookie` header: the session and
  /// the `XSRF-TOKEN` cookie.
  pub cookie:       Option<String>
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      base_url:     DEFAULT_BASE_URL
        .to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      cookie:       None
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
  pub timezone: String,
  pub locale:   String
}

impl Default for CalendarSection {
  fn default() -> Self {
    Self {
      timezone: DEFAULT_TIMEZONE
        .to_string(),
      locale:   "en".to_string()
    }
  }
}

#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub server:   ServerConfig,
  pub calendar: CalendarSection,
  #[serde(skip)]
  pub loaded_from: Option<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path =
      resolve_config_path(config_override);

    let mut cfg = match path {
      | Some(path) if path.exists() => {
        info!(config = %path.display(), "loading config");
        let mut cfg = Self::from_file(&path)?;
        cfg.loaded_from = Some(path);
        cfg
      }
      | Some(path) => {
        if config_override.is_some() {
          return Err(anyhow!(
            "config file {} does not \
             exist",
            path.display()
          ));
        }
        warn!(
          config = %path.display(),
          "no config file found; using \
           defaults"
        );
        Self::default()
      }
      | None => {
        warn!(
          "cannot determine config \
           directory; using defaults"
        );
        Self::default()
      }
    };

    if let Ok(raw) =
      std::env::var(TIMEZONE_ENV_VAR)
      && !raw.trim().is_empty()
    {
      debug!(timezone = %raw, "timezone from environment");
      cfg.calendar.timezone =
        raw.trim().to_string();
    }

    cfg.sanitize();
    Ok(cfg)
  }

  pub fn from_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    Self::from_toml(&text).with_context(
      || {
        format!(
          "failed to parse {}",
          path.display()
        )
      }
    )
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg: Config =
      toml::from_str(text)?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Applies `key=value` overrides from the
  /// command line.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      match key.trim() {
        | "server.base_url" => {
          self.server.base_url = value
        }
        | "server.cookie" => {
          self.server.cookie = Some(value)
        }
        | "server.timeout_secs" => {
          self.server.timeout_secs = value
            .trim()
            .parse()
            .with_context(|| {
              format!(
                "invalid \
                 server.timeout_secs: \
                 {value}"
              )
            })?
        }
        | "calendar.timezone" => {
          self.calendar.timezone = value
        }
        | "calendar.locale" => {
          self.calendar.locale = value
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }
    self.sanitize();
    Ok(())
  }

  /// IANA timezone used to decide "today"
  /// and to read timestamp-shaped dates.
  pub fn timezone(&self) -> Tz {
    match self
      .calendar
      .timezone
      .trim()
      .parse::<Tz>()
    {
      | Ok(tz) => tz,
      | Err(err) => {
        tracing::error!(
          timezone = %self.calendar.timezone,
          error = %err,
          "failed to parse timezone id; \
           using default"
        );
        DEFAULT_TIMEZONE
          .parse::<Tz>()
          .unwrap_or(chrono_tz::UTC)
      }
    }
  }

  pub fn locale(&self) -> Locale {
    Locale::parse(&self.calendar.locale)
      .unwrap_or_default()
  }

  fn sanitize(&mut self) {
    if self
      .server
      .base_url
      .trim()
      .is_empty()
    {
      self.server.base_url =
        DEFAULT_BASE_URL.to_string();
    }
    self.server.base_url = self
      .server
      .base_url
      .trim()
      .trim_end_matches('/')
      .to_string();

    if self.server.timeout_secs == 0 {
      self.server.timeout_secs =
        DEFAULT_TIMEOUT_SECS;
    }

    if self
      .server
      .cookie
      .as_deref()
      .is_some_and(|c| c.trim().is_empty())
    {
      self.server.cookie = None;
    }

    if self
      .calendar
      .timezone
      .trim()
      .is_empty()
    {
      self.calendar.timezone =
        DEFAULT_TIMEZONE.to_string();
    }

    if Locale::parse(&self.calendar.locale)
      .is_none()
    {
      warn!(
        locale = %self.calendar.locale,
        "unknown locale; using en"
      );
      self.calendar.locale =
        "en".to_string();
    }
  }
}

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
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    dir
      .join(CONFIG_DIR_NAME)
      .join(CONFIG_FILE_NAME)
  })
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
