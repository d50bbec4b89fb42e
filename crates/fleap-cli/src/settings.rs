//! Layered configuration: defaults, then an optional TOML file, then
//! `FLEAP_*` environment variables. Command-line flags are applied on top by
//! the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Default location of the SQLite database.
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/fleap/fleap.db";

/// Runtime configuration, deserialised from `fleap.toml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
  pub store_path: PathBuf,
  #[serde(default)]
  pub email:      Option<String>,
  #[serde(default)]
  pub password:   Option<String>,
}

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(file, config::Environment::with_prefix("FLEAP"))
  }

  /// Like [`Settings::load`], reading overrides from `env` instead of the
  /// process environment.
  pub fn load_with_env(file: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)
      .context("failed to set config defaults")?
      .add_source(config::File::from(file).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut loaded: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    loaded.store_path = expand_tilde(&loaded.store_path);
    Ok(loaded)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn env(vars: &[(&str, &str)]) -> config::Environment {
    let map = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect::<HashMap<_, _>>();
    config::Environment::with_prefix("FLEAP").source(Some(map))
  }

  #[test]
  fn absolute_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/tmp/f.db")), PathBuf::from("/tmp/f.db"));
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let settings =
      Settings::load_with_env(Path::new("/nonexistent/fleap.toml"), env(&[])).unwrap();
    assert!(settings.store_path.ends_with(".local/share/fleap/fleap.db"));
    assert!(settings.email.is_none());
  }

  #[test]
  fn environment_overrides_defaults() {
    let settings = Settings::load_with_env(
      Path::new("/nonexistent/fleap.toml"),
      env(&[("FLEAP_STORE_PATH", "/tmp/other.db"), ("FLEAP_EMAIL", "a@b.com")]),
    )
    .unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/other.db"));
    assert_eq!(settings.email.as_deref(), Some("a@b.com"));
  }
}
