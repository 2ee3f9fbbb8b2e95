//! Writer configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the optional
//! `.irf_config.json` file, `IRF_*` environment variables, and finally
//! `ANTHROPIC_API_KEY` for the key alone.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

pub const CONFIG_FILE: &str = ".irf_config.json";
pub const ENV_PREFIX: &str = "IRF";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
  pub api_key:                String,
  pub model:                  String,
  pub output_dir:             PathBuf,
  pub max_tokens_per_section: u32,
  pub default_format:         String,
  /// Upper bound on one generation call.
  pub timeout_secs:           u64,
  /// Total tries per section, including the first.
  pub max_attempts:           u32,
}

impl Default for WriterConfig {
  fn default() -> Self {
    Self {
      api_key:                String::new(),
      model:                  "claude-sonnet-4-20250514".to_owned(),
      output_dir:             PathBuf::from("output"),
      max_tokens_per_section: 4096,
      default_format:         "markdown".to_owned(),
      timeout_secs:           120,
      max_attempts:           2,
    }
  }
}

impl WriterConfig {
  /// Load from `.irf_config.json` in the working directory and the process
  /// environment.
  pub fn load() -> Result<Self> { Self::load_from(Path::new(CONFIG_FILE)) }

  /// Load using `path` as the config file. A missing file is not an error.
  pub fn load_from(path: &Path) -> Result<Self> {
    let api_key = std::env::var(API_KEY_ENV).ok();
    Self::build(path, config::Environment::with_prefix(ENV_PREFIX), api_key)
  }

  fn build(
    path: &Path,
    environment: config::Environment,
    api_key: Option<String>,
  ) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::Config::try_from(&Self::default())?)
      .add_source(config::File::from(path).required(false))
      .add_source(environment.try_parsing(true))
      .set_override_option("api_key", api_key.filter(|k| !k.is_empty()))?
      .build()?;

    Ok(settings.try_deserialize()?)
  }

  /// `(key, value)` pairs safe to display: any setting whose name contains
  /// `key` is masked when set.
  pub fn redacted(&self) -> Vec<(&'static str, String)> {
    [
      ("api_key", self.api_key.clone()),
      ("model", self.model.clone()),
      ("output_dir", self.output_dir.display().to_string()),
      ("max_tokens_per_section", self.max_tokens_per_section.to_string()),
      ("default_format", self.default_format.clone()),
      ("timeout_secs", self.timeout_secs.to_string()),
      ("max_attempts", self.max_attempts.to_string()),
    ]
    .into_iter()
    .map(|(name, value)| {
      if name.contains("key") && !value.is_empty() {
        (name, "****".to_owned())
      } else {
        (name, value)
      }
    })
    .collect()
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  /// An environment source fed from `vars` instead of the process.
  fn fake_env(vars: &[(&str, &str)]) -> config::Environment {
    let map: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect();
    config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
  }

  #[test]
  fn defaults_apply_without_file_or_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    let config = WriterConfig::build(&path, fake_env(&[]), None).unwrap();
    assert_eq!(config, WriterConfig::default());
  }

  #[test]
  fn file_then_env_then_api_key_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(
      &path,
      r#"{ "api_key": "from-file", "model": "file-model", "max_tokens_per_section": 2048 }"#,
    )
    .unwrap();

    let env = fake_env(&[("IRF_MODEL", "env-model")]);
    let config = WriterConfig::build(&path, env, None).unwrap();
    assert_eq!(config.api_key, "from-file");
    assert_eq!(config.model, "env-model");
    assert_eq!(config.max_tokens_per_section, 2048);
    assert_eq!(config.timeout_secs, 120);

    let config = WriterConfig::build(
      &path,
      fake_env(&[("IRF_TIMEOUT_SECS", "30")]),
      Some("from-env".into()),
    )
    .unwrap();
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.timeout_secs, 30);
  }

  #[test]
  fn empty_api_key_env_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(&path, r#"{ "api_key": "from-file" }"#).unwrap();
    let config = WriterConfig::build(&path, fake_env(&[]), Some(String::new())).unwrap();
    assert_eq!(config.api_key, "from-file");
  }

  #[test]
  fn redaction_masks_keys_only() {
    let config = WriterConfig { api_key: "sk-secret".into(), ..WriterConfig::default() };
    let shown = config.redacted();
    assert_eq!(shown[0], ("api_key", "****".to_owned()));
    assert!(shown.contains(&("model", "claude-sonnet-4-20250514".to_owned())));

    let shown = WriterConfig::default().redacted();
    assert_eq!(shown[0], ("api_key", String::new()));
  }
}
