use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};

/// Settings for a single provider, after merging the config file over the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Model used when `--model` is not given.
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Base URL; each provider has its own default.
    pub endpoint: Option<String>,
}

/// Final resolved configuration for reviewbot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    providers: BTreeMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                model: Some("codellama".to_string()),
                ..Default::default()
            },
        );
        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            },
        );
        providers.insert(
            "anthropic".to_string(),
            ProviderConfig {
                model: Some("claude-3-5-sonnet-latest".to_string()),
                ..Default::default()
            },
        );
        Config { providers }
    }
}

impl Config {
    /// Build the final config from the built-in defaults and an optional file.
    ///
    /// File lookup:
    ///   1. `explicit` (`--config` or `REVIEWBOT_CONFIG`), which must exist
    ///   2. `~/.config/reviewbot.toml`, if present
    ///
    /// Fields set in the file win over the defaults, one field at a time.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = Config::default();

        let path = match explicit {
            Some(p) if !p.exists() => {
                return Err(ReviewError::config(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            log::debug!("Loading provider config from {}", path.display());
            cfg.merge(read_file_config(&path)?);
        }

        Ok(cfg)
    }

    fn merge(&mut self, file: FileConfig) {
        for (name, over) in file.providers {
            let entry = self.providers.entry(name).or_default();
            if over.model.is_some() {
                entry.model = over.model;
            }
            if over.api_key.is_some() {
                entry.api_key = over.api_key;
            }
            if over.endpoint.is_some() {
                entry.endpoint = over.endpoint;
            }
        }
    }

    pub fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.providers.get(name).ok_or_else(|| {
            ReviewError::config(format!("provider '{name}' is not configured"))
        })
    }

    /// The API key for `name`, from the config file or else `env_var`.
    pub fn api_key(&self, name: &str, env_var: &str) -> Option<String> {
        self.api_key_or(name, || env::var(env_var).ok())
    }

    fn api_key_or(&self, name: &str, fallback: impl FnOnce() -> Option<String>) -> Option<String> {
        self.providers
            .get(name)
            .and_then(|p| p.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .or_else(|| fallback().filter(|k| !k.trim().is_empty()))
    }
}

/// Return `~/.config/reviewbot.toml`
fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("reviewbot.toml"))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path).map_err(|e| {
        ReviewError::config(format!("failed to read config file {}", path.display())).with_source(e)
    })?;
    parse_by_extension(path, &data)
}

/// Parse `data` as YAML for `.yaml`/`.yml` files and as TOML otherwise.
pub(crate) fn parse_by_extension<T>(path: &Path, data: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(data).map_err(|e| {
            ReviewError::config(format!("invalid YAML in {}", path.display())).with_source(e)
        }),
        _ => toml::from_str(data).map_err(|e| {
            ReviewError::config(format!("invalid TOML in {}", path.display())).with_source(e)
        }),
    }
}
