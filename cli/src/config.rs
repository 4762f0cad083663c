//! CLI Configuration
//!
//! Profiles live in `~/.gbp/config.toml` or `~/.gbp/config.<profile>.toml`.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by `gbp config set|get`
pub const KEYS: &[&str] = &["endpoint", "token", "tenant_id", "default_format"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub tenant_id: Option<String>,
    pub default_format: Option<OutputFormat>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(value),
            "token" => self.token = Some(value),
            "tenant_id" => self.tenant_id = Some(value),
            "default_format" => {
                let format = <OutputFormat as clap::ValueEnum>::from_str(&value, true)
                    .map_err(|e| anyhow::anyhow!("invalid default_format {:?}: {}", value, e))?;
                self.default_format = Some(format);
            }
            _ => anyhow::bail!("Unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Display value of a key; the token is masked
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            "endpoint" => self.endpoint.clone(),
            "token" => self.token.as_deref().map(mask),
            "tenant_id" => self.tenant_id.clone(),
            "default_format" => self
                .default_format
                .map(|f| format!("{:?}", f).to_lowercase()),
            _ => anyhow::bail!("Unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        })
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(Self::path_in(&home, profile))
    }

    fn path_in(home: &Path, profile: Option<&str>) -> PathBuf {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        home.join(".gbp").join(filename)
    }
}

pub fn mask(secret: &str) -> String {
    format!("{}****", secret.chars().take(8).collect::<String>())
}
