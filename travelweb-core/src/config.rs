use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

/// The three data.go.kr services the tools talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiId {
    Tour,
    Weather,
    PhotoAward,
}

impl ApiId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiId::Tour => "tour",
            ApiId::Weather => "weather",
            ApiId::PhotoAward => "photo-award",
        }
    }

    pub const fn all() -> &'static [ApiId] {
        &[ApiId::Tour, ApiId::Weather, ApiId::PhotoAward]
    }
}

impl std::fmt::Display for ApiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ApiId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "tour" => Ok(ApiId::Tour),
            "weather" => Ok(ApiId::Weather),
            "photo-award" | "photo" => Ok(ApiId::PhotoAward),
            _ => Err(anyhow!(
                "Unknown service '{value}'. Supported services: tour, weather, photo-award."
            )),
        }
    }
}

/// Configuration for a single service (e.g., API key override).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_key: String,
}

/// Top-level configuration stored on disk.
///
/// The public data portal issues one key that is valid for every service, so
/// `service_key` is the usual setup; per-service overrides exist for accounts
/// with separately approved subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Shared data.go.kr service key, used by any service without an override.
    pub service_key: Option<String>,

    /// Example TOML:
    /// [services.weather]
    /// service_key = "..."
    pub services: HashMap<String, ServiceConfig>,
}

impl Config {
    /// Returns the key a given service should use, preferring its override.
    pub fn service_key_for(&self, id: ApiId) -> Option<&str> {
        self.services
            .get(id.as_str())
            .map(|cfg| cfg.service_key.as_str())
            .or(self.service_key.as_deref())
    }

    pub fn is_service_configured(&self, id: ApiId) -> bool {
        self.service_key_for(id).is_some()
    }

    /// Set the shared key used by all services without an override.
    pub fn set_shared_key(&mut self, service_key: String) {
        self.service_key = Some(service_key);
    }

    /// Set/replace a per-service key override.
    pub fn upsert_service_key(&mut self, id: ApiId, service_key: String) {
        self.services.insert(id.as_str().to_string(), ServiceConfig { service_key });
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "travelweb", "travelweb-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
