//! Engine configuration
//!
//! One JSON file with per-section defaults. A missing file means "run
//! with defaults"; a present file only needs the fields it wants to
//! override.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ft_infra::ApiTimeouts;
use serde::{Deserialize, Serialize};

/// Overrides the config file location, mainly for tests and dev shells.
pub const CONFIG_PATH_ENV: &str = "FIELDTRACK_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_geocoder_base_url")]
    pub geocoder_base_url: String,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_geocoder_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            geocoder_base_url: default_geocoder_base_url(),
        }
    }
}

/// All request deadlines, in whole seconds. `None` for a create timeout
/// means that request runs unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_nearby_secs")]
    pub nearby_secs: u64,
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,
    #[serde(default = "default_geocode_secs")]
    pub geocode_secs: u64,
    #[serde(default = "default_farmer_create_secs")]
    pub farmer_create_secs: Option<u64>,
    #[serde(default)]
    pub dealer_create_secs: Option<u64>,
}

fn default_nearby_secs() -> u64 {
    3
}

fn default_request_secs() -> u64 {
    10
}

fn default_geocode_secs() -> u64 {
    5
}

fn default_farmer_create_secs() -> Option<u64> {
    Some(10)
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            nearby_secs: default_nearby_secs(),
            request_secs: default_request_secs(),
            geocode_secs: default_geocode_secs(),
            farmer_create_secs: default_farmer_create_secs(),
            dealer_create_secs: None,
        }
    }
}

impl TimeoutConfig {
    pub fn api_timeouts(&self) -> ApiTimeouts {
        ApiTimeouts {
            nearby: Duration::from_secs(self.nearby_secs),
            standard: Duration::from_secs(self.request_secs),
            create_farmer: self.farmer_create_secs.map(Duration::from_secs),
            create_dealer: self.dealer_create_secs.map(Duration::from_secs),
        }
    }

    pub fn geocode(&self) -> Duration {
        Duration::from_secs(self.geocode_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the key-value store file lives. Defaults to the platform
    /// data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine the platform data directory"))?;
        Ok(base.join("fieldtrack"))
    }
}

impl EngineConfig {
    /// Default config file location: the env override when set, the
    /// platform config directory otherwise.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine the platform config directory"))?;
        Ok(base.join("fieldtrack").join("engine.json"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("could not parse config file: {:?}", path)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("could not read config file: {:?}", path))
            }
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create config directory: {:?}", parent))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .with_context(|| format!("could not write config file: {:?}", tmp))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("could not move config file into place: {:?}", path))?;
        Ok(())
    }
}
