use crate::fetch::FetchOptions;
use crate::registry::DatasetDescriptor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Transport settings for archive fetches (optional `[fetch]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds (0 = none).
    pub timeout_secs: u64,
    /// Abort if the rate stays below this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchOptions::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            timeout_secs: defaults.timeout.as_secs(),
            low_speed_limit_bytes: defaults.low_speed_limit,
            low_speed_time_secs: defaults.low_speed_time.as_secs(),
            max_redirections: defaults.max_redirections,
            user_agent: defaults.user_agent,
        }
    }
}

impl FetchConfig {
    pub fn to_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            max_redirections: self.max_redirections,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Global configuration loaded from `~/.config/datamirror/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Destination root used when `--download_dir` is not given.
    pub download_dir: PathBuf,
    /// Persistent archive cache used when `--cache_dir` is not given.
    /// None = stage each download in a temporary directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extra datasets on top of the built-ins.
    #[serde(default)]
    pub datasets: Vec<DatasetDescriptor>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("data"),
            cache_dir: None,
            fetch: FetchConfig::default(),
            datasets: Vec::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("datamirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MirrorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
