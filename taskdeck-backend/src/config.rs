/// Configuration for the taskdeck backend.
/// Reads config.json from ~/.config/taskdeck/config.json (or platform equivalent).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Directory holding board documents. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    8765
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            data_dir: None,
        }
    }
}

impl BackendConfig {
    /// The resolved board data directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskdeck")
                .join("boards")
        })
    }
}

/// Default config path: ~/.config/taskdeck/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdeck")
        .join("config.json")
}

/// Load config from path. Returns defaults if the file doesn't exist.
pub fn load_config(path: &PathBuf) -> BackendConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config {}: {}", path.display(), e);
            BackendConfig::default()
        }),
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            BackendConfig::default()
        }
    }
}

/// Persist config, creating parent directories as needed.
pub fn save_config(path: &PathBuf, config: &BackendConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)
}
