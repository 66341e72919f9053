use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::{BoardError, BoardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub attachment_root: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Honour `X-Forwarded-For` when resolving the client address.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_data_file() -> PathBuf {
    PathBuf::from("opsboard.json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            data_file: default_data_file(),
            storage: StorageBackend::default(),
            jwt_secret: String::new(),
            attachment_root: None,
            log_filter: default_log_filter(),
            trust_forwarded_for: false,
        }
    }
}

impl ServerConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/opsboard/config.toml"))
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs::config_dir().map(|config| config.join("opsboard").join("config.toml"))
        }
    }

    /// Load from an explicit file, which must exist and parse.
    pub fn from_file(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BoardError::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// Load from `explicit` when given, otherwise from the per-user config
    /// location, falling back to defaults when that file is absent.
    pub fn load(explicit: Option<&Path>) -> BoardResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(BoardError::invalid_field(
                "jwt_secret",
                "a signing secret is required to verify bearer tokens",
            ));
        }
        Ok(())
    }
}
