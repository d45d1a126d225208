use crate::errors::ConfigError;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// File name the API credentials are looked up under
pub const CONFIG_FILE_NAME: &str = ".zoom_api_config";

/// Static credentials and endpoint for the meeting platform API
#[derive(Deserialize, Clone)]
pub struct ApiConfig {
    pub root_request_url: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
    pub data_type: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("root_request_url", &self.root_request_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("data_type", &self.data_type)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let mut config: ApiConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if !config.root_request_url.ends_with('/') {
            config.root_request_url.push('/');
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &content)
    }

    /// Loads the config from `explicit` when given, otherwise from the first
    /// existing candidate in [`ApiConfig::candidate_paths`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let candidates = Self::candidate_paths();
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(path),
            None => Err(ConfigError::NotFound(
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(proj_dirs) = ProjectDirs::from("us", "zoom-tools", "zoom-deprovisioner") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths
    }
}
