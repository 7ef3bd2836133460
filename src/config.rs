// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::service_client::DEFAULT_TIMEOUT_SECS;

pub const CONFIG_FILE: &str = "jobboard.yaml";
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the job directory service
    pub api_url: String,
    /// Identity provider base URL; the directory URL when absent
    #[serde(default)]
    pub identity_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Where the bearer token is kept between runs
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default)]
    pub json_logs: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: ClientConfig,
    #[serde(default)]
    production: Option<ClientConfig>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            identity_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            token_path: None,
            json_logs: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration based on environment, then apply `JOBBOARD_*` overrides
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let path = explicit_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content, &environment)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else if explicit_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBBOARD_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Invalid configuration YAML")?;

        Ok(match (environment, file.production) {
            ("production", Some(production)) => production,
            _ => file.local,
        })
    }

    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("JOBBOARD_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = lookup("JOBBOARD_IDENTITY_URL") {
            self.identity_url = Some(url);
        }
        if let Some(path) = lookup("JOBBOARD_TOKEN_PATH") {
            self.token_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("JOBBOARD_TIMEOUT_SECS") {
            self.timeout_seconds = secs
                .parse()
                .map_err(|_| anyhow::anyhow!("JOBBOARD_TIMEOUT_SECS must be a number of seconds"))?;
        }
        Ok(())
    }

    pub fn identity_url(&self) -> &str {
        self.identity_url.as_deref().unwrap_or(&self.api_url)
    }

    /// Token file location, defaulting to `~/.jobboard/token`
    pub fn token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".jobboard").join("token")
        })
    }
}
