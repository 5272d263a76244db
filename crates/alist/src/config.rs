//! Client configuration: which AList server to talk to and with what token.
//!
//! Loaded from `$CONFIG_DIR/alist-course/config.toml`, then overridden by
//! `ALIST_SERVER_URL` / `ALIST_TOKEN`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{consts, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_server_url() -> String {
    consts::DEFAULT_SERVER_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    consts::DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("no config directory on this platform".to_owned()))?;
        Ok(dir.join("alist-course").join("config.toml"))
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Missing file means defaults; env overrides are applied either way.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        let mut config = if fs::try_exists(&path).await? {
            Self::load_from_file(&path).await?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.merge_env();
        config.validate()?;
        Ok(config)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, toml::to_string_pretty(self)?).await?;
        Ok(())
    }

    pub fn merge_env(&mut self) {
        if let Ok(url) = std::env::var(consts::ENV_SERVER_URL) {
            self.server_url = url;
        }
        if let Ok(token) = std::env::var(consts::ENV_TOKEN) {
            self.token = token;
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_owned()));
        }
        Ok(())
    }
}
