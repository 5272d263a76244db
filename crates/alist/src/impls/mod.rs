mod auth;
mod fs;

pub use fs::*;

use std::sync::Arc;

use parking_lot::RwLock;

use super::*;
use crate::config::ClientConfig;

/// Base URL and token, read at request time so a login or a config change
/// applies to the next request without rebuilding the client.
#[derive(Debug, Clone)]
struct Settings {
    server_url: String,
    token: String,
}

#[derive(Debug, Clone)]
pub struct Service {
    settings: Arc<RwLock<Settings>>,
    client: reqwest::Client,
}

impl Service {
    pub fn new() -> Result<Self> {
        Self::from_config(&ClientConfig::default())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            settings: Arc::new(RwLock::new(Settings {
                server_url: config.server_url.clone(),
                token: config.token.clone(),
            })),
            client,
        })
    }

    pub fn server_url(&self) -> String {
        self.settings.read().server_url.clone()
    }

    pub fn set_server_url(&self, server_url: impl Into<String>) -> Result<()> {
        let server_url = server_url.into();
        url::Url::parse(&server_url)?;
        self.settings.write().server_url = server_url;
        Ok(())
    }

    pub fn token(&self) -> String {
        self.settings.read().token.clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.settings.write().token = token.into();
    }

    fn api_url(&self, api: &str) -> String {
        format!("{}{}", self.settings.read().server_url.trim_end_matches('/'), api)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token();
        if token.is_empty() {
            builder
        } else {
            builder.header(reqwest::header::AUTHORIZATION, token)
        }
    }
}

/// `encodeURIComponent`-style encoding for the `File-Path` header.
pub(crate) fn encode_file_path(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
