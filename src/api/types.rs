use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Layout;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub docs: PathBuf,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn parse_addr(&self) -> anyhow::Result<SocketAddr> {
        use anyhow::Context;
        self.addr()
            .parse()
            .with_context(|| format!("invalid listen address {}", self.addr()))
    }
}

pub struct AppState {
    pub layout: Layout,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(docs: impl Into<PathBuf>) -> SharedState {
        Arc::new(Self {
            layout: Layout::from_docs(docs),
        })
    }
}

/// Body of `POST /api/save`. Unparseable bodies decode as the default.
#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Body of `POST /api/delete`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub path: Option<String>,
}

pub fn parse_body<T: Default + serde::de::DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}
