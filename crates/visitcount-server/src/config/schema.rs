use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use visitcount_core::error::{CounterError, Result};
use visitcount_core::{DocumentKey, IncrementMode};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub counter: CounterSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub cors: CorsSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            counter: CounterSection::default(),
            store: StoreSection::default(),
            cors: CorsSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CounterError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.listen_addr()?;
        self.counter.validate()?;
        self.store.validate()?;
        self.cors.validate()?;

        Ok(())
    }

    /// Replace the port of `server.listen` with `port` (the `PORT` env var).
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };
        let port: u16 = raw
            .parse()
            .map_err(|e| CounterError::BadConfig(format!("PORT must be a port number ({raw}): {e}")))?;

        let mut addr = self.server.listen_addr()?;
        addr.set_port(port);
        self.server.listen = addr.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            CounterError::BadConfig(format!(
                "server.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterSection {
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_document")]
    pub document: String,

    #[serde(default)]
    pub mode: IncrementMode,
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            document: default_document(),
            mode: IncrementMode::default(),
        }
    }
}

impl CounterSection {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("counter.collection", &self.collection), ("counter.document", &self.document)] {
            if v.is_empty() {
                return Err(CounterError::BadConfig(format!("{name} must not be empty")));
            }
            if v.contains('/') || v.contains('\\') || v == "." || v == ".." {
                return Err(CounterError::BadConfig(format!(
                    "{name} must be a single path segment: {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.collection.clone(), self.document.clone())
    }
}

fn default_collection() -> String {
    "views".into()
}
fn default_document() -> String {
    "counter".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::File && self.path.as_os_str().is_empty() {
            return Err(CounterError::BadConfig(
                "store.path must not be empty for the file backend".into(),
            ));
        }
        Ok(())
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data")
}

/// `*` for any origin, `mirror` to echo the request `Origin`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub enum AllowOrigin {
    #[default]
    #[serde(rename = "*")]
    Any,
    #[serde(rename = "mirror")]
    Mirror,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsSection {
    #[serde(default)]
    pub allow_origin: AllowOrigin,

    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u32,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            allow_origin: AllowOrigin::default(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl CorsSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_age_secs > 86_400 {
            return Err(CounterError::BadConfig(
                "cors.max_age_secs must be at most 86400".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_age_secs() -> u32 {
    3600
}
