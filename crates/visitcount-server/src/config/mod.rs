//! Service config loader (strict parsing).
//!
//! Lookup order: `VISITCOUNT_CONFIG` if set, else `visitcount.yaml` when it
//! exists, else built-in defaults. `PORT` overrides the listen port last.

pub mod schema;

use std::fs;
use std::path::Path;

use visitcount_core::error::{CounterError, Result};

pub use schema::{
    AllowOrigin, CorsSection, CounterSection, ServerSection, ServiceConfig, StoreBackend,
    StoreSection,
};

pub const CONFIG_ENV: &str = "VISITCOUNT_CONFIG";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_CONFIG_FILE: &str = "visitcount.yaml";

/// Load config from the process environment.
pub fn load() -> Result<ServiceConfig> {
    let config_path = std::env::var(CONFIG_ENV).ok();
    let port = std::env::var(PORT_ENV).ok();
    load_with(
        config_path.as_deref(),
        Path::new(DEFAULT_CONFIG_FILE),
        port.as_deref(),
    )
}

/// Resolve config from explicit inputs: `config_path` (the `VISITCOUNT_CONFIG`
/// value) wins, then `default_file` if it exists, then built-in defaults.
/// `port` (the `PORT` value) is applied last.
pub fn load_with(
    config_path: Option<&str>,
    default_file: &Path,
    port: Option<&str>,
) -> Result<ServiceConfig> {
    let mut cfg = match config_path {
        Some(path) => load_from_file(Path::new(path))?,
        None if default_file.exists() => load_from_file(default_file)?,
        None => ServiceConfig::default(),
    };

    cfg.apply_port_override(port)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path).map_err(|e| {
        CounterError::BadConfig(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| CounterError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
