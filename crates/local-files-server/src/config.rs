//! Configuration loading and parsing.
//!
//! Defines the optional TOML config schema and resolves defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::save_path::{OsKind, default_save_dir};

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_MAX_UPLOAD_MB: u64 = 200;
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Top-level server configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Bind address (host:port).
    pub bind: Option<String>,
    /// Default save directory; `~` is expanded.
    pub save_dir: Option<String>,
    /// Per-part upload limit in MiB.
    pub max_upload_mb: Option<u64>,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Parse the bind address from config, falling back to loopback.
pub fn bind_from_config(cfg: &ServerConfig) -> Result<SocketAddr> {
    let bind = cfg.bind.as_deref().unwrap_or(DEFAULT_BIND);
    bind.parse().with_context(|| format!("parse bind {bind}"))
}

/// Configured save directory, or the Spotify default for this OS.
pub fn save_dir_from_config(cfg: &ServerConfig) -> Result<PathBuf> {
    if let Some(dir) = cfg.save_dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(shellexpand::tilde(dir).as_ref()));
    }
    let home = dirs::home_dir().context("cannot determine home directory; set save_dir")?;
    Ok(default_save_dir(OsKind::current(), &home))
}

/// Upload size limit in bytes.
pub fn max_upload_bytes_from_config(cfg: &ServerConfig) -> usize {
    let mb = cfg.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB).max(1);
    usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
}

/// CORS origins from config, or the local dev-server defaults.
pub fn cors_origins_from_config(cfg: &ServerConfig) -> Vec<String> {
    match cfg.cors_origins.as_ref() {
        Some(origins) => origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect(),
        None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
    }
}
