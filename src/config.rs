//! Server configuration.
//!
//! Layers, later ones winning:
//! 1. built-in defaults,
//! 2. `config.json` in the user's config directory (`<config_dir>/planboard/`),
//! 3. environment variables (`PLANBOARD_HOST`, `PLANBOARD_PORT` or `PORT`,
//!    `PLANBOARD_DATABASE`, `PLANBOARD_CORS_ORIGINS` comma-separated),
//! 4. command-line flags, applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::db::Database;

const APP_NAME: &str = "planboard";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    pub port: u16,
    /// SQLite file holding the plans. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database_path: None,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load file and environment layers.
    /// Falls back to defaults (plus environment) if the file can't be read.
    pub fn load() -> Self {
        let base = match get_config_path().and_then(|path| Self::from_file(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        base.with_env()
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!("Loaded config from {}", path.display());

        Ok(config)
    }

    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("PLANBOARD_HOST") {
            self.host = host;
        }

        let port = lookup("PLANBOARD_PORT").or_else(|| lookup("PORT"));
        if let Some(raw) = port {
            match raw.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid port: {}", raw),
            }
        }

        if let Some(path) = lookup("PLANBOARD_DATABASE") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(origins) = lookup("PLANBOARD_CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.cors_origins = (!origins.is_empty()).then_some(origins);
        }

        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured store (not yet migrated).
    pub fn open_database(&self) -> Result<Database> {
        match &self.database_path {
            Some(path) => Database::open(path.clone()),
            None => Database::open_default(),
        }
    }

    /// Open and migrate the configured store. The server refuses to start
    /// if either step fails.
    pub fn open_store(&self) -> Result<Database> {
        let db = self.open_database().context("Failed to open plan store")?;
        db.migrate().context("Failed to migrate plan store")?;
        Ok(db)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
