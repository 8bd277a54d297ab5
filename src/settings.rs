use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, Source};
use serde::Deserialize;

const ENV_PREFIX: &str = "BRIEF";
const DEFAULT_DB_PATH: &str = "data/briefs.sqlite";
const DEFAULT_CHUNK_SIZE: usize = 500;

/// Runtime settings, read from `BRIEF_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Records structured per parallel batch before each DB write.
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .add_source(source)
            .build()
            .and_then(Config::try_deserialize)
            .context("Failed to read settings")?;
        ensure!(settings.chunk_size > 0, "chunk_size must be at least 1");
        Ok(settings)
    }
}
