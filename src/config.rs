//! Runtime settings. Defaults put everything under a dot-directory in the
//! user's home; environment variables (optionally from a `.env` file) override
//! individual paths.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "catalog.sqlite";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "catalog.log";

pub const DB_PATH_ENV: &str = "LIBRARY_CATALOG_DB";
pub const LOG_PATH_ENV: &str = "LIBRARY_CATALOG_LOG_FILE";
pub const LOG_FILTER_ENV: &str = "LIBRARY_CATALOG_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

impl Settings {
    /// Resolve settings from `.env`, the process environment and the home
    /// directory, in that order of precedence (environment wins over `.env`).
    pub fn load() -> Result<Self> {
        load_env_file(None)?;

        let data_dir = BaseDirs::new().map(|dirs| dirs.home_dir().join(DATA_DIR_NAME));

        Self::resolve(
            data_dir.as_deref(),
            env::var_os(DB_PATH_ENV).map(PathBuf::from),
            env::var_os(LOG_PATH_ENV).map(PathBuf::from),
        )
    }

    /// Combine explicit overrides with defaults under `data_dir`. Fails only
    /// when a path has neither an override nor a data directory to default to.
    pub fn resolve(
        data_dir: Option<&Path>,
        database_override: Option<PathBuf>,
        log_override: Option<PathBuf>,
    ) -> Result<Self> {
        let default_in = |file: &str| {
            data_dir
                .map(|dir| dir.join(file))
                .ok_or_else(|| anyhow!("could not locate home directory; set {DB_PATH_ENV}"))
        };

        let database_path = match database_override {
            Some(path) => path,
            None => default_in(DB_FILE_NAME)?,
        };

        // Without a home directory the log goes next to the database.
        let log_path = match log_override {
            Some(path) => path,
            None => match data_dir {
                Some(dir) => dir.join(LOG_FILE_NAME),
                None => database_path.with_extension("log"),
            },
        };

        Ok(Self {
            database_path,
            log_path,
        })
    }
}

/// Load `path`, or the nearest `.env` when `None`, into the process
/// environment. Only a missing file is tolerated.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match loaded {
        Err(err) if err.not_found() => Ok(()),
        other => other.context("failed to read .env file"),
    }
}
