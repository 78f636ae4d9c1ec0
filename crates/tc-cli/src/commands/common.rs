//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tc_core::{Config, CoreError};
use tc_db::TripDb;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process exits.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; never shown to the user
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Resolve configuration from `--config`, or `tripcheck.yml` in the project
/// directory, falling back to defaults when neither exists.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => match Config::load_from_dir(Path::new(&global.project_dir)) {
            Ok(config) => config,
            Err(CoreError::ConfigNotFound { path }) => {
                log::debug!("No config at {path}; using defaults");
                Config::default()
            }
            Err(e) => return Err(e).context("Failed to load config"),
        },
    };
    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    Ok(config)
}

/// Open the trip database named by the configuration.
pub(crate) fn open_db(config: &Config) -> Result<TripDb> {
    TripDb::open_configured(&config.database.path)
        .with_context(|| format!("Failed to open database {}", config.database.path))
}

/// Configuration and database for commands that need both.
pub(crate) fn open(global: &GlobalArgs) -> Result<(Config, TripDb)> {
    let config = load_config(global)?;
    let db = open_db(&config)?;
    Ok((config, db))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
