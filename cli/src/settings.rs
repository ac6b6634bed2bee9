//! Layered configuration loading for the CLI.
//!
//! Sources, later ones winning: `config/default.toml`,
//! `config/<LIBRARY_ENV>.toml`, then `LIBRARY__*` environment variables
//! (`LIBRARY__API__BASE_URL`, `LIBRARY__LOGGING__LEVEL`, ...). A `.env`
//! file is read first so its values count as environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context;
use library_core::AppConfig;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRARY_ENV";
const CONFIG_DIR_ENV: &str = "LIBRARY_CONFIG_DIR";
const ENV_PREFIX: &str = "LIBRARY";

pub fn load() -> anyhow::Result<AppConfig> {
    // A missing `.env` is fine.
    let _ = dotenvy::dotenv();

    let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let config_dir = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir()
            .context("unable to resolve current directory")?
            .join("config"),
    };
    load_from(&config_dir, &environment, true)
}

/// Build the configuration from `config_dir`. `with_env` adds the
/// `LIBRARY__*` environment layer.
pub fn load_from(
    config_dir: &Path,
    environment: &str,
    with_env: bool,
) -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(config_dir.join("default.toml")).required(false))
        .add_source(
            config::File::from(config_dir.join(format!("{environment}.toml"))).required(false),
        );
    if with_env {
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    }

    let settings: AppConfig = builder
        .build()
        .context("failed to build configuration")?
        .try_deserialize()
        .context("failed to deserialize configuration")?;
    tracing::debug!(environment, base_url = %settings.api.base_url, "configuration loaded");
    Ok(settings)
}
