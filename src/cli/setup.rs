use crate::core::config::{API_KEY_ENV, AppConfig};
use anyhow::{Context, Result, bail};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example config to the platform config directory.
pub fn setup() -> Result<()> {
    let path = write_default_config(AppConfig::default_config_path()?)?;
    println!("Created configuration at {}", path.display());
    println!("Set provider.api_key there, or export {API_KEY_ENV}.");
    Ok(())
}

/// Writes the example config to `path`, refusing to replace an existing file.
pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("Configuration file already exists at {}", path.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to create config file: {}", path.display()));
        }
    };
    file.write_all(DEFAULT_CONFIG.as_bytes())
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote default configuration");
    Ok(path.to_path_buf())
}
