mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./discforged.toml", "~/.config/discforged/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file: {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(title) = config.dvd.title {
        if title > MAX_DVD_TITLE {
            anyhow::bail!("DVD title {} is out of range (0..={})", title, MAX_DVD_TITLE);
        }
    }
    if config.dvd.angle > MAX_DVD_ANGLE {
        anyhow::bail!(
            "DVD angle {} is out of range (0..={})",
            config.dvd.angle,
            MAX_DVD_ANGLE
        );
    }

    if let Some(title) = config.bluray.title {
        if title > MAX_BLURAY_TITLE {
            anyhow::bail!(
                "Blu-ray title {} is out of range (0..={})",
                title,
                MAX_BLURAY_TITLE
            );
        }
    }
    if !MIN_TITLE_LENGTH_RANGE.contains(&config.bluray.min_title_length) {
        anyhow::bail!(
            "Blu-ray min_title_length {} is out of range ({}..={})",
            config.bluray.min_title_length,
            MIN_TITLE_LENGTH_RANGE.start(),
            MIN_TITLE_LENGTH_RANGE.end()
        );
    }

    if config.output.time_base_den == 0 {
        anyhow::bail!("Output time_base_den cannot be 0");
    }
    if config.output.buffer_sectors == 0 {
        anyhow::bail!("Output buffer_sectors cannot be 0");
    }

    Ok(())
}
