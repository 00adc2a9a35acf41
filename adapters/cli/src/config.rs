//! Loading of level settings from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use lane_defense_core::Settings;

/// Reads, parses and validates the level settings stored at `path`.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level settings at {}", path.display()))?;
    parse_settings(&contents)
        .with_context(|| format!("invalid level settings in {}", path.display()))
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(contents).context("failed to parse level settings toml contents")?;
    settings
        .validate()
        .context("level settings describe an unplayable level")?;
    Ok(settings)
}
