pub mod info;
pub mod plan;

use std::path::Path;

use anyhow::{Context, Result};
use funcprep_core::config::ProjectConfig;

pub fn load_project(path: &Path) -> Result<ProjectConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading project file {}", path.display()))?;
    let config: ProjectConfig = toml::from_str(&text)
        .with_context(|| format!("parsing project file {}", path.display()))?;
    Ok(config)
}
