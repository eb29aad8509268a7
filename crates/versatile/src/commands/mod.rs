//! Command implementations for the Versatile CLI
//!
//! Each command module handles the CLI interface and delegates to
//! versatile-core for the actual work.

pub mod list;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use versatile_core::{ConfigFile, Engine, EngineConfig};

/// Build an engine from the optional config file and load `root` into it.
pub fn load_engine(root: &Path, config: Option<&Path>) -> Result<Engine> {
    let mut engine_config = EngineConfig::new();
    if let Some(path) = config {
        let file = ConfigFile::from_path(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        info!("Using config file: {}", path.display());
        engine_config.apply(file);
    }

    let mut engine = Engine::with_config(engine_config);
    let report = engine
        .load_content_tree(root)
        .with_context(|| format!("Failed to load content tree: {}", root.display()))?;

    let failed = report.failures().count();
    if failed > 0 {
        warn!("{failed} file(s) could not be loaded");
    }

    Ok(engine)
}
