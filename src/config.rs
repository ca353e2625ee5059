use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::layout::SimulationConfig;
use crate::view::ViewportConfig;

/// Tunables read from `--layout-config`. Missing keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub simulation: SimulationConfig,
    pub viewport: ViewportConfig,
}

pub fn load_layout_config(path: &Path) -> Result<LayoutConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid layout config {}", path.display()))?;
    info!(path = %path.display(), "loaded layout config");
    Ok(config)
}
