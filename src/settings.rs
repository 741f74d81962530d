use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::classifier::ClassifierConfig;
use crate::engine::EngineConfig;
use crate::exercises::kettlebell::KettlebellConfig;
use crate::exercises::pistol::PistolSquatConfig;

/// Every tunable threshold in one JSON document. Missing keys keep defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerSettings {
    pub engine: EngineConfig,
    pub kettlebell: KettlebellConfig,
    pub pistol: PistolSquatConfig,
    pub classifier: ClassifierConfig,
}

impl AnalyzerSettings {
    /// Read settings from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
