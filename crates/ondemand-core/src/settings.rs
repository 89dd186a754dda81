// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Global configuration of the streaming cache.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process-wide switches of the on-demand system.
///
/// Every field has a default, so a partial RON or JSON document only needs to
/// name the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnDemandSettings {
    /// Stream maps on demand. When off, every map is loaded at registration
    /// and never evicted.
    pub use_on_demand: bool,
    /// Stream biome maps on demand. When off, biome maps are loaded at
    /// registration and never evicted.
    pub use_on_demand_biomes: bool,
    /// Default auto-load flag for maps whose descriptor does not set one.
    pub load_on_missing: bool,
    /// Log queries answered with a default value because the map was not
    /// loaded.
    pub log_on_missing: bool,
    /// Grace period, in seconds, between "not needed" and the actual unload.
    pub unload_delay_secs: f64,
    /// Store maps as raw native buffers instead of keeping the decoded image.
    pub use_manual_memory_management: bool,
    /// The directory map paths are resolved against.
    pub game_data_root: PathBuf,
}

impl Default for OnDemandSettings {
    fn default() -> Self {
        Self {
            use_on_demand: true,
            use_on_demand_biomes: true,
            load_on_missing: true,
            log_on_missing: true,
            unload_delay_secs: 10.0,
            use_manual_memory_management: true,
            game_data_root: PathBuf::from("GameData"),
        }
    }
}

impl OnDemandSettings {
    /// Parses settings from a RON string.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).context("Failed to parse RON on-demand settings")
    }

    /// Parses settings from a JSON string.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Failed to parse JSON on-demand settings")
    }

    /// Loads settings from a `.ron` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron(&content)?,
            Some("json") => Self::from_json(&content)?,
            other => bail!("Unsupported settings extension {:?}", other),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the numeric fields.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.unload_delay_secs.is_finite() && self.unload_delay_secs >= 0.0,
            "unload_delay_secs must be a finite, non-negative number of seconds (got {})",
            self.unload_delay_secs
        );
        Ok(())
    }

    /// Returns the eviction grace period.
    ///
    /// Invalid values fall back to zero; [`validate`](Self::validate) rejects them first.
    pub fn unload_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.unload_delay_secs).unwrap_or(Duration::ZERO)
    }
}
