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

use super::{MapDepth, MapKind, OwnerId};
use crate::math::Color;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_kind() -> MapKind {
    MapKind::Surface
}

/// Everything the configuration layer knows about a map at startup.
///
/// This is the registration tuple `(owner, path, depth, auto_load)` plus a
/// logical name and the sub-kind used for filtered batch operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    /// The owner the map is tracked under.
    pub owner: OwnerId,
    /// The logical name, stable across loads.
    pub name: String,
    /// The storage path, relative to the game-data root.
    pub path: PathBuf,
    /// The channel layout the map is queried with.
    pub depth: MapDepth,
    /// Whether a query against an unloaded map loads it implicitly.
    /// `None` falls back to the `load_on_missing` setting.
    #[serde(default)]
    pub auto_load: Option<bool>,
    /// The sub-kind of the map.
    #[serde(default = "default_kind")]
    pub kind: MapKind,
    /// The attributes a biome map's colours stand for. Empty for other kinds.
    #[serde(default)]
    pub attributes: Vec<MapAttribute>,
}

impl MapDescriptor {
    /// Creates a surface map descriptor with the auto-load setting left to
    /// the global default.
    pub fn new(
        owner: impl Into<OwnerId>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        depth: MapDepth,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            path: path.into(),
            depth,
            auto_load: None,
            kind: MapKind::Surface,
            attributes: Vec::new(),
        }
    }

    /// Creates a biome map descriptor with its attribute table.
    pub fn biome(
        owner: impl Into<OwnerId>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        attributes: Vec<MapAttribute>,
    ) -> Self {
        Self {
            kind: MapKind::Biome,
            attributes,
            ..Self::new(owner, name, path, MapDepth::RGB)
        }
    }

    /// Sets the sub-kind.
    pub fn with_kind(mut self, kind: MapKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the auto-load flag explicitly.
    pub fn with_auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load = Some(auto_load);
        self
    }
}

/// A named region of a biome map and the colour that marks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAttribute {
    /// The attribute name (e.g. a biome name).
    pub name: String,
    /// The colour the attribute is painted with.
    pub color: Color,
}

impl MapAttribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// A list of map descriptors, the serialized form of the startup configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapManifest {
    /// The maps to register, in registration order.
    pub maps: Vec<MapDescriptor>,
}

impl MapManifest {
    /// Parses a manifest from a RON string.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).context("Failed to parse RON map manifest")
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Failed to parse JSON map manifest")
    }

    /// Loads a manifest from a `.ron` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read map manifest '{}'", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron(&content),
            Some("json") => Self::from_json(&content),
            other => bail!("Unsupported manifest extension {:?}", other),
        }
    }
}
