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

//! Provides the primitive types describing a streamable map.
//!
//! This module defines the "common language" for all streaming operations: the
//! depth kind a map is queried with, its sub-kind, its load state, the owner
//! key it is grouped under, and the descriptor the configuration layer hands
//! over at startup. It has no knowledge of how maps are loaded or stored.

mod descriptor;

pub use descriptor::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The channel layout contract a map's queries must honour.
///
/// The discriminant is the number of bytes per pixel of the native layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapDepth {
    /// A single grey channel.
    Greyscale = 1,
    /// A height channel plus an alpha channel.
    HeightAlpha = 2,
    /// Three colour channels.
    #[serde(alias = "Rgb")]
    RGB = 3,
    /// Three colour channels plus alpha.
    #[serde(alias = "Rgba")]
    RGBA = 4,
}

impl MapDepth {
    /// Returns the number of bytes per pixel of the native layout.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self as usize
    }
}

/// The sub-kind of a map, used to filter batch operations so independent
/// subsystems can manage overlapping map sets of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// Height and colour maps feeding the surface mesh builder.
    Surface,
    /// Attribute maps feeding biome lookups.
    Biome,
    /// Textures of the distant, scaled-down representation of a body.
    ScaledSpace,
}

/// The load state of a streamable map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssetState {
    /// No backing buffer. Loading may be attempted.
    #[default]
    Unloaded,
    /// Bytes are being fetched and decoded.
    Loading,
    /// The backing buffer is present and queries are answered from it.
    Loaded,
    /// Loading failed. Sticky until an explicit reset.
    Error,
}

/// The logical grouping key maps are associated with (e.g. a body name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates a new owner key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the owner name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OwnerId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
