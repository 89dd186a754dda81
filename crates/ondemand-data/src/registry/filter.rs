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

use ondemand_core::MapKind;

/// Restricts a batch operation to maps of one sub-kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapFilter {
    /// Every map.
    #[default]
    All,
    /// Surface height and colour maps only.
    Surface,
    /// Biome attribute maps only.
    Biome,
    /// Scaled-space textures only.
    ScaledSpace,
}

impl MapFilter {
    /// Whether a map of `kind` passes the filter.
    pub fn matches(self, kind: MapKind) -> bool {
        match self {
            MapFilter::All => true,
            MapFilter::Surface => kind == MapKind::Surface,
            MapFilter::Biome => kind == MapKind::Biome,
            MapFilter::ScaledSpace => kind == MapKind::ScaledSpace,
        }
    }
}

impl From<MapKind> for MapFilter {
    fn from(kind: MapKind) -> Self {
        match kind {
            MapKind::Surface => MapFilter::Surface,
            MapKind::Biome => MapFilter::Biome,
            MapKind::ScaledSpace => MapFilter::ScaledSpace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_match_their_kind() {
        assert!(MapFilter::All.matches(MapKind::Biome));
        assert!(MapFilter::Biome.matches(MapKind::Biome));
        assert!(!MapFilter::Surface.matches(MapKind::ScaledSpace));
        assert_eq!(MapFilter::from(MapKind::ScaledSpace), MapFilter::ScaledSpace);
    }
}
