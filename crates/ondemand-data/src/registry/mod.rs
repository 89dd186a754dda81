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

//! The owner registry: an arena of streamed maps plus the owner index used
//! by batch operations.
//!
//! A map lives in the arena from [`MapRegistry::insert`] until
//! [`MapRegistry::retire`]. Independently, it can be tracked by at most one
//! owner, whose list keeps insertion order.

mod filter;

pub use self::filter::MapFilter;

use crate::map::DemandMap;
use ondemand_core::OwnerId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A stable handle to a map in a [`MapRegistry`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(u32);

impl MapId {
    /// Rebuilds a handle from its raw index. Lookups with a handle the
    /// registry never issued simply miss.
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// The raw index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The explicitly owned registry of every streamed map.
#[derive(Debug, Default)]
pub struct MapRegistry {
    maps: Vec<Option<DemandMap>>,
    owners: BTreeMap<OwnerId, Vec<MapId>>,
    owner_of: HashMap<MapId, OwnerId>,
}

impl MapRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a map and returns its handle. The map is not
    /// tracked by any owner yet.
    pub fn insert(&mut self, map: DemandMap) -> MapId {
        let id = MapId(self.maps.len() as u32);
        log::debug!("Registered map '{}' as {}", map.name(), id);
        self.maps.push(Some(map));
        id
    }

    /// Returns the map behind `id`, if it has not been retired.
    pub fn get(&self, id: MapId) -> Option<&DemandMap> {
        self.maps.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns the map behind `id` mutably, if it has not been retired.
    pub fn get_mut(&mut self, id: MapId) -> Option<&mut DemandMap> {
        self.maps.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Tracks a map under `owner`.
    ///
    /// Re-adding to the same owner is a warned no-op. Adding a map tracked by
    /// another owner, or an unknown map, is logged as an error and ignored.
    /// Returns whether the map was added.
    pub fn add_map(&mut self, owner: &OwnerId, id: MapId) -> bool {
        let Some(map) = self.get(id) else {
            log::error!("Cannot track unknown map {} under '{}'", id, owner);
            return false;
        };
        match self.owner_of.get(&id) {
            Some(current) if current == owner => {
                log::warn!(
                    "Map '{}' is already tracked under '{}', ignoring",
                    map.name(),
                    owner
                );
                false
            }
            Some(current) => {
                log::error!(
                    "Map '{}' is tracked under '{}', refusing to also track it under '{}'",
                    map.name(),
                    current,
                    owner
                );
                false
            }
            None => {
                self.owners.entry(owner.clone()).or_default().push(id);
                self.owner_of.insert(id, owner.clone());
                true
            }
        }
    }

    /// Stops tracking a map under `owner`. An owner left without maps is
    /// dropped. Returns whether the map was removed.
    pub fn remove_map(&mut self, owner: &OwnerId, id: MapId) -> bool {
        let Some(list) = self.owners.get_mut(owner) else {
            log::warn!("Cannot remove map {} from unknown owner '{}'", id, owner);
            return false;
        };
        let Some(pos) = list.iter().position(|m| *m == id) else {
            log::warn!("Map {} is not tracked under '{}'", id, owner);
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.owners.remove(owner);
            log::debug!("Owner '{}' has no maps left, dropped", owner);
        }
        self.owner_of.remove(&id);
        true
    }

    /// Removes a map from its owner and from the arena, handing it back.
    pub fn retire(&mut self, id: MapId) -> Option<DemandMap> {
        if let Some(owner) = self.owner_of.get(&id).cloned() {
            self.remove_map(&owner, id);
        }
        let map = self.maps.get_mut(id.index()).and_then(Option::take);
        if let Some(map) = &map {
            log::debug!("Retired map '{}' ({})", map.name(), id);
        }
        map
    }

    /// The maps tracked under `owner`, in insertion order.
    pub fn maps_of(&self, owner: &OwnerId) -> &[MapId] {
        self.owners.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The owner tracking `id`, if any.
    pub fn owner_of(&self, id: MapId) -> Option<&OwnerId> {
        self.owner_of.get(&id)
    }

    /// Every owner with at least one tracked map, in order.
    pub fn owners(&self) -> impl Iterator<Item = &OwnerId> {
        self.owners.keys()
    }

    /// Every live map with its handle, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (MapId, &DemandMap)> {
        self.maps
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().map(|m| (MapId(i as u32), m)))
    }

    /// Every live map mutably, in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MapId, &mut DemandMap)> {
        self.maps
            .iter_mut()
            .enumerate()
            .filter_map(|(i, m)| m.as_mut().map(|m| (MapId(i as u32), m)))
    }

    /// The number of live maps.
    pub fn len(&self) -> usize {
        self.maps.iter().filter(|m| m.is_some()).count()
    }

    /// Whether no live map remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The maps of `owner` matching `filter`, in list order.
    pub fn select(&self, owner: &OwnerId, filter: MapFilter) -> Vec<MapId> {
        self.maps_of(owner)
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|m| filter.matches(m.kind())))
            .collect()
    }

    /// Loads every map of `owner` matching `filter`, in list order.
    ///
    /// Maps already loaded are skipped and a failing map does not stop the
    /// batch. Returns how many maps were loaded, or `None` for an unknown
    /// owner.
    pub fn enable_owner(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        if !self.owners.contains_key(owner) {
            log::warn!("Cannot enable unknown owner '{}'", owner);
            return None;
        }
        let mut changed = 0;
        for id in self.select(owner, filter) {
            if let Some(map) = self.get_mut(id) {
                if map.load() {
                    changed += 1;
                }
            }
        }
        log::debug!("Enabled owner '{}' ({:?}): {} maps loaded", owner, filter, changed);
        Some(changed)
    }

    /// Unloads every map of `owner` matching `filter`, in list order.
    ///
    /// Resident maps are skipped. Returns how many maps were unloaded, or
    /// `None` for an unknown owner.
    pub fn disable_owner(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        if !self.owners.contains_key(owner) {
            log::warn!("Cannot disable unknown owner '{}'", owner);
            return None;
        }
        let mut changed = 0;
        for id in self.select(owner, filter) {
            if let Some(map) = self.get_mut(id) {
                if !map.is_resident() && map.unload() {
                    changed += 1;
                }
            }
        }
        log::debug!("Disabled owner '{}' ({:?}): {} maps unloaded", owner, filter, changed);
        Some(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, rgba_image, CountingSource};
    use ondemand_core::{AssetState, MapDepth, MapDescriptor, MapKind};
    use std::sync::Arc;

    struct Fixture {
        registry: MapRegistry,
        source: Arc<CountingSource>,
        owner: OwnerId,
    }

    impl Fixture {
        fn new() -> Self {
            let source = Arc::new(
                CountingSource::default()
                    .with("Duna/color.dds", rgba_image())
                    .with("Duna/height.dds", rgba_image())
                    .with("Duna/biomes.png", rgba_image()),
            );
            Self {
                registry: MapRegistry::new(),
                source,
                owner: OwnerId::from("Duna"),
            }
        }

        fn add(&mut self, name: &str, path: &str, kind: MapKind) -> MapId {
            let descriptor =
                MapDescriptor::new(self.owner.clone(), name, path, MapDepth::RGBA).with_kind(kind);
            let id = self
                .registry
                .insert(DemandMap::new(descriptor, context(self.source.clone())));
            assert!(self.registry.add_map(&self.owner.clone(), id));
            id
        }

        fn state(&self, id: MapId) -> AssetState {
            self.registry.get(id).map(DemandMap::state).unwrap_or_default()
        }
    }

    #[test]
    fn double_add_lists_the_map_once() {
        let mut f = Fixture::new();
        let id = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        assert!(!f.registry.add_map(&f.owner.clone(), id));
        assert_eq!(f.registry.maps_of(&f.owner), &[id]);
    }

    #[test]
    fn second_owner_is_refused() {
        let mut f = Fixture::new();
        let id = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        let ike = OwnerId::from("Ike");
        assert!(!f.registry.add_map(&ike, id));
        assert!(f.registry.maps_of(&ike).is_empty());
        assert_eq!(f.registry.owner_of(id), Some(&f.owner));
    }

    #[test]
    fn removing_the_last_map_drops_the_owner() {
        let mut f = Fixture::new();
        let a = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        let b = f.add("DunaHeight", "Duna/height.dds", MapKind::Surface);
        let owner = f.owner.clone();

        assert!(f.registry.remove_map(&owner, a));
        assert!(!f.registry.remove_map(&owner, a));
        assert_eq!(f.registry.maps_of(&owner), &[b]);
        assert!(f.registry.remove_map(&owner, b));
        assert_eq!(f.registry.owners().count(), 0);
        // Untracked maps stay in the arena and can be tracked again.
        assert!(f.registry.get(a).is_some());
        assert!(f.registry.add_map(&OwnerId::from("Ike"), a));
    }

    #[test]
    fn retire_drops_from_owner_and_arena() {
        let mut f = Fixture::new();
        let id = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        assert!(f.registry.retire(id).is_some());
        assert!(f.registry.get(id).is_none());
        assert!(f.registry.is_empty());
        assert!(f.registry.owner_of(id).is_none());
        assert!(f.registry.retire(id).is_none());
        // Handles are never reused.
        let next = f.add("DunaHeight", "Duna/height.dds", MapKind::Surface);
        assert_ne!(next, id);
    }

    #[test]
    fn batch_operations_respect_filters_and_failures() {
        let mut f = Fixture::new();
        let color = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        let broken = f.add("DunaBroken", "Duna/missing.dds", MapKind::Surface);
        let biomes = f.add("DunaBiomes", "Duna/biomes.png", MapKind::Biome);
        let owner = f.owner.clone();

        assert_eq!(f.registry.enable_owner(&owner, MapFilter::Surface), Some(1));
        assert_eq!(f.state(color), AssetState::Loaded);
        assert_eq!(f.state(broken), AssetState::Error);
        assert_eq!(f.state(biomes), AssetState::Unloaded);

        assert_eq!(f.registry.enable_owner(&owner, MapFilter::All), Some(1));
        assert_eq!(f.state(biomes), AssetState::Loaded);

        assert_eq!(f.registry.disable_owner(&owner, MapFilter::Biome), Some(1));
        assert_eq!(f.state(biomes), AssetState::Unloaded);
        assert_eq!(f.state(color), AssetState::Loaded);

        assert_eq!(f.registry.enable_owner(&OwnerId::from("Jool"), MapFilter::All), None);
    }

    #[test]
    fn disable_then_enable_reloads_everything() {
        let mut f = Fixture::new();
        let ids = [
            f.add("DunaColor", "Duna/color.dds", MapKind::Surface),
            f.add("DunaHeight", "Duna/height.dds", MapKind::Surface),
            f.add("DunaBiomes", "Duna/biomes.png", MapKind::Biome),
        ];
        let owner = f.owner.clone();
        f.registry.enable_owner(&owner, MapFilter::All);

        assert_eq!(f.registry.disable_owner(&owner, MapFilter::All), Some(3));
        assert_eq!(f.registry.enable_owner(&owner, MapFilter::All), Some(3));
        for id in ids {
            assert_eq!(f.state(id), AssetState::Loaded);
        }
    }

    #[test]
    fn resident_maps_survive_disable() {
        let mut f = Fixture::new();
        let id = f.add("DunaColor", "Duna/color.dds", MapKind::Surface);
        let owner = f.owner.clone();
        f.registry.enable_owner(&owner, MapFilter::All);
        if let Some(map) = f.registry.get_mut(id) {
            map.set_resident(true);
        }
        assert_eq!(f.registry.disable_owner(&owner, MapFilter::All), Some(0));
        assert_eq!(f.state(id), AssetState::Loaded);
    }
}
