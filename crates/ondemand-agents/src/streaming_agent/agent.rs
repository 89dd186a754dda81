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

//! The StreamingAgent owns every streamed map and decides when each one holds
//! memory.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ondemand_core::{
    AssetState, EventBus, MapAttribute, MapDescriptor, MapEvent, MapKind, MapManifest,
    OnDemandSettings, OwnerId, StreamingMetrics, TextureSource,
};
use ondemand_data::{DemandMap, MapContext, MapFilter, MapId, MapRegistry};
use ondemand_lanes::TextureLoaderLane;

use super::scheduler::EvictionScheduler;
use super::status::StreamingStatus;

/// The host-facing driver of the streaming cache.
///
/// The host registers maps at startup, signals which owners are relevant as
/// the scene changes, and calls [`tick`](Self::tick) once per frame. Maps
/// that nobody needs are unloaded once their grace period has elapsed,
/// except those of the active owner.
pub struct StreamingAgent {
    registry: MapRegistry,
    scheduler: EvictionScheduler,
    ctx: MapContext,
    events: EventBus<MapEvent>,
    needed: HashSet<MapId>,
    active_owner: Option<OwnerId>,
    now: Duration,
    initialized: bool,
}

impl StreamingAgent {
    /// Creates an agent reading images from `source`.
    pub fn new(settings: OnDemandSettings, source: Arc<dyn TextureSource>) -> Self {
        let events = EventBus::new();
        let ctx = MapContext::new(source, settings).with_events(events.sender());
        let scheduler = EvictionScheduler::new(ctx.settings.unload_delay());
        Self {
            registry: MapRegistry::new(),
            scheduler,
            ctx,
            events,
            needed: HashSet::new(),
            active_owner: None,
            now: Duration::ZERO,
            initialized: false,
        }
    }

    /// Creates an agent reading files under the settings' game-data root.
    pub fn with_loader(settings: OnDemandSettings) -> Self {
        let loader = TextureLoaderLane::from_settings(&settings);
        Self::new(settings, Arc::new(loader))
    }

    /// Creates a file-backed agent from a `.ron` or `.json` settings file.
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = OnDemandSettings::from_file(path)
            .with_context(|| format!("Failed to configure streaming from '{}'", path.display()))?;
        Ok(Self::with_loader(settings))
    }

    /// Validates the settings and announces the configuration. Calling it
    /// again is a no-op.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        let settings = &self.ctx.settings;
        settings.validate().context("Invalid on-demand settings")?;
        log::info!(
            "StreamingAgent: on_demand={} biomes_on_demand={} load_on_missing={} unload_delay={:?} root='{}'",
            settings.use_on_demand,
            settings.use_on_demand_biomes,
            settings.load_on_missing,
            settings.unload_delay(),
            settings.game_data_root.display()
        );
        self.initialized = true;
        Ok(())
    }

    /// Registers a map under its descriptor's owner.
    ///
    /// With on-demand streaming switched off for the map's kind, the map is
    /// loaded right away and pinned: batch disables and evictions skip it.
    pub fn register(&mut self, descriptor: MapDescriptor) -> MapId {
        let settings = &self.ctx.settings;
        let eager = !settings.use_on_demand
            || (descriptor.kind == MapKind::Biome && !settings.use_on_demand_biomes);
        let owner = descriptor.owner.clone();

        let id = self
            .registry
            .insert(DemandMap::new(descriptor, self.ctx.clone()));
        self.registry.add_map(&owner, id);

        if eager {
            if let Some(map) = self.registry.get_mut(id) {
                map.set_resident(true);
                map.load();
                log::debug!("Map '{}' is resident", map.name());
            }
        }
        id
    }

    /// Registers every map of a manifest, in order.
    pub fn register_manifest(&mut self, manifest: MapManifest) -> Vec<MapId> {
        let count = manifest.maps.len();
        let ids: Vec<_> = manifest
            .maps
            .into_iter()
            .map(|descriptor| self.register(descriptor))
            .collect();
        log::info!("StreamingAgent: registered {} maps from manifest", count);
        ids
    }

    /// Reads a manifest file and registers its maps.
    pub fn register_manifest_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<MapId>> {
        let path = path.as_ref();
        let manifest = MapManifest::from_file(path)
            .with_context(|| format!("Failed to register maps from '{}'", path.display()))?;
        Ok(self.register_manifest(manifest))
    }

    /// Unloads a map and drops it from the cache. Returns whether it existed.
    pub fn retire(&mut self, id: MapId) -> bool {
        self.scheduler.mark_needed(id);
        self.needed.remove(&id);
        match self.registry.retire(id) {
            Some(mut map) => {
                map.unload();
                true
            }
            None => {
                log::warn!("Cannot retire unknown map {}", id);
                false
            }
        }
    }

    /// Loads the maps of `owner` matching `filter` now, cancelling their
    /// pending evictions.
    ///
    /// Returns how many maps were loaded, or `None` for an unknown owner.
    pub fn enable_owner(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        for id in self.registry.select(owner, filter) {
            self.scheduler.mark_needed(id);
            self.needed.insert(id);
        }
        self.registry.enable_owner(owner, filter)
    }

    /// Unloads the non-resident maps of `owner` matching `filter` now.
    ///
    /// Returns how many maps were unloaded, or `None` for an unknown owner.
    pub fn disable_owner(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        for id in self.registry.select(owner, filter) {
            self.scheduler.mark_needed(id);
            self.needed.remove(&id);
        }
        self.registry.disable_owner(owner, filter)
    }

    /// Loads the biome maps of `owner`.
    pub fn enable_biome_maps(&mut self, owner: &OwnerId) -> Option<usize> {
        self.enable_owner(owner, MapFilter::Biome)
    }

    /// Unloads the biome maps of `owner`.
    pub fn disable_biome_maps(&mut self, owner: &OwnerId) -> Option<usize> {
        self.disable_owner(owner, MapFilter::Biome)
    }

    /// Signals that `owner` became relevant: pending evictions of its maps
    /// are cancelled and the maps are loaded immediately.
    pub fn owner_needed(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        log::debug!("Owner '{}' needed ({:?})", owner, filter);
        self.enable_owner(owner, filter)
    }

    /// Signals that `owner` is no longer relevant: each of its loaded,
    /// non-resident maps gets an eviction timer, unless one is pending.
    ///
    /// Returns how many timers were armed, or `None` for an unknown owner.
    pub fn owner_not_needed(&mut self, owner: &OwnerId, filter: MapFilter) -> Option<usize> {
        if self.registry.maps_of(owner).is_empty() {
            log::warn!("Unknown owner '{}' reported as not needed", owner);
            return None;
        }
        let mut armed = 0;
        for id in self.registry.select(owner, filter) {
            self.needed.remove(&id);
            let evictable = self
                .registry
                .get(id)
                .is_some_and(|map| map.is_loaded() && !map.is_resident());
            if evictable && self.scheduler.mark_unneeded(id, self.now) {
                armed += 1;
            }
        }
        log::debug!("Owner '{}' not needed ({:?}): {} timers armed", owner, filter, armed);
        Some(armed)
    }

    /// Sets the foreground owner, whose maps are never evicted.
    pub fn set_active_owner(&mut self, owner: Option<OwnerId>) {
        if self.active_owner != owner {
            match &owner {
                Some(o) => log::info!("StreamingAgent: active owner is now '{}'", o),
                None => log::info!("StreamingAgent: no active owner"),
            }
        }
        self.active_owner = owner;
    }

    /// Advances agent time by `dt` and performs every eviction that fell due.
    ///
    /// Loaded maps nobody declared needed (typically loaded implicitly by a
    /// query) get a timer first. Returns how many maps were evicted.
    pub fn tick(&mut self, dt: Duration) -> usize {
        self.now = self.now.saturating_add(dt);
        self.arm_stray_maps();

        let registry = &self.registry;
        let active = self.active_owner.as_ref();
        let due = self.scheduler.take_due(self.now, |id| {
            active.is_some_and(|owner| registry.owner_of(id) == Some(owner))
                || registry.get(id).is_some_and(DemandMap::is_resident)
        });

        let mut evicted = 0;
        for id in due {
            let Some(map) = self.registry.get_mut(id) else {
                continue;
            };
            if map.unload() {
                self.ctx.metrics.record_eviction();
                log::info!("Evicted map '{}' at {:?}", map.name(), self.now);
                evicted += 1;
            }
        }
        if evicted > 0 {
            log::trace!("Tick at {:?}: {} maps evicted", self.now, evicted);
        }
        evicted
    }

    fn arm_stray_maps(&mut self) {
        for (id, map) in self.registry.iter() {
            if map.is_loaded()
                && !map.is_resident()
                && !self.needed.contains(&id)
                && self.scheduler.mark_unneeded(id, self.now)
            {
                log::trace!("Map '{}' is loaded but not needed", map.name());
            }
        }
    }

    /// Unloads every map, resident ones included, and drops every timer.
    /// Returns how many maps were unloaded.
    pub fn shutdown(&mut self) -> usize {
        let mut unloaded = 0;
        for (_, map) in self.registry.iter_mut() {
            if map.unload() {
                unloaded += 1;
            }
        }
        self.scheduler.clear();
        self.needed.clear();
        self.initialized = false;
        log::info!("StreamingAgent: shut down, {} maps unloaded", unloaded);
        unloaded
    }

    /// Summarizes the cache.
    pub fn status(&self) -> StreamingStatus {
        let mut status = StreamingStatus {
            pending_evictions: self.scheduler.pending_count(),
            resident_bytes: self.ctx.metrics.resident_bytes(),
            ..Default::default()
        };
        for (_, map) in self.registry.iter() {
            match map.state() {
                AssetState::Unloaded => status.unloaded += 1,
                AssetState::Loading => status.loading += 1,
                AssetState::Loaded => status.loaded += 1,
                AssetState::Error => status.errored += 1,
            }
            if map.is_resident() {
                status.resident += 1;
            }
        }
        status
    }

    /// Looks up the biome attribute at a position on a biome map.
    pub fn biome_at(&mut self, id: MapId, lat: f64, lon: f64) -> Option<&MapAttribute> {
        self.registry.get_mut(id)?.get_att(lat, lon)
    }

    /// The receiver of map state transitions.
    pub fn events(&self) -> &flume::Receiver<MapEvent> {
        self.events.receiver()
    }

    /// Removes and returns every queued map event.
    pub fn drain_events(&self) -> Vec<MapEvent> {
        self.events.drain()
    }

    /// The shared counters.
    pub fn metrics(&self) -> &StreamingMetrics {
        &self.ctx.metrics
    }

    /// The settings the agent runs with.
    pub fn settings(&self) -> &OnDemandSettings {
        &self.ctx.settings
    }

    /// The current agent time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// The foreground owner, if any.
    pub fn active_owner(&self) -> Option<&OwnerId> {
        self.active_owner.as_ref()
    }

    /// The eviction timers.
    pub fn scheduler(&self) -> &EvictionScheduler {
        &self.scheduler
    }

    /// The map registry.
    pub fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    /// The map registry, mutably.
    pub fn registry_mut(&mut self) -> &mut MapRegistry {
        &mut self.registry
    }

    /// A registered map.
    pub fn map(&self, id: MapId) -> Option<&DemandMap> {
        self.registry.get(id)
    }

    /// A registered map, mutably. Queries go through this.
    pub fn map_mut(&mut self, id: MapId) -> Option<&mut DemandMap> {
        self.registry.get_mut(id)
    }
}
