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

//! A streamed map: a pixel store driven by the load/unload state machine.
//!
//! ```text
//! Unloaded --load--> Loading --ok--> Loaded --unload--> Unloaded
//!                       \--err--> Error --reset--> Unloaded
//! ```
//!
//! `Error` is sticky: loads are suppressed and unloads ignored until an
//! explicit [`DemandMap::reset`].

use super::map_so::{MapSO, PixelBytes};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use ondemand_core::{
    AssetState, Color, Color32, HeightAlpha, LoadError, MapAttribute, MapDepth, MapDescriptor,
    MapEvent, MapKind, OnDemandSettings, ScopedLoadTimer, StreamingMetrics, TextureSource,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// The collaborators every map of a registry shares.
#[derive(Clone)]
pub struct MapContext {
    /// Where decoded images come from.
    pub source: Arc<dyn TextureSource>,
    /// Global switches.
    pub settings: Arc<OnDemandSettings>,
    /// Where state transitions are published, if anywhere.
    pub events: Option<flume::Sender<MapEvent>>,
    /// Shared counters.
    pub metrics: Arc<StreamingMetrics>,
}

impl MapContext {
    /// Creates a context without an event sink and with fresh metrics.
    pub fn new(source: Arc<dyn TextureSource>, settings: OnDemandSettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
            events: None,
            metrics: Arc::new(StreamingMetrics::new()),
        }
    }

    /// Sets the event sink.
    pub fn with_events(mut self, events: flume::Sender<MapEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

/// One streamable image resource.
pub struct DemandMap {
    map: MapSO,
    path: PathBuf,
    kind: MapKind,
    auto_load: bool,
    state: AssetState,
    resident: bool,
    attributes: Vec<MapAttribute>,
    ctx: MapContext,
    missing_logged: bool,
    error_logged: bool,
}

impl DemandMap {
    /// Creates an unloaded map from its descriptor.
    ///
    /// A descriptor without an explicit auto-load flag takes the
    /// `load_on_missing` setting.
    pub fn new(descriptor: MapDescriptor, ctx: MapContext) -> Self {
        let auto_load = descriptor
            .auto_load
            .unwrap_or(ctx.settings.load_on_missing);
        Self {
            map: MapSO::new(descriptor.name, descriptor.depth),
            path: descriptor.path,
            kind: descriptor.kind,
            auto_load,
            state: AssetState::Unloaded,
            resident: false,
            attributes: descriptor.attributes,
            ctx,
            missing_logged: false,
            error_logged: false,
        }
    }

    /// The logical map name.
    pub fn name(&self) -> &str {
        self.map.name()
    }

    /// The storage path, relative to the game-data root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The depth kind.
    pub fn depth(&self) -> MapDepth {
        self.map.depth()
    }

    /// The sub-kind.
    pub fn kind(&self) -> MapKind {
        self.kind
    }

    /// The current state.
    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Whether the map currently holds a buffer.
    pub fn is_loaded(&self) -> bool {
        self.state == AssetState::Loaded
    }

    /// Whether queries on an unloaded map load it implicitly.
    pub fn auto_load(&self) -> bool {
        self.auto_load
    }

    /// Changes the auto-load flag.
    pub fn set_auto_load(&mut self, auto_load: bool) {
        self.auto_load = auto_load;
    }

    /// Whether the map is pinned in memory (never batch-disabled or evicted).
    pub fn is_resident(&self) -> bool {
        self.resident
    }

    /// Pins or unpins the map.
    pub fn set_resident(&mut self, resident: bool) {
        self.resident = resident;
    }

    /// The attribute table of a biome map.
    pub fn attributes(&self) -> &[MapAttribute] {
        &self.attributes
    }

    /// The underlying pixel store, without triggering a load.
    pub fn map_so(&self) -> &MapSO {
        &self.map
    }

    /// Bytes currently held.
    pub fn byte_len(&self) -> usize {
        self.map.byte_len()
    }

    fn publish(&self, event: MapEvent) {
        if let Some(events) = &self.ctx.events {
            if events.send(event).is_err() {
                log::trace!("No listener for events of map '{}'", self.name());
            }
        }
    }

    /// Loads the map synchronously.
    ///
    /// Returns `true` if the map transitioned to `Loaded`. Loading a loaded
    /// map is a no-op, and so is loading an errored one (logged once).
    pub fn load(&mut self) -> bool {
        match self.state {
            AssetState::Loaded | AssetState::Loading => false,
            AssetState::Error => {
                self.ctx.metrics.record_suppressed_retry();
                if !self.error_logged {
                    log::warn!(
                        "DemandMap '{}' is in the error state, not retrying (path={})",
                        self.name(),
                        self.path.display()
                    );
                    self.error_logged = true;
                }
                false
            }
            AssetState::Unloaded => self.load_from_source(),
        }
    }

    fn load_from_source(&mut self) -> bool {
        let prior = self.state;
        self.state = AssetState::Loading;
        let result = {
            let _timer = ScopedLoadTimer::new(&self.ctx.metrics);
            self.ctx.source.load(&self.path).and_then(|image| {
                image.validate().map(|()| image).map_err(|source| LoadError::Decode {
                    path: self.path.clone(),
                    source,
                })
            })
        };

        match result {
            Ok(image) => {
                let bytes = self
                    .map
                    .create_map(image, self.ctx.settings.use_manual_memory_management);
                self.state = AssetState::Loaded;
                self.missing_logged = false;
                self.ctx.metrics.record_load(bytes);
                log::info!(
                    "DemandMap '{}' loaded (path={}, prior_state={:?}, {}x{}, {} bytes)",
                    self.name(),
                    self.path.display(),
                    prior,
                    self.map.width(),
                    self.map.height(),
                    bytes
                );
                self.publish(MapEvent::Loaded {
                    name: self.name().to_string(),
                    path: self.path.clone(),
                    width: self.map.width(),
                    height: self.map.height(),
                    bytes,
                });
                true
            }
            Err(e) => {
                self.state = AssetState::Error;
                self.error_logged = true;
                self.ctx.metrics.record_failure();
                log::error!(
                    "DemandMap '{}' failed to load (path={}, prior_state={:?}): {}",
                    self.name(),
                    self.path.display(),
                    prior,
                    e
                );
                self.publish(MapEvent::LoadFailed {
                    name: self.name().to_string(),
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Drops the buffer.
    ///
    /// Returns `true` if the map transitioned to `Unloaded`. Unloading an
    /// unloaded or errored map is a no-op.
    pub fn unload(&mut self) -> bool {
        if self.state != AssetState::Loaded {
            return false;
        }
        let bytes = self.map.clear();
        self.state = AssetState::Unloaded;
        self.missing_logged = false;
        self.ctx.metrics.record_unload(bytes);
        log::info!(
            "DemandMap '{}' unloaded (path={}, prior_state={:?}, {} bytes released)",
            self.name(),
            self.path.display(),
            AssetState::Loaded,
            bytes
        );
        self.publish(MapEvent::Unloaded {
            name: self.name().to_string(),
        });
        true
    }

    /// Leaves the error state so the next load hits the source again.
    ///
    /// Returns `true` if the map was in `Error`.
    pub fn reset(&mut self) -> bool {
        if self.state != AssetState::Error {
            return false;
        }
        self.state = AssetState::Unloaded;
        self.error_logged = false;
        self.missing_logged = false;
        log::info!(
            "DemandMap '{}' reset (path={}, prior_state={:?})",
            self.name(),
            self.path.display(),
            AssetState::Error
        );
        true
    }

    /// Makes sure queries can be answered from memory, loading if allowed.
    ///
    /// Returns whether the map is loaded afterwards.
    pub(super) fn ensure_loaded(&mut self, query: &str) -> bool {
        if self.state == AssetState::Loaded {
            return true;
        }
        if self.auto_load && self.state != AssetState::Error {
            return self.load_from_source();
        }
        if self.ctx.settings.log_on_missing && !self.missing_logged {
            log::warn!(
                "{} on unloaded map '{}' (path={}, state={:?}, auto_load={}), returning the default",
                query,
                self.name(),
                self.path.display(),
                self.state,
                self.auto_load
            );
            self.missing_logged = true;
        }
        false
    }

    /// See [`MapSO::get_pixel_byte`].
    pub fn get_pixel_byte(&mut self, x: i32, y: i32) -> u8 {
        self.ensure_loaded("get_pixel_byte");
        self.map.get_pixel_byte(x, y)
    }

    /// See [`MapSO::get_pixel_float`].
    pub fn get_pixel_float(&mut self, x: i32, y: i32) -> f32 {
        self.ensure_loaded("get_pixel_float");
        self.map.get_pixel_float(x, y)
    }

    /// See [`MapSO::get_pixel_color`].
    pub fn get_pixel_color(&mut self, x: i32, y: i32) -> Color {
        self.ensure_loaded("get_pixel_color");
        self.map.get_pixel_color(x, y)
    }

    /// See [`MapSO::get_pixel_color32`].
    pub fn get_pixel_color32(&mut self, x: i32, y: i32) -> Color32 {
        self.ensure_loaded("get_pixel_color32");
        self.map.get_pixel_color32(x, y)
    }

    /// See [`MapSO::get_pixel_height_alpha`].
    pub fn get_pixel_height_alpha(&mut self, x: i32, y: i32) -> HeightAlpha {
        self.ensure_loaded("get_pixel_height_alpha");
        self.map.get_pixel_height_alpha(x, y)
    }

    /// See [`MapSO::grey_byte`].
    pub fn grey_byte(&mut self, x: i32, y: i32) -> u8 {
        self.ensure_loaded("grey_byte");
        self.map.grey_byte(x, y)
    }

    /// See [`MapSO::grey_float`].
    pub fn grey_float(&mut self, x: i32, y: i32) -> f32 {
        self.ensure_loaded("grey_float");
        self.map.grey_float(x, y)
    }

    /// See [`MapSO::pixel_bytes`].
    pub fn pixel_bytes(&mut self, x: i32, y: i32) -> PixelBytes {
        self.ensure_loaded("pixel_bytes");
        self.map.pixel_bytes(x, y)
    }

    /// See [`MapSO::sample_float`].
    pub fn sample_float(&mut self, u: impl Into<f64>, v: impl Into<f64>) -> f32 {
        self.ensure_loaded("sample_float");
        self.map.sample_float(u, v)
    }

    /// See [`MapSO::sample_color`].
    pub fn sample_color(&mut self, u: impl Into<f64>, v: impl Into<f64>) -> Color {
        self.ensure_loaded("sample_color");
        self.map.sample_color(u, v)
    }

    /// See [`MapSO::sample_color32`].
    pub fn sample_color32(&mut self, u: impl Into<f64>, v: impl Into<f64>) -> Color32 {
        self.ensure_loaded("sample_color32");
        self.map.sample_color32(u, v)
    }

    /// See [`MapSO::sample_height_alpha`].
    pub fn sample_height_alpha(&mut self, u: impl Into<f64>, v: impl Into<f64>) -> HeightAlpha {
        self.ensure_loaded("sample_height_alpha");
        self.map.sample_height_alpha(u, v)
    }

    /// See [`MapSO::sample_grey_float`].
    pub fn sample_grey_float(&mut self, u: impl Into<f64>, v: impl Into<f64>) -> f32 {
        self.ensure_loaded("sample_grey_float");
        self.map.sample_grey_float(u, v)
    }

    /// See [`MapSO::compile_to_texture`].
    pub fn compile_to_texture(&mut self) -> DynamicImage {
        self.ensure_loaded("compile_to_texture");
        self.map.compile_to_texture()
    }

    /// See [`MapSO::compile_greyscale`].
    pub fn compile_greyscale(&mut self) -> GrayImage {
        self.ensure_loaded("compile_greyscale");
        self.map.compile_greyscale()
    }

    /// See [`MapSO::compile_height_alpha`].
    pub fn compile_height_alpha(&mut self) -> GrayAlphaImage {
        self.ensure_loaded("compile_height_alpha");
        self.map.compile_height_alpha()
    }

    /// See [`MapSO::compile_rgb`].
    pub fn compile_rgb(&mut self) -> RgbImage {
        self.ensure_loaded("compile_rgb");
        self.map.compile_rgb()
    }

    /// See [`MapSO::compile_rgba`].
    pub fn compile_rgba(&mut self) -> RgbaImage {
        self.ensure_loaded("compile_rgba");
        self.map.compile_rgba()
    }
}

impl std::fmt::Debug for DemandMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemandMap")
            .field("name", &self.name())
            .field("path", &self.path)
            .field("depth", &self.depth())
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("auto_load", &self.auto_load)
            .field("resident", &self.resident)
            .finish()
    }
}
