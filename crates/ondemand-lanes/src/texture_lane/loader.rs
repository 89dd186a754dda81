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

//! The file-backed [`TextureSource`]: resolve, read, dispatch, decode.

use super::{
    DdsDecoderLane, FileLoadingLane, GenericDecoderLane, ImageDecoderLane, TgaDecoderLane,
};
use anyhow::{bail, Result};
use ondemand_core::{DecodedImage, LoadError, OnDemandSettings, TextureSource};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// A registry of decoder lanes keyed by lower-case file extension.
///
/// Extensions without a registered decoder go to the fallback decoder.
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn ImageDecoderLane>>,
    fallback: Arc<dyn ImageDecoderLane>,
}

impl DecoderRegistry {
    /// Creates an empty registry that sends everything to `fallback`.
    pub fn new(fallback: Arc<dyn ImageDecoderLane>) -> Self {
        Self {
            decoders: HashMap::new(),
            fallback,
        }
    }

    /// Registers a decoder for every extension it declares.
    ///
    /// Fails without registering anything if one of them is already taken.
    pub fn register(&mut self, decoder: Arc<dyn ImageDecoderLane>) -> Result<()> {
        for ext in decoder.extensions() {
            if let Some(existing) = self.decoders.get(*ext) {
                bail!(
                    "Extension '{}' is already handled by the {} decoder",
                    ext,
                    existing.strategy_name()
                );
            }
        }
        for ext in decoder.extensions() {
            self.decoders.insert(ext.to_string(), decoder.clone());
        }
        Ok(())
    }

    /// Returns the decoder for `path`, by extension, case-insensitively.
    pub fn decoder_for(&self, path: &Path) -> &dyn ImageDecoderLane {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.decoders.get(&e.to_ascii_lowercase()))
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for DecoderRegistry {
    /// DDS and TGA go to the hand-written decoders, everything else to the
    /// `image` crate.
    fn default() -> Self {
        let mut decoders: HashMap<String, Arc<dyn ImageDecoderLane>> = HashMap::new();
        decoders.insert("dds".into(), Arc::new(DdsDecoderLane));
        decoders.insert("tga".into(), Arc::new(TgaDecoderLane));
        Self {
            decoders,
            fallback: Arc::new(GenericDecoderLane),
        }
    }
}

/// A lane dedicated to loading and decoding texture files from the
/// game-data directory.
pub struct TextureLoaderLane {
    root: PathBuf,
    files: FileLoadingLane,
    decoders: DecoderRegistry,
}

impl TextureLoaderLane {
    /// Creates a loader resolving paths against `root`, with the default
    /// decoders.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_decoders(root, DecoderRegistry::default())
    }

    /// Creates a loader resolving paths against the settings' game-data root.
    pub fn from_settings(settings: &OnDemandSettings) -> Self {
        Self::new(settings.game_data_root.clone())
    }

    /// Creates a loader with a custom decoder registry.
    pub fn with_decoders(root: impl Into<PathBuf>, decoders: DecoderRegistry) -> Self {
        Self {
            root: root.into(),
            files: FileLoadingLane,
            decoders,
        }
    }

    /// Returns the directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl TextureSource for TextureLoaderLane {
    fn load(&self, path: &Path) -> Result<DecodedImage, LoadError> {
        let resolved = self.resolve(path);
        let bytes = self.files.read_all(&resolved)?;
        let decoder = self.decoders.decoder_for(&resolved);
        log::trace!(
            "Decoding '{}' ({} bytes) with the {} decoder",
            resolved.display(),
            bytes.len(),
            decoder.strategy_name()
        );
        decoder.decode(&bytes).map_err(|source| {
            log::error!(
                "{} decoder failed on '{}': {}",
                decoder.strategy_name(),
                resolved.display(),
                source
            );
            LoadError::Decode {
                path: resolved,
                source,
            }
        })
    }
}
