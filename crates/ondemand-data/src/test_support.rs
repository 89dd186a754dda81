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

//! Fixtures shared by the unit tests of this crate.

use crate::map::MapContext;
use ondemand_core::{DecodedImage, LoadError, OnDemandSettings, PixelData, TextureSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An in-memory source that counts how often it is asked for something.
#[derive(Default)]
pub(crate) struct CountingSource {
    images: HashMap<PathBuf, DecodedImage>,
    calls: AtomicUsize,
}

impl CountingSource {
    pub(crate) fn with(mut self, path: &str, image: DecodedImage) -> Self {
        self.images.insert(PathBuf::from(path), image);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextureSource for CountingSource {
    fn load(&self, path: &Path) -> Result<DecodedImage, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Missing(path.to_path_buf()))
    }
}

/// A 2x2 RGBA image whose bytes count up from zero.
pub(crate) fn rgba_image() -> DecodedImage {
    DecodedImage::new(2, 2, PixelData::Rgba8((0..16).collect())).expect("valid test image")
}

pub(crate) fn context(source: Arc<CountingSource>) -> MapContext {
    let _ = env_logger::builder().is_test(true).try_init();
    MapContext::new(source, OnDemandSettings::default())
}
