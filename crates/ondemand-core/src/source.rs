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

//! The contract between the streaming data layer and whatever produces pixels.

use crate::error::LoadError;
use crate::pixel::DecodedImage;
use std::path::Path;

/// A producer of decoded images keyed by storage path.
///
/// Implementations are shared between every map of a registry, so they must
/// be `Send + Sync` and must not mutate per-map state.
pub trait TextureSource: Send + Sync {
    /// Reads and decodes the image stored at `path`.
    fn load(&self, path: &Path) -> Result<DecodedImage, LoadError>;
}
