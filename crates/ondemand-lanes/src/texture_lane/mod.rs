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

//! Texture loading lanes.

mod decoding;
mod file_lane;
mod loader;

pub use self::decoding::{DdsDecoderLane, GenericDecoderLane, TgaDecoderLane};
pub use self::file_lane::FileLoadingLane;
pub use self::loader::{DecoderRegistry, TextureLoaderLane};

use ondemand_core::{DecodeError, DecodedImage};

/// A strategy turning the bytes of one container format into a
/// [`DecodedImage`].
///
/// This is the CPU-heavy part of streaming. Implementors are pure: the same
/// bytes always produce the same image or the same error, and nothing panics
/// on malformed input.
pub trait ImageDecoderLane: Send + Sync {
    /// A short, stable name used in logs.
    fn strategy_name(&self) -> &'static str;

    /// The lower-case file extensions this decoder handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Decodes the top-level image contained in `bytes`.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}
