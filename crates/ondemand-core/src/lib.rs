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

//! # OnDemand Core
//!
//! Foundational crate containing the shared vocabulary of the texture streaming
//! system: depth kinds, load states, colour types, decoded image buffers,
//! settings, events, metrics and the [`TextureSource`] contract that the
//! decoding lanes implement.
//!
//! This crate has no knowledge of how images are decoded or where maps are
//! stored; it only defines the types every other crate agrees on.

#![warn(missing_docs)]

pub mod asset;
pub mod error;
pub mod event;
pub mod pixel;
pub mod math;
pub mod settings;
pub mod source;
pub mod telemetry;

pub use asset::{
    AssetState, MapAttribute, MapDepth, MapDescriptor, MapKind, MapManifest, OwnerId,
};
pub use error::{DecodeError, LoadError};
pub use event::{EventBus, MapEvent};
pub use pixel::{DecodedImage, PixelData, PixelFormat};
pub use math::{Color, Color32, HeightAlpha};
pub use settings::OnDemandSettings;
pub use source::TextureSource;
pub use telemetry::{MetricsSnapshot, ScopedLoadTimer, StreamingMetrics};
