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

//! # OnDemand Lanes
//!
//! Stateless data-plane workers of the streaming cache: container decoders
//! (DDS, TGA and everything the `image` crate reads), whole-file reading and
//! the [`TextureLoaderLane`] that glues them together behind the
//! [`TextureSource`](ondemand_core::TextureSource) contract.
//!
//! Lanes never hold per-map state. Deciding *when* to run them is the job of
//! the data layer and the agents.

#![warn(missing_docs)]

pub mod texture_lane;

pub use texture_lane::{
    DdsDecoderLane, DecoderRegistry, FileLoadingLane, GenericDecoderLane, ImageDecoderLane,
    TextureLoaderLane, TgaDecoderLane,
};
