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

//! # OnDemand Data
//!
//! Data layouts of the streaming cache.
//!
//! - [`MapSO`]: the typed pixel store, one enum-dispatched buffer per loaded
//!   map, answering every per-pixel query.
//! - [`DemandMap`]: a `MapSO` wrapped in the load/unload state machine,
//!   loading itself on first query when allowed to.
//! - [`MapRegistry`]: the arena of maps plus the owner index used by batch
//!   enable/disable.

#![warn(missing_docs)]

pub mod map;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use map::{BilinearCoords, DemandMap, MapBuffer, MapContext, MapSO, PixelBytes};
pub use registry::{MapFilter, MapId, MapRegistry};
