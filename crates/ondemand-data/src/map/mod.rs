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

//! Per-map data: the typed pixel store and the streamed map wrapping it.

mod biome;
mod buffer;
mod demand;
mod map_so;

pub use self::biome::lat_lon_to_uv;
pub use self::buffer::MapBuffer;
pub use self::demand::{DemandMap, MapContext};
pub use self::map_so::{BilinearCoords, MapSO, PixelBytes};
