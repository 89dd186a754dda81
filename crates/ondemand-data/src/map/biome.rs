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

//! Biome attribute lookup on top of a streamed colour map.

use super::demand::DemandMap;
use ondemand_core::{Color, MapAttribute};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Converts latitude and longitude in radians to normalized map coordinates.
///
/// Longitude zero sits a quarter turn into the map and grows right to left;
/// latitude grows bottom to top.
pub fn lat_lon_to_uv(lat: f64, lon: f64) -> (f64, f64) {
    let lon = (lon - FRAC_PI_2).rem_euclid(TAU);
    (1.0 - lon / TAU, lat / PI + 0.5)
}

#[inline]
fn rgb_distance(a: Color, b: Color) -> f32 {
    let (dr, dg, db) = (a.r - b.r, a.g - b.g, a.b - b.b);
    dr * dr + dg * dg + db * db
}

impl DemandMap {
    /// Returns the attribute whose colour is closest to the map's colour at
    /// the given position.
    ///
    /// Longitude wraps; latitude clamps at the poles. An unloaded map that may
    /// not auto-load answers with the first attribute. `None` only when the
    /// map has no attributes.
    pub fn get_att(&mut self, lat: f64, lon: f64) -> Option<&MapAttribute> {
        let (u, v) = lat_lon_to_uv(lat, lon);
        if !self.ensure_loaded("get_att") {
            return self.attributes().first();
        }
        let map = self.map_so();
        let (w, h) = (map.width(), map.height());
        let x = ((u * w as f64) as i64).clamp(0, w as i64 - 1) as i32;
        let y = ((v.clamp(0.0, 1.0) * h as f64) as i64).clamp(0, h as i64 - 1) as i32;
        let color = map.get_pixel_color(x, y);

        self.attributes().iter().min_by(|a, b| {
            rgb_distance(a.color, color).total_cmp(&rgb_distance(b.color, color))
        })
    }
}
