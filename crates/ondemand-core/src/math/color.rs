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

//! Defines the colour types returned by pixel queries.

use super::{byte_to_float, float_to_byte, lerp};
use serde::{Deserialize, Serialize};

/// A colour with normalized `f32` components, as returned by float queries.
///
/// Components decoded from 8-bit sources are exactly `byte / 255`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    /// The red component.
    pub r: f32,
    /// The green component.
    pub g: f32,
    /// The blue component.
    pub b: f32,
    /// The alpha component.
    pub a: f32,
}

impl Color {
    /// Opaque black (`[0.0, 0.0, 0.0, 1.0]`), the default for unloaded maps.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Creates a new `Color` with explicit RGBA values.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `Color` (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Linearly interpolates between two colours, `t` clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            r: lerp(a.r, b.r, t),
            g: lerp(a.g, b.g, t),
            b: lerp(a.b, b.b, t),
            a: lerp(a.a, b.a, t),
        }
    }
}

impl From<Color32> for Color {
    #[inline]
    fn from(c: Color32) -> Self {
        Self {
            r: byte_to_float(c.r),
            g: byte_to_float(c.g),
            b: byte_to_float(c.b),
            a: byte_to_float(c.a),
        }
    }
}

/// A colour with 8-bit components, as stored by most map layouts.
///
/// `Default` is all-zero (transparent black), which is the documented
/// fallback of 32-bit colour queries on unloaded maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color32 {
    /// The red component.
    pub r: u8,
    /// The green component.
    pub g: u8,
    /// The blue component.
    pub b: u8,
    /// The alpha component.
    pub a: u8,
}

impl Color32 {
    /// Creates a new `Color32`.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque grey colour with all colour channels set to `v`.
    #[inline]
    pub const fn grey(v: u8) -> Self {
        Self::new(v, v, v, u8::MAX)
    }

    /// Returns the colour as `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linearly interpolates between two colours, truncating like the byte
    /// colour lerp of the engine this cache serves.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t) as u8;
        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: mix(a.a, b.a),
        }
    }
}

impl From<Color> for Color32 {
    #[inline]
    fn from(c: Color) -> Self {
        Self {
            r: float_to_byte(c.r),
            g: float_to_byte(c.g),
            b: float_to_byte(c.b),
            a: float_to_byte(c.a),
        }
    }
}

impl From<[u8; 4]> for Color32 {
    #[inline]
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// A height sample paired with its alpha, both normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightAlpha {
    /// The height component.
    pub height: f32,
    /// The alpha component.
    pub alpha: f32,
}

impl HeightAlpha {
    /// Creates a new `HeightAlpha`.
    #[inline]
    pub const fn new(height: f32, alpha: f32) -> Self {
        Self { height, alpha }
    }

    /// Linearly interpolates both components, `t` clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            height: lerp(a.height, b.height, t),
            alpha: lerp(a.alpha, b.alpha, t),
        }
    }
}
