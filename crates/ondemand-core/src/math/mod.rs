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

//! Colour primitives and the fixed numeric conversions used by pixel queries.

pub mod color;

pub use self::color::{Color, Color32, HeightAlpha};

/// The factor converting a normalized channel to a byte.
pub const FLOAT_TO_BYTE: f32 = 255.0;

/// Converts an 8-bit channel to a float in `[0, 1]`.
///
/// Uses an exact division so values round-trip bit-for-bit.
#[inline]
pub fn byte_to_float(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Converts a 16-bit channel to a float in `[0, 1]` (`v / 65535`).
#[inline]
pub fn u16_to_float(value: u16) -> f32 {
    value as f32 / 65535.0
}

/// Converts a float channel to a byte, clamping to `[0, 1]` and rounding.
#[inline]
pub fn float_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * FLOAT_TO_BYTE).round() as u8
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}
