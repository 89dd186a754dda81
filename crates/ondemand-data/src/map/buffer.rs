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

//! The native memory layouts a loaded map can be stored in.

use ondemand_core::{
    math::{byte_to_float, u16_to_float},
    Color, Color32, DecodedImage, MapDepth, PixelData,
};

/// The backing buffer of a loaded map, one variant per layout.
///
/// Raw variants are tightly packed, rows top-down. `Reference` keeps the
/// decoded image as-is and projects every answer onto the depth kind, so
/// both storage modes answer queries identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapBuffer {
    /// 1 byte per pixel: grey.
    Greyscale(Vec<u8>),
    /// 2 bytes per pixel: height, alpha.
    HeightAlpha(Vec<u8>),
    /// One 16-bit sample per pixel, read as height `v / 65535` and alpha
    /// `(v & 0xFF) / 255`.
    HeightAlpha16(Vec<u16>),
    /// 3 bytes per pixel: red, green, blue.
    Rgb(Vec<u8>),
    /// 4 bytes per pixel: red, green, blue, alpha.
    Rgba(Vec<u8>),
    /// The decoded image, unconverted.
    Reference {
        /// The depth kind answers are projected onto.
        depth: MapDepth,
        /// The decoded image.
        image: DecodedImage,
    },
}

/// Builds a packed buffer with `N` bytes per pixel from the image's colours.
fn convert<const N: usize>(image: &DecodedImage, pick: impl Fn(Color32) -> [u8; N]) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.width as usize * image.height as usize * N);
    for y in 0..image.height {
        for x in 0..image.width {
            out.extend_from_slice(&pick(image.pixel_color32(x, y)));
        }
    }
    out
}

/// Reduces a colour to the channels a depth kind stores, exactly as the
/// conversion in [`MapBuffer::adopt`] does.
#[inline]
fn project(depth: MapDepth, c: Color32) -> Color32 {
    match depth {
        MapDepth::Greyscale => Color32::grey(c.r),
        MapDepth::HeightAlpha => Color32::new(c.r, c.r, c.r, c.a),
        MapDepth::RGB => Color32::new(c.r, c.g, c.b, u8::MAX),
        MapDepth::RGBA => c,
    }
}

/// Height `v / 65535`, alpha from the low byte.
#[inline]
fn height_alpha16(s: u16) -> Color {
    let h = u16_to_float(s);
    Color::new(h, h, h, byte_to_float((s & 0xFF) as u8))
}

impl MapBuffer {
    /// Takes ownership of a decoded image, laying it out for `depth`.
    ///
    /// With `manual_memory` off the image is kept as a [`MapBuffer::Reference`].
    /// Otherwise sources that already have the target layout are moved in
    /// without a per-pixel pass, and everything else is converted.
    pub fn adopt(depth: MapDepth, image: DecodedImage, manual_memory: bool) -> Self {
        if !manual_memory {
            return MapBuffer::Reference { depth, image };
        }
        match (depth, image.data) {
            (MapDepth::Greyscale, PixelData::Grey8(v) | PixelData::Alpha8(v)) => {
                MapBuffer::Greyscale(v)
            }
            (MapDepth::HeightAlpha, PixelData::GreyAlpha8(v)) => MapBuffer::HeightAlpha(v),
            (MapDepth::HeightAlpha, PixelData::R16(v)) => MapBuffer::HeightAlpha16(v),
            (MapDepth::RGB, PixelData::Rgb8(v)) => MapBuffer::Rgb(v),
            (MapDepth::RGBA, PixelData::Rgba8(v)) => MapBuffer::Rgba(v),
            (depth, data) => {
                let image = DecodedImage {
                    width: image.width,
                    height: image.height,
                    data,
                };
                match depth {
                    MapDepth::Greyscale => MapBuffer::Greyscale(convert(&image, |c| [c.r])),
                    MapDepth::HeightAlpha => {
                        MapBuffer::HeightAlpha(convert(&image, |c| [c.r, c.a]))
                    }
                    MapDepth::RGB => MapBuffer::Rgb(convert(&image, |c| [c.r, c.g, c.b])),
                    MapDepth::RGBA => MapBuffer::Rgba(convert(&image, |c| c.to_array())),
                }
            }
        }
    }

    /// Returns the number of bytes held.
    pub fn byte_len(&self) -> usize {
        match self {
            MapBuffer::Greyscale(v)
            | MapBuffer::HeightAlpha(v)
            | MapBuffer::Rgb(v)
            | MapBuffer::Rgba(v) => v.len(),
            MapBuffer::HeightAlpha16(v) => v.len() * 2,
            MapBuffer::Reference { image, .. } => image.byte_len(),
        }
    }

    /// Returns the pixel at an in-range position as an 8-bit colour.
    #[inline]
    pub(crate) fn color32(&self, x: u32, y: u32, width: u32) -> Color32 {
        let i = y as usize * width as usize + x as usize;
        match self {
            MapBuffer::Greyscale(v) => Color32::grey(v[i]),
            MapBuffer::HeightAlpha(v) => {
                let h = v[i * 2];
                Color32::new(h, h, h, v[i * 2 + 1])
            }
            MapBuffer::HeightAlpha16(v) => {
                let h = (v[i] >> 8) as u8;
                Color32::new(h, h, h, (v[i] & 0xFF) as u8)
            }
            MapBuffer::Rgb(v) => Color32::new(v[i * 3], v[i * 3 + 1], v[i * 3 + 2], u8::MAX),
            MapBuffer::Rgba(v) => Color32::new(v[i * 4], v[i * 4 + 1], v[i * 4 + 2], v[i * 4 + 3]),
            MapBuffer::Reference { depth, image } => match (depth, &image.data) {
                (MapDepth::HeightAlpha, PixelData::R16(v)) => {
                    let s = v[i];
                    let h = (s >> 8) as u8;
                    Color32::new(h, h, h, (s & 0xFF) as u8)
                }
                _ => project(*depth, image.pixel_color32(x, y)),
            },
        }
    }

    /// Returns the pixel at an in-range position as a float colour.
    ///
    /// 16-bit samples keep their full precision.
    #[inline]
    pub(crate) fn color(&self, x: u32, y: u32, width: u32) -> Color {
        match self {
            MapBuffer::HeightAlpha16(v) => {
                height_alpha16(v[y as usize * width as usize + x as usize])
            }
            MapBuffer::Reference {
                depth: MapDepth::HeightAlpha,
                image:
                    DecodedImage {
                        data: PixelData::R16(v),
                        ..
                    },
            } => height_alpha16(v[y as usize * width as usize + x as usize]),
            other => other.color32(x, y, width).into(),
        }
    }
}
