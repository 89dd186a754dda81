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

//! Decoded, format-tagged pixel buffers produced by the decoding lanes.
//!
//! Rows are stored top-down and tightly packed. Colour accessors take
//! already-wrapped coordinates; wrapping is the pixel store's concern.

use crate::error::DecodeError;
use crate::math::{u16_to_float, Color, Color32};

/// The native layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One luminance byte per pixel.
    Grey8,
    /// One alpha-only byte per pixel.
    Alpha8,
    /// Luminance byte then alpha byte.
    GreyAlpha8,
    /// One 16-bit single-channel sample per pixel.
    R16,
    /// Red, green, blue bytes.
    Rgb8,
    /// Red, green, blue, alpha bytes.
    Rgba8,
}

impl PixelFormat {
    /// Returns the number of bytes one pixel occupies.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Grey8 | PixelFormat::Alpha8 => 1,
            PixelFormat::GreyAlpha8 | PixelFormat::R16 => 2,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// The samples of a decoded image, one variant per [`PixelFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    /// See [`PixelFormat::Grey8`].
    Grey8(Vec<u8>),
    /// See [`PixelFormat::Alpha8`].
    Alpha8(Vec<u8>),
    /// See [`PixelFormat::GreyAlpha8`].
    GreyAlpha8(Vec<u8>),
    /// See [`PixelFormat::R16`].
    R16(Vec<u16>),
    /// See [`PixelFormat::Rgb8`].
    Rgb8(Vec<u8>),
    /// See [`PixelFormat::Rgba8`].
    Rgba8(Vec<u8>),
}

impl PixelData {
    /// Returns the format tag of the samples.
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelData::Grey8(_) => PixelFormat::Grey8,
            PixelData::Alpha8(_) => PixelFormat::Alpha8,
            PixelData::GreyAlpha8(_) => PixelFormat::GreyAlpha8,
            PixelData::R16(_) => PixelFormat::R16,
            PixelData::Rgb8(_) => PixelFormat::Rgb8,
            PixelData::Rgba8(_) => PixelFormat::Rgba8,
        }
    }

    /// Returns the number of samples (not bytes) held.
    fn sample_len(&self) -> usize {
        match self {
            PixelData::Grey8(v)
            | PixelData::Alpha8(v)
            | PixelData::GreyAlpha8(v)
            | PixelData::Rgb8(v)
            | PixelData::Rgba8(v) => v.len(),
            PixelData::R16(v) => v.len(),
        }
    }

    /// Returns the size of the samples in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            PixelData::R16(v) => v.len() * 2,
            other => other.sample_len(),
        }
    }
}

/// A fully decoded image: dimensions plus samples in their native layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// The samples, rows top-down.
    pub data: PixelData,
}

impl DecodedImage {
    /// Creates a decoded image, checking that both dimensions are non-zero
    /// and that the sample count matches them.
    pub fn new(width: u32, height: u32, data: PixelData) -> Result<Self, DecodeError> {
        let image = Self {
            width,
            height,
            data,
        };
        image.validate()?;
        Ok(image)
    }

    /// Checks the invariants [`new`](Self::new) enforces, for images built
    /// from their public fields.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.width == 0 || self.height == 0 {
            return Err(DecodeError::Corrupt(format!(
                "{}x{} image has no pixels",
                self.width, self.height
            )));
        }
        let per_pixel = match self.data.format() {
            PixelFormat::R16 => 1,
            other => other.bytes_per_pixel(),
        };
        let expected = self.width as usize * self.height as usize * per_pixel;
        if self.data.sample_len() != expected {
            return Err(DecodeError::Corrupt(format!(
                "{}x{} {:?} image needs {} samples, got {}",
                self.width,
                self.height,
                self.data.format(),
                expected,
                self.data.sample_len()
            )));
        }
        Ok(())
    }

    /// Returns the native layout of the samples.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.data.format()
    }

    /// Returns the size of the samples in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data.byte_len()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the pixel at `(x, y)` as an 8-bit colour.
    ///
    /// Single-channel formats expand to opaque grey. A 16-bit sample keeps
    /// its high byte.
    pub fn pixel_color32(&self, x: u32, y: u32) -> Color32 {
        let i = self.index(x, y);
        match &self.data {
            PixelData::Grey8(v) | PixelData::Alpha8(v) => Color32::grey(v[i]),
            PixelData::GreyAlpha8(v) => {
                let g = v[i * 2];
                Color32::new(g, g, g, v[i * 2 + 1])
            }
            PixelData::R16(v) => Color32::grey((v[i] >> 8) as u8),
            PixelData::Rgb8(v) => Color32::new(v[i * 3], v[i * 3 + 1], v[i * 3 + 2], u8::MAX),
            PixelData::Rgba8(v) => {
                Color32::new(v[i * 4], v[i * 4 + 1], v[i * 4 + 2], v[i * 4 + 3])
            }
        }
    }

    /// Returns the pixel at `(x, y)` as a float colour.
    ///
    /// Identical to converting [`pixel_color32`](Self::pixel_color32), except
    /// that 16-bit samples keep their full precision (`v / 65535`).
    pub fn pixel_color(&self, x: u32, y: u32) -> Color {
        match &self.data {
            PixelData::R16(v) => {
                let h = u16_to_float(v[self.index(x, y)]);
                Color::rgb(h, h, h)
            }
            _ => self.pixel_color32(x, y).into(),
        }
    }
}
