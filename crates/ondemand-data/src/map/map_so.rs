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

//! The typed pixel store.

use super::buffer::MapBuffer;
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba,
    RgbaImage,
};
use ondemand_core::{
    math::{float_to_byte, lerp},
    Color, Color32, DecodedImage, HeightAlpha, MapDepth, PixelFormat,
};
use std::ops::Deref;

/// The raw bytes of one pixel, `depth` of them, without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelBytes {
    bytes: [u8; 4],
    len: u8,
}

impl PixelBytes {
    fn new(c: Color32, depth: MapDepth) -> Self {
        Self {
            bytes: match depth {
                MapDepth::Greyscale => [c.r, 0, 0, 0],
                MapDepth::HeightAlpha => [c.r, c.a, 0, 0],
                MapDepth::RGB => [c.r, c.g, c.b, 0],
                MapDepth::RGBA => c.to_array(),
            },
            len: depth.bytes_per_pixel() as u8,
        }
    }

    /// Returns `depth` zero bytes.
    pub fn zeroed(depth: MapDepth) -> Self {
        Self {
            bytes: [0; 4],
            len: depth.bytes_per_pixel() as u8,
        }
    }

    /// Returns the bytes as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl Deref for PixelBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// The four texels and weights of a bilinear sample.
///
/// Normalized coordinates wrap into `[0, 1)`. The upper neighbour of the
/// last column (or row) is the first one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearCoords {
    /// Left column.
    pub min_x: i32,
    /// Right column.
    pub max_x: i32,
    /// Top row.
    pub min_y: i32,
    /// Bottom row.
    pub max_y: i32,
    /// Weight of the right column.
    pub mid_x: f32,
    /// Weight of the bottom row.
    pub mid_y: f32,
}

impl BilinearCoords {
    fn axis(t: f64, size: u32) -> (i32, i32, f32) {
        let t = (t - t.floor()).abs();
        let center = t * size as f64;
        let min = center.floor() as i32;
        let mut max = min + 1;
        if max >= size as i32 {
            max = 0;
        }
        (min, max, (center - min as f64) as f32)
    }

    /// Builds wrapping coordinates for a `width` x `height` map.
    pub fn wrapping(u: f64, v: f64, width: u32, height: u32) -> Self {
        let (min_x, max_x, mid_x) = Self::axis(u, width);
        let (min_y, max_y, mid_y) = Self::axis(v, height);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            mid_x,
            mid_y,
        }
    }

    /// Interpolates `f` over the four texels.
    #[inline]
    pub fn blend<T>(&self, f: impl Fn(i32, i32) -> T, lerp: impl Fn(T, T, f32) -> T) -> T {
        let top = lerp(f(self.min_x, self.min_y), f(self.max_x, self.min_y), self.mid_x);
        let bottom = lerp(f(self.min_x, self.max_y), f(self.max_x, self.max_y), self.mid_x);
        lerp(top, bottom, self.mid_y)
    }
}

/// A typed pixel store: a map's depth, its last known size and, while loaded,
/// its backing buffer.
///
/// Integer queries wrap their coordinates toroidally. Every query on an empty
/// store returns the zero-equivalent default (`0`, `0.0`, [`Color::BLACK`],
/// [`Color32::default()`], `HeightAlpha(0, 0)`).
#[derive(Debug, Clone)]
pub struct MapSO {
    name: String,
    depth: MapDepth,
    width: u32,
    height: u32,
    buffer: Option<MapBuffer>,
    source_format: Option<PixelFormat>,
}

impl MapSO {
    /// Creates an empty store.
    pub fn new(name: impl Into<String>, depth: MapDepth) -> Self {
        Self {
            name: name.into(),
            depth,
            width: 0,
            height: 0,
            buffer: None,
            source_format: None,
        }
    }

    /// Fills the store from a decoded image and returns the bytes now held.
    ///
    /// Any previous buffer is dropped first. An image with a zero extent
    /// leaves the store empty.
    pub fn create_map(&mut self, image: DecodedImage, manual_memory: bool) -> usize {
        self.buffer = None;
        self.source_format = None;
        self.width = image.width;
        self.height = image.height;
        if image.width == 0 || image.height == 0 {
            return 0;
        }
        self.source_format = Some(image.format());
        let buffer = MapBuffer::adopt(self.depth, image, manual_memory);
        let bytes = buffer.byte_len();
        self.buffer = Some(buffer);
        bytes
    }

    /// Drops the buffer and returns the bytes released. The size is kept.
    pub fn clear(&mut self) -> usize {
        self.source_format = None;
        self.buffer.take().map_or(0, |b| b.byte_len())
    }

    /// Returns whether a buffer is present.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// The map name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The depth kind queries honour.
    pub fn depth(&self) -> MapDepth {
        self.depth
    }

    /// Width of the current or last loaded buffer.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the current or last loaded buffer.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The backing buffer, if loaded.
    pub fn buffer(&self) -> Option<&MapBuffer> {
        self.buffer.as_ref()
    }

    /// The decoded format the buffer was built from, if loaded.
    pub fn source_format(&self) -> Option<PixelFormat> {
        self.source_format
    }

    /// Bytes held by the buffer.
    pub fn byte_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, MapBuffer::byte_len)
    }

    #[inline]
    fn is_alpha8(&self) -> bool {
        self.source_format == Some(PixelFormat::Alpha8)
    }

    #[inline]
    fn wrap(&self, x: i32, y: i32) -> (u32, u32) {
        (
            (x as i64).rem_euclid(self.width as i64) as u32,
            (y as i64).rem_euclid(self.height as i64) as u32,
        )
    }

    #[inline]
    fn texel32(&self, x: i32, y: i32) -> Option<Color32> {
        let buffer = self.buffer.as_ref()?;
        let (x, y) = self.wrap(x, y);
        Some(buffer.color32(x, y, self.width))
    }

    #[inline]
    fn texel(&self, x: i32, y: i32) -> Option<Color> {
        let buffer = self.buffer.as_ref()?;
        let (x, y) = self.wrap(x, y);
        Some(buffer.color(x, y, self.width))
    }

    /// The red byte, or the single stored byte of an alpha-only source.
    pub fn get_pixel_byte(&self, x: i32, y: i32) -> u8 {
        self.texel32(x, y).map_or(0, |c| c.r)
    }

    /// The pixel reduced to one float according to the depth kind.
    pub fn get_pixel_float(&self, x: i32, y: i32) -> f32 {
        let Some(c) = self.texel(x, y) else {
            return 0.0;
        };
        if self.is_alpha8() {
            return c.r;
        }
        match self.depth {
            MapDepth::Greyscale => c.r,
            MapDepth::HeightAlpha => 0.5 * (c.r + c.a),
            MapDepth::RGB => (1.0 / 3.0) * (c.r + c.g + c.b),
            MapDepth::RGBA => 0.25 * (c.r + c.g + c.b + c.a),
        }
    }

    /// The pixel as a float colour.
    pub fn get_pixel_color(&self, x: i32, y: i32) -> Color {
        self.texel(x, y).unwrap_or(Color::BLACK)
    }

    /// The pixel as an 8-bit colour.
    pub fn get_pixel_color32(&self, x: i32, y: i32) -> Color32 {
        self.texel32(x, y).unwrap_or_default()
    }

    /// Height and alpha. Depths without alpha report an alpha of one.
    pub fn get_pixel_height_alpha(&self, x: i32, y: i32) -> HeightAlpha {
        let Some(c) = self.texel(x, y) else {
            return HeightAlpha::default();
        };
        match self.depth {
            MapDepth::HeightAlpha | MapDepth::RGBA => HeightAlpha::new(c.r, c.a),
            MapDepth::Greyscale | MapDepth::RGB => HeightAlpha::new(c.r, 1.0),
        }
    }

    /// Same as [`get_pixel_byte`](Self::get_pixel_byte).
    pub fn grey_byte(&self, x: i32, y: i32) -> u8 {
        self.get_pixel_byte(x, y)
    }

    /// The red channel as a float.
    pub fn grey_float(&self, x: i32, y: i32) -> f32 {
        self.texel(x, y).map_or(0.0, |c| c.r)
    }

    /// The raw bytes of the pixel, `depth` of them.
    pub fn pixel_bytes(&self, x: i32, y: i32) -> PixelBytes {
        match self.texel32(x, y) {
            Some(c) => PixelBytes::new(c, self.depth),
            None => PixelBytes::zeroed(self.depth),
        }
    }

    #[inline]
    fn bilinear(&self, u: f64, v: f64) -> Option<BilinearCoords> {
        self.buffer
            .as_ref()
            .map(|_| BilinearCoords::wrapping(u, v, self.width, self.height))
    }

    /// Bilinear [`get_pixel_float`](Self::get_pixel_float) at normalized coordinates.
    pub fn sample_float(&self, u: impl Into<f64>, v: impl Into<f64>) -> f32 {
        self.bilinear(u.into(), v.into())
            .map_or(0.0, |b| b.blend(|x, y| self.get_pixel_float(x, y), lerp))
    }

    /// Bilinear [`get_pixel_color`](Self::get_pixel_color) at normalized coordinates.
    pub fn sample_color(&self, u: impl Into<f64>, v: impl Into<f64>) -> Color {
        self.bilinear(u.into(), v.into()).map_or(Color::BLACK, |b| {
            b.blend(|x, y| self.get_pixel_color(x, y), Color::lerp)
        })
    }

    /// Bilinear [`get_pixel_color32`](Self::get_pixel_color32) at normalized coordinates.
    pub fn sample_color32(&self, u: impl Into<f64>, v: impl Into<f64>) -> Color32 {
        self.bilinear(u.into(), v.into()).map_or(Color32::default(), |b| {
            b.blend(|x, y| self.get_pixel_color32(x, y), Color32::lerp)
        })
    }

    /// Bilinear [`get_pixel_height_alpha`](Self::get_pixel_height_alpha) at normalized coordinates.
    pub fn sample_height_alpha(&self, u: impl Into<f64>, v: impl Into<f64>) -> HeightAlpha {
        self.bilinear(u.into(), v.into())
            .map_or(HeightAlpha::default(), |b| {
                b.blend(|x, y| self.get_pixel_height_alpha(x, y), HeightAlpha::lerp)
            })
    }

    /// Bilinear [`grey_float`](Self::grey_float) at normalized coordinates.
    pub fn sample_grey_float(&self, u: impl Into<f64>, v: impl Into<f64>) -> f32 {
        self.bilinear(u.into(), v.into())
            .map_or(0.0, |b| b.blend(|x, y| self.grey_float(x, y), lerp))
    }

    /// Rebuilds the map in its native layout through the query API.
    pub fn compile_to_texture(&self) -> DynamicImage {
        match self.depth {
            MapDepth::Greyscale => DynamicImage::ImageLuma8(self.compile_greyscale()),
            MapDepth::HeightAlpha => DynamicImage::ImageLumaA8(self.compile_height_alpha()),
            MapDepth::RGB => DynamicImage::ImageRgb8(self.compile_rgb()),
            MapDepth::RGBA => DynamicImage::ImageRgba8(self.compile_rgba()),
        }
    }

    /// One grey byte per pixel, from [`get_pixel_byte`](Self::get_pixel_byte).
    pub fn compile_greyscale(&self) -> GrayImage {
        if !self.is_loaded() {
            return ImageBuffer::new(self.width, self.height);
        }
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            Luma([self.get_pixel_byte(x as i32, y as i32)])
        })
    }

    /// Height and alpha bytes, from [`get_pixel_height_alpha`](Self::get_pixel_height_alpha).
    pub fn compile_height_alpha(&self) -> GrayAlphaImage {
        if !self.is_loaded() {
            return ImageBuffer::new(self.width, self.height);
        }
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let ha = self.get_pixel_height_alpha(x as i32, y as i32);
            LumaA([float_to_byte(ha.height), float_to_byte(ha.alpha)])
        })
    }

    /// RGB bytes, from [`get_pixel_color32`](Self::get_pixel_color32).
    pub fn compile_rgb(&self) -> RgbImage {
        if !self.is_loaded() {
            return ImageBuffer::new(self.width, self.height);
        }
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let c = self.get_pixel_color32(x as i32, y as i32);
            Rgb([c.r, c.g, c.b])
        })
    }

    /// RGBA bytes, from [`get_pixel_color32`](Self::get_pixel_color32).
    pub fn compile_rgba(&self) -> RgbaImage {
        if !self.is_loaded() {
            return ImageBuffer::new(self.width, self.height);
        }
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            Rgba(self.get_pixel_color32(x as i32, y as i32).to_array())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ondemand_core::PixelData;

    fn loaded(depth: MapDepth, width: u32, height: u32, data: PixelData, manual: bool) -> MapSO {
        let mut map = MapSO::new("test", depth);
        map.create_map(
            DecodedImage::new(width, height, data).expect("valid test image"),
            manual,
        );
        map
    }

    fn rgb_gradient(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| [(i * 7) as u8, (i * 13) as u8, (255 - i) as u8])
            .collect()
    }

    #[test]
    fn coordinates_wrap_toroidally() {
        for manual in [true, false] {
            let map = loaded(MapDepth::RGB, 3, 2, PixelData::Rgb8(rgb_gradient(3, 2)), manual);
            for y in -4..4 {
                for x in -6..6 {
                    let c = map.get_pixel_color(x, y);
                    assert_eq!(c, map.get_pixel_color(x + 3, y));
                    assert_eq!(c, map.get_pixel_color(x, y + 2));
                }
            }
            assert_eq!(map.get_pixel_color32(-1, -1), map.get_pixel_color32(2, 1));
        }
    }

    #[test]
    fn compile_rgb_round_trips_rgb24() {
        let data = rgb_gradient(5, 4);
        for manual in [true, false] {
            let map = loaded(MapDepth::RGB, 5, 4, PixelData::Rgb8(data.clone()), manual);
            assert_eq!(map.compile_rgb().into_raw(), data);
        }
    }

    #[test]
    fn float_semantics_follow_depth() {
        let px = vec![51, 102, 153, 204];
        for manual in [true, false] {
            let rgba = loaded(MapDepth::RGBA, 1, 1, PixelData::Rgba8(px.clone()), manual);
            let expected = 0.25 * (51.0 / 255.0 + 102.0 / 255.0 + 153.0 / 255.0 + 204.0 / 255.0);
            assert_eq!(rgba.get_pixel_float(0, 0), expected);
            assert_eq!(rgba.get_pixel_height_alpha(0, 0), HeightAlpha::new(0.2, 0.8));

            let rgb = loaded(MapDepth::RGB, 1, 1, PixelData::Rgba8(px.clone()), manual);
            assert_eq!(rgb.get_pixel_height_alpha(0, 0).alpha, 1.0);
            assert_eq!(&*rgb.pixel_bytes(0, 0), &[51, 102, 153]);

            let grey = loaded(MapDepth::Greyscale, 1, 1, PixelData::Rgba8(px.clone()), manual);
            assert_eq!(grey.get_pixel_color32(0, 0), Color32::new(51, 51, 51, 255));

            let ha = loaded(MapDepth::HeightAlpha, 1, 1, PixelData::GreyAlpha8(vec![255, 0]), manual);
            assert_eq!(ha.get_pixel_float(0, 0), 0.5);
            assert_eq!(&*ha.pixel_bytes(0, 0), &[255, 0]);
        }
    }

    #[test]
    fn alpha_only_source_reads_its_value() {
        for manual in [true, false] {
            let a8 = loaded(MapDepth::HeightAlpha, 1, 1, PixelData::Alpha8(vec![102]), manual);
            assert_eq!(a8.get_pixel_float(0, 0), 0.4);
            assert_eq!(a8.get_pixel_byte(0, 0), 102);
            assert_eq!(a8.grey_float(0, 0), 0.4);
        }
    }

    #[test]
    fn r16_height_alpha_keeps_precision() {
        for manual in [true, false] {
            let map = loaded(MapDepth::HeightAlpha, 1, 1, PixelData::R16(vec![40000]), manual);
            let ha = map.get_pixel_height_alpha(0, 0);
            assert_eq!(ha.height, 40000.0 / 65535.0);
            assert_eq!(ha.alpha, (40000 & 0xFF) as f32 / 255.0);
            assert_eq!(map.get_pixel_color32(0, 0), Color32::new(156, 156, 156, 64));
        }
    }

    #[test]
    fn bilinear_sampling_wraps_and_interpolates() {
        for manual in [true, false] {
            let map = loaded(MapDepth::Greyscale, 2, 1, PixelData::Grey8(vec![0, 255]), manual);
            assert_eq!(map.sample_float(0.0f32, 0.0f32), 0.0);
            assert_eq!(map.sample_float(0.25f64, 0.0f64), 0.5);
            // Past the last column the right neighbour wraps to column zero.
            assert_eq!(map.sample_float(0.75, 0.0), 0.5);
            assert_eq!(map.sample_float(1.25, 0.0), map.sample_float(0.25, 0.0));
        }
    }

    #[test]
    fn zero_extent_image_leaves_the_store_empty() {
        let mut map = MapSO::new("flat", MapDepth::RGB);
        let image = DecodedImage {
            width: 0,
            height: 4,
            data: PixelData::Rgb8(Vec::new()),
        };
        assert_eq!(map.create_map(image, true), 0);
        assert!(!map.is_loaded());
        assert_eq!(map.get_pixel_color32(3, -7), Color32::default());
        assert_eq!(map.sample_float(0.5, 0.5), 0.0);
    }

    #[test]
    fn empty_store_answers_defaults() {
        for manual in [true, false] {
            let mut map = loaded(MapDepth::RGBA, 4, 2, PixelData::Rgba8(vec![9; 32]), manual);
            assert_eq!(map.clear(), 32);
            assert!(!map.is_loaded());
            assert_eq!(map.get_pixel_byte(0, 0), 0);
            assert_eq!(map.get_pixel_color(0, 0), Color::BLACK);
            assert_eq!(map.get_pixel_color32(0, 0), Color32::default());
            assert_eq!(map.sample_height_alpha(0.5, 0.5), HeightAlpha::default());
            assert_eq!(&*map.pixel_bytes(1, 1), &[0, 0, 0, 0]);

            let blank = map.compile_to_texture();
            assert_eq!((blank.width(), blank.height()), (4, 2));
            assert!(blank.as_bytes().iter().all(|&b| b == 0));
        }
    }
}
