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

use crate::texture_lane::ImageDecoderLane;
use image::DynamicImage;
use ondemand_core::{DecodeError, DecodedImage, PixelData};

/// A lane decoding every container the `image` crate understands.
///
/// Grey, grey-alpha, 16-bit grey, RGB and RGBA images keep their layout;
/// anything else is converted to RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDecoderLane;

impl ImageDecoderLane for GenericDecoderLane {
    fn strategy_name(&self) -> &'static str {
        "Generic"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = (img.width(), img.height());
        let samples = match img {
            DynamicImage::ImageLuma8(buf) => PixelData::Grey8(buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => PixelData::GreyAlpha8(buf.into_raw()),
            DynamicImage::ImageLuma16(buf) => PixelData::R16(buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => PixelData::Rgb8(buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => PixelData::Rgba8(buf.into_raw()),
            other => PixelData::Rgba8(other.to_rgba8().into_raw()),
        };
        DecodedImage::new(width, height, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, LumaA, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)
            .expect("PNG encoding should succeed");
        out.into_inner()
    }

    #[test]
    fn png_rgb_keeps_layout() {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 7]));
        let decoded = GenericDecoderLane
            .decode(&encode_png(DynamicImage::ImageRgb8(img.clone())))
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.data, PixelData::Rgb8(img.into_raw()));
    }

    #[test]
    fn png_grey_variants_keep_layout() {
        let grey = image::GrayImage::from_pixel(2, 2, Luma([9]));
        let decoded = GenericDecoderLane
            .decode(&encode_png(DynamicImage::ImageLuma8(grey)))
            .unwrap();
        assert_eq!(decoded.data, PixelData::Grey8(vec![9; 4]));

        let ga = image::GrayAlphaImage::from_pixel(1, 1, LumaA([3, 4]));
        let decoded = GenericDecoderLane
            .decode(&encode_png(DynamicImage::ImageLumaA8(ga)))
            .unwrap();
        assert_eq!(decoded.data, PixelData::GreyAlpha8(vec![3, 4]));

        let wide = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(1, 1, Luma([0xBEEF]));
        let decoded = GenericDecoderLane
            .decode(&encode_png(DynamicImage::ImageLuma16(wide)))
            .unwrap();
        assert_eq!(decoded.data, PixelData::R16(vec![0xBEEF]));
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(
            GenericDecoderLane.decode(b"definitely not an image"),
            Err(DecodeError::Image(_))
        ));
    }
}
