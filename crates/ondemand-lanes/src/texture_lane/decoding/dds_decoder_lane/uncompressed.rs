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

//! Uncompressed, luminance and palette-indexed DDS pixel formats.

use super::header::{DdsPixelFormat, DDPF_ALPHA, DDPF_ALPHAPIXELS, DDPF_LUMINANCE, DDPF_RGB};
use ondemand_core::{DecodeError, DecodedImage, PixelData};

const RGB888_MASKS: (u32, u32, u32) = (0x0000_00FF, 0x0000_FF00, 0x00FF_0000);
const ALPHA888_MASK: u32 = 0xFF00_0000;

/// One channel of a bit-mask pixel format.
#[derive(Debug, Clone, Copy)]
struct Channel {
    mask: u32,
    shift: u32,
    max: u32,
}

impl Channel {
    fn new(mask: u32) -> Self {
        let shift = if mask == 0 { 0 } else { mask.trailing_zeros() };
        let bits = mask.count_ones();
        let max = if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 };
        Self { mask, shift, max }
    }

    /// Scales the channel to 8 bits, rounding to nearest. Absent channels
    /// read as `absent`.
    #[inline]
    fn extract(&self, pixel: u32, absent: u8) -> u8 {
        if self.mask == 0 {
            return absent;
        }
        let v = ((pixel & self.mask) >> self.shift) as u64;
        let max = self.max as u64;
        ((v * 255 + max / 2) / max) as u8
    }
}

#[inline]
fn read_pixel(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Decodes the non-FourCC pixel formats, in the same precedence order as the
/// content pipeline that produced them: plain RGB(A) copies first, then
/// other RGB masks, then luminance and alpha, then palettes.
pub fn decode(
    pf: &DdsPixelFormat,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let pixels = width as usize * height as usize;
    let bit_count = pf.rgb_bit_count;
    let rgb = pf.has(DDPF_RGB);

    if rgb {
        let is_rgb888 = (pf.r_mask, pf.g_mask, pf.b_mask) == RGB888_MASKS;
        if is_rgb888 && bit_count == 24 {
            let len = pixels * 3;
            DecodeError::check_len(len, data.len())?;
            return DecodedImage::new(width, height, PixelData::Rgb8(data[..len].to_vec()));
        }
        if is_rgb888 && bit_count == 32 && pf.has(DDPF_ALPHAPIXELS) && pf.a_mask == ALPHA888_MASK
        {
            let len = pixels * 4;
            DecodeError::check_len(len, data.len())?;
            return DecodedImage::new(width, height, PixelData::Rgba8(data[..len].to_vec()));
        }
        if matches!(bit_count, 16 | 24 | 32) {
            return decode_masked(pf, width, height, data);
        }
        return Err(DecodeError::Unsupported(format!(
            "{bit_count}-bit RGB pixel format"
        )));
    }

    let alpha = pf.has(DDPF_ALPHA);
    let luminance = pf.has(DDPF_LUMINANCE);
    if alpha != luminance && matches!(bit_count, 8 | 16) {
        return decode_single_channel(pf, alpha, width, height, data);
    }

    if matches!(bit_count, 4 | 8) {
        return decode_palette(bit_count, width, height, data);
    }

    Err(DecodeError::Unsupported(format!(
        "pixel format flags {:#x} with {} bits per pixel",
        pf.flags, bit_count
    )))
}

/// Per-pixel mask extraction for packed formats such as 565 and 4444.
fn decode_masked(
    pf: &DdsPixelFormat,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let pixels = width as usize * height as usize;
    let stride = pf.rgb_bit_count as usize / 8;
    DecodeError::check_len(pixels * stride, data.len())?;

    let r = Channel::new(pf.r_mask);
    let g = Channel::new(pf.g_mask);
    let b = Channel::new(pf.b_mask);
    let has_alpha = pf.has(DDPF_ALPHAPIXELS) && pf.a_mask != 0;

    let src = data[..pixels * stride].chunks_exact(stride).map(read_pixel);
    if has_alpha {
        let a = Channel::new(pf.a_mask);
        let mut out = Vec::with_capacity(pixels * 4);
        for p in src {
            out.extend_from_slice(&[r.extract(p, 0), g.extract(p, 0), b.extract(p, 0), a.extract(p, 255)]);
        }
        DecodedImage::new(width, height, PixelData::Rgba8(out))
    } else {
        let mut out = Vec::with_capacity(pixels * 3);
        for p in src {
            out.extend_from_slice(&[r.extract(p, 0), g.extract(p, 0), b.extract(p, 0)]);
        }
        DecodedImage::new(width, height, PixelData::Rgb8(out))
    }
}

/// 8-bit alpha or luminance, 16-bit luminance-alpha or 16-bit luminance.
fn decode_single_channel(
    pf: &DdsPixelFormat,
    alpha: bool,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let pixels = width as usize * height as usize;
    if pf.rgb_bit_count == 8 {
        DecodeError::check_len(pixels, data.len())?;
        let bytes = data[..pixels].to_vec();
        let samples = if alpha {
            PixelData::Alpha8(bytes)
        } else {
            PixelData::Grey8(bytes)
        };
        return DecodedImage::new(width, height, samples);
    }

    DecodeError::check_len(pixels * 2, data.len())?;
    let src = &data[..pixels * 2];
    if pf.has(DDPF_ALPHAPIXELS) && pf.a_mask == 0xFF00 {
        // Little-endian L8A8 is already luminance byte then alpha byte.
        return DecodedImage::new(width, height, PixelData::GreyAlpha8(src.to_vec()));
    }
    let samples = src
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    DecodedImage::new(width, height, PixelData::R16(samples))
}

/// 4- or 8-bit indices into an RGBA palette stored right after the header.
/// 4-bit data stores the high nibble first.
fn decode_palette(
    bit_count: u32,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let pixels = width as usize * height as usize;
    let colors = 1usize << bit_count;
    let palette_len = 4 * colors;
    let index_len = (pixels * bit_count as usize).div_ceil(8);
    DecodeError::check_len(palette_len + index_len, data.len())?;

    let (palette, indices) = data.split_at(palette_len);
    let mut out = Vec::with_capacity(pixels * 4);
    let mut push = |i: usize| out.extend_from_slice(&palette[i * 4..i * 4 + 4]);
    if bit_count == 8 {
        indices[..pixels].iter().for_each(|&i| push(i as usize));
    } else {
        for n in 0..pixels {
            let byte = indices[n / 2];
            let i = if n % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            push(i as usize);
        }
    }
    DecodedImage::new(width, height, PixelData::Rgba8(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ondemand_core::PixelFormat;

    fn pf(flags: u32, bits: u32, masks: [u32; 4]) -> DdsPixelFormat {
        DdsPixelFormat {
            size: 32,
            flags,
            four_cc: 0,
            rgb_bit_count: bits,
            r_mask: masks[0],
            g_mask: masks[1],
            b_mask: masks[2],
            a_mask: masks[3],
        }
    }

    #[test]
    fn rgb888_is_copied_directly() {
        let f = pf(DDPF_RGB, 24, [0xFF, 0xFF00, 0xFF_0000, 0]);
        let img = decode(&f, 2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.data, PixelData::Rgb8(vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn rgb565_is_mask_extracted() {
        let f = pf(DDPF_RGB, 16, [0xF800, 0x07E0, 0x001F, 0]);
        let img = decode(&f, 2, 1, &[0x00, 0xF8, 0x1F, 0x00]).unwrap();
        assert_eq!(img.data, PixelData::Rgb8(vec![255, 0, 0, 0, 0, 255]));
    }

    #[test]
    fn argb4444_keeps_alpha() {
        let f = pf(DDPF_RGB | DDPF_ALPHAPIXELS, 16, [0x0F00, 0x00F0, 0x000F, 0xF000]);
        let img = decode(&f, 1, 1, &[0x0F, 0x80]).unwrap();
        assert_eq!(img.data, PixelData::Rgba8(vec![0, 0, 255, 136]));
    }

    #[test]
    fn bgr888_is_swizzled() {
        let f = pf(DDPF_RGB, 24, [0xFF_0000, 0xFF00, 0xFF, 0]);
        let img = decode(&f, 1, 1, &[1, 2, 3]).unwrap();
        assert_eq!(img.data, PixelData::Rgb8(vec![3, 2, 1]));
    }

    #[test]
    fn luminance_and_alpha_formats() {
        let a8 = decode(&pf(DDPF_ALPHA, 8, [0, 0, 0, 0xFF]), 1, 1, &[7]).unwrap();
        assert_eq!(a8.format(), PixelFormat::Alpha8);

        let l8 = decode(&pf(DDPF_LUMINANCE, 8, [0xFF, 0, 0, 0]), 1, 1, &[7]).unwrap();
        assert_eq!(l8.format(), PixelFormat::Grey8);

        let la = pf(DDPF_LUMINANCE | DDPF_ALPHAPIXELS, 16, [0xFF, 0, 0, 0xFF00]);
        let la = decode(&la, 1, 1, &[9, 200]).unwrap();
        assert_eq!(la.data, PixelData::GreyAlpha8(vec![9, 200]));

        let l16 = decode(&pf(DDPF_LUMINANCE, 16, [0xFFFF, 0, 0, 0]), 1, 1, &[0x34, 0x12]).unwrap();
        assert_eq!(l16.data, PixelData::R16(vec![0x1234]));
    }

    #[test]
    fn palette_4bpp_reads_high_nibble_first() {
        let mut data = vec![0u8; 16 * 4];
        data[4..8].copy_from_slice(&[10, 20, 30, 40]); // colour 1
        data[8..12].copy_from_slice(&[50, 60, 70, 80]); // colour 2
        data.push(0x12); // pixel 0 -> 1, pixel 1 -> 2
        let img = decode(&pf(0, 4, [0; 4]), 2, 1, &data).unwrap();
        assert_eq!(
            img.data,
            PixelData::Rgba8(vec![10, 20, 30, 40, 50, 60, 70, 80])
        );
    }

    #[test]
    fn palette_8bpp_and_truncation() {
        let mut data = vec![0u8; 256 * 4];
        data[255 * 4..].copy_from_slice(&[1, 2, 3, 4]);
        data.push(255);
        let img = decode(&pf(0, 8, [0; 4]), 1, 1, &data).unwrap();
        assert_eq!(img.data, PixelData::Rgba8(vec![1, 2, 3, 4]));

        assert!(matches!(
            decode(&pf(0, 8, [0; 4]), 2, 2, &data),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn other_depths_are_unsupported() {
        assert!(matches!(
            decode(&pf(0, 2, [0; 4]), 1, 1, &[0; 64]),
            Err(DecodeError::Unsupported(_))
        ));
    }
}
