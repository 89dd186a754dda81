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

//! Block decompression of BC1 (DXT1), BC2 (DXT3) and BC3 (DXT5).

use ondemand_core::DecodeError;

/// The block-compressed encodings the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    Bc1,
    Bc2,
    Bc3,
}

impl BlockFormat {
    pub const fn block_size(self) -> usize {
        match self {
            BlockFormat::Bc1 => 8,
            BlockFormat::Bc2 | BlockFormat::Bc3 => 16,
        }
    }
}

/// Expands a 5:6:5 colour to 8-bit channels by bit replication.
#[inline]
fn expand_565(c: u16) -> [u8; 3] {
    let r = ((c >> 11) & 0x1F) as u8;
    let g = ((c >> 5) & 0x3F) as u8;
    let b = (c & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Decodes the 8-byte colour part of a block into 16 RGBA texels.
///
/// BC2 and BC3 colour blocks are always in four-colour mode.
fn decode_color_block(block: &[u8], four_color_only: bool, out: &mut [[u8; 4]; 16]) {
    let c0 = u16::from_le_bytes([block[0], block[1]]);
    let c1 = u16::from_le_bytes([block[2], block[3]]);
    let indices = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);

    let e0 = expand_565(c0);
    let e1 = expand_565(c1);
    let mut palette = [[0u8; 4]; 4];
    palette[0] = [e0[0], e0[1], e0[2], 255];
    palette[1] = [e1[0], e1[1], e1[2], 255];

    if c0 > c1 || four_color_only {
        for ch in 0..3 {
            let a = e0[ch] as u16;
            let b = e1[ch] as u16;
            palette[2][ch] = ((2 * a + b) / 3) as u8;
            palette[3][ch] = ((a + 2 * b) / 3) as u8;
        }
        palette[2][3] = 255;
        palette[3][3] = 255;
    } else {
        for ch in 0..3 {
            palette[2][ch] = ((e0[ch] as u16 + e1[ch] as u16) / 2) as u8;
        }
        palette[2][3] = 255;
        // Index 3 is transparent black.
        palette[3] = [0, 0, 0, 0];
    }

    for (i, texel) in out.iter_mut().enumerate() {
        *texel = palette[((indices >> (2 * i)) & 0b11) as usize];
    }
}

/// Applies the explicit 4-bit alpha of a BC2 block.
fn decode_explicit_alpha(block: &[u8], out: &mut [[u8; 4]; 16]) {
    let mut bits = [0u8; 8];
    bits.copy_from_slice(&block[..8]);
    let bits = u64::from_le_bytes(bits);
    for (i, texel) in out.iter_mut().enumerate() {
        let a = ((bits >> (4 * i)) & 0xF) as u8;
        texel[3] = a * 17;
    }
}

/// Applies the interpolated alpha of a BC3 block.
fn decode_interpolated_alpha(block: &[u8], out: &mut [[u8; 4]; 16]) {
    let a0 = block[0] as u16;
    let a1 = block[1] as u16;
    let mut table = [0u8; 8];
    table[0] = a0 as u8;
    table[1] = a1 as u8;
    if a0 > a1 {
        for i in 1..7u16 {
            table[i as usize + 1] = (((7 - i) * a0 + i * a1) / 7) as u8;
        }
    } else {
        for i in 1..5u16 {
            table[i as usize + 1] = (((5 - i) * a0 + i * a1) / 5) as u8;
        }
        table[6] = 0;
        table[7] = 255;
    }

    let mut bits = [0u8; 8];
    bits[..6].copy_from_slice(&block[2..8]);
    let bits = u64::from_le_bytes(bits);
    for (i, texel) in out.iter_mut().enumerate() {
        texel[3] = table[((bits >> (3 * i)) & 0b111) as usize];
    }
}

/// Decompresses the top mip level of a block-compressed image to RGBA8.
pub fn decompress(
    format: BlockFormat,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let (w, h) = (width as usize, height as usize);
    let blocks_x = w.div_ceil(4);
    let blocks_y = h.div_ceil(4);
    let block_size = format.block_size();
    DecodeError::check_len(blocks_x * blocks_y * block_size, data.len())?;

    let mut rgba = vec![0u8; w * h * 4];
    let mut texels = [[0u8; 4]; 16];

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = (by * blocks_x + bx) * block_size;
            let block = &data[offset..offset + block_size];
            match format {
                BlockFormat::Bc1 => decode_color_block(block, false, &mut texels),
                BlockFormat::Bc2 => {
                    decode_color_block(&block[8..], true, &mut texels);
                    decode_explicit_alpha(block, &mut texels);
                }
                BlockFormat::Bc3 => {
                    decode_color_block(&block[8..], true, &mut texels);
                    decode_interpolated_alpha(block, &mut texels);
                }
            }

            for (i, texel) in texels.iter().enumerate() {
                let x = bx * 4 + i % 4;
                let y = by * 4 + i / 4;
                if x < w && y < h {
                    let dst = (y * w + x) * 4;
                    rgba[dst..dst + 4].copy_from_slice(texel);
                }
            }
        }
    }

    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_565_replicates_bits() {
        assert_eq!(expand_565(0xFFFF), [255, 255, 255]);
        assert_eq!(expand_565(0x0000), [0, 0, 0]);
        assert_eq!(expand_565(0xF800), [255, 0, 0]);
        assert_eq!(expand_565(0x07E0), [0, 255, 0]);
        assert_eq!(expand_565(0x001F), [0, 0, 255]);
    }

    #[test]
    fn bc1_three_colour_mode_has_transparent_index() {
        // c0 <= c1 selects three colours plus transparent black.
        let block = [0x1F, 0x00, 0x00, 0xF8, 0b1110_0100, 0, 0, 0];
        let rgba = decompress(BlockFormat::Bc1, 4, 4, &block).unwrap();
        assert_eq!(&rgba[0..4], &[0, 0, 255, 255]);
        assert_eq!(&rgba[4..8], &[255, 0, 0, 255]);
        assert_eq!(&rgba[8..12], &[127, 0, 127, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn bc1_four_colour_mode_interpolates_thirds() {
        let block = [0x00, 0xF8, 0x1F, 0x00, 0b1110_0100, 0, 0, 0];
        let rgba = decompress(BlockFormat::Bc1, 4, 4, &block).unwrap();
        assert_eq!(&rgba[8..12], &[170, 0, 85, 255]);
        assert_eq!(&rgba[12..16], &[85, 0, 170, 255]);
    }

    #[test]
    fn bc2_uses_explicit_alpha() {
        let mut block = [0u8; 16];
        block[0] = 0x0F; // texel 0 alpha 15, texel 1 alpha 0
        block[8..10].copy_from_slice(&0xFFFFu16.to_le_bytes());
        let rgba = decompress(BlockFormat::Bc2, 4, 4, &block).unwrap();
        assert_eq!(&rgba[0..4], &[255, 255, 255, 255]);
        assert_eq!(rgba[7], 0);
    }

    #[test]
    fn bc3_six_value_alpha_mode_has_extremes() {
        let mut block = [0u8; 16];
        block[0] = 10;
        block[1] = 200; // a0 <= a1: six interpolated values plus 0 and 255
        // texel 0 -> index 6 (0), texel 1 -> index 7 (255)
        block[2] = 0b00_111_110;
        let rgba = decompress(BlockFormat::Bc3, 4, 4, &block).unwrap();
        assert_eq!(rgba[3], 0);
        assert_eq!(rgba[7], 255);
        // texel 2 -> index 0 (a0)
        assert_eq!(rgba[11], 10);
    }

    #[test]
    fn partial_blocks_are_clipped() {
        let block = [0xFF, 0xFF, 0x00, 0x00, 0, 0, 0, 0];
        let rgba = decompress(BlockFormat::Bc1, 2, 3, &block).unwrap();
        assert_eq!(rgba.len(), 2 * 3 * 4);
        assert!(rgba.chunks(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn short_data_is_truncated() {
        assert!(matches!(
            decompress(BlockFormat::Bc3, 8, 4, &[0u8; 16]),
            Err(DecodeError::Truncated {
                needed: 32,
                available: 16
            })
        ));
    }
}
