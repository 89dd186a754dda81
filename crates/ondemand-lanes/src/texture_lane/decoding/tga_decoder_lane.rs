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

//! Truevision TGA decoding, true-colour images only.

use crate::texture_lane::ImageDecoderLane;
use ondemand_core::{DecodeError, DecodedImage, PixelData};

const HEADER_LEN: usize = 18;
const TYPE_TRUE_COLOR: u8 = 2;
const TYPE_TRUE_COLOR_RLE: u8 = 10;
const ORIGIN_RIGHT: u8 = 0x10;
const ORIGIN_TOP: u8 = 0x20;

/// A lane decoding uncompressed and run-length encoded true-colour `.tga`
/// files at 24 or 32 bits per pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TgaDecoderLane;

struct TgaHeader {
    id_len: usize,
    color_map_type: u8,
    image_type: u8,
    color_map_len: usize,
    color_map_entry_bits: usize,
    width: u32,
    height: u32,
    bits_per_pixel: u8,
    descriptor: u8,
}

impl TgaHeader {
    fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        DecodeError::check_len(HEADER_LEN, bytes.len())?;
        let le16 = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        Ok(Self {
            id_len: bytes[0] as usize,
            color_map_type: bytes[1],
            image_type: bytes[2],
            color_map_len: le16(5) as usize,
            color_map_entry_bits: bytes[7] as usize,
            width: le16(12) as u32,
            height: le16(14) as u32,
            bits_per_pixel: bytes[16],
            descriptor: bytes[17],
        })
    }

    fn data_offset(&self) -> usize {
        let color_map = if self.color_map_type == 1 {
            (self.color_map_len * self.color_map_entry_bits).div_ceil(8)
        } else {
            0
        };
        HEADER_LEN + self.id_len + color_map
    }
}

/// Expands run-length packets into `len` bytes of raw pixels.
fn unpack_rle(data: &[u8], stride: usize, len: usize) -> Result<Vec<u8>, DecodeError> {
    // Each packet byte expands to at most 128 pixels.
    let reachable = data.len().saturating_mul(stride).saturating_mul(128);
    let mut out = Vec::with_capacity(len.min(reachable));
    let mut pos = 0;
    while out.len() < len {
        let packet = *data.get(pos).ok_or(DecodeError::Truncated {
            needed: pos + 1,
            available: data.len(),
        })?;
        pos += 1;
        let count = (packet & 0x7F) as usize + 1;
        if packet & 0x80 != 0 {
            DecodeError::check_len(pos + stride, data.len())?;
            let pixel = &data[pos..pos + stride];
            for _ in 0..count {
                out.extend_from_slice(pixel);
            }
            pos += stride;
        } else {
            let n = count * stride;
            DecodeError::check_len(pos + n, data.len())?;
            out.extend_from_slice(&data[pos..pos + n]);
            pos += n;
        }
    }
    // A final packet may overrun the image; drop the excess.
    out.truncate(len);
    Ok(out)
}

impl ImageDecoderLane for TgaDecoderLane {
    fn strategy_name(&self) -> &'static str {
        "TGA"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tga"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let header = TgaHeader::parse(bytes)?;
        if !matches!(header.image_type, TYPE_TRUE_COLOR | TYPE_TRUE_COLOR_RLE) {
            return Err(DecodeError::Unsupported(format!(
                "TGA image type {}",
                header.image_type
            )));
        }
        let stride = match header.bits_per_pixel {
            24 => 3,
            32 => 4,
            other => {
                return Err(DecodeError::Unsupported(format!(
                    "{other}-bit TGA true-colour image"
                )))
            }
        };
        if header.width == 0 || header.height == 0 {
            return Err(DecodeError::Corrupt("TGA image has zero extent".into()));
        }

        let (w, h) = (header.width as usize, header.height as usize);
        let len = w * h * stride;
        let offset = header.data_offset();
        DecodeError::check_len(offset, bytes.len())?;
        let data = &bytes[offset..];
        let raw = if header.image_type == TYPE_TRUE_COLOR_RLE {
            unpack_rle(data, stride, len)?
        } else {
            DecodeError::check_len(len, data.len())?;
            data[..len].to_vec()
        };

        let from_top = header.descriptor & ORIGIN_TOP != 0;
        let from_right = header.descriptor & ORIGIN_RIGHT != 0;
        let mut out = vec![0u8; len];
        for row in 0..h {
            let src_row = if from_top { row } else { h - 1 - row };
            for col in 0..w {
                let src_col = if from_right { w - 1 - col } else { col };
                let src = (src_row * w + src_col) * stride;
                let dst = (row * w + col) * stride;
                // BGR(A) on disk.
                out[dst] = raw[src + 2];
                out[dst + 1] = raw[src + 1];
                out[dst + 2] = raw[src];
                if stride == 4 {
                    out[dst + 3] = raw[src + 3];
                }
            }
        }

        let samples = if stride == 4 {
            PixelData::Rgba8(out)
        } else {
            PixelData::Rgb8(out)
        };
        DecodedImage::new(header.width, header.height, samples)
    }
}
