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

//! DirectDraw Surface decoding.
//!
//! Only the top mip level is decoded. Block-compressed formats are expanded
//! to RGBA8; uncompressed formats keep the narrowest layout that holds them.

mod block;
mod header;
mod uncompressed;

use self::block::BlockFormat;
use self::header::{four_cc, DdsHeaderDx10, DDPF_FOURCC, MAGIC};
use crate::texture_lane::ImageDecoderLane;
use ondemand_core::{DecodeError, DecodedImage, PixelData};

const DXGI_R8G8B8A8_UNORM: u32 = 28;
const DXGI_R8G8B8A8_UNORM_SRGB: u32 = 29;
const DXGI_R16_UNORM: u32 = 56;
const DXGI_R8_UNORM: u32 = 61;
const DXGI_A8_UNORM: u32 = 65;
const DXGI_BC1_UNORM: u32 = 71;
const DXGI_BC1_UNORM_SRGB: u32 = 72;
const DXGI_BC2_UNORM: u32 = 74;
const DXGI_BC2_UNORM_SRGB: u32 = 75;
const DXGI_BC3_UNORM: u32 = 77;
const DXGI_BC3_UNORM_SRGB: u32 = 78;

/// A lane decoding `.dds` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DdsDecoderLane;

impl DdsDecoderLane {
    fn decode_blocks(
        format: BlockFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<DecodedImage, DecodeError> {
        let rgba = block::decompress(format, width, height, data)?;
        DecodedImage::new(width, height, PixelData::Rgba8(rgba))
    }

    fn decode_dx10(
        dx10: &DdsHeaderDx10,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<DecodedImage, DecodeError> {
        let pixels = width as usize * height as usize;
        match dx10.dxgi_format {
            DXGI_BC1_UNORM | DXGI_BC1_UNORM_SRGB => {
                Self::decode_blocks(BlockFormat::Bc1, width, height, data)
            }
            DXGI_BC2_UNORM | DXGI_BC2_UNORM_SRGB => {
                Self::decode_blocks(BlockFormat::Bc2, width, height, data)
            }
            DXGI_BC3_UNORM | DXGI_BC3_UNORM_SRGB => {
                Self::decode_blocks(BlockFormat::Bc3, width, height, data)
            }
            DXGI_R8G8B8A8_UNORM | DXGI_R8G8B8A8_UNORM_SRGB => {
                DecodeError::check_len(pixels * 4, data.len())?;
                DecodedImage::new(width, height, PixelData::Rgba8(data[..pixels * 4].to_vec()))
            }
            DXGI_R8_UNORM => {
                DecodeError::check_len(pixels, data.len())?;
                DecodedImage::new(width, height, PixelData::Grey8(data[..pixels].to_vec()))
            }
            DXGI_A8_UNORM => {
                DecodeError::check_len(pixels, data.len())?;
                DecodedImage::new(width, height, PixelData::Alpha8(data[..pixels].to_vec()))
            }
            DXGI_R16_UNORM => {
                DecodeError::check_len(pixels * 2, data.len())?;
                let samples = data[..pixels * 2]
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                DecodedImage::new(width, height, PixelData::R16(samples))
            }
            other => Err(DecodeError::Unsupported(format!("DX10 DXGI format {other}"))),
        }
    }
}

impl ImageDecoderLane for DdsDecoderLane {
    fn strategy_name(&self) -> &'static str {
        "DDS"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dds"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let parsed = header::parse(bytes)?;
        let (width, height) = (parsed.header.width, parsed.header.height);
        let data = &bytes[parsed.data_offset..];
        let pf = parsed.header.pixel_format;

        if let Some(dx10) = &parsed.dx10 {
            return Self::decode_dx10(dx10, width, height, data);
        }

        if pf.has(DDPF_FOURCC) {
            let code = pf.four_cc;
            if code == four_cc(b"DXT1") {
                return Self::decode_blocks(BlockFormat::Bc1, width, height, data);
            }
            if code == four_cc(b"DXT3") {
                return Self::decode_blocks(BlockFormat::Bc2, width, height, data);
            }
            if code == four_cc(b"DXT5") {
                return Self::decode_blocks(BlockFormat::Bc3, width, height, data);
            }
            if code == four_cc(b"DXT2") || code == four_cc(b"DXT4") {
                let name = String::from_utf8_lossy(&code.to_le_bytes()).into_owned();
                return Err(DecodeError::Unsupported(format!("premultiplied {name}")));
            }
            if code == MAGIC {
                return Err(DecodeError::Unsupported("FourCC equal to the DDS magic".into()));
            }
            log::debug!(
                "Unknown DDS FourCC {:#010x}, falling back to the uncompressed rules",
                code
            );
        }

        uncompressed::decode(&pf, width, height, data)
    }
}
