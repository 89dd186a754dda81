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

//! On-disk layout of the DDS container headers.

use bytemuck::{Pod, Zeroable};
use ondemand_core::DecodeError;

/// `"DDS "` read as a little-endian `u32`.
pub const MAGIC: u32 = u32::from_le_bytes(*b"DDS ");
/// Size of the magic number plus the legacy header.
pub const HEADER_END: usize = 4 + std::mem::size_of::<DdsHeader>();
/// Size of the DX10 extension header.
pub const DX10_HEADER_SIZE: usize = std::mem::size_of::<DdsHeaderDx10>();
/// The widest per-pixel factor any decoder multiplies the pixel count by
/// (bits of a palette index, bytes of an RGBA texel).
const MAX_PIXEL_FACTOR: usize = 8;

/// Pixel format flag: the alpha mask is valid.
pub const DDPF_ALPHAPIXELS: u32 = 0x0000_0001;
/// Pixel format flag: alpha-only data.
pub const DDPF_ALPHA: u32 = 0x0000_0002;
/// Pixel format flag: the FourCC field is valid.
pub const DDPF_FOURCC: u32 = 0x0000_0004;
/// Pixel format flag: uncompressed RGB data.
pub const DDPF_RGB: u32 = 0x0000_0040;
/// Pixel format flag: luminance data.
pub const DDPF_LUMINANCE: u32 = 0x0002_0000;

/// Builds a FourCC code from its four characters.
pub const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// `DDS_PIXELFORMAT`, 32 bytes at offset 76 of the header.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: u32,
    pub rgb_bit_count: u32,
    pub r_mask: u32,
    pub g_mask: u32,
    pub b_mask: u32,
    pub a_mask: u32,
}

impl DdsPixelFormat {
    #[inline]
    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// `DDS_HEADER`, the 124 bytes following the magic number.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

/// `DDS_HEADER_DXT10`, present when the FourCC is `"DX10"`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DdsHeaderDx10 {
    pub dxgi_format: u32,
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    pub misc_flags2: u32,
}

/// Reads a `Pod` struct stored little-endian at `offset`.
fn read_le<T: Pod>(bytes: &[u8], offset: usize) -> Result<T, DecodeError> {
    let size = std::mem::size_of::<T>();
    DecodeError::check_len(offset + size, bytes.len())?;
    let mut value: T = bytemuck::pod_read_unaligned(&bytes[offset..offset + size]);
    // Every header field is a u32, so fixing endianness word by word is exact.
    for word in bytemuck::cast_slice_mut::<T, u8>(std::slice::from_mut(&mut value))
        .chunks_exact_mut(4)
    {
        let v = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        word.copy_from_slice(&v.to_ne_bytes());
    }
    Ok(value)
}

/// The parsed headers and the offset at which pixel data starts.
#[derive(Debug, Clone, Copy)]
pub struct ParsedHeaders {
    pub header: DdsHeader,
    pub dx10: Option<DdsHeaderDx10>,
    pub data_offset: usize,
}

pub fn parse(bytes: &[u8]) -> Result<ParsedHeaders, DecodeError> {
    DecodeError::check_len(4, bytes.len())?;
    if u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let header: DdsHeader = read_le(bytes, 4)?;
    if header.size != 124 {
        return Err(DecodeError::Corrupt(format!(
            "DDS header size is {}, expected 124",
            header.size
        )));
    }
    if header.width == 0 || header.height == 0 {
        return Err(DecodeError::Corrupt(format!(
            "DDS image has zero extent ({}x{})",
            header.width, header.height
        )));
    }
    (header.width as usize)
        .checked_mul(header.height as usize)
        .and_then(|pixels| pixels.checked_mul(MAX_PIXEL_FACTOR))
        .ok_or_else(|| {
            DecodeError::Corrupt(format!(
                "DDS image extent {}x{} overflows the addressable size",
                header.width, header.height
            ))
        })?;

    let pf = header.pixel_format;
    if pf.has(DDPF_FOURCC) && pf.four_cc == four_cc(b"DX10") {
        let dx10: DdsHeaderDx10 = read_le(bytes, HEADER_END)?;
        Ok(ParsedHeaders {
            header,
            dx10: Some(dx10),
            data_offset: HEADER_END + DX10_HEADER_SIZE,
        })
    } else {
        Ok(ParsedHeaders {
            header,
            dx10: None,
            data_offset: HEADER_END,
        })
    }
}
