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

//! On-disk fixtures shared by the integration tests.

#![allow(dead_code)]

use ondemand_agents::StreamingAgent;
use ondemand_core::{Color32, OnDemandSettings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// The colour of texel (0, 0) of [`dxt5_dds`]. Every other texel is
/// [`DXT5_FILL`].
pub const DXT5_CORNER: Color32 = Color32::new(0, 0, 255, 128);
/// The colour of the remaining texels of [`dxt5_dds`].
pub const DXT5_FILL: Color32 = Color32::new(255, 0, 0, 255);

const DDPF_FOURCC: u32 = 0x4;

/// A 4x4 DDS file holding a single DXT5 block.
pub fn dxt5_dds() -> Vec<u8> {
    let mut words = vec![124, 0x1007, 4, 4, 0, 0, 1];
    words.extend([0; 11]);
    // Pixel format: size, flags, FourCC, bit count, four masks.
    words.extend([32, DDPF_FOURCC, u32::from_le_bytes(*b"DXT5"), 0, 0, 0, 0, 0]);
    // Caps 1-4, reserved.
    words.extend([0x1000, 0, 0, 0, 0]);

    let mut out = b"DDS ".to_vec();
    for word in words {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(&[
        255, 128, 0b0000_0001, 0, 0, 0, 0, 0, // alpha: a0, a1, texel 0 takes a1
        0x00, 0xF8, 0x1F, 0x00, 0b0000_0001, 0, 0, 0, // colour: red, blue, texel 0 takes blue
    ]);
    out
}

/// An uncompressed 24-bit TGA of one colour, stored bottom-up.
pub fn solid_tga(width: u16, height: u16, [r, g, b]: [u8; 3]) -> Vec<u8> {
    let mut out = vec![0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend([24, 0]);
    for _ in 0..(width as usize * height as usize) {
        out.extend([b, g, r]);
    }
    out
}

/// A temporary game-data directory.
pub struct GameData {
    dir: TempDir,
}

impl GameData {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file below the root, creating its directories.
    pub fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(path, bytes).expect("Failed to write fixture");
    }

    pub fn settings(&self, unload_delay_secs: f64) -> OnDemandSettings {
        OnDemandSettings {
            unload_delay_secs,
            game_data_root: self.root().to_path_buf(),
            ..Default::default()
        }
    }

    /// A file-backed, initialized agent.
    pub fn agent(&self, unload_delay_secs: f64) -> StreamingAgent {
        let mut agent = StreamingAgent::with_loader(self.settings(unload_delay_secs));
        agent.init().expect("Fixture settings should be valid");
        agent
    }
}
