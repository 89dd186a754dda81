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

//! Error types shared by the decoding lanes and the streaming data layer.

use std::path::PathBuf;
use thiserror::Error;

/// An error raised while turning encoded bytes into a [`DecodedImage`].
///
/// [`DecodedImage`]: crate::DecodedImage
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container's magic number did not match.
    #[error("bad magic number")]
    BadMagic,
    /// The buffer ended before the header or pixel data was complete.
    #[error("truncated data: needed {needed} bytes, {available} available")]
    Truncated {
        /// The number of bytes required.
        needed: usize,
        /// The number of bytes present.
        available: usize,
    },
    /// The encoding is recognised but not supported.
    #[error("unsupported format: {0}")]
    Unsupported(String),
    /// The header is internally inconsistent.
    #[error("corrupt data: {0}")]
    Corrupt(String),
    /// The generic container decoder failed.
    #[error("image decoding failed: {0}")]
    Image(#[from] ::image::ImageError),
}

impl DecodeError {
    /// Returns `Truncated` if `available < needed`.
    pub fn check_len(needed: usize, available: usize) -> Result<(), DecodeError> {
        if available < needed {
            Err(DecodeError::Truncated { needed, available })
        } else {
            Ok(())
        }
    }
}

/// An error raised by a [`TextureSource`] while producing a decoded image.
///
/// [`TextureSource`]: crate::TextureSource
#[derive(Debug, Error)]
pub enum LoadError {
    /// No file exists at the resolved path.
    #[error("texture not found: {}", .0.display())]
    Missing(PathBuf),
    /// The file exists but could not be read.
    #[error("failed to read texture '{}': {source}", path.display())]
    Io {
        /// The resolved path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its content could not be decoded.
    #[error("failed to decode texture '{}': {source}", path.display())]
    Decode {
        /// The resolved path.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: DecodeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len_reports_both_sizes() {
        assert!(DecodeError::check_len(4, 4).is_ok());
        match DecodeError::check_len(128, 3) {
            Err(DecodeError::Truncated { needed, available }) => {
                assert_eq!(needed, 128);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_error_messages_include_path() {
        let err = LoadError::Decode {
            path: PathBuf::from("Duna/height.dds"),
            source: DecodeError::BadMagic,
        };
        let msg = err.to_string();
        assert!(msg.contains("Duna/height.dds"));
        assert!(msg.contains("bad magic"));
        assert!(LoadError::Missing(PathBuf::from("x.png"))
            .to_string()
            .contains("x.png"));
    }
}
