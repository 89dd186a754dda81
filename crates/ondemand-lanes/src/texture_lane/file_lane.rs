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

use ondemand_core::LoadError;
use std::{fs::File, io::Read, path::Path};

/// A lane responsible for the I/O half of a load: reading a whole file from
/// disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoadingLane;

impl FileLoadingLane {
    /// Reads every byte of the file at `path`.
    ///
    /// A path that does not name a file is reported as
    /// [`LoadError::Missing`], any other failure as [`LoadError::Io`].
    pub fn read_all(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(io_err)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).map_err(io_err)?;
        Ok(buffer)
    }
}
