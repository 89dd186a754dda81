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

use std::fmt;

/// A point-in-time summary of the streaming cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamingStatus {
    /// Maps without a buffer.
    pub unloaded: usize,
    /// Maps mid-load.
    pub loading: usize,
    /// Maps answering queries from memory.
    pub loaded: usize,
    /// Maps whose load failed.
    pub errored: usize,
    /// Maps pinned in memory.
    pub resident: usize,
    /// Maps with an armed eviction timer.
    pub pending_evictions: usize,
    /// Bytes held by loaded maps.
    pub resident_bytes: u64,
}

impl StreamingStatus {
    /// The number of maps counted.
    pub fn total(&self) -> usize {
        self.unloaded + self.loading + self.loaded + self.errored
    }
}

impl fmt::Display for StreamingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded={} unloaded={} loading={} errored={} resident={} pending_evictions={} bytes={}",
            self.loaded,
            self.unloaded,
            self.loading,
            self.errored,
            self.resident,
            self.pending_evictions,
            self.resident_bytes
        )
    }
}
