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

use super::StreamingMetrics;
use std::time::Instant;

/// A guard that records the time between its creation and its drop as one
/// load attempt.
#[must_use = "the timer records on drop; binding it to `_` drops it immediately"]
pub struct ScopedLoadTimer<'a> {
    start: Instant,
    metrics: &'a StreamingMetrics,
}

impl<'a> ScopedLoadTimer<'a> {
    /// Starts a timer reporting into `metrics`.
    pub fn new(metrics: &'a StreamingMetrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }
}

impl Drop for ScopedLoadTimer<'_> {
    fn drop(&mut self) {
        self.metrics.record_load_time(self.start.elapsed());
    }
}
