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

//! Counters and gauges describing the streaming cache.
//!
//! [`StreamingMetrics`] is shared through an `Arc` by every map of a
//! registry. Updates are relaxed atomics: the numbers are an observability
//! side channel and never drive control decisions.

mod timer;

pub use self::timer::ScopedLoadTimer;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters of the streaming cache.
#[derive(Debug, Default)]
pub struct StreamingMetrics {
    loads: AtomicU64,
    unloads: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
    suppressed_retries: AtomicU64,
    resident_bytes: AtomicU64,
    last_load_micros: AtomicU64,
    total_load_micros: AtomicU64,
}

impl StreamingMetrics {
    /// Creates a zeroed metrics block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful load that made `bytes` resident.
    pub fn record_load(&self, bytes: usize) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.resident_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Records an unload that released `bytes`.
    pub fn record_unload(&self, bytes: usize) {
        self.unloads.fetch_add(1, Ordering::Relaxed);
        // Saturate instead of wrapping if a caller double-reports.
        let _ = self
            .resident_bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(bytes as u64))
            });
    }

    /// Records a load that ended in the error state.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an unload triggered by an expired eviction timer.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a load request swallowed because the map is in the error state.
    pub fn record_suppressed_retry(&self) {
        self.suppressed_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the wall time of one load attempt.
    pub fn record_load_time(&self, elapsed: Duration) {
        let micros = elapsed.as_micros().min(u64::MAX as u128) as u64;
        self.last_load_micros.store(micros, Ordering::Relaxed);
        self.total_load_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Returns the bytes currently held by loaded maps.
    pub fn resident_bytes(&self) -> u64 {
        self.resident_bytes.load(Ordering::Relaxed)
    }

    /// Copies every counter into a plain struct.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            loads: self.loads.load(Ordering::Relaxed),
            unloads: self.unloads.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            suppressed_retries: self.suppressed_retries.load(Ordering::Relaxed),
            resident_bytes: self.resident_bytes.load(Ordering::Relaxed),
            last_load_time: Duration::from_micros(self.last_load_micros.load(Ordering::Relaxed)),
            total_load_time: Duration::from_micros(
                self.total_load_micros.load(Ordering::Relaxed),
            ),
        }
    }
}

/// A point-in-time copy of [`StreamingMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Successful loads.
    pub loads: u64,
    /// Unloads of loaded maps.
    pub unloads: u64,
    /// Loads that ended in the error state.
    pub failures: u64,
    /// Unloads triggered by the eviction scheduler.
    pub evictions: u64,
    /// Load requests swallowed by the error state.
    pub suppressed_retries: u64,
    /// Bytes currently held by loaded maps.
    pub resident_bytes: u64,
    /// Duration of the most recent load attempt.
    pub last_load_time: Duration,
    /// Sum of every load attempt's duration.
    pub total_load_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resident_bytes_follow_loads_and_unloads() {
        let m = StreamingMetrics::new();
        m.record_load(64);
        m.record_load(16);
        m.record_unload(64);
        let s = m.snapshot();
        assert_eq!(s.loads, 2);
        assert_eq!(s.unloads, 1);
        assert_eq!(s.resident_bytes, 16);
    }

    #[test]
    fn resident_bytes_saturate_at_zero() {
        let m = StreamingMetrics::new();
        m.record_load(8);
        m.record_unload(100);
        assert_eq!(m.resident_bytes(), 0);
    }

    #[test]
    fn load_time_accumulates() {
        let m = StreamingMetrics::new();
        m.record_load_time(Duration::from_millis(3));
        m.record_load_time(Duration::from_millis(5));
        let s = m.snapshot();
        assert_eq!(s.last_load_time, Duration::from_millis(5));
        assert_eq!(s.total_load_time, Duration::from_millis(8));
    }
}
