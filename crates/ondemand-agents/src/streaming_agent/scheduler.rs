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

//! Debounced eviction timers.

use ondemand_data::MapId;
use std::collections::HashMap;
use std::time::Duration;

/// Per-map deferred unloads.
///
/// A map that stops being needed gets a deadline `now + grace`. Becoming
/// needed again before the deadline cancels it. Times are agent time, as
/// advanced by the host's ticks.
#[derive(Debug, Clone, Default)]
pub struct EvictionScheduler {
    grace: Duration,
    deadlines: HashMap<MapId, Duration>,
}

impl EvictionScheduler {
    /// Creates a scheduler with the given grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            deadlines: HashMap::new(),
        }
    }

    /// The grace period.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Arms a timer for `id` unless one is already pending.
    ///
    /// Returns whether a new timer was armed. A pending timer keeps its
    /// original deadline, so repeated signals cannot postpone an eviction.
    pub fn mark_unneeded(&mut self, id: MapId, now: Duration) -> bool {
        if self.deadlines.contains_key(&id) {
            return false;
        }
        let deadline = now.saturating_add(self.grace);
        log::trace!("Eviction of {} scheduled at {:?}", id, deadline);
        self.deadlines.insert(id, deadline);
        true
    }

    /// Cancels the pending timer of `id`. Returns whether one was pending.
    pub fn mark_needed(&mut self, id: MapId) -> bool {
        let cancelled = self.deadlines.remove(&id).is_some();
        if cancelled {
            log::trace!("Eviction of {} cancelled", id);
        }
        cancelled
    }

    /// Removes and returns every map whose deadline has passed, earliest
    /// first.
    ///
    /// Maps for which `protect` answers `true` are left armed and will be
    /// reconsidered on the next call.
    pub fn take_due(&mut self, now: Duration, protect: impl Fn(MapId) -> bool) -> Vec<MapId> {
        let mut due: Vec<(Duration, MapId)> = self
            .deadlines
            .iter()
            .filter(|(id, deadline)| **deadline <= now && !protect(**id))
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort_unstable();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether `id` has a pending timer.
    pub fn is_pending(&self, id: MapId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// The deadline of `id`, if armed.
    pub fn deadline(&self, id: MapId) -> Option<Duration> {
        self.deadlines.get(&id).copied()
    }

    /// The number of pending timers.
    pub fn pending_count(&self) -> usize {
        self.deadlines.len()
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Duration = Duration::from_secs(10);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn pending_timer_keeps_its_deadline() {
        let mut scheduler = EvictionScheduler::new(GRACE);
        let id = MapId::from_raw(0);
        assert!(scheduler.mark_unneeded(id, secs(0)));
        assert!(!scheduler.mark_unneeded(id, secs(5)));
        assert_eq!(scheduler.deadline(id), Some(secs(10)));
    }

    #[test]
    fn cancel_before_deadline_prevents_eviction() {
        let mut scheduler = EvictionScheduler::new(GRACE);
        let id = MapId::from_raw(3);
        scheduler.mark_unneeded(id, secs(0));
        assert!(scheduler.mark_needed(id));
        assert!(!scheduler.mark_needed(id));
        assert!(scheduler.take_due(secs(60), |_| false).is_empty());
    }

    #[test]
    fn due_maps_are_returned_once_in_deadline_order() {
        let mut scheduler = EvictionScheduler::new(GRACE);
        let (a, b, c) = (MapId::from_raw(0), MapId::from_raw(1), MapId::from_raw(2));
        scheduler.mark_unneeded(b, secs(1));
        scheduler.mark_unneeded(a, secs(2));
        scheduler.mark_unneeded(c, secs(30));

        assert!(scheduler.take_due(secs(10), |_| false).is_empty());
        assert_eq!(scheduler.take_due(secs(12), |_| false), vec![b, a]);
        assert!(scheduler.take_due(secs(12), |_| false).is_empty());
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(c));
    }

    #[test]
    fn protected_maps_stay_armed() {
        let mut scheduler = EvictionScheduler::new(GRACE);
        let (a, b) = (MapId::from_raw(0), MapId::from_raw(1));
        scheduler.mark_unneeded(a, secs(0));
        scheduler.mark_unneeded(b, secs(0));

        assert_eq!(scheduler.take_due(secs(20), |id| id == a), vec![b]);
        assert!(scheduler.is_pending(a));
        assert_eq!(scheduler.take_due(secs(21), |_| false), vec![a]);
    }

    #[test]
    fn zero_grace_is_due_immediately() {
        let mut scheduler = EvictionScheduler::new(Duration::ZERO);
        let id = MapId::from_raw(7);
        scheduler.mark_unneeded(id, secs(4));
        assert_eq!(scheduler.take_due(secs(4), |_| false), vec![id]);
        scheduler.mark_unneeded(id, secs(4));
        scheduler.clear();
        assert_eq!(scheduler.pending_count(), 0);
    }
}
