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

//! Event primitives for observing the streaming cache.
//!
//! The [`EventBus`] is a generic MPSC channel; [`MapEvent`] is the event type
//! the data layer publishes on every state transition of a map.

mod bus;

pub use self::bus::EventBus;

use std::path::PathBuf;

/// A state transition of a streamed map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// The map finished loading and is now answering queries from memory.
    Loaded {
        /// The logical map name.
        name: String,
        /// The storage path the map was loaded from.
        path: PathBuf,
        /// Width of the adopted buffer.
        width: u32,
        /// Height of the adopted buffer.
        height: u32,
        /// Bytes held by the adopted buffer.
        bytes: usize,
    },
    /// The map dropped its buffer.
    Unloaded {
        /// The logical map name.
        name: String,
    },
    /// Loading failed and the map entered the error state.
    LoadFailed {
        /// The logical map name.
        name: String,
        /// The storage path the load was attempted from.
        path: PathBuf,
        /// The rendered failure.
        reason: String,
    },
}

impl MapEvent {
    /// Returns the name of the map the event is about.
    pub fn name(&self) -> &str {
        match self {
            MapEvent::Loaded { name, .. }
            | MapEvent::Unloaded { name }
            | MapEvent::LoadFailed { name, .. } => name,
        }
    }
}
