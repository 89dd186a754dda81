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

//! Acts as the **[A]gent** for texture streaming.
//!
//! The agent decides *when* maps are loaded and unloaded; the decoding lanes
//! and the data layer do the actual work. Relevance signals are debounced by
//! the [`EvictionScheduler`] so that an owner flickering in and out of view
//! does not thrash the disk.

mod agent;
mod scheduler;
mod status;

pub use self::agent::StreamingAgent;
pub use self::scheduler::EvictionScheduler;
pub use self::status::StreamingStatus;
