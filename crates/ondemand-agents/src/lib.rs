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

//! # OnDemand Agents
//!
//! The stateful driver of the streaming cache. The [`StreamingAgent`] owns the
//! map registry and the eviction scheduler, and turns the host's lifecycle
//! signals (`init`, relevance changes, `tick`, `shutdown`) into map loads and
//! unloads.

#![warn(missing_docs)]

pub mod streaming_agent;

pub use streaming_agent::{EvictionScheduler, StreamingAgent, StreamingStatus};
