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

mod common;

use common::{dxt5_dds, GameData};
use ondemand_agents::StreamingAgent;
use ondemand_core::{AssetState, MapDepth, MapDescriptor, MapEvent, OwnerId};
use ondemand_data::{MapFilter, MapId};
use std::time::Duration;

const GRACE_SECS: f64 = 10.0;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// An agent with one DXT5 colour map per owner.
fn setup(owners: &[&str]) -> (GameData, StreamingAgent, Vec<MapId>) {
    let data = GameData::new();
    let mut agent = data.agent(GRACE_SECS);
    let ids = owners
        .iter()
        .map(|owner| {
            let path = format!("{owner}/color.dds");
            data.write(&path, &dxt5_dds());
            agent.register(MapDescriptor::new(
                *owner,
                format!("{owner}Color"),
                path,
                MapDepth::RGBA,
            ))
        })
        .collect();
    (data, agent, ids)
}

fn unload_events(agent: &StreamingAgent) -> usize {
    agent
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, MapEvent::Unloaded { .. }))
        .count()
}

fn state(agent: &StreamingAgent, id: MapId) -> Option<AssetState> {
    agent.map(id).map(|m| m.state())
}

#[test]
fn flickering_relevance_never_unloads() {
    let (_data, mut agent, ids) = setup(&["Duna"]);
    let duna = OwnerId::from("Duna");

    assert_eq!(agent.owner_needed(&duna, MapFilter::All), Some(1));
    agent.tick(secs(1));
    assert_eq!(agent.owner_not_needed(&duna, MapFilter::All), Some(1));
    agent.tick(secs(4));
    agent.owner_needed(&duna, MapFilter::All);
    agent.owner_not_needed(&duna, MapFilter::All);
    agent.tick(secs(4));
    agent.owner_needed(&duna, MapFilter::All);

    // Well past the first deadline, but every timer was cancelled in time.
    for _ in 0..10 {
        assert_eq!(agent.tick(secs(5)), 0);
    }
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Loaded));
    assert_eq!(unload_events(&agent), 0);
    assert_eq!(agent.metrics().snapshot().loads, 1);
}

#[test]
fn a_new_signal_restarts_a_cancelled_timer() {
    let (_data, mut agent, ids) = setup(&["Duna"]);
    let duna = OwnerId::from("Duna");
    agent.owner_needed(&duna, MapFilter::All);

    agent.owner_not_needed(&duna, MapFilter::All); // due at 10
    agent.tick(secs(6));
    agent.owner_needed(&duna, MapFilter::All);
    agent.owner_not_needed(&duna, MapFilter::All); // due at 16
    assert_eq!(agent.tick(secs(6)), 0);
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Loaded));
    assert_eq!(agent.tick(secs(4)), 1);
}

#[test]
fn sustained_irrelevance_unloads_exactly_once() {
    let (_data, mut agent, ids) = setup(&["Duna"]);
    let duna = OwnerId::from("Duna");
    agent.owner_needed(&duna, MapFilter::All);
    agent.owner_not_needed(&duna, MapFilter::All);
    // Repeated signals do not postpone the deadline.
    agent.tick(secs(4));
    assert_eq!(agent.owner_not_needed(&duna, MapFilter::All), Some(0));

    assert_eq!(agent.tick(secs(4)), 0);
    assert_eq!(agent.tick(secs(4)), 1);
    for _ in 0..5 {
        assert_eq!(agent.tick(secs(4)), 0);
    }

    assert_eq!(state(&agent, ids[0]), Some(AssetState::Unloaded));
    assert_eq!(unload_events(&agent), 1);
    let snapshot = agent.metrics().snapshot();
    assert_eq!((snapshot.unloads, snapshot.evictions), (1, 1));
    assert_eq!(snapshot.resident_bytes, 0);
}

#[test]
fn evicted_maps_reload_when_needed_again() {
    let (_data, mut agent, ids) = setup(&["Duna"]);
    let duna = OwnerId::from("Duna");
    agent.owner_needed(&duna, MapFilter::All);
    agent.owner_not_needed(&duna, MapFilter::All);
    assert_eq!(agent.tick(secs(11)), 1);

    assert_eq!(agent.owner_needed(&duna, MapFilter::All), Some(1));
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Loaded));
    assert_eq!(agent.metrics().snapshot().loads, 2);
}

#[test]
fn active_owner_is_never_evicted() {
    let (_data, mut agent, ids) = setup(&["Duna", "Ike"]);
    let (duna, ike) = (OwnerId::from("Duna"), OwnerId::from("Ike"));
    agent.owner_needed(&duna, MapFilter::All);
    agent.owner_needed(&ike, MapFilter::All);
    agent.set_active_owner(Some(duna.clone()));

    agent.owner_not_needed(&duna, MapFilter::All);
    agent.owner_not_needed(&ike, MapFilter::All);
    assert_eq!(agent.tick(secs(11)), 1);
    for _ in 0..10 {
        assert_eq!(agent.tick(secs(30)), 0);
    }
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Loaded));
    assert_eq!(state(&agent, ids[1]), Some(AssetState::Unloaded));
    // The expired timer stays armed while the owner is in the foreground.
    assert!(agent.scheduler().is_pending(ids[0]));

    agent.set_active_owner(None);
    assert_eq!(agent.tick(Duration::ZERO), 1);
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Unloaded));
}

#[test]
fn active_owner_keeps_implicitly_loaded_maps() {
    let (_data, mut agent, ids) = setup(&["Kerbin"]);
    agent.set_active_owner(Some(OwnerId::from("Kerbin")));

    let map = agent.map_mut(ids[0]).expect("registered");
    assert_eq!(map.get_pixel_color32(1, 1).a, 255);
    for _ in 0..5 {
        assert_eq!(agent.tick(secs(60)), 0);
    }
    assert_eq!(state(&agent, ids[0]), Some(AssetState::Loaded));
}

#[test]
fn filters_split_one_owner_between_subsystems() {
    let data = GameData::new();
    data.write("Eve/color.dds", &dxt5_dds());
    data.write("Eve/biomes.dds", &dxt5_dds());
    let mut agent = data.agent(GRACE_SECS);
    let eve = OwnerId::from("Eve");
    let color = agent.register(MapDescriptor::new(
        "Eve",
        "EveColor",
        "Eve/color.dds",
        MapDepth::RGBA,
    ));
    let biomes = agent.register(MapDescriptor::biome(
        "Eve",
        "EveBiomes",
        "Eve/biomes.dds",
        Vec::new(),
    ));

    assert_eq!(agent.owner_needed(&eve, MapFilter::All), Some(2));
    assert_eq!(agent.owner_not_needed(&eve, MapFilter::Biome), Some(1));
    assert_eq!(agent.tick(secs(11)), 1);
    assert_eq!(state(&agent, color), Some(AssetState::Loaded));
    assert_eq!(state(&agent, biomes), Some(AssetState::Unloaded));

    assert_eq!(agent.enable_biome_maps(&eve), Some(1));
    assert_eq!(agent.disable_biome_maps(&eve), Some(1));
    assert_eq!(state(&agent, color), Some(AssetState::Loaded));
}
