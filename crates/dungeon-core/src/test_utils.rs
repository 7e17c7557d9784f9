//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::graph::RoomNodeGraph;
use crate::id::*;
use crate::registry::RoomNodeTypeRegistry;
use std::sync::Arc;

// ===========================================================================
// Standard type ids
// ===========================================================================

/// Ids of the stock room node types in [`RoomNodeTypeRegistry::standard`].
#[derive(Debug, Clone, Copy)]
pub struct StandardTypes {
    pub none: RoomNodeTypeId,
    pub corridor: RoomNodeTypeId,
    pub corridor_ns: RoomNodeTypeId,
    pub corridor_ew: RoomNodeTypeId,
    pub entrance: RoomNodeTypeId,
    pub small_room: RoomNodeTypeId,
    pub medium_room: RoomNodeTypeId,
    pub large_room: RoomNodeTypeId,
    pub chest_room: RoomNodeTypeId,
    pub boss_room: RoomNodeTypeId,
}

impl StandardTypes {
    pub fn lookup(registry: &RoomNodeTypeRegistry) -> Self {
        let id = |name: &str| {
            registry
                .id_by_name(name)
                .unwrap_or_else(|| panic!("standard registry is missing {name}"))
        };
        Self {
            none: id("None"),
            corridor: id("Corridor"),
            corridor_ns: id("CorridorNS"),
            corridor_ew: id("CorridorEW"),
            entrance: id("Entrance"),
            small_room: id("Small Room"),
            medium_room: id("Medium Room"),
            large_room: id("Large Room"),
            chest_room: id("Chest Room Small"),
            boss_room: id("Boss Room"),
        }
    }
}

// ===========================================================================
// Graph constructors
// ===========================================================================

pub fn standard_registry() -> Arc<RoomNodeTypeRegistry> {
    Arc::new(RoomNodeTypeRegistry::standard())
}

/// An empty graph over the standard registry.
pub fn empty_graph() -> (RoomNodeGraph, StandardTypes) {
    let registry = standard_registry();
    let types = StandardTypes::lookup(&registry);
    (RoomNodeGraph::new("test graph", registry), types)
}

/// A graph holding only an entrance node.
pub fn entrance_graph() -> (RoomNodeGraph, StandardTypes, RoomNodeId) {
    let (mut graph, types) = empty_graph();
    let entrance = graph.add_node(types.entrance).unwrap();
    (graph, types, entrance)
}

/// Append a corridor and a room of `room_type` below `parent`.
/// Returns `(corridor, room)`.
pub fn add_corridor_and_room(
    graph: &mut RoomNodeGraph,
    types: &StandardTypes,
    parent: RoomNodeId,
    room_type: RoomNodeTypeId,
) -> (RoomNodeId, RoomNodeId) {
    let corridor = graph.add_node(types.corridor).unwrap();
    let room = graph.add_node(room_type).unwrap();
    assert!(graph.try_connect(parent, corridor), "parent -> corridor refused");
    assert!(graph.try_connect(corridor, room), "corridor -> room refused");
    (corridor, room)
}

/// Entrance -> corridor -> room -> corridor -> ... ending in the boss room.
/// `rooms` counts the rooms between the entrance and the boss.
pub fn build_chain_dungeon(rooms: usize) -> (RoomNodeGraph, StandardTypes) {
    let (mut graph, types, entrance) = entrance_graph();
    let mut tail = entrance;
    for _ in 0..rooms {
        let (_, room) = add_corridor_and_room(&mut graph, &types, tail, types.small_room);
        tail = room;
    }
    add_corridor_and_room(&mut graph, &types, tail, types.boss_room);
    (graph, types)
}

/// A full tree: every room branches into `fan_out` corridors, each leading
/// to one room, `depth` levels deep.
pub fn build_branching_dungeon(depth: usize, fan_out: usize) -> (RoomNodeGraph, StandardTypes) {
    let (mut graph, types, entrance) = entrance_graph();
    let mut frontier = vec![entrance];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(frontier.len() * fan_out);
        for &room in &frontier {
            for _ in 0..fan_out {
                let (_, child) = add_corridor_and_room(&mut graph, &types, room, types.medium_room);
                next.push(child);
            }
        }
        frontier = next;
    }
    (graph, types)
}

// ===========================================================================
// Invariant checks
// ===========================================================================

/// Panics with a description if any structural invariant is broken.
pub fn assert_graph_invariants(graph: &RoomNodeGraph) {
    let mut connected_bosses = 0;
    for (id, node) in graph.nodes() {
        let room_type = graph.room_type_of(id).expect("node type resolves");
        assert!(!node.parents().contains(&id), "{id:?} is its own parent");
        assert!(!node.children().contains(&id), "{id:?} is its own child");
        if !room_type.is_entrance {
            assert!(node.parents().len() <= 1, "{id:?} has several parents");
        } else {
            assert!(node.parents().is_empty(), "entrance {id:?} has a parent");
        }
        if room_type.is_boss_room && node.has_parent() {
            connected_bosses += 1;
        }
        for &child in node.children() {
            let child_node = graph.get_node(child).expect("child exists");
            assert!(
                child_node.parents().contains(&id),
                "{id:?} -> {child:?} missing back link"
            );
            let child_type = graph.room_type_of(child).expect("child type resolves");
            assert_ne!(
                room_type.is_corridor, child_type.is_corridor,
                "{id:?} -> {child:?} does not alternate"
            );
        }
        for &parent in node.parents() {
            let parent_node = graph.get_node(parent).expect("parent exists");
            assert!(
                parent_node.children().contains(&id),
                "{parent:?} -> {id:?} missing forward link"
            );
        }
    }
    assert!(connected_bosses <= 1, "{connected_bosses} boss rooms connected");
    assert!(is_acyclic(graph), "graph contains a cycle");
}

/// Depth-first cycle check following child links.
pub fn is_acyclic(graph: &RoomNodeGraph) -> bool {
    use std::collections::HashMap;

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(graph: &RoomNodeGraph, id: RoomNodeId, marks: &mut HashMap<RoomNodeId, Mark>) -> bool {
        match marks.get(&id) {
            Some(Mark::Visiting) => return false,
            Some(Mark::Done) => return true,
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        if let Some(node) = graph.get_node(id) {
            for &child in node.children() {
                if !visit(graph, child, marks) {
                    return false;
                }
            }
        }
        marks.insert(id, Mark::Done);
        true
    }

    let mut marks = HashMap::new();
    graph.nodes().all(|(id, _)| visit(graph, id, &mut marks))
}
