//! Authoring example: build a small dungeon the way an editor would,
//! try a few illegal links, then check the level against its templates.
//!
//! Run with: `cargo run -p dungeon-core --example author_dungeon`

use dungeon_core::graph::RoomNodeGraph;
use dungeon_core::level::{DungeonLevel, GridPos, RoomTemplate, check_level};
use dungeon_core::registry::RoomNodeTypeRegistry;
use dungeon_core::session::EditorSession;
use dungeon_core::traversal;
use std::sync::Arc;

fn main() {
    let registry = Arc::new(RoomNodeTypeRegistry::standard());
    let id = |name: &str| registry.id_by_name(name).expect("stock room type");

    let mut graph = RoomNodeGraph::new("first floor", registry.clone());
    let mut session = EditorSession::new();

    // --- Step 1: Create nodes (the entrance appears automatically) ---

    let corridor = session.create_room_node(&mut graph).expect("node created");
    let room = session.create_room_node(&mut graph).expect("node created");
    let corridor_2 = session.create_room_node(&mut graph).expect("node created");
    let boss = session.create_room_node(&mut graph).expect("node created");
    let entrance = graph.entrance().expect("entrance created");

    // --- Step 2: Pick types for the unassigned nodes ---

    graph.set_node_type(corridor, id("Corridor"));
    graph.set_node_type(room, id("Medium Room"));
    graph.set_node_type(corridor_2, id("Corridor"));
    graph.set_node_type(boss, id("Boss Room"));

    // --- Step 3: Drag links ---

    for (from, to) in [(entrance, corridor), (corridor, room), (room, corridor_2), (corridor_2, boss)] {
        session.begin_connection(from);
        let accepted = session.finish_connection(&mut graph, to);
        println!("link {from:?} -> {to:?}: {}", if accepted { "ok" } else { "refused" });
    }

    // Illegal: room straight to room, and a second parent for the boss.
    for (from, to) in [(entrance, room), (corridor, boss)] {
        match graph.connect(from, to) {
            Ok(()) => println!("link {from:?} -> {to:?}: ok"),
            Err(reason) => println!("link {from:?} -> {to:?}: refused ({reason})"),
        }
    }

    // --- Step 4: Walk the dungeon ---

    println!("\nDepth-first from the entrance:");
    for node in traversal::depth_first(&graph) {
        let name = graph.room_type_of(node).map_or("?", |t| t.name.as_str());
        println!("  {node:?} {name}");
    }

    // --- Step 5: Check the level ---

    let mut level = DungeonLevel::new("Level 1", registry.clone());
    for name in ["Entrance", "CorridorNS", "CorridorEW", "Medium Room"] {
        level.templates.push(RoomTemplate {
            name: name.to_lowercase(),
            room_type: id(name),
            lower_bounds: GridPos::new(0, 0),
            upper_bounds: GridPos::new(12, 10),
            doorways: Vec::new(),
            spawn_points: Vec::new(),
        });
    }
    level.graphs.push(graph);

    println!("\nLevel findings:");
    for finding in check_level(&level) {
        println!("  {finding}");
    }
}
