//! End-to-end authoring scenarios against the standard type catalog.

use dungeon_core::config::GraphConfig;
use dungeon_core::connection::{ConnectionRejection, can_connect};
use dungeon_core::test_utils::*;
use dungeon_core::traversal;

#[test]
fn entrance_cannot_link_directly_to_a_room() {
    let (mut graph, t, e) = entrance_graph();
    let room = graph.add_node(t.small_room).unwrap();

    assert!(!graph.try_connect(e, room));
    assert_eq!(graph.connect(e, room), Err(ConnectionRejection::RoomToRoom));
    assert!(graph.get_node(e).unwrap().children().is_empty());
}

#[test]
fn corridor_bridges_entrance_and_room() {
    let (mut graph, t, e) = entrance_graph();
    let c = graph.add_node(t.corridor_ew).unwrap();
    let x = graph.add_node(t.small_room).unwrap();
    let y = graph.add_node(t.medium_room).unwrap();

    assert!(graph.try_connect(e, c));
    assert!(graph.try_connect(c, x));
    assert_eq!(
        graph.connect(c, y),
        Err(ConnectionRejection::RoomAfterChild)
    );
    assert_graph_invariants(&graph);
}

#[test]
fn corridor_fan_out_limit_of_one() {
    let (mut graph, t, e) = entrance_graph();
    graph.set_config(GraphConfig::with_max_corridor_children(1));
    let (_, room) = add_corridor_and_room(&mut graph, &t, e, t.large_room);
    let c1 = graph.add_node(t.corridor).unwrap();
    assert!(graph.try_connect(room, c1));

    let c2 = graph.add_node(t.corridor_ns).unwrap();
    assert_eq!(
        graph.connect(room, c2),
        Err(ConnectionRejection::CorridorLimit { max: 1 })
    );
}

#[test]
fn only_one_boss_room_is_ever_wired_in() {
    let (mut graph, t, e) = entrance_graph();
    let (_, room_a) = add_corridor_and_room(&mut graph, &t, e, t.small_room);
    let (_, room_b) = add_corridor_and_room(&mut graph, &t, e, t.medium_room);
    let ca = graph.add_node(t.corridor).unwrap();
    let cb = graph.add_node(t.corridor).unwrap();
    assert!(graph.try_connect(room_a, ca));
    assert!(graph.try_connect(room_b, cb));

    let b1 = graph.add_node(t.boss_room).unwrap();
    let b2 = graph.add_node(t.boss_room).unwrap();
    assert!(graph.try_connect(ca, b1));
    assert_eq!(
        graph.connect(cb, b2),
        Err(ConnectionRejection::BossRoomAlreadyConnected)
    );
    assert_graph_invariants(&graph);
}

#[test]
fn self_links_are_always_refused() {
    let (mut graph, t, e) = entrance_graph();
    let nodes = [
        e,
        graph.add_node(t.corridor).unwrap(),
        graph.add_node(t.small_room).unwrap(),
        graph.add_node(t.boss_room).unwrap(),
        graph.add_node(t.none).unwrap(),
    ];
    for id in nodes {
        assert!(!can_connect(&graph, id, id));
        assert!(!graph.try_connect(id, id));
    }
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn entrance_survives_removal() {
    let (mut graph, t, e) = entrance_graph();
    add_corridor_and_room(&mut graph, &t, e, t.small_room);
    let edges_before: Vec<_> = graph.edges().collect();

    assert!(!graph.remove_node(e));
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edges().collect::<Vec<_>>(), edges_before);
}

#[test]
fn removing_a_middle_room_orphans_its_subtree() {
    let (mut graph, _) = build_chain_dungeon(2);
    let order = traversal::depth_first(&graph);
    // entrance, c, room, c, room, c, boss
    let middle_room = order[2];
    let below = order[3];

    assert!(graph.remove_node(middle_room));
    assert!(graph.get_node(below).unwrap().parents().is_empty());
    assert_eq!(traversal::depth_first(&graph).len(), 2);
    assert_graph_invariants(&graph);
}

#[test]
fn removed_ids_never_come_back() {
    let (mut graph, t, e) = entrance_graph();
    let c = graph.add_node(t.corridor).unwrap();
    assert!(graph.remove_node(c));
    let fresh = graph.add_node(t.corridor).unwrap();
    assert_ne!(c, fresh);
    assert!(graph.get_node(c).is_none());
    assert!(graph.try_connect(e, fresh));
}

#[test]
fn branching_dungeon_holds_every_invariant() {
    let (graph, _) = build_branching_dungeon(3, 3);
    // 1 entrance + per level: corridors and rooms (3 + 9 + 27 each)
    assert_eq!(graph.node_count(), 1 + 2 * (3 + 9 + 27));
    assert_eq!(traversal::breadth_first(&graph).len(), graph.node_count());
    assert_eq!(traversal::leaves(&graph).len(), 27);
    assert_graph_invariants(&graph);
}
