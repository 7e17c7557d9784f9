//! Read-only walks over a room node graph for generators.
//!
//! Every walk starts at the graph's entrance and follows child links in
//! insertion order. A graph without an entrance yields nothing.

use crate::graph::RoomNodeGraph;
use crate::id::RoomNodeId;
use std::collections::{HashSet, VecDeque};

/// Visit order for [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    DepthFirst,
    BreadthFirst,
}

/// All nodes reachable from the entrance, entrance first.
pub fn walk(graph: &RoomNodeGraph, order: Order) -> Vec<RoomNodeId> {
    let Some(entrance) = graph.entrance() else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    let mut out = Vec::new();
    let mut pending = VecDeque::from([entrance]);

    while let Some(id) = match order {
        Order::DepthFirst => pending.pop_back(),
        Order::BreadthFirst => pending.pop_front(),
    } {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = graph.get_node(id) else {
            continue;
        };
        out.push(id);
        match order {
            // Reverse so the first child is popped first.
            Order::DepthFirst => pending.extend(node.children().iter().rev()),
            Order::BreadthFirst => pending.extend(node.children()),
        }
    }
    out
}

pub fn depth_first(graph: &RoomNodeGraph) -> Vec<RoomNodeId> {
    walk(graph, Order::DepthFirst)
}

pub fn breadth_first(graph: &RoomNodeGraph) -> Vec<RoomNodeId> {
    walk(graph, Order::BreadthFirst)
}

/// Reachable nodes with no children: the dead ends and the boss room.
pub fn leaves(graph: &RoomNodeGraph) -> Vec<RoomNodeId> {
    depth_first(graph)
        .into_iter()
        .filter(|&id| {
            graph
                .get_node(id)
                .is_some_and(|n| n.children().is_empty())
        })
        .collect()
}
