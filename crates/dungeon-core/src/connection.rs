//! Connection rules for room node graphs.
//!
//! A link `parent -> child` is accepted only when none of the rules below
//! refuses it. The rules are evaluated in a fixed order and the first
//! failing one is reported:
//!
//! 1. no self-loop
//! 2. no duplicate link
//! 3. no immediate two-node cycle
//! 4. the unassigned placeholder is never a child
//! 5. the entrance is never a child
//! 6. a node has at most one parent
//! 7. at most one boss room is connected
//! 8. corridors never link to corridors
//! 9. rooms never link to rooms
//! 10. corridor fan-out per node is bounded by the graph config
//! 11. a node that already has a child never gains a room child
//! 12. the child is not an ancestor of the parent (no longer cycles)
//!
//! Together these keep every graph a forest whose links alternate between
//! rooms and corridors, rooted at the entrance.

use crate::graph::RoomNodeGraph;
use crate::id::{RoomNodeId, RoomNodeTypeId};

/// The rule that refused a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionRejection {
    #[error("parent node {0:?} not found")]
    ParentNotFound(RoomNodeId),
    #[error("child node {0:?} not found")]
    ChildNotFound(RoomNodeId),
    #[error("room node type {0:?} is not in the registry")]
    UnknownRoomType(RoomNodeTypeId),
    #[error("a node cannot be linked to itself")]
    SelfLoop,
    #[error("the nodes are already linked")]
    AlreadyConnected,
    #[error("the child is already the parent's parent")]
    ReverseLink,
    #[error("an unassigned node cannot be a child")]
    UnassignedChild,
    #[error("the entrance cannot be a child")]
    EntranceChild,
    #[error("the child already has a parent")]
    ChildHasParent,
    #[error("another boss room is already connected")]
    BossRoomAlreadyConnected,
    #[error("corridors cannot link to corridors")]
    CorridorToCorridor,
    #[error("rooms cannot link to rooms")]
    RoomToRoom,
    #[error("the parent already has {max} corridor children")]
    CorridorLimit { max: usize },
    #[error("the parent already has a child and cannot gain a room child")]
    RoomAfterChild,
    #[error("the child is an ancestor of the parent")]
    WouldCreateCycle,
}

/// Whether `parent -> child` may be added to `graph`.
///
/// Unknown ids are a plain `false`, never a panic.
pub fn can_connect(graph: &RoomNodeGraph, parent: RoomNodeId, child: RoomNodeId) -> bool {
    check_connection(graph, parent, child).is_ok()
}

/// Evaluate every connection rule in order and report the first that fails.
pub fn check_connection(
    graph: &RoomNodeGraph,
    parent: RoomNodeId,
    child: RoomNodeId,
) -> Result<(), ConnectionRejection> {
    let parent_node = graph
        .get_node(parent)
        .ok_or(ConnectionRejection::ParentNotFound(parent))?;
    let child_node = graph
        .get_node(child)
        .ok_or(ConnectionRejection::ChildNotFound(child))?;
    let parent_type = graph
        .type_of(parent_node)
        .ok_or(ConnectionRejection::UnknownRoomType(parent_node.room_type()))?;
    let child_type = graph
        .type_of(child_node)
        .ok_or(ConnectionRejection::UnknownRoomType(child_node.room_type()))?;

    if parent == child {
        return Err(ConnectionRejection::SelfLoop);
    }
    if parent_node.children().contains(&child) {
        return Err(ConnectionRejection::AlreadyConnected);
    }
    if parent_node.parents().contains(&child) {
        return Err(ConnectionRejection::ReverseLink);
    }
    if child_type.is_none {
        return Err(ConnectionRejection::UnassignedChild);
    }
    if child_type.is_entrance {
        return Err(ConnectionRejection::EntranceChild);
    }
    if child_node.has_parent() {
        return Err(ConnectionRejection::ChildHasParent);
    }
    if child_type.is_boss_room && boss_room_connected(graph) {
        return Err(ConnectionRejection::BossRoomAlreadyConnected);
    }
    if parent_type.is_corridor && child_type.is_corridor {
        return Err(ConnectionRejection::CorridorToCorridor);
    }
    if !parent_type.is_corridor && !child_type.is_corridor {
        return Err(ConnectionRejection::RoomToRoom);
    }

    let max = graph.config().max_corridor_children;
    if child_type.is_corridor && parent_node.children().len() >= max {
        return Err(ConnectionRejection::CorridorLimit { max });
    }
    if !child_type.is_corridor && !parent_node.children().is_empty() {
        return Err(ConnectionRejection::RoomAfterChild);
    }
    if is_ancestor(graph, child, parent) {
        return Err(ConnectionRejection::WouldCreateCycle);
    }

    Ok(())
}

/// True if any boss-type node already has a parent.
fn boss_room_connected(graph: &RoomNodeGraph) -> bool {
    graph
        .nodes()
        .any(|(_, n)| n.has_parent() && graph.type_of(n).is_some_and(|t| t.is_boss_room))
}

/// Walk the parent chain upward from `node` looking for `candidate`.
fn is_ancestor(graph: &RoomNodeGraph, candidate: RoomNodeId, node: RoomNodeId) -> bool {
    let mut current = node;
    // Bounded by node count so a corrupted chain cannot spin forever.
    for _ in 0..graph.node_count() {
        let Some(&up) = graph.get_node(current).and_then(|n| n.parents().first()) else {
            return false;
        };
        if up == candidate {
            return true;
        }
        current = up;
    }
    false
}
