//! Editor-side state that drives a graph without living inside it.
//!
//! An [`EditorSession`] remembers the node a link is being dragged from and
//! which nodes are selected. Every structural change goes through the
//! graph's own entry points, so the session can never break an invariant.

use crate::graph::{GraphError, RoomNodeGraph};
use crate::id::RoomNodeId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pending_edge_source: Option<RoomNodeId>,
    selection: BTreeSet<RoomNodeId>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Link dragging
    // -----------------------------------------------------------------------

    pub fn begin_connection(&mut self, source: RoomNodeId) {
        self.pending_edge_source = Some(source);
    }

    pub fn cancel_connection(&mut self) {
        self.pending_edge_source = None;
    }

    pub fn pending_edge_source(&self) -> Option<RoomNodeId> {
        self.pending_edge_source
    }

    /// Drop the dragged link on `target`. The pending source is cleared
    /// whether or not the graph accepts the link.
    pub fn finish_connection(&mut self, graph: &mut RoomNodeGraph, target: RoomNodeId) -> bool {
        match self.pending_edge_source.take() {
            Some(source) => graph.try_connect(source, target),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Node creation
    // -----------------------------------------------------------------------

    /// Create an unassigned node. The first node created in an empty graph
    /// is preceded by the entrance, so every authored graph has its root.
    pub fn create_room_node(&mut self, graph: &mut RoomNodeGraph) -> Result<RoomNodeId, GraphError> {
        let registry = graph.registry().clone();
        if graph.is_empty() {
            let entrance = registry
                .entrance_type()
                .ok_or(GraphError::MissingSpecialType("entrance"))?;
            graph.add_node(entrance)?;
        }
        let none = registry
            .none_type()
            .ok_or(GraphError::MissingSpecialType("none"))?;
        graph.add_node(none)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn toggle_selected(&mut self, id: RoomNodeId) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    pub fn is_selected(&self, id: RoomNodeId) -> bool {
        self.selection.contains(&id)
    }

    pub fn select_all(&mut self, graph: &RoomNodeGraph) {
        self.selection = graph.nodes().map(|(id, _)| id).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.selection.iter().copied()
    }

    /// Remove every link whose two ends are both selected.
    pub fn delete_selected_links(&mut self, graph: &mut RoomNodeGraph) {
        let doomed: Vec<(RoomNodeId, RoomNodeId)> = graph
            .edges()
            .filter(|(p, c)| self.is_selected(*p) && self.is_selected(*c))
            .collect();
        for (parent, child) in doomed {
            graph.disconnect(parent, child);
        }
        self.clear_selection();
    }

    /// Remove every selected node except the entrance. Returns how many
    /// nodes were removed.
    pub fn delete_selected_nodes(&mut self, graph: &mut RoomNodeGraph) -> usize {
        let selected: Vec<RoomNodeId> = self.selection.iter().copied().collect();
        let removed = selected
            .into_iter()
            .filter(|&id| graph.remove_node(id))
            .count();
        if self.pending_edge_source.is_some_and(|s| !graph.contains_node(s)) {
            self.pending_edge_source = None;
        }
        self.clear_selection();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RoomNodeType, RoomNodeTypeRegistryBuilder};
    use crate::test_utils::*;
    use std::sync::Arc;

    #[test]
    fn first_node_brings_the_entrance() {
        let (mut graph, t) = empty_graph();
        let mut session = EditorSession::new();

        let first = session.create_room_node(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.entrance().is_some());
        assert_eq!(graph.get_node(first).unwrap().room_type(), t.none);

        session.create_room_node(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn create_without_special_types_fails() {
        let mut b = RoomNodeTypeRegistryBuilder::new();
        b.register(RoomNodeType::room("Only Room"));
        let mut graph = RoomNodeGraph::new("bare", Arc::new(b.build().unwrap()));
        let result = EditorSession::new().create_room_node(&mut graph);
        assert_eq!(result, Err(GraphError::MissingSpecialType("entrance")));
        assert!(graph.is_empty());
    }

    #[test]
    fn drag_link_connects_and_clears() {
        let (mut graph, t, e) = entrance_graph();
        let c = graph.add_node(t.corridor).unwrap();
        let mut session = EditorSession::new();

        session.begin_connection(e);
        assert_eq!(session.pending_edge_source(), Some(e));
        assert!(session.finish_connection(&mut graph, c));
        assert!(session.pending_edge_source().is_none());
        assert_eq!(graph.get_node(e).unwrap().children(), &[c]);
    }

    #[test]
    fn rejected_drag_still_clears() {
        let (mut graph, t, e) = entrance_graph();
        let r = graph.add_node(t.small_room).unwrap();
        let mut session = EditorSession::new();

        session.begin_connection(e);
        assert!(!session.finish_connection(&mut graph, r));
        assert!(session.pending_edge_source().is_none());
        assert!(!session.finish_connection(&mut graph, r));
    }

    #[test]
    fn delete_links_between_selected_nodes_only() {
        let (mut graph, t, e) = entrance_graph();
        let (c, r) = add_corridor_and_room(&mut graph, &t, e, t.small_room);
        let mut session = EditorSession::new();

        session.toggle_selected(c);
        session.toggle_selected(r);
        session.delete_selected_links(&mut graph);

        assert_eq!(graph.get_node(e).unwrap().children(), &[c]);
        assert!(graph.get_node(c).unwrap().children().is_empty());
        assert!(graph.get_node(r).unwrap().parents().is_empty());
        assert!(!session.is_selected(c));
    }

    #[test]
    fn delete_all_keeps_the_entrance() {
        let (mut graph, t, e) = entrance_graph();
        add_corridor_and_room(&mut graph, &t, e, t.small_room);
        let mut session = EditorSession::new();

        session.select_all(&graph);
        assert_eq!(session.selection().count(), 3);
        assert_eq!(session.delete_selected_nodes(&mut graph), 2);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.get_node(e).unwrap().children().is_empty());
        assert_eq!(session.selection().count(), 0);
    }

    #[test]
    fn deleting_the_drag_source_cancels_the_drag() {
        let (mut graph, t, e) = entrance_graph();
        let c = graph.add_node(t.corridor).unwrap();
        let r = graph.add_node(t.small_room).unwrap();
        let mut session = EditorSession::new();

        session.begin_connection(c);
        session.toggle_selected(r);
        assert_eq!(session.delete_selected_nodes(&mut graph), 1);
        assert_eq!(session.pending_edge_source(), Some(c));

        session.toggle_selected(c);
        assert_eq!(session.delete_selected_nodes(&mut graph), 1);
        assert!(session.pending_edge_source().is_none());
        assert!(!session.finish_connection(&mut graph, e));
    }

    #[test]
    fn toggle_selection() {
        let (_, _, e) = entrance_graph();
        let mut session = EditorSession::new();
        session.toggle_selected(e);
        assert!(session.is_selected(e));
        session.toggle_selected(e);
        assert!(!session.is_selected(e));
    }
}
