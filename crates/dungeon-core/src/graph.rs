use crate::config::GraphConfig;
use crate::connection::{self, ConnectionRejection};
use crate::id::*;
use crate::registry::{RoomNodeType, RoomNodeTypeRegistry};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when creating nodes.
///
/// Structural rejections (refused edges, protected deletions) are not
/// errors; those operations report `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("room node type {0:?} is not in the registry")]
    UnknownRoomType(RoomNodeTypeId),
    #[error("registry has no {0} room node type")]
    MissingSpecialType(&'static str),
}

// ---------------------------------------------------------------------------
// RoomNode
// ---------------------------------------------------------------------------

/// A single vertex of a room node graph.
///
/// Parent and child lists have set semantics: the connection rules never
/// admit a duplicate. They are kept in insertion order so traversal is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNode {
    id: RoomNodeId,
    room_type: RoomNodeTypeId,
    parents: Vec<RoomNodeId>,
    children: Vec<RoomNodeId>,
}

impl RoomNode {
    pub fn id(&self) -> RoomNodeId {
        self.id
    }

    pub fn room_type(&self) -> RoomNodeTypeId {
        self.room_type
    }

    pub fn parents(&self) -> &[RoomNodeId] {
        &self.parents
    }

    pub fn children(&self) -> &[RoomNodeId] {
        &self.children
    }

    pub fn has_parent(&self) -> bool {
        !self.parents.is_empty()
    }

    pub(crate) fn clear_links(&mut self) {
        self.parents.clear();
        self.children.clear();
    }
}

/// Raw access for building corrupted snapshots in tests.
#[cfg(test)]
impl RoomNode {
    pub(crate) fn set_id(&mut self, id: RoomNodeId) {
        self.id = id;
    }

    pub(crate) fn parents_mut(&mut self) -> &mut Vec<RoomNodeId> {
        &mut self.parents
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<RoomNodeId> {
        &mut self.children
    }
}

// ---------------------------------------------------------------------------
// RoomNodeGraph
// ---------------------------------------------------------------------------

/// The topology of one dungeon layout: room nodes keyed by id, with
/// parent/child links kept symmetric across every mutation.
///
/// Node types are resolved through a shared, immutable registry passed in
/// at construction.
#[derive(Debug, Clone)]
pub struct RoomNodeGraph {
    name: String,
    config: GraphConfig,
    registry: Arc<RoomNodeTypeRegistry>,
    nodes: SlotMap<RoomNodeId, RoomNode>,
}

impl RoomNodeGraph {
    /// Create a new, empty graph with the default configuration.
    pub fn new(name: &str, registry: Arc<RoomNodeTypeRegistry>) -> Self {
        Self::with_config(name, registry, GraphConfig::default())
    }

    pub fn with_config(
        name: &str,
        registry: Arc<RoomNodeTypeRegistry>,
        config: GraphConfig,
    ) -> Self {
        Self {
            name: name.to_string(),
            config,
            registry,
            nodes: SlotMap::with_key(),
        }
    }

    /// Reassemble a graph from stored parts. The caller is responsible for
    /// having checked node types; links are expected to be empty or valid.
    pub(crate) fn from_parts(
        name: String,
        config: GraphConfig,
        registry: Arc<RoomNodeTypeRegistry>,
        nodes: SlotMap<RoomNodeId, RoomNode>,
    ) -> Self {
        Self {
            name,
            config,
            registry,
            nodes,
        }
    }

    pub(crate) fn raw_nodes(&self) -> &SlotMap<RoomNodeId, RoomNode> {
        &self.nodes
    }

    #[cfg(test)]
    pub(crate) fn raw_node_mut(&mut self, id: RoomNodeId) -> Option<&mut RoomNode> {
        self.nodes.get_mut(id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert a new node of the given type with no links. Returns its id.
    pub fn add_node(&mut self, room_type: RoomNodeTypeId) -> Result<RoomNodeId, GraphError> {
        if self.registry.get(room_type).is_none() {
            return Err(GraphError::UnknownRoomType(room_type));
        }
        let id = self.nodes.insert_with_key(|id| RoomNode {
            id,
            room_type,
            parents: Vec::new(),
            children: Vec::new(),
        });
        tracing::trace!(graph = %self.name, node = ?id, ?room_type, "room node added");
        Ok(id)
    }

    /// Remove a node and every link that touches it.
    ///
    /// Returns `false` without changing anything if the node does not exist
    /// or is the entrance.
    pub fn remove_node(&mut self, id: RoomNodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if self.type_of(node).is_some_and(|t| t.is_entrance) {
            tracing::debug!(graph = %self.name, node = ?id, "refusing to remove the entrance");
            return false;
        }

        let parents = node.parents.clone();
        let children = node.children.clone();
        for parent in parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for child in children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parents.retain(|&p| p != id);
            }
        }
        self.nodes.remove(id);
        tracing::trace!(graph = %self.name, node = ?id, "room node removed");
        true
    }

    /// Link `parent -> child` if the connection rules allow it.
    pub fn try_connect(&mut self, parent: RoomNodeId, child: RoomNodeId) -> bool {
        self.connect(parent, child).is_ok()
    }

    /// Like [`try_connect`](Self::try_connect), but reports which rule
    /// refused the link. The graph is unchanged on rejection.
    pub fn connect(
        &mut self,
        parent: RoomNodeId,
        child: RoomNodeId,
    ) -> Result<(), ConnectionRejection> {
        if let Err(reason) = connection::check_connection(self, parent, child) {
            tracing::debug!(graph = %self.name, ?parent, ?child, %reason, "connection rejected");
            return Err(reason);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parents.push(parent);
        }
        tracing::trace!(graph = %self.name, ?parent, ?child, "room nodes connected");
        Ok(())
    }

    /// Remove the `parent -> child` link. A missing link or node is a no-op.
    pub fn disconnect(&mut self, parent: RoomNodeId, child: RoomNodeId) {
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parents.retain(|&p| p != parent);
        }
    }

    /// Change the type of a node, as an editor type picker would.
    ///
    /// Only unparented, non-entrance nodes may be retyped, never into the
    /// entrance, and a node that already has children keeps its corridor
    /// or room nature so existing links stay alternating.
    pub fn set_node_type(&mut self, id: RoomNodeId, room_type: RoomNodeTypeId) -> bool {
        let Some(new_type) = self.registry.get(room_type) else {
            return false;
        };
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let Some(current) = self.type_of(node) else {
            return false;
        };
        if current.is_entrance || new_type.is_entrance || node.has_parent() {
            return false;
        }
        if !node.children.is_empty() && current.is_corridor != new_type.is_corridor {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.room_type = room_type;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GraphConfig) {
        self.config = config;
    }

    pub fn registry(&self) -> &Arc<RoomNodeTypeRegistry> {
        &self.registry
    }

    pub fn get_node(&self, id: RoomNodeId) -> Option<&RoomNode> {
        self.nodes.get(id)
    }

    /// Resolve the type descriptor of a node.
    pub fn room_type_of(&self, id: RoomNodeId) -> Option<&RoomNodeType> {
        self.nodes.get(id).and_then(|n| self.type_of(n))
    }

    pub(crate) fn type_of(&self, node: &RoomNode) -> Option<&RoomNodeType> {
        self.registry.get(node.room_type)
    }

    pub fn contains_node(&self, id: RoomNodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in stable slot order.
    pub fn nodes(&self) -> impl Iterator<Item = (RoomNodeId, &RoomNode)> {
        self.nodes.iter()
    }

    /// Iterate over all links as `(parent, child)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (RoomNodeId, RoomNodeId)> + '_ {
        self.nodes
            .iter()
            .flat_map(|(id, n)| n.children.iter().map(move |&c| (id, c)))
    }

    /// The first node whose type is the entrance.
    pub fn entrance(&self) -> Option<RoomNodeId> {
        self.nodes_where(|t| t.is_entrance).next()
    }

    /// Nodes whose type satisfies `pred`, in slot order.
    pub fn nodes_where<'a>(
        &'a self,
        pred: impl Fn(&RoomNodeType) -> bool + 'a,
    ) -> impl Iterator<Item = RoomNodeId> + 'a {
        self.nodes
            .iter()
            .filter(move |(_, n)| self.type_of(n).is_some_and(&pred))
            .map(|(id, _)| id)
    }
}
