//! Binary snapshots of room node graphs.
//!
//! Snapshots are `bitcode`-encoded with a versioned header. The type
//! registry is not stored; it is supplied again on load and every node's
//! type is checked against it, together with link symmetry. Links are then
//! replayed through the connection rules, so a loaded graph satisfies the
//! same invariants as one built by hand.

use crate::config::GraphConfig;
use crate::connection::ConnectionRejection;
use crate::graph::{RoomNode, RoomNodeGraph};
use crate::id::{RoomNodeId, RoomNodeTypeId};
use crate::registry::RoomNodeTypeRegistry;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a room node graph snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xD06E_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("room node type {0:?} is not in the registry")]
    UnknownRoomType(RoomNodeTypeId),
    #[error("node stored under {key:?} claims id {claimed:?}")]
    MismatchedId { key: RoomNodeId, claimed: RoomNodeId },
    #[error("node {from:?} links to missing node {to:?}")]
    DanglingLink { from: RoomNodeId, to: RoomNodeId },
    #[error("link {parent:?} -> {child:?} is only recorded on one side")]
    AsymmetricLink { parent: RoomNodeId, child: RoomNodeId },
    #[error("link {parent:?} -> {child:?} rejected: {reason}")]
    RejectedLink {
        parent: RoomNodeId,
        child: RoomNodeId,
        reason: ConnectionRejection,
    },
}

// ---------------------------------------------------------------------------
// Snapshot layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct GraphSnapshotRef<'a> {
    header: SnapshotHeader,
    name: &'a str,
    config: GraphConfig,
    nodes: &'a SlotMap<RoomNodeId, RoomNode>,
}

#[derive(Deserialize)]
struct GraphSnapshot {
    header: SnapshotHeader,
    name: String,
    config: GraphConfig,
    nodes: SlotMap<RoomNodeId, RoomNode>,
}

// ---------------------------------------------------------------------------
// Graph serialization
// ---------------------------------------------------------------------------

impl RoomNodeGraph {
    /// Serialize the graph (name, config, nodes) to a binary blob.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = GraphSnapshotRef {
            header: SnapshotHeader::new(),
            name: self.name(),
            config: *self.config(),
            nodes: self.raw_nodes(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Rebuild a graph from a snapshot, resolving node types against
    /// `registry`. Node ids are preserved.
    ///
    /// Links are re-added in slot order through
    /// [`connect`](RoomNodeGraph::connect); the first one the rules refuse
    /// fails the load.
    pub fn deserialize(
        data: &[u8],
        registry: Arc<RoomNodeTypeRegistry>,
    ) -> Result<Self, DeserializeError> {
        let snapshot: GraphSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        validate_nodes(&snapshot.nodes, &registry)?;

        let mut nodes = snapshot.nodes;
        let edges: Vec<(RoomNodeId, RoomNodeId)> = nodes
            .iter()
            .flat_map(|(id, n)| n.children().iter().map(move |&c| (id, c)))
            .collect();
        for node in nodes.values_mut() {
            node.clear_links();
        }

        let mut graph = RoomNodeGraph::from_parts(snapshot.name, snapshot.config, registry, nodes);
        for (parent, child) in edges {
            graph
                .connect(parent, child)
                .map_err(|reason| DeserializeError::RejectedLink {
                    parent,
                    child,
                    reason,
                })?;
        }
        Ok(graph)
    }
}

fn validate_nodes(
    nodes: &SlotMap<RoomNodeId, RoomNode>,
    registry: &RoomNodeTypeRegistry,
) -> Result<(), DeserializeError> {
    for (key, node) in nodes {
        if node.id() != key {
            return Err(DeserializeError::MismatchedId {
                key,
                claimed: node.id(),
            });
        }
        if registry.get(node.room_type()).is_none() {
            return Err(DeserializeError::UnknownRoomType(node.room_type()));
        }
        for &child in node.children() {
            let other = nodes
                .get(child)
                .ok_or(DeserializeError::DanglingLink { from: key, to: child })?;
            if !other.parents().contains(&key) {
                return Err(DeserializeError::AsymmetricLink { parent: key, child });
            }
        }
        for &parent in node.parents() {
            let other = nodes
                .get(parent)
                .ok_or(DeserializeError::DanglingLink { from: key, to: parent })?;
            if !other.children().contains(&key) {
                return Err(DeserializeError::AsymmetricLink { parent, child: key });
            }
        }
    }
    Ok(())
}
