//! Dungeon Core -- room node graphs for procedural dungeon layouts.
//!
//! A room node graph describes the topology a dungeon generator later
//! turns into physical rooms and corridors. This crate owns the data model
//! and the rules that keep every graph a valid blueprint.
//!
//! # Graph Shape
//!
//! Every accepted mutation leaves the graph:
//!
//! - rooted at a single entrance that never gains a parent,
//! - a forest (each node has at most one parent, no cycles),
//! - alternating: every link joins a room and a corridor,
//! - with at most one connected boss room,
//! - with bounded corridor fan-out per room.
//!
//! # Mutation Pattern
//!
//! Mutations are immediate. Refused links and protected deletions report
//! `false` and leave the graph untouched:
//!
//! ```rust,ignore
//! let mut graph = RoomNodeGraph::new("level 1", registry.clone());
//! let entrance = graph.add_node(entrance_type)?;
//! let corridor = graph.add_node(corridor_type)?;
//! assert!(graph.try_connect(entrance, corridor));
//! ```
//!
//! # Key Types
//!
//! - [`registry::RoomNodeTypeRegistry`] -- Immutable catalog of room node
//!   types, passed explicitly to every graph.
//! - [`graph::RoomNodeGraph`] -- Nodes keyed by id with symmetric
//!   parent/child links.
//! - [`connection`] -- The connection rules (`can_connect`).
//! - [`traversal`] -- Read-only walks from the entrance for generators.
//! - [`level::check_level`] -- Advisory cross-check of graphs against room
//!   templates.
//! - [`session::EditorSession`] -- Link dragging and selection for editors.
//! - [`serialize`] -- Versioned binary snapshots via bitcode.

pub mod config;
pub mod connection;
pub mod graph;
pub mod id;
pub mod level;
pub mod registry;
pub mod serialize;
pub mod session;
pub mod traversal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
