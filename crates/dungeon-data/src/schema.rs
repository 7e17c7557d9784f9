//! Serde data file structs for dungeon assets.
//!
//! These structs define the on-disk format for room node types, room
//! templates, room node graphs, dungeon levels and graph settings. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into
//! `dungeon-core` types by the loader. Cross-references are by name.

use dungeon_core::config::{DEFAULT_MAX_CORRIDOR_CHILDREN, GraphConfig};
use dungeon_core::level::{Doorway, GridPos};
use dungeon_core::registry::RoomNodeType;
use serde::Deserialize;

// ===========================================================================
// Room node types
// ===========================================================================

/// A room node type definition. Flags default to `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomNodeTypeData {
    pub name: String,
    #[serde(default)]
    pub is_corridor: bool,
    #[serde(default)]
    pub is_corridor_ns: bool,
    #[serde(default)]
    pub is_corridor_ew: bool,
    #[serde(default)]
    pub is_entrance: bool,
    #[serde(default)]
    pub is_boss_room: bool,
    #[serde(default)]
    pub is_none: bool,
    #[serde(default = "default_true")]
    pub visible_in_editor: bool,
}

fn default_true() -> bool {
    true
}

impl From<RoomNodeTypeData> for RoomNodeType {
    fn from(data: RoomNodeTypeData) -> Self {
        RoomNodeType {
            name: data.name,
            is_corridor: data.is_corridor,
            is_corridor_ns: data.is_corridor_ns,
            is_corridor_ew: data.is_corridor_ew,
            is_entrance: data.is_entrance,
            is_boss_room: data.is_boss_room,
            is_none: data.is_none,
            visible_in_editor: data.visible_in_editor,
        }
    }
}

// ===========================================================================
// Room templates
// ===========================================================================

/// A room template. `room_type` names an entry in `room_node_types`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomTemplateData {
    pub name: String,
    pub room_type: String,
    pub lower_bounds: GridPos,
    pub upper_bounds: GridPos,
    #[serde(default)]
    pub doorways: Vec<Doorway>,
    #[serde(default)]
    pub spawn_points: Vec<GridPos>,
}

// ===========================================================================
// Room node graphs
// ===========================================================================

/// A stored room node graph.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomNodeGraphData {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<RoomNodeData>,
}

/// One node of a stored graph. `id` is a token unique within the graph;
/// `parents` and `children` refer to other nodes' tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomNodeData {
    pub id: String,
    pub room_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

// ===========================================================================
// Dungeon levels
// ===========================================================================

/// A level definition. `templates` and `graphs` name loaded assets.
#[derive(Debug, Clone, Deserialize)]
pub struct DungeonLevelData {
    pub name: String,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub graphs: Vec<String>,
}

// ===========================================================================
// Settings
// ===========================================================================

/// Graph settings applied to every loaded graph.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsData {
    #[serde(default = "default_max_corridor_children")]
    pub max_corridor_children: usize,
}

fn default_max_corridor_children() -> usize {
    DEFAULT_MAX_CORRIDOR_CHILDREN
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            max_corridor_children: DEFAULT_MAX_CORRIDOR_CHILDREN,
        }
    }
}

impl From<SettingsData> for GraphConfig {
    fn from(data: SettingsData) -> Self {
        GraphConfig::with_max_corridor_children(data.max_corridor_children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_node_type_flags_default_off() {
        let data: RoomNodeTypeData = ron::from_str(r#"(name: "Small Room")"#).unwrap();
        let room_type = RoomNodeType::from(data);
        assert_eq!(room_type, RoomNodeType::room("Small Room"));
        assert!(room_type.visible_in_editor);
    }

    #[test]
    fn corridor_flags_round_through() {
        let data: RoomNodeTypeData = serde_json::from_str(
            r#"{"name": "CorridorNS", "is_corridor": true, "is_corridor_ns": true, "visible_in_editor": false}"#,
        )
        .unwrap();
        let room_type = RoomNodeType::from(data);
        assert!(room_type.is_corridor && room_type.is_corridor_ns);
        assert!(!room_type.visible_in_editor);
    }

    #[test]
    fn graph_node_links_are_optional() {
        let data: RoomNodeGraphData = ron::from_str(
            r#"(name: "g", nodes: [(id: "e", room_type: "Entrance", children: ["c"])])"#,
        )
        .unwrap();
        assert_eq!(data.nodes[0].children, vec!["c".to_string()]);
        assert!(data.nodes[0].parents.is_empty());
    }

    #[test]
    fn template_geometry_parses() {
        let data: RoomTemplateData = toml::from_str(
            r#"
name = "hall"
room_type = "Large Room"
lower_bounds = { x = 0, y = 0 }
upper_bounds = { x = 20, y = 14 }
doorways = [{ position = { x = 10, y = 14 }, orientation = "north" }]
"#,
        )
        .unwrap();
        assert_eq!(data.upper_bounds, GridPos::new(20, 14));
        assert_eq!(data.doorways.len(), 1);
        assert!(data.spawn_points.is_empty());
    }

    #[test]
    fn settings_default_to_stock_limit() {
        let data: SettingsData = ron::from_str("()").unwrap();
        assert_eq!(
            GraphConfig::from(data).max_corridor_children,
            DEFAULT_MAX_CORRIDOR_CHILDREN
        );
    }
}
