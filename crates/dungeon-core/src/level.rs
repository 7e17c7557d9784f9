//! Dungeon level definitions and their consistency check.
//!
//! A level pairs a set of room node graphs (one is picked at generation
//! time) with the room templates used to build them. [`check_level`]
//! reports, without ever failing, every way the two do not line up.

use crate::graph::RoomNodeGraph;
use crate::id::RoomNodeTypeId;
use crate::registry::{RoomNodeType, RoomNodeTypeRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Room templates
// ---------------------------------------------------------------------------

/// A tile position in a template's local grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compass side a doorway opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doorway {
    pub position: GridPos,
    pub orientation: Orientation,
}

/// Geometry for one room node type. Carried for the room builder; only
/// `room_type` matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    pub room_type: RoomNodeTypeId,
    pub lower_bounds: GridPos,
    pub upper_bounds: GridPos,
    #[serde(default)]
    pub doorways: Vec<Doorway>,
    #[serde(default)]
    pub spawn_points: Vec<GridPos>,
}

/// Looks up a room template by node type.
pub trait TemplateProvider {
    fn find_template(&self, room_type: RoomNodeTypeId) -> Option<&RoomTemplate>;
}

impl TemplateProvider for [RoomTemplate] {
    fn find_template(&self, room_type: RoomNodeTypeId) -> Option<&RoomTemplate> {
        self.iter().find(|t| t.room_type == room_type)
    }
}

// ---------------------------------------------------------------------------
// Dungeon level
// ---------------------------------------------------------------------------

/// Templates and graphs share one registry; template and node type ids
/// are compared directly.
#[derive(Debug, Clone)]
pub struct DungeonLevel {
    pub name: String,
    pub registry: Arc<RoomNodeTypeRegistry>,
    pub templates: Vec<RoomTemplate>,
    pub graphs: Vec<RoomNodeGraph>,
}

impl DungeonLevel {
    pub fn new(name: &str, registry: Arc<RoomNodeTypeRegistry>) -> Self {
        Self {
            name: name.to_string(),
            registry,
            templates: Vec::new(),
            graphs: Vec::new(),
        }
    }

    fn has_template_where(&self, pred: impl Fn(&RoomNodeType) -> bool) -> bool {
        self.templates
            .iter()
            .filter_map(|t| self.registry.get(t.room_type))
            .any(pred)
    }
}

impl TemplateProvider for DungeonLevel {
    fn find_template(&self, room_type: RoomNodeTypeId) -> Option<&RoomTemplate> {
        self.templates.find_template(room_type)
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// One advisory problem found in a level. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelFinding {
    EmptyLevelName,
    NoTemplates,
    NoGraphs,
    MissingCorridorEwTemplate,
    MissingCorridorNsTemplate,
    MissingEntranceTemplate,
    /// A concrete room type used by a graph has no template.
    MissingRoomTemplate { graph: String, room_type: String },
    /// A graph has no entrance node.
    NoEntranceNode { graph: String },
    /// A graph has more than one entrance node.
    MultipleEntranceNodes { graph: String, count: usize },
}

impl fmt::Display for LevelFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFinding::EmptyLevelName => write!(f, "level name is empty"),
            LevelFinding::NoTemplates => write!(f, "no room templates specified"),
            LevelFinding::NoGraphs => write!(f, "no room node graphs specified"),
            LevelFinding::MissingCorridorEwTemplate => {
                write!(f, "no E/W corridor room type specified")
            }
            LevelFinding::MissingCorridorNsTemplate => {
                write!(f, "no N/S corridor room type specified")
            }
            LevelFinding::MissingEntranceTemplate => {
                write!(f, "no entrance room type specified")
            }
            LevelFinding::MissingRoomTemplate { graph, room_type } => {
                write!(f, "no room template {room_type} found for node graph {graph}")
            }
            LevelFinding::NoEntranceNode { graph } => {
                write!(f, "node graph {graph} has no entrance")
            }
            LevelFinding::MultipleEntranceNodes { graph, count } => {
                write!(f, "node graph {graph} has {count} entrances")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Consistency check
// ---------------------------------------------------------------------------

/// Cross-reference a level's graphs against its templates.
///
/// Every finding is also logged at `warn` level.
pub fn check_level(level: &DungeonLevel) -> Vec<LevelFinding> {
    let mut findings = Vec::new();

    if level.name.trim().is_empty() {
        findings.push(LevelFinding::EmptyLevelName);
    }
    if level.templates.is_empty() {
        findings.push(LevelFinding::NoTemplates);
    }
    if level.graphs.is_empty() {
        findings.push(LevelFinding::NoGraphs);
    }

    if !level.has_template_where(|t| t.is_corridor_ew) {
        findings.push(LevelFinding::MissingCorridorEwTemplate);
    }
    if !level.has_template_where(|t| t.is_corridor_ns) {
        findings.push(LevelFinding::MissingCorridorNsTemplate);
    }
    if !level.has_template_where(|t| t.is_entrance) {
        findings.push(LevelFinding::MissingEntranceTemplate);
    }

    for graph in &level.graphs {
        let entrances = graph.nodes_where(|t| t.is_entrance).count();
        match entrances {
            0 => findings.push(LevelFinding::NoEntranceNode {
                graph: graph.name().to_string(),
            }),
            1 => {}
            count => findings.push(LevelFinding::MultipleEntranceNodes {
                graph: graph.name().to_string(),
                count,
            }),
        }

        // Templates hold ids from the level's registry; a graph built on
        // another registry is matched by type name instead.
        let shared = Arc::ptr_eq(&level.registry, graph.registry());
        for (id, node) in graph.nodes() {
            let Some(room_type) = graph.room_type_of(id) else {
                continue;
            };
            if !room_type.is_concrete_room() {
                continue;
            }
            let template_type = if shared {
                Some(node.room_type())
            } else {
                level.registry.id_by_name(&room_type.name)
            };
            if template_type.and_then(|t| level.find_template(t)).is_none() {
                findings.push(LevelFinding::MissingRoomTemplate {
                    graph: graph.name().to_string(),
                    room_type: room_type.name.clone(),
                });
            }
        }
    }

    for finding in &findings {
        tracing::warn!(level = %level.name, %finding, "level consistency");
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RoomNodeTypeRegistryBuilder;
    use crate::test_utils::*;

    fn template(name: &str, room_type: RoomNodeTypeId) -> RoomTemplate {
        RoomTemplate {
            name: name.to_string(),
            room_type,
            lower_bounds: GridPos::new(0, 0),
            upper_bounds: GridPos::new(10, 8),
            doorways: vec![Doorway {
                position: GridPos::new(5, 8),
                orientation: Orientation::North,
            }],
            spawn_points: vec![GridPos::new(3, 3)],
        }
    }

    fn complete_level() -> (DungeonLevel, StandardTypes) {
        let (graph, t) = build_chain_dungeon(1);
        let mut level = DungeonLevel::new("Level 1", graph.registry().clone());
        level.templates = vec![
            template("entrance", t.entrance),
            template("corridor_ns", t.corridor_ns),
            template("corridor_ew", t.corridor_ew),
            template("small_room", t.small_room),
            template("boss_room", t.boss_room),
        ];
        level.graphs = vec![graph];
        (level, t)
    }

    #[test]
    fn complete_level_has_no_findings() {
        let (level, _) = complete_level();
        assert!(check_level(&level).is_empty());
    }

    #[test]
    fn empty_level_reports_everything_missing() {
        let findings = check_level(&DungeonLevel::new("", standard_registry()));
        assert_eq!(
            findings,
            vec![
                LevelFinding::EmptyLevelName,
                LevelFinding::NoTemplates,
                LevelFinding::NoGraphs,
                LevelFinding::MissingCorridorEwTemplate,
                LevelFinding::MissingCorridorNsTemplate,
                LevelFinding::MissingEntranceTemplate,
            ]
        );
    }

    #[test]
    fn missing_corridor_templates_reported() {
        let (mut level, t) = complete_level();
        level
            .templates
            .retain(|tpl| tpl.room_type != t.corridor_ns && tpl.room_type != t.corridor_ew);
        let findings = check_level(&level);
        assert!(findings.contains(&LevelFinding::MissingCorridorEwTemplate));
        assert!(findings.contains(&LevelFinding::MissingCorridorNsTemplate));
        assert!(!findings.contains(&LevelFinding::MissingEntranceTemplate));
    }

    #[test]
    fn missing_room_template_names_graph_and_type() {
        let (mut level, t) = complete_level();
        level.templates.retain(|tpl| tpl.room_type != t.boss_room);
        let findings = check_level(&level);
        assert_eq!(
            findings,
            vec![LevelFinding::MissingRoomTemplate {
                graph: "test graph".to_string(),
                room_type: "Boss Room".to_string(),
            }]
        );
        assert_eq!(
            findings[0].to_string(),
            "no room template Boss Room found for node graph test graph"
        );
    }

    #[test]
    fn corridors_and_placeholders_need_no_template() {
        let (mut level, t) = complete_level();
        level.graphs[0].add_node(t.none).unwrap();
        level.graphs[0].add_node(t.corridor).unwrap();
        assert!(check_level(&level).is_empty());
    }

    #[test]
    fn entrance_cardinality_reported() {
        let (mut level, t) = complete_level();
        level.graphs[0].add_node(t.entrance).unwrap();
        let (bare, _) = empty_graph();
        level.graphs.push(bare);

        let findings = check_level(&level);
        assert!(findings.contains(&LevelFinding::MultipleEntranceNodes {
            graph: "test graph".to_string(),
            count: 2,
        }));
        assert!(findings.contains(&LevelFinding::NoEntranceNode {
            graph: "test graph".to_string(),
        }));
    }

    #[test]
    fn graph_on_another_registry_is_matched_by_name() {
        let mut b = RoomNodeTypeRegistryBuilder::new();
        let small = b.register(RoomNodeType::room("Small Room"));
        let entrance = b.register(RoomNodeType::entrance("Entrance"));
        let mut graph = RoomNodeGraph::new("foreign", Arc::new(b.build().unwrap()));
        graph.add_node(entrance).unwrap();
        graph.add_node(small).unwrap();

        let (mut level, t) = complete_level();
        level.graphs = vec![graph];
        assert!(check_level(&level).is_empty());

        level.templates.retain(|tpl| tpl.room_type != t.small_room);
        assert_eq!(
            check_level(&level),
            vec![LevelFinding::MissingRoomTemplate {
                graph: "foreign".to_string(),
                room_type: "Small Room".to_string(),
            }]
        );
    }

    #[test]
    fn template_lookup() {
        let (level, t) = complete_level();
        assert_eq!(
            level.find_template(t.small_room).map(|tpl| tpl.name.as_str()),
            Some("small_room")
        );
        assert!(level.find_template(t.large_room).is_none());
        assert!(level.templates[..].find_template(t.entrance).is_some());
    }
}
