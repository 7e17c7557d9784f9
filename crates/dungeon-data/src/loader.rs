//! Resolution pipeline: reads asset files, resolves cross-references, builds
//! the registry and replays every stored link through the connection rules.
//!
//! Each asset lives in one file named after it (`room_templates.ron`,
//! `room_node_graphs.toml`, ...) in any of the supported formats.

use crate::schema::{
    DungeonLevelData, RoomNodeGraphData, RoomNodeTypeData, RoomTemplateData, SettingsData,
};
use dungeon_core::config::GraphConfig;
use dungeon_core::connection::ConnectionRejection;
use dungeon_core::graph::{GraphError, RoomNodeGraph};
use dungeon_core::id::RoomNodeId;
use dungeon_core::level::{DungeonLevel, RoomTemplate};
use dungeon_core::registry::{RegistryError, RoomNodeTypeRegistry, RoomNodeTypeRegistryBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

// ===========================================================================
// Errors
// ===========================================================================

/// Why an asset directory could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The room node type catalog is missing from the asset directory.
    #[error("no '{file}' asset in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("{file}: not a .ron, .json or .toml asset")]
    UnsupportedFormat { file: PathBuf },

    /// The same asset is present in two formats.
    #[error("asset stored twice: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("cannot parse {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A room type, node, template or graph name that nothing defines.
    #[error("{expected_kind} '{name}' referenced in {file} does not exist")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A type, template, graph, level or node name defined twice.
    #[error("'{name}' is defined more than once in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("invalid room node types in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    #[error("graph '{graph}' in {file}: {source}")]
    Graph {
        file: PathBuf,
        graph: String,
        #[source]
        source: GraphError,
    },

    /// A stored link breaks a connection rule.
    #[error("graph '{graph}' in {file}: link {parent} -> {child} rejected: {reason}")]
    RejectedEdge {
        file: PathBuf,
        graph: String,
        parent: String,
        child: String,
        reason: ConnectionRejection,
    },

    /// A stored link is listed on only one of its two nodes.
    #[error("graph '{graph}' in {file}: link {parent} -> {child} is only declared on one side")]
    AsymmetricLink {
        file: PathBuf,
        graph: String,
        parent: String,
        child: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Asset files
// ===========================================================================

/// Encodings an asset file may use, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Ron,
    Toml,
    Json,
}

impl AssetFormat {
    pub const ALL: [AssetFormat; 3] = [AssetFormat::Ron, AssetFormat::Toml, AssetFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            AssetFormat::Ron => "ron",
            AssetFormat::Toml => "toml",
            AssetFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|f| Some(f.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }
}

/// The file holding asset `name` in `dir`, in whichever format it exists.
/// More than one format for the same asset is an error.
pub fn find_asset_file(dir: &Path, name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = AssetFormat::ALL
        .into_iter()
        .map(|f| dir.join(format!("{name}.{}", f.extension())))
        .filter(|p| p.is_file());
    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

pub fn require_asset_file(dir: &Path, name: &str) -> Result<PathBuf, DataLoadError> {
    find_asset_file(dir, name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Parsing
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

pub fn read_asset<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = AssetFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        AssetFormat::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        AssetFormat::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        AssetFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a list of records. TOML has no top-level arrays, so a TOML file
/// keeps its records under a key named after the asset (`[[room_templates]]`).
pub fn read_asset_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if AssetFormat::from_path(path)? != AssetFormat::Toml {
        return read_asset(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let records = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("no [[{toml_key}]] entries")))?;
    records
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

/// An optional list asset; absent means empty.
fn read_optional_list<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
) -> Result<(Option<PathBuf>, Vec<T>), DataLoadError> {
    match find_asset_file(dir, name)? {
        Some(path) => {
            let list = read_asset_list(&path, name)?;
            debug!(file = %path.display(), entries = list.len(), "read asset list");
            Ok((Some(path), list))
        }
        None => Ok((None, Vec::new())),
    }
}

// ===========================================================================
// Name references
// ===========================================================================

pub fn resolve_ref<'a, V>(
    defined: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    defined.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

pub fn ensure_unique<V>(
    defined: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    match defined.contains_key(name) {
        true => Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        }),
        false => Ok(()),
    }
}

// ===========================================================================
// Loaded assets
// ===========================================================================

/// Everything loaded from one asset directory, resolved and validated.
#[derive(Debug, Clone)]
pub struct DungeonAssets {
    pub registry: Arc<RoomNodeTypeRegistry>,
    pub templates: Vec<RoomTemplate>,
    pub graphs: Vec<RoomNodeGraph>,
    pub levels: Vec<DungeonLevel>,
    pub settings: GraphConfig,
}

impl DungeonAssets {
    pub fn graph(&self, name: &str) -> Option<&RoomNodeGraph> {
        self.graphs.iter().find(|g| g.name() == name)
    }

    pub fn template(&self, name: &str) -> Option<&RoomTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn level(&self, name: &str) -> Option<&DungeonLevel> {
        self.levels.iter().find(|l| l.name == name)
    }
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Load every asset file in `dir`.
///
/// `room_node_types` is required; `settings`, `room_templates`,
/// `room_node_graphs` and `dungeon_levels` are optional. Stored links are
/// replayed through [`RoomNodeGraph::connect`], so a graph that breaks a
/// connection rule fails to load with the rule named.
pub fn load_dungeon_assets(dir: &Path) -> Result<DungeonAssets, DataLoadError> {
    let registry = Arc::new(load_registry(dir)?);

    let settings = match find_asset_file(dir, "settings")? {
        Some(path) => GraphConfig::from(read_asset::<SettingsData>(&path)?),
        None => GraphConfig::default(),
    };

    let (templates_file, template_data) =
        read_optional_list::<RoomTemplateData>(dir, "room_templates")?;
    let templates = match &templates_file {
        Some(file) => resolve_templates(template_data, &registry, file)?,
        None => Vec::new(),
    };

    let (graphs_file, graph_data) = read_optional_list::<RoomNodeGraphData>(dir, "room_node_graphs")?;
    let mut graphs = Vec::with_capacity(graph_data.len());
    if let Some(file) = &graphs_file {
        let mut seen = HashMap::new();
        for data in &graph_data {
            ensure_unique(&seen, &data.name, file)?;
            seen.insert(data.name.clone(), ());
            graphs.push(build_graph(data, &registry, settings, file)?);
        }
    }

    let (levels_file, level_data) = read_optional_list::<DungeonLevelData>(dir, "dungeon_levels")?;
    let levels = match &levels_file {
        Some(file) => resolve_levels(level_data, &registry, &templates, &graphs, file)?,
        None => Vec::new(),
    };

    info!(
        dir = %dir.display(),
        room_types = registry.len(),
        templates = templates.len(),
        graphs = graphs.len(),
        levels = levels.len(),
        "loaded dungeon assets"
    );

    Ok(DungeonAssets {
        registry,
        templates,
        graphs,
        levels,
        settings,
    })
}

fn load_registry(dir: &Path) -> Result<RoomNodeTypeRegistry, DataLoadError> {
    let file = require_asset_file(dir, "room_node_types")?;
    let types: Vec<RoomNodeTypeData> = read_asset_list(&file, "room_node_types")?;

    let mut builder = RoomNodeTypeRegistryBuilder::new();
    for data in types {
        builder.register(data.into());
    }
    builder
        .build()
        .map_err(|source| DataLoadError::Registry { file, source })
}

fn resolve_templates(
    data: Vec<RoomTemplateData>,
    registry: &RoomNodeTypeRegistry,
    file: &Path,
) -> Result<Vec<RoomTemplate>, DataLoadError> {
    let mut seen = HashMap::new();
    let mut templates = Vec::with_capacity(data.len());
    for t in data {
        ensure_unique(&seen, &t.name, file)?;
        seen.insert(t.name.clone(), ());
        let room_type = registry
            .id_by_name(&t.room_type)
            .ok_or_else(|| DataLoadError::UnresolvedRef {
                file: file.to_path_buf(),
                name: t.room_type.clone(),
                expected_kind: "room node type",
            })?;
        templates.push(RoomTemplate {
            name: t.name,
            room_type,
            lower_bounds: t.lower_bounds,
            upper_bounds: t.upper_bounds,
            doorways: t.doorways,
            spawn_points: t.spawn_points,
        });
    }
    Ok(templates)
}

/// Build one graph: create every node, check that declared parents mirror
/// declared children, then replay the links in file order.
fn build_graph(
    data: &RoomNodeGraphData,
    registry: &Arc<RoomNodeTypeRegistry>,
    config: GraphConfig,
    file: &Path,
) -> Result<RoomNodeGraph, DataLoadError> {
    let mut graph = RoomNodeGraph::with_config(&data.name, registry.clone(), config);
    let mut ids: HashMap<String, RoomNodeId> = HashMap::with_capacity(data.nodes.len());

    for node in &data.nodes {
        ensure_unique(&ids, &node.id, file)?;
        let room_type = registry
            .id_by_name(&node.room_type)
            .ok_or_else(|| DataLoadError::UnresolvedRef {
                file: file.to_path_buf(),
                name: node.room_type.clone(),
                expected_kind: "room node type",
            })?;
        let id = graph
            .add_node(room_type)
            .map_err(|source| DataLoadError::Graph {
                file: file.to_path_buf(),
                graph: data.name.clone(),
                source,
            })?;
        ids.insert(node.id.clone(), id);
    }

    let declared: HashMap<&str, _> = data.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let asymmetric = |parent: &str, child: &str| DataLoadError::AsymmetricLink {
        file: file.to_path_buf(),
        graph: data.name.clone(),
        parent: parent.to_string(),
        child: child.to_string(),
    };
    for node in &data.nodes {
        for child in &node.children {
            resolve_ref(&ids, child, file, "room node")?;
            if !declared[child.as_str()].parents.contains(&node.id) {
                return Err(asymmetric(&node.id, child));
            }
        }
        for parent in &node.parents {
            resolve_ref(&ids, parent, file, "room node")?;
            if !declared[parent.as_str()].children.contains(&node.id) {
                return Err(asymmetric(parent, &node.id));
            }
        }
    }

    for node in &data.nodes {
        let parent = ids[&node.id];
        for child in &node.children {
            graph
                .connect(parent, ids[child])
                .map_err(|reason| DataLoadError::RejectedEdge {
                    file: file.to_path_buf(),
                    graph: data.name.clone(),
                    parent: node.id.clone(),
                    child: child.clone(),
                    reason,
                })?;
        }
    }

    debug!(
        graph = %data.name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built room node graph"
    );
    Ok(graph)
}

fn resolve_levels(
    data: Vec<DungeonLevelData>,
    registry: &Arc<RoomNodeTypeRegistry>,
    templates: &[RoomTemplate],
    graphs: &[RoomNodeGraph],
    file: &Path,
) -> Result<Vec<DungeonLevel>, DataLoadError> {
    let template_index: HashMap<String, &RoomTemplate> =
        templates.iter().map(|t| (t.name.clone(), t)).collect();
    let graph_index: HashMap<String, &RoomNodeGraph> =
        graphs.iter().map(|g| (g.name().to_string(), g)).collect();

    let mut seen = HashMap::new();
    let mut levels = Vec::with_capacity(data.len());
    for l in data {
        ensure_unique(&seen, &l.name, file)?;
        seen.insert(l.name.clone(), ());

        let mut level = DungeonLevel::new(&l.name, registry.clone());
        for name in &l.templates {
            let template = resolve_ref(&template_index, name, file, "room template")?;
            level.templates.push((*template).clone());
        }
        for name in &l.graphs {
            let graph = resolve_ref(&graph_index, name, file, "room node graph")?;
            level.graphs.push((*graph).clone());
        }
        levels.push(level);
    }
    Ok(levels)
}

// ===========================================================================
// Tests
// ===========================================================================
