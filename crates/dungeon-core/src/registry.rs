use crate::id::RoomNodeTypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Describes a category of room node. Capability flags stand in for a type
/// hierarchy; connection rules only ever look at the flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNodeType {
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
    /// Whether an editor should offer this type in its picker. Ignored by
    /// the connection rules.
    #[serde(default = "default_visible")]
    pub visible_in_editor: bool,
}

fn default_visible() -> bool {
    true
}

impl RoomNodeType {
    /// A plain room with no special capabilities.
    pub fn room(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_corridor: false,
            is_corridor_ns: false,
            is_corridor_ew: false,
            is_entrance: false,
            is_boss_room: false,
            is_none: false,
            visible_in_editor: true,
        }
    }

    pub fn entrance(name: &str) -> Self {
        Self {
            is_entrance: true,
            ..Self::room(name)
        }
    }

    /// The generic corridor used when authoring graphs.
    pub fn corridor(name: &str) -> Self {
        Self {
            is_corridor: true,
            ..Self::room(name)
        }
    }

    /// North/south corridor. Matched against templates, hidden from editors.
    pub fn corridor_ns(name: &str) -> Self {
        Self {
            is_corridor: true,
            is_corridor_ns: true,
            visible_in_editor: false,
            ..Self::room(name)
        }
    }

    /// East/west corridor. Matched against templates, hidden from editors.
    pub fn corridor_ew(name: &str) -> Self {
        Self {
            is_corridor: true,
            is_corridor_ew: true,
            visible_in_editor: false,
            ..Self::room(name)
        }
    }

    pub fn boss_room(name: &str) -> Self {
        Self {
            is_boss_room: true,
            ..Self::room(name)
        }
    }

    /// The "unassigned" placeholder type.
    pub fn none(name: &str) -> Self {
        Self {
            is_none: true,
            ..Self::room(name)
        }
    }

    /// A room that needs its own template: not any kind of corridor, not the
    /// entrance and not the placeholder.
    pub fn is_concrete_room(&self) -> bool {
        !(self.is_corridor
            || self.is_corridor_ns
            || self.is_corridor_ew
            || self.is_entrance
            || self.is_none)
    }
}

/// Builder for constructing an immutable [`RoomNodeTypeRegistry`].
#[derive(Debug, Default)]
pub struct RoomNodeTypeRegistryBuilder {
    types: Vec<RoomNodeType>,
}

impl RoomNodeTypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room node type. Returns its ID.
    pub fn register(&mut self, room_type: RoomNodeType) -> RoomNodeTypeId {
        let id = RoomNodeTypeId(self.types.len() as u32);
        self.types.push(room_type);
        id
    }

    /// Finalize the catalog. Type names must be non-empty and unique.
    pub fn build(self) -> Result<RoomNodeTypeRegistry, RegistryError> {
        let mut seen = HashMap::with_capacity(self.types.len());
        for (index, room_type) in self.types.iter().enumerate() {
            let id = RoomNodeTypeId(index as u32);
            if room_type.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(id));
            }
            if seen.insert(room_type.name.as_str(), id).is_some() {
                return Err(RegistryError::DuplicateName(room_type.name.clone()));
            }
        }
        Ok(RoomNodeTypeRegistry::from_checked(self.types))
    }
}

/// Immutable, ordered catalog of room node types. Frozen after build();
/// share it between graphs behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RoomNodeTypeRegistry {
    types: Vec<RoomNodeType>,
    name_to_id: HashMap<String, RoomNodeTypeId>,
}

impl RoomNodeTypeRegistry {
    /// The stock catalog: placeholder, entrance, corridors, rooms of three
    /// sizes, chest rooms and the boss room.
    pub fn standard() -> Self {
        let mut b = RoomNodeTypeRegistryBuilder::new();
        b.register(RoomNodeType::none("None"));
        b.register(RoomNodeType::corridor("Corridor"));
        b.register(RoomNodeType::corridor_ns("CorridorNS"));
        b.register(RoomNodeType::corridor_ew("CorridorEW"));
        b.register(RoomNodeType::entrance("Entrance"));
        b.register(RoomNodeType::room("Small Room"));
        b.register(RoomNodeType::room("Medium Room"));
        b.register(RoomNodeType::room("Large Room"));
        b.register(RoomNodeType::room("Chest Room Entrance"));
        b.register(RoomNodeType::room("Chest Room Small"));
        b.register(RoomNodeType::boss_room("Boss Room"));
        Self::from_checked(b.types)
    }

    /// Index a catalog whose names are already known to be non-empty and
    /// unique.
    fn from_checked(types: Vec<RoomNodeType>) -> Self {
        let name_to_id = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), RoomNodeTypeId(i as u32)))
            .collect();
        Self { types, name_to_id }
    }

    pub fn get(&self, id: RoomNodeTypeId) -> Option<&RoomNodeType> {
        self.types.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<RoomNodeTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// First registered type flagged as the entrance.
    pub fn entrance_type(&self) -> Option<RoomNodeTypeId> {
        self.find(|t| t.is_entrance)
    }

    /// First registered type flagged as the unassigned placeholder.
    pub fn none_type(&self) -> Option<RoomNodeTypeId> {
        self.find(|t| t.is_none)
    }

    /// Iterate over all types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RoomNodeTypeId, &RoomNodeType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (RoomNodeTypeId(i as u32), t))
    }

    /// Types an editor should offer in its type picker.
    pub fn editor_types(&self) -> impl Iterator<Item = (RoomNodeTypeId, &RoomNodeType)> {
        self.iter().filter(|(_, t)| t.visible_in_editor)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn find(&self, pred: impl Fn(&RoomNodeType) -> bool) -> Option<RoomNodeTypeId> {
        self.iter().find(|(_, t)| pred(t)).map(|(id, _)| id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("room node type {0:?} has an empty name")]
    EmptyName(RoomNodeTypeId),
    #[error("duplicate room node type name: {0}")]
    DuplicateName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> RoomNodeTypeRegistryBuilder {
        let mut b = RoomNodeTypeRegistryBuilder::new();
        b.register(RoomNodeType::none("None"));
        b.register(RoomNodeType::entrance("Entrance"));
        b.register(RoomNodeType::corridor("Corridor"));
        b.register(RoomNodeType::room("Armory"));
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.id_by_name("Armory"), Some(RoomNodeTypeId(3)));
        assert!(reg.id_by_name("Vault").is_none());
    }

    #[test]
    fn duplicate_name_fails() {
        let mut b = setup_builder();
        b.register(RoomNodeType::room("Armory"));
        match b.build() {
            Err(RegistryError::DuplicateName(name)) => assert_eq!(name, "Armory"),
            other => panic!("expected DuplicateName, got: {other:?}"),
        }
    }

    #[test]
    fn empty_name_fails() {
        let mut b = setup_builder();
        let blank = b.register(RoomNodeType::room("  "));
        match b.build() {
            Err(RegistryError::EmptyName(id)) => assert_eq!(id, blank),
            other => panic!("expected EmptyName, got: {other:?}"),
        }
    }

    #[test]
    fn special_type_lookup() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.none_type(), Some(RoomNodeTypeId(0)));
        assert_eq!(reg.entrance_type(), Some(RoomNodeTypeId(1)));

        let empty = RoomNodeTypeRegistryBuilder::new().build().unwrap();
        assert!(empty.is_empty());
        assert!(empty.entrance_type().is_none());
        assert!(empty.get(RoomNodeTypeId(0)).is_none());
    }

    #[test]
    fn standard_catalog_flags() {
        let reg = RoomNodeTypeRegistry::standard();
        let ew = reg.get(reg.id_by_name("CorridorEW").unwrap()).unwrap();
        assert!(ew.is_corridor && ew.is_corridor_ew && !ew.visible_in_editor);
        let boss = reg.get(reg.id_by_name("Boss Room").unwrap()).unwrap();
        assert!(boss.is_boss_room && boss.is_concrete_room());
        assert!(reg.entrance_type().is_some());
        assert!(reg.none_type().is_some());
    }

    #[test]
    fn standard_catalog_passes_builder_checks() {
        let standard = RoomNodeTypeRegistry::standard();
        let mut b = RoomNodeTypeRegistryBuilder::new();
        for (_, t) in standard.iter() {
            b.register(t.clone());
        }
        let rebuilt = b.build().unwrap();
        assert_eq!(rebuilt.len(), 11);
        for (id, t) in standard.iter() {
            assert_eq!(standard.id_by_name(&t.name), Some(id));
            assert_eq!(rebuilt.id_by_name(&t.name), Some(id));
        }
    }

    #[test]
    fn editor_types_skip_hidden_corridors() {
        let reg = RoomNodeTypeRegistry::standard();
        let names: Vec<&str> = reg.editor_types().map(|(_, t)| t.name.as_str()).collect();
        assert!(names.contains(&"Corridor"));
        assert!(!names.contains(&"CorridorNS"));
        assert!(!names.contains(&"CorridorEW"));
    }

    #[test]
    fn concrete_room_classification() {
        assert!(RoomNodeType::room("Armory").is_concrete_room());
        assert!(!RoomNodeType::corridor("Corridor").is_concrete_room());
        assert!(!RoomNodeType::corridor_ns("CorridorNS").is_concrete_room());
        assert!(!RoomNodeType::entrance("Entrance").is_concrete_room());
        assert!(!RoomNodeType::none("None").is_concrete_room());
    }

    #[test]
    fn visible_in_editor_defaults_to_true() {
        let t: RoomNodeType = serde_json::from_str(r#"{"name": "Armory"}"#).unwrap();
        assert!(t.visible_in_editor);
        assert!(t.is_concrete_room());
    }
}
