use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a room node in a room node graph. Versioned, so an id is
    /// never handed out again after its node is removed.
    pub struct RoomNodeId;
}

/// Identifies a room node type in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomNodeTypeId(pub u32);
