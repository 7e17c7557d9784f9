use serde::{Deserialize, Serialize};

/// Default bound on how many corridors may branch off one room.
pub const DEFAULT_MAX_CORRIDOR_CHILDREN: usize = 3;

/// Per-graph tuning for the connection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of children a node may hold when the new child is a
    /// corridor.
    #[serde(default = "default_max_corridor_children")]
    pub max_corridor_children: usize,
}

fn default_max_corridor_children() -> usize {
    DEFAULT_MAX_CORRIDOR_CHILDREN
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_corridor_children: DEFAULT_MAX_CORRIDOR_CHILDREN,
        }
    }
}

impl GraphConfig {
    pub fn with_max_corridor_children(max_corridor_children: usize) -> Self {
        Self {
            max_corridor_children,
        }
    }
}
