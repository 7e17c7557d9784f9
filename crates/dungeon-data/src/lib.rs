//! Data-driven loading of dungeon assets.
//!
//! Reads room node types, room templates, room node graphs, dungeon levels
//! and graph settings from RON, JSON or TOML files in one directory, and
//! resolves them into `dungeon-core` types. See [`load_dungeon_assets`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, DungeonAssets, load_dungeon_assets};
