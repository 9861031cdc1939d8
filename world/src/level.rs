//! Level descriptions as produced by the level loader.

use std::{
    fs,
    path::{Path, PathBuf},
};

use gridcast_core::MalformedLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;

/// Layout glyph marking open floor.
pub const FLOOR_GLYPH: char = '.';
/// Layout glyph marking open floor where the player spawns.
pub const PLAYER_GLYPH: char = 'P';
/// Layout glyph marking open floor where an NPC spawns.
pub const NPC_GLYPH: char = 'N';

const DEFAULT_NPC_KIND: &str = "soldier";

/// Serialisable description of a level: tile layout, textures and spawns.
///
/// Each layout row is a string of glyphs. `.` is floor, `P` the player
/// spawn, `N` an NPC spawn and a decimal digit a wall textured with the
/// texture of that id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Human readable level name.
    #[serde(default)]
    pub name: String,
    /// Rows of layout glyphs, top row first.
    pub layout: Vec<String>,
    /// Wall textures the layout may reference.
    #[serde(default)]
    pub textures: Vec<TextureDescription>,
    /// NPC spawns declared outside the layout.
    #[serde(default)]
    pub npcs: Vec<NpcSpawnDescription>,
}

/// Wall texture declared by a level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescription {
    /// Identifier referenced by layout digits.
    pub id: u16,
    /// Name of the texture asset, resolved by the texture collaborator.
    pub name: String,
}

/// NPC spawn declared outside the layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSpawnDescription {
    /// Column of the spawn cell.
    pub column: u32,
    /// Row of the spawn cell.
    pub row: u32,
    /// Kind of NPC to spawn.
    #[serde(default = "default_npc_kind")]
    pub kind: String,
}

fn default_npc_kind() -> String {
    DEFAULT_NPC_KIND.to_owned()
}

impl LevelDescription {
    /// Parses a level description from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, LevelError> {
        toml::from_str(source).map_err(|source| LevelError::Parse { path: None, source })
    }

    /// Reads and parses the level description stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&source).map_err(|source| LevelError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Kind assigned to NPCs spawned from layout glyphs.
    #[must_use]
    pub fn default_npc_kind() -> &'static str {
        DEFAULT_NPC_KIND
    }
}

/// Errors that abort level construction.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The description parsed but does not describe a usable grid.
    #[error("malformed level: {0}")]
    Malformed(#[from] MalformedLevel),
    /// The description is not valid TOML for the level schema.
    #[error("failed to parse level {}", display_path(.path))]
    Parse {
        /// File the description was read from, if any.
        path: Option<PathBuf>,
        /// Underlying parser error.
        #[source]
        source: toml::de::Error,
    },
    /// The description file could not be read.
    #[error("failed to read level {}", .path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// No level could be selected from the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "<inline>".to_owned(), |path| path.display().to_string())
}
