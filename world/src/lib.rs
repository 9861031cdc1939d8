#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Gridcast.
//!
//! The [`Engine`] is the explicit context object handed to the solvers: it
//! owns the [`LevelMap`], the authoritative NPC list and the camera pose.
//! Mutations arrive as [`Command`] values through [`apply`]; reads go through
//! the [`query`] module or a borrowed [`FrameContext`].

mod catalog;
mod grid;
mod level;
mod npc;

use gridcast_core::{CameraPose, Command, Event, NpcId};
use tracing::{debug, info};

pub use catalog::{CatalogError, LevelCatalog};
pub use grid::{Cell, LevelMap, NpcSpawn};
pub use level::{
    LevelDescription, LevelError, NpcSpawnDescription, TextureDescription, FLOOR_GLYPH, NPC_GLYPH,
    PLAYER_GLYPH,
};
pub use npc::Npc;

/// Represents one running level: grid, NPCs and camera.
#[derive(Clone, Debug)]
pub struct Engine {
    level_number: usize,
    level: LevelMap,
    npcs: Vec<Npc>,
    pose: CameraPose,
}

impl Engine {
    /// Starts a level from an already loaded grid.
    ///
    /// NPCs are spawned at the centre of their spawn cells with identifiers
    /// assigned in spawn order, the camera is placed at the centre of the
    /// player spawn facing east, and the occupant map is refreshed once.
    #[must_use]
    pub fn from_level(level: LevelMap, fov: f32) -> Self {
        let npcs = level
            .npc_spawns()
            .iter()
            .zip(0_u32..)
            .map(|(spawn, id)| Npc::new(NpcId::new(id), spawn.cell.center(), spawn.kind.clone()))
            .collect();
        let pose = CameraPose::new(level.player_spawn().center(), 0.0, fov);
        let mut engine = Self {
            level_number: 0,
            level,
            npcs,
            pose,
        };
        let _ = engine.level.refresh_occupants(&mut engine.npcs);
        engine
    }

    /// Loads and starts the level described by `description`.
    pub fn from_description(description: &LevelDescription, fov: f32) -> Result<Self, LevelError> {
        Ok(Self::from_level(LevelMap::load(description)?, fov))
    }

    /// Starts level `level_number` of the catalog, cycling past its end.
    pub fn new_game(
        catalog: &LevelCatalog,
        level_number: usize,
        fov: f32,
    ) -> Result<Self, LevelError> {
        let path = catalog.select(level_number)?;
        let description = LevelDescription::from_path(path)?;
        let mut engine = Self::from_description(&description, fov)?;
        engine.level_number = level_number;
        info!(
            level = %description.name,
            path = %path.display(),
            npcs = engine.npcs.len(),
            "new game started"
        );
        Ok(engine)
    }

    /// Rebuilds the occupant map. Call once per frame before any solver runs.
    pub fn update(&mut self, out_events: &mut Vec<Event>) {
        apply(self, Command::RefreshOccupants, out_events);
    }

    /// Borrows a consistent snapshot for this frame's solver calls.
    #[must_use]
    pub fn frame(&self) -> FrameContext<'_> {
        FrameContext {
            level: &self.level,
            pose: self.pose,
            npcs: &self.npcs,
        }
    }

    fn npc_mut(&mut self, npc: NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|candidate| candidate.id() == npc)
    }
}

/// Read-only snapshot handed to the solvers for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    /// Grid with occupants refreshed for this frame.
    pub level: &'a LevelMap,
    /// Camera pose for this frame.
    pub pose: CameraPose,
    /// Live NPCs in registry order.
    pub npcs: &'a [Npc],
}

/// Applies the provided command to the engine, mutating state deterministically.
pub fn apply(engine: &mut Engine, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetCameraPose { pose } => {
            engine.pose = pose;
            out_events.push(Event::CameraMoved { pose });
        }
        Command::MoveNpc { npc, position } => {
            let Some(record) = engine.npc_mut(npc) else {
                return;
            };
            if !record.is_alive() {
                return;
            }
            let from = record.cell();
            record.set_position(position);
            let to = record.cell();
            if from != to {
                out_events.push(Event::NpcChangedCell { npc, from, to });
            }
        }
        Command::KillNpc { npc } => {
            let Some(record) = engine.npc_mut(npc) else {
                return;
            };
            if record.is_alive() {
                record.kill();
                out_events.push(Event::NpcKilled { npc });
            }
        }
        Command::RefreshOccupants => {
            let pruned = engine.level.refresh_occupants(&mut engine.npcs);
            for npc in pruned {
                debug!(npc = npc.id().get(), "pruned dead npc");
                out_events.push(Event::NpcPruned { npc: npc.id() });
            }
            out_events.push(Event::OccupantsRefreshed {
                recorded: engine.level.occupants().count(),
            });
        }
    }
}

/// Query functions that provide read-only access to the engine state.
pub mod query {
    use gridcast_core::{CameraPose, NpcId};

    use super::{Engine, LevelMap, Npc};

    /// Provides read-only access to the level grid.
    #[must_use]
    pub fn level_map(engine: &Engine) -> &LevelMap {
        &engine.level
    }

    /// Current camera pose.
    #[must_use]
    pub fn camera_pose(engine: &Engine) -> CameraPose {
        engine.pose
    }

    /// Authoritative NPC list in registry order.
    #[must_use]
    pub fn npcs(engine: &Engine) -> &[Npc] {
        &engine.npcs
    }

    /// Looks up a single NPC.
    #[must_use]
    pub fn npc(engine: &Engine, npc: NpcId) -> Option<&Npc> {
        engine.npcs.iter().find(|candidate| candidate.id() == npc)
    }

    /// Level number the engine was started with.
    #[must_use]
    pub fn level_number(engine: &Engine) -> usize {
        engine.level_number
    }
}
