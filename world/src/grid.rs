//! Dense wall and occupant grid shared by both solvers.

use std::collections::BTreeMap;

use glam::Vec2;
use gridcast_core::{CellCoord, MalformedLevel, NpcId, OutOfBoundsQuery, TextureId, WallLayout};
use tracing::debug;

use crate::{
    level::{LevelDescription, LevelError, FLOOR_GLYPH, NPC_GLYPH, PLAYER_GLYPH},
    npc::Npc,
};

/// Single grid cell: a static wall flag with its texture plus the NPC
/// recorded there by the latest occupant refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    wall: Option<TextureId>,
    occupant: Option<NpcId>,
}

impl Cell {
    /// Reports whether the cell is statically blocked.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        self.wall.is_some()
    }

    /// Texture of the wall, present only for wall cells.
    #[must_use]
    pub const fn wall_texture(&self) -> Option<TextureId> {
        self.wall
    }

    /// NPC recorded in the cell by the latest refresh.
    #[must_use]
    pub const fn occupant(&self) -> Option<NpcId> {
        self.occupant
    }
}

/// NPC spawn resolved against the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NpcSpawn {
    /// Cell the NPC starts in.
    pub cell: CellCoord,
    /// Kind of NPC to spawn.
    pub kind: String,
}

/// Fixed-size tile grid produced once per level load.
///
/// The wall layout never changes after [`LevelMap::load`]; only occupants
/// are rewritten by [`LevelMap::refresh_occupants`].
#[derive(Clone, Debug)]
pub struct LevelMap {
    name: String,
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
    occupied: Vec<usize>,
    textures: BTreeMap<TextureId, String>,
    player_spawn: CellCoord,
    npc_spawns: Vec<NpcSpawn>,
}

impl LevelMap {
    /// Builds the grid described by `description`.
    pub fn load(description: &LevelDescription) -> Result<Self, LevelError> {
        let rows = u32::try_from(description.layout.len()).unwrap_or(u32::MAX);
        let columns = description
            .layout
            .first()
            .map_or(0, |row| u32::try_from(row.chars().count()).unwrap_or(u32::MAX));
        if rows == 0 || columns == 0 {
            return Err(MalformedLevel::ZeroDimensions.into());
        }

        let mut textures = BTreeMap::new();
        for texture in &description.textures {
            let id = TextureId::new(texture.id);
            if textures.insert(id, texture.name.clone()).is_some() {
                return Err(MalformedLevel::DuplicateTexture { texture: id }.into());
            }
        }

        let mut cells = Vec::with_capacity(description.layout.iter().map(String::len).sum());
        let mut player_spawn = None;
        let mut npc_spawns = Vec::new();

        for (row, line) in (0..rows).zip(&description.layout) {
            let width = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
            if width != columns {
                return Err(MalformedLevel::RaggedRow {
                    row,
                    width,
                    expected: columns,
                }
                .into());
            }

            for (column, glyph) in (0..columns).zip(line.chars()) {
                let cell = CellCoord::new(column, row);
                let wall = match glyph {
                    FLOOR_GLYPH => None,
                    PLAYER_GLYPH => {
                        if player_spawn.replace(cell).is_some() {
                            return Err(MalformedLevel::DuplicateSpawn.into());
                        }
                        None
                    }
                    NPC_GLYPH => {
                        npc_spawns.push(NpcSpawn {
                            cell,
                            kind: LevelDescription::default_npc_kind().to_owned(),
                        });
                        None
                    }
                    digit if digit.is_ascii_digit() => {
                        let texture = TextureId::new(digit as u16 - u16::from(b'0'));
                        if !textures.contains_key(&texture) {
                            return Err(MalformedLevel::UndefinedTexture {
                                texture,
                                column,
                                row,
                            }
                            .into());
                        }
                        Some(texture)
                    }
                    glyph => {
                        return Err(MalformedLevel::UnknownGlyph { glyph, column, row }.into());
                    }
                };
                cells.push(Cell {
                    wall,
                    occupant: None,
                });
            }
        }

        let player_spawn = player_spawn.ok_or(MalformedLevel::MissingSpawn)?;

        for spawn in &description.npcs {
            let (column, row) = (spawn.column, spawn.row);
            if column >= columns || row >= rows {
                return Err(MalformedLevel::NpcOutOfBounds { column, row }.into());
            }
            let index = row as usize * columns as usize + column as usize;
            if cells[index].is_wall() {
                return Err(MalformedLevel::NpcInWall { column, row }.into());
            }
            npc_spawns.push(NpcSpawn {
                cell: CellCoord::new(column, row),
                kind: spawn.kind.clone(),
            });
        }

        debug!(
            level = %description.name,
            columns,
            rows,
            npcs = npc_spawns.len(),
            "level loaded"
        );

        Ok(Self {
            name: description.name.clone(),
            columns,
            rows,
            cells,
            occupied: Vec::new(),
            textures,
            player_spawn,
            npc_spawns,
        })
    }

    /// Name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Cell containing a world-space position, if inside the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        CellCoord::from_position(position).filter(|cell| self.contains(*cell))
    }

    /// Checked access to a single cell.
    pub fn cell(&self, cell: CellCoord) -> Result<&Cell, OutOfBoundsQuery> {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .ok_or(OutOfBoundsQuery {
                cell,
                columns: self.columns,
                rows: self.rows,
            })
    }

    /// Reports whether `cell` is a wall or holds an occupant other than
    /// `exclude`.
    ///
    /// Cells outside the grid count as blocked so that the grid edge behaves
    /// like a solid boundary. Use [`LevelMap::cell`] to treat such queries as
    /// errors instead.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord, exclude: Option<NpcId>) -> bool {
        let Ok(cell) = self.cell(cell) else {
            return true;
        };
        if cell.is_wall() {
            return true;
        }
        match cell.occupant {
            None => false,
            Some(occupant) => Some(occupant) != exclude,
        }
    }

    /// NPC recorded at `cell` by the latest refresh.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<NpcId> {
        self.cell(cell).ok().and_then(Cell::occupant)
    }

    /// Iterator over the occupant map in the order NPCs were recorded.
    pub fn occupants(&self) -> impl Iterator<Item = (CellCoord, NpcId)> + '_ {
        self.occupied.iter().filter_map(|&index| {
            let occupant = self.cells.get(index)?.occupant?;
            Some((self.coord(index), occupant))
        })
    }

    /// Rebuilds the occupant map from the authoritative NPC list.
    ///
    /// Dead NPCs are partitioned out and the list is replaced by the live
    /// ones, preserving order; the pruned NPCs are returned. When two live
    /// NPCs stand in the same cell the first one in list order is recorded.
    /// NPCs outside the grid or inside walls are not recorded. Runs in time
    /// proportional to the number of NPCs.
    pub fn refresh_occupants(&mut self, npcs: &mut Vec<Npc>) -> Vec<Npc> {
        let (live, dead): (Vec<Npc>, Vec<Npc>) =
            std::mem::take(npcs).into_iter().partition(Npc::is_alive);
        *npcs = live;

        for index in self.occupied.drain(..) {
            if let Some(cell) = self.cells.get_mut(index) {
                cell.occupant = None;
            }
        }

        for npc in npcs.iter() {
            let Some(index) = npc.cell().and_then(|cell| self.index(cell)) else {
                continue;
            };
            let slot = &mut self.cells[index];
            if slot.is_wall() {
                continue;
            }
            if let Some(existing) = slot.occupant {
                debug!(
                    npc = npc.id().get(),
                    existing = existing.get(),
                    "cell already occupied; keeping first occupant"
                );
                continue;
            }
            slot.occupant = Some(npc.id());
            self.occupied.push(index);
        }

        dead
    }

    /// Cell the player starts in.
    #[must_use]
    pub const fn player_spawn(&self) -> CellCoord {
        self.player_spawn
    }

    /// NPC spawns in declaration order: layout glyphs first, then explicit
    /// entries.
    #[must_use]
    pub fn npc_spawns(&self) -> &[NpcSpawn] {
        &self.npc_spawns
    }

    /// Name of the texture registered under `id`.
    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&str> {
        self.textures.get(&id).map(String::as_str)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    fn coord(&self, index: usize) -> CellCoord {
        let width = self.columns as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }
}

impl WallLayout for LevelMap {
    fn dimensions(&self) -> (u32, u32) {
        LevelMap::dimensions(self)
    }

    fn wall_texture(&self, cell: CellCoord) -> Option<TextureId> {
        self.cell(cell).ok().and_then(Cell::wall_texture)
    }
}
