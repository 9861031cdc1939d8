#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridcast engine.
//!
//! This crate defines the value types that connect the level model, the two
//! solvers and the adapters. Adapters submit [`Command`] values describing
//! desired mutations, the engine executes those commands via its `apply`
//! entry point and broadcasts [`Event`] values. Solvers read immutable
//! snapshots of the grid and return plain value records ([`ColumnHit`],
//! [`Path`]) that the caller owns.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible engine mutations during play.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the camera pose with the provided one.
    SetCameraPose {
        /// Pose the camera adopts.
        pose: CameraPose,
    },
    /// Moves an NPC to a new continuous position.
    MoveNpc {
        /// Identifier of the NPC being moved.
        npc: NpcId,
        /// Destination expressed in world units.
        position: Vec2,
    },
    /// Clears the liveness flag of an NPC. The NPC is pruned on the next refresh.
    KillNpc {
        /// Identifier of the NPC that died.
        npc: NpcId,
    },
    /// Rebuilds the occupant map from the live NPC list.
    RefreshOccupants,
}

/// Events broadcast by the engine after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the camera adopted a new pose.
    CameraMoved {
        /// Pose after the update.
        pose: CameraPose,
    },
    /// Confirms that an NPC changed cells.
    NpcChangedCell {
        /// Identifier of the NPC that moved.
        npc: NpcId,
        /// Cell the NPC stood on before the move, if it was inside the grid.
        from: Option<CellCoord>,
        /// Cell the NPC stands on after the move, if it is inside the grid.
        to: Option<CellCoord>,
    },
    /// Confirms that an NPC lost its liveness flag.
    NpcKilled {
        /// Identifier of the NPC that died.
        npc: NpcId,
    },
    /// Reports that a dead NPC was removed from the authoritative list.
    NpcPruned {
        /// Identifier of the pruned NPC.
        npc: NpcId,
    },
    /// Announces that the occupant map was rebuilt.
    OccupantsRefreshed {
        /// Number of NPCs recorded in the occupant map.
        recorded: usize,
    },
}

/// Unique identifier assigned to an NPC when a level loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(u32);

impl NpcId {
    /// Creates a new NPC identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a wall texture declared by the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(u16);

impl TextureId {
    /// Creates a new texture identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Maps a world-space position onto the cell containing it.
    ///
    /// Positions are truncated towards zero. Negative or non-finite
    /// coordinates have no cell and yield `None`; bounds are not checked.
    #[must_use]
    pub fn from_position(position: Vec2) -> Option<Self> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        if position.x >= u32::MAX as f32 || position.y >= u32::MAX as f32 {
            return None;
        }

        Some(Self::new(position.x as u32, position.y as u32))
    }

    /// World-space position of the cell centre.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Returns the neighbouring cell in `direction` when it lies inside a
    /// `columns` × `rows` grid.
    #[must_use]
    pub fn neighbor(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        if column < columns && row < rows {
            Some(Self::new(column, row))
        } else {
            None
        }
    }
}

/// Movement directions on the grid. Rows grow towards the south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// Diagonal movement north and east.
    NorthEast,
    /// Diagonal movement south and east.
    SouthEast,
    /// Diagonal movement south and west.
    SouthWest,
    /// Diagonal movement north and west.
    NorthWest,
}

impl Direction {
    /// Cardinal directions in fixed expansion order.
    pub const CARDINAL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// All eight directions in fixed expansion order, cardinals first.
    pub const ALL: [Direction; 8] = [
        Self::North,
        Self::East,
        Self::South,
        Self::West,
        Self::NorthEast,
        Self::SouthEast,
        Self::SouthWest,
        Self::NorthWest,
    ];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::NorthEast => (1, -1),
            Self::SouthEast => (1, 1),
            Self::SouthWest => (-1, 1),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Reports whether the direction moves along both axes at once.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    /// Splits a diagonal into its two cardinal components.
    #[must_use]
    pub const fn components(self) -> Option<(Direction, Direction)> {
        match self {
            Self::NorthEast => Some((Self::North, Self::East)),
            Self::SouthEast => Some((Self::South, Self::East)),
            Self::SouthWest => Some((Self::South, Self::West)),
            Self::NorthWest => Some((Self::North, Self::West)),
            Self::North | Self::East | Self::South | Self::West => None,
        }
    }

    /// Direction of a single step between two neighbouring cells.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let dx = i64::from(to.column()) - i64::from(from.column());
        let dy = i64::from(to.row()) - i64::from(from.row());
        Self::ALL
            .into_iter()
            .find(|direction| {
                let (ox, oy) = direction.offset();
                i64::from(ox) == dx && i64::from(oy) == dy
            })
    }
}

/// Read access to the static wall layout of a grid.
///
/// The ray caster only needs to know the grid bounds and which cells are
/// walls, so it depends on this trait rather than on the full level model.
pub trait WallLayout {
    /// Number of columns and rows in the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Texture of the wall occupying `cell`, or `None` for open or
    /// out-of-bounds cells.
    fn wall_texture(&self, cell: CellCoord) -> Option<TextureId>;
}

/// Continuous camera position and orientation, owned by the player component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    position: Vec2,
    angle: f32,
    fov: f32,
}

impl CameraPose {
    /// Creates a pose at `position` facing `angle` radians with a field of
    /// view of `fov` radians. Angle zero faces east and grows towards south.
    #[must_use]
    pub const fn new(position: Vec2, angle: f32, fov: f32) -> Self {
        Self {
            position,
            angle,
            fov,
        }
    }

    /// Camera position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Horizontal field of view in radians.
    #[must_use]
    pub const fn fov(&self) -> f32 {
        self.fov
    }

    /// Unit vector along the facing direction.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Cell containing the camera, if its position is non-negative.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::from_position(self.position)
    }

    /// Returns a copy moved to `position`.
    #[must_use]
    pub fn with_position(self, position: Vec2) -> Self {
        Self { position, ..self }
    }

    /// Returns a copy facing `angle` radians.
    #[must_use]
    pub fn with_angle(self, angle: f32) -> Self {
        Self { angle, ..self }
    }
}

/// Grid line crossed by a ray immediately before it hit a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallSide {
    /// The ray crossed a vertical grid line (constant column boundary).
    Vertical,
    /// The ray crossed a horizontal grid line (constant row boundary).
    Horizontal,
}

/// Nearest wall intersected by a single column's ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Ray length projected onto the camera's forward axis.
    pub perpendicular_distance: f32,
    /// Orientation of the wall face that was hit.
    pub wall_side: WallSide,
    /// Texture assigned to the wall cell.
    pub texture_id: TextureId,
    /// Fractional position along the wall face, in `[0, 1)`.
    pub texture_offset: f32,
    /// Wall cell that stopped the ray.
    pub cell: CellCoord,
}

/// Outcome of casting one column's ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnHit {
    /// The ray hit a wall within the maximum ray length.
    Wall(RayHit),
    /// The ray left the grid or exceeded the maximum length; draw background.
    NoWallHit,
}

impl ColumnHit {
    /// Wall hit recorded for the column, if any.
    #[must_use]
    pub const fn hit(&self) -> Option<&RayHit> {
        match self {
            Self::Wall(hit) => Some(hit),
            Self::NoWallHit => None,
        }
    }

    /// Perpendicular distance of the hit, if any.
    #[must_use]
    pub fn distance(&self) -> Option<f32> {
        self.hit().map(|hit| hit.perpendicular_distance)
    }
}

/// Ordered sequence of waypoints leading from a start cell to a goal cell.
///
/// The start cell is not included; the goal cell is the final waypoint. A
/// path between identical cells has no waypoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<CellCoord>,
}

impl Path {
    /// Creates a path from waypoints ordered from the start outward.
    #[must_use]
    pub fn new(waypoints: Vec<CellCoord>) -> Self {
        Self { waypoints }
    }

    /// Zero-length path returned when the start already is the goal.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// First cell to step onto, if any.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.waypoints.first().copied()
    }

    /// Final cell of the path, if any.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.waypoints.last().copied()
    }

    /// Consumes the path, yielding the underlying waypoints.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        self.waypoints
    }
}

/// A query addressed a cell outside the grid. Indicates a caller defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error(
    "cell ({}, {}) lies outside the {columns}x{rows} grid",
    .cell.column(),
    .cell.row()
)]
pub struct OutOfBoundsQuery {
    /// Cell that was requested.
    pub cell: CellCoord,
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
}

/// Reasons a level description cannot be turned into a grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedLevel {
    /// The layout has no rows or no columns.
    #[error("level layout has zero width or height")]
    ZeroDimensions,
    /// A layout row does not match the width of the first row.
    #[error("layout row {row} has width {width}, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: u32,
        /// Width of the offending row.
        width: u32,
        /// Width of the first row.
        expected: u32,
    },
    /// The layout contains a glyph with no meaning.
    #[error("unknown glyph {glyph:?} at ({column}, {row})")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
    },
    /// A wall references a texture id the level never declares.
    #[error("wall at ({column}, {row}) references undefined texture {}", .texture.get())]
    UndefinedTexture {
        /// Referenced texture.
        texture: TextureId,
        /// Column of the wall.
        column: u32,
        /// Row of the wall.
        row: u32,
    },
    /// The same texture id is declared twice.
    #[error("texture {} is declared more than once", .texture.get())]
    DuplicateTexture {
        /// Texture declared twice.
        texture: TextureId,
    },
    /// No cell is marked as the player spawn.
    #[error("level has no player spawn cell")]
    MissingSpawn,
    /// More than one cell is marked as the player spawn.
    #[error("level declares more than one player spawn")]
    DuplicateSpawn,
    /// An NPC spawn lies outside the grid.
    #[error("npc spawn ({column}, {row}) lies outside the grid")]
    NpcOutOfBounds {
        /// Column of the spawn.
        column: u32,
        /// Row of the spawn.
        row: u32,
    },
    /// An NPC spawn lies inside a wall.
    #[error("npc spawn ({column}, {row}) lies inside a wall")]
    NpcInWall {
        /// Column of the spawn.
        column: u32,
        /// Row of the spawn.
        row: u32,
    },
}
