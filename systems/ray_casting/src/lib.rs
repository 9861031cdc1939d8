#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic column ray caster.
//!
//! For every screen column the caster walks a ray through the grid one grid
//! line at a time (a digital differential analyser), always advancing along
//! the axis whose next crossing is nearer. Cells are therefore visited in
//! strictly increasing distance order and none is skipped. The first wall
//! cell stops the ray and produces a [`RayHit`] whose distance is projected
//! onto the camera's forward axis so that flat walls stay flat on screen.

use glam::Vec2;
use gridcast_core::{CameraPose, CellCoord, ColumnHit, RayHit, WallLayout, WallSide};
use tracing::trace;

/// Default maximum ray length, in world units.
pub const DEFAULT_MAX_DISTANCE: f32 = 20.0;

/// Smallest perpendicular distance ever reported for a hit.
const MIN_PERPENDICULAR_DISTANCE: f32 = 1.0e-4;

/// Tunables for the ray caster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCastConfig {
    /// Rays stop and report [`ColumnHit::NoWallHit`] past this length.
    pub max_distance: f32,
}

impl Default for RayCastConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// Stateless solver that turns a grid and a camera pose into column hits.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayCaster {
    config: RayCastConfig,
}

impl RayCaster {
    /// Creates a ray caster using the provided configuration.
    #[must_use]
    pub const fn new(config: RayCastConfig) -> Self {
        Self { config }
    }

    /// Configuration the caster was created with.
    #[must_use]
    pub const fn config(&self) -> RayCastConfig {
        self.config
    }

    /// Casts one ray per screen column and writes the outcomes to `out`.
    ///
    /// `out` is cleared first and receives exactly `columns` entries in
    /// column order, left to right. Its allocation is reused across frames.
    pub fn cast_columns<L>(
        &self,
        layout: &L,
        pose: &CameraPose,
        columns: usize,
        out: &mut Vec<ColumnHit>,
    ) where
        L: WallLayout + ?Sized,
    {
        out.clear();
        out.reserve(columns);

        let origin = pose.position();
        let facing = pose.angle();
        for column in 0..columns {
            let angle = facing + column_offset(pose.fov(), column, columns);
            out.push(self.cast_ray(layout, origin, angle, facing));
        }

        trace!(
            columns,
            walls = out.iter().filter(|hit| hit.hit().is_some()).count(),
            "cast frame"
        );
    }

    /// Casts a single ray from `origin` along `angle`.
    ///
    /// `facing` is the camera's forward angle; the reported distance is the
    /// ray length projected onto it.
    #[must_use]
    pub fn cast_ray<L>(&self, layout: &L, origin: Vec2, angle: f32, facing: f32) -> ColumnHit
    where
        L: WallLayout + ?Sized,
    {
        let (columns, rows) = layout.dimensions();
        let Some(start) = CellCoord::from_position(origin)
            .filter(|cell| cell.column() < columns && cell.row() < rows)
        else {
            return ColumnHit::NoWallHit;
        };

        let direction = Vec2::from_angle(angle);

        // Truncation places a camera standing on a grid line in the cell on
        // its positive side. Moving into that cell means touching its face.
        if let Some(side) = entry_side(origin, start, direction) {
            if let Some(texture_id) = layout.wall_texture(start) {
                return ColumnHit::Wall(RayHit {
                    perpendicular_distance: MIN_PERPENDICULAR_DISTANCE,
                    wall_side: side,
                    texture_id,
                    texture_offset: texture_offset(origin, direction, side),
                    cell: start,
                });
            }
        }

        let mut along_x = AxisWalk::new(origin.x, start.column(), direction.x);
        let mut along_y = AxisWalk::new(origin.y, start.row(), direction.y);
        let mut column = start.column();
        let mut row = start.row();

        // A ray crosses each grid line at most once before leaving the grid.
        let max_steps = u64::from(columns) + u64::from(rows) + 2;
        for _ in 0..max_steps {
            let (distance, side, next) = if along_x.next_crossing <= along_y.next_crossing {
                let distance = along_x.next_crossing;
                let next = along_x.advance(column);
                (distance, WallSide::Vertical, next)
            } else {
                let distance = along_y.next_crossing;
                let next = along_y.advance(row);
                (distance, WallSide::Horizontal, next)
            };

            if !(distance <= self.config.max_distance) {
                return ColumnHit::NoWallHit;
            }
            let Some(next) = next else {
                return ColumnHit::NoWallHit;
            };
            match side {
                WallSide::Vertical => column = next,
                WallSide::Horizontal => row = next,
            }
            if column >= columns || row >= rows {
                return ColumnHit::NoWallHit;
            }

            let cell = CellCoord::new(column, row);
            if let Some(texture_id) = layout.wall_texture(cell) {
                let hit_point = origin + direction * distance;
                let perpendicular_distance =
                    (distance * (angle - facing).cos()).max(MIN_PERPENDICULAR_DISTANCE);
                return ColumnHit::Wall(RayHit {
                    perpendicular_distance,
                    wall_side: side,
                    texture_id,
                    texture_offset: texture_offset(hit_point, direction, side),
                    cell,
                });
            }
        }

        ColumnHit::NoWallHit
    }
}

/// Angle between the camera's forward axis and the ray of `column`.
///
/// Rays sample column centres, spread linearly across `[-fov/2, +fov/2]`.
#[must_use]
pub fn column_offset(fov: f32, column: usize, columns: usize) -> f32 {
    if columns == 0 {
        return 0.0;
    }
    let t = (column as f32 + 0.5) / columns as f32;
    fov * (t - 0.5)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Forward,
    Backward,
    Still,
}

/// Progress of a ray along one axis.
#[derive(Clone, Copy, Debug)]
struct AxisWalk {
    step: Step,
    /// Ray length between two successive crossings of this axis' grid lines.
    delta: f32,
    /// Ray length at which the next grid line of this axis is crossed.
    next_crossing: f32,
}

impl AxisWalk {
    fn new(origin: f32, cell: u32, direction: f32) -> Self {
        if direction == 0.0 {
            return Self {
                step: Step::Still,
                delta: f32::INFINITY,
                next_crossing: f32::INFINITY,
            };
        }

        let delta = 1.0 / direction.abs();
        let cell = cell as f32;
        if direction < 0.0 {
            Self {
                step: Step::Backward,
                delta,
                next_crossing: (origin - cell) * delta,
            }
        } else {
            Self {
                step: Step::Forward,
                delta,
                next_crossing: (cell + 1.0 - origin) * delta,
            }
        }
    }

    /// Crosses the next grid line, returning the index of the entered cell.
    fn advance(&mut self, index: u32) -> Option<u32> {
        self.next_crossing += self.delta;
        match self.step {
            Step::Forward => index.checked_add(1),
            Step::Backward => index.checked_sub(1),
            Step::Still => None,
        }
    }
}

/// Face of `start` the ray enters through when `origin` lies on the near
/// boundary of `start` and the ray points into the cell.
fn entry_side(origin: Vec2, start: CellCoord, direction: Vec2) -> Option<WallSide> {
    if direction.x > 0.0 && origin.x == start.column() as f32 {
        Some(WallSide::Vertical)
    } else if direction.y > 0.0 && origin.y == start.row() as f32 {
        Some(WallSide::Horizontal)
    } else {
        None
    }
}

/// Fractional position of `hit_point` along the wall face, in `[0, 1)`.
///
/// Faces seen from the west and from the south are mirrored so that a
/// texture reads left to right from every viewing direction.
fn texture_offset(hit_point: Vec2, direction: Vec2, side: WallSide) -> f32 {
    let (along, mirrored) = match side {
        WallSide::Vertical => (hit_point.y, direction.x < 0.0),
        WallSide::Horizontal => (hit_point.x, direction.y > 0.0),
    };
    let fraction = unit_fraction(along);
    if mirrored {
        unit_fraction(1.0 - fraction)
    } else {
        fraction
    }
}

fn unit_fraction(value: f32) -> f32 {
    let fraction = value - value.floor();
    if fraction.is_finite() && (0.0..1.0).contains(&fraction) {
        fraction
    } else {
        0.0
    }
}
