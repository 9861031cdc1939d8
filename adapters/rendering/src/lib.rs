#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gridcast adapters.
//!
//! The ray caster reports one [`ColumnHit`] per screen column. This crate
//! projects those hits into vertical [`ColumnStrip`]s, keeps the per-column
//! [`DepthBuffer`] external renderers need for sprite occlusion, and offers a
//! plain-text [`AsciiFrame`] used by the command-line adapter.

use anyhow::Result as AnyResult;
use gridcast_core::{ColumnHit, TextureId, WallSide};
use std::{error::Error, fmt};

/// Distances below this are clamped before computing wall heights.
pub const MIN_PROJECTION_DISTANCE: f32 = 1.0e-3;

/// Screen dimensions, in columns and rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    columns: u32,
    rows: u32,
}

impl Viewport {
    /// Creates a viewport, rejecting zero-sized screens.
    pub fn new(columns: u32, rows: u32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyViewport { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Number of screen columns, one ray each.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of screen rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }
}

/// Vertical wall slice drawn for one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallStrip {
    /// First covered row, inclusive.
    pub top: u32,
    /// Last covered row, exclusive.
    pub bottom: u32,
    /// Unclipped wall height in rows; texture rows scale against it.
    pub height: f32,
    /// Texture of the hit wall.
    pub texture_id: TextureId,
    /// Horizontal texture coordinate in `[0, 1)`.
    pub texture_offset: f32,
    /// Face of the wall that was hit.
    pub side: WallSide,
    /// Perpendicular distance to the wall.
    pub depth: f32,
}

/// Projected outcome of one screen column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnStrip {
    /// Screen column index.
    pub column: usize,
    /// Wall slice, or `None` for open sky.
    pub wall: Option<WallStrip>,
}

impl ColumnStrip {
    /// Column where no wall was hit.
    #[must_use]
    pub const fn sky(column: usize) -> Self {
        Self { column, wall: None }
    }

    /// Whether the column shows no wall.
    #[must_use]
    pub const fn is_sky(&self) -> bool {
        self.wall.is_none()
    }

    /// Perpendicular distance of the wall, or infinity for sky columns.
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.wall.map_or(f32::INFINITY, |wall| wall.depth)
    }
}

/// Height, in rows, of a wall seen at `distance`.
#[must_use]
pub fn wall_height(distance: f32, screen_rows: u32) -> f32 {
    screen_rows as f32 / distance.max(MIN_PROJECTION_DISTANCE)
}

/// Projects column hits into strips centred on the horizon.
///
/// `out` is cleared first and receives one strip per hit, in column order.
pub fn project_columns(hits: &[ColumnHit], screen_rows: u32, out: &mut Vec<ColumnStrip>) {
    out.clear();
    out.reserve(hits.len());

    let rows = screen_rows as f32;
    let horizon = rows / 2.0;
    out.extend(hits.iter().enumerate().map(|(column, hit)| {
        let ColumnHit::Wall(hit) = hit else {
            return ColumnStrip::sky(column);
        };
        let height = wall_height(hit.perpendicular_distance, screen_rows);
        let top = (horizon - height / 2.0).round().clamp(0.0, rows) as u32;
        let bottom = (horizon + height / 2.0).round().clamp(0.0, rows) as u32;
        ColumnStrip {
            column,
            wall: Some(WallStrip {
                top,
                bottom: bottom.max(top),
                height,
                texture_id: hit.texture_id,
                texture_offset: hit.texture_offset,
                side: hit.wall_side,
                depth: hit.perpendicular_distance,
            }),
        }
    }));
}

/// Per-column wall distances for the current frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepthBuffer {
    depths: Vec<f32>,
}

impl DepthBuffer {
    /// Creates an empty depth buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the buffer contents with the depths of `strips`.
    pub fn fill(&mut self, strips: &[ColumnStrip]) {
        self.depths.clear();
        self.depths.extend(strips.iter().map(ColumnStrip::depth));
    }

    /// Number of columns recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether no columns are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Wall distance at `column`; infinity when the column shows sky.
    #[must_use]
    pub fn depth(&self, column: usize) -> Option<f32> {
        self.depths.get(column).copied()
    }

    /// Whether something at `distance` in `column` is hidden behind a wall.
    ///
    /// Columns outside the buffer count as hidden.
    #[must_use]
    pub fn occludes(&self, column: usize, distance: f32) -> bool {
        self.depth(column).map_or(true, |depth| distance >= depth)
    }
}

/// Glyph drawn above the horizon where no wall covers the column.
pub const SKY_GLYPH: char = ' ';
/// Glyph drawn below the horizon where no wall covers the column.
pub const FLOOR_GLYPH: char = '.';

// Nearest first.
const WALL_RAMP: [char; 8] = ['@', '#', '%', '*', '+', '=', '-', ':'];

/// Character rendition of a projected frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiFrame {
    columns: usize,
    rows: usize,
    glyphs: Vec<char>,
}

impl AsciiFrame {
    /// Rasterises `strips` into a frame of `viewport.rows()` rows.
    ///
    /// Walls are shaded by distance, with `max_depth` mapping to the faintest
    /// glyph. Horizontal faces are drawn one shade fainter than vertical ones.
    #[must_use]
    pub fn render(strips: &[ColumnStrip], viewport: Viewport, max_depth: f32) -> Self {
        let columns = strips.len();
        let rows = viewport.rows() as usize;
        let horizon = rows / 2;
        let mut glyphs = Vec::with_capacity(columns * rows);

        for row in 0..rows {
            for strip in strips {
                let glyph = match strip.wall {
                    Some(wall) if (wall.top as usize..wall.bottom as usize).contains(&row) => {
                        shade(wall, max_depth)
                    }
                    _ if row < horizon => SKY_GLYPH,
                    _ => FLOOR_GLYPH,
                };
                glyphs.push(glyph);
            }
        }

        Self {
            columns,
            rows,
            glyphs,
        }
    }

    /// Width of the frame in characters.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Height of the frame in lines.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Glyph at the provided position.
    #[must_use]
    pub fn glyph(&self, column: usize, row: usize) -> Option<char> {
        if column >= self.columns {
            return None;
        }
        self.glyphs.get(row * self.columns + column).copied()
    }
}

fn shade(wall: WallStrip, max_depth: f32) -> char {
    let last = WALL_RAMP.len() - 1;
    let ratio = if max_depth > 0.0 {
        (wall.depth / max_depth).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut index = (ratio * last as f32).round() as usize;
    if wall.side == WallSide::Horizontal {
        index += 1;
    }
    WALL_RAMP[index.min(last)]
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns == 0 {
            return Ok(());
        }
        for line in self.glyphs.chunks(self.columns) {
            for glyph in line {
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rendering backend capable of presenting projected frames.
pub trait RenderingBackend {
    /// Presents one frame.
    ///
    /// `strips` holds one entry per screen column in column order and `depth`
    /// the matching wall distances for sprite occlusion.
    fn present(&mut self, strips: &[ColumnStrip], depth: &DepthBuffer) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The screen must have at least one column and one row.
    EmptyViewport {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyViewport { columns, rows } => {
                write!(
                    f,
                    "viewport must be at least 1x1 (received {columns}x{rows})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcast_core::{CellCoord, RayHit};

    fn wall(distance: f32, side: WallSide) -> ColumnHit {
        ColumnHit::Wall(RayHit {
            perpendicular_distance: distance,
            wall_side: side,
            texture_id: TextureId::new(3),
            texture_offset: 0.25,
            cell: CellCoord::new(1, 1),
        })
    }

    fn project(hits: &[ColumnHit], rows: u32) -> Vec<ColumnStrip> {
        let mut out = Vec::new();
        project_columns(hits, rows, &mut out);
        out
    }

    #[test]
    fn viewport_rejects_zero_dimensions_without_panicking() {
        assert_eq!(
            Viewport::new(0, 24),
            Err(RenderingError::EmptyViewport {
                columns: 0,
                rows: 24
            })
        );
        assert!(Viewport::new(80, 0).is_err());
        assert_eq!(Viewport::new(80, 24).map(|viewport| viewport.rows()), Ok(24));
    }

    #[test]
    fn wall_height_is_inverse_of_distance() {
        let strips = project(
            &[wall(1.0, WallSide::Vertical), wall(2.0, WallSide::Vertical)],
            24,
        );

        let near = strips[0].wall.expect("wall");
        assert_eq!((near.top, near.bottom), (0, 24));
        let far = strips[1].wall.expect("wall");
        assert_eq!((far.top, far.bottom), (6, 18));
        assert_eq!(far.height, 12.0);
        assert_eq!(far.texture_id, TextureId::new(3));
        assert_eq!(far.texture_offset, 0.25);
    }

    #[test]
    fn tiny_distances_are_clamped_and_clipped() {
        let strips = project(&[wall(1.0e-6, WallSide::Horizontal)], 10);
        let strip = strips[0].wall.expect("wall");

        assert_eq!(strip.height, 10.0 / MIN_PROJECTION_DISTANCE);
        assert_eq!((strip.top, strip.bottom), (0, 10));
        assert!(strip.height.is_finite());
    }

    #[test]
    fn sky_columns_have_infinite_depth() {
        let strips = project(&[ColumnHit::NoWallHit, wall(4.0, WallSide::Vertical)], 24);
        let mut depth = DepthBuffer::new();
        depth.fill(&strips);

        assert_eq!(strips[0], ColumnStrip::sky(0));
        assert!(strips[0].is_sky());
        assert_eq!(depth.len(), 2);
        assert_eq!(depth.depth(0), Some(f32::INFINITY));
        assert_eq!(depth.depth(1), Some(4.0));
        assert!(!depth.occludes(0, 100.0));
        assert!(depth.occludes(1, 4.5));
        assert!(!depth.occludes(1, 3.5));
        assert!(depth.occludes(2, 0.0));
    }

    #[test]
    fn ascii_frame_draws_sky_wall_and_floor() {
        let strips = project(
            &[
                ColumnHit::NoWallHit,
                wall(2.0, WallSide::Vertical),
                wall(2.0, WallSide::Horizontal),
            ],
            4,
        );
        let viewport = Viewport::new(3, 4).expect("viewport");

        let frame = AsciiFrame::render(&strips, viewport, 8.0);

        assert_eq!(frame.columns(), 3);
        assert_eq!(frame.rows(), 4);
        assert_eq!(frame.to_string(), "   \n %*\n.%*\n...\n");
        assert_eq!(frame.glyph(0, 3), Some(FLOOR_GLYPH));
        assert_eq!(frame.glyph(3, 0), None);
    }

    #[test]
    fn shading_fades_with_distance() {
        let near = shade(
            WallStrip {
                top: 0,
                bottom: 1,
                height: 1.0,
                texture_id: TextureId::new(1),
                texture_offset: 0.0,
                side: WallSide::Vertical,
                depth: 0.5,
            },
            20.0,
        );
        let far = shade(
            WallStrip {
                top: 0,
                bottom: 1,
                height: 1.0,
                texture_id: TextureId::new(1),
                texture_offset: 0.0,
                side: WallSide::Horizontal,
                depth: 40.0,
            },
            20.0,
        );

        assert_eq!(near, '@');
        assert_eq!(far, ':');
    }
}
