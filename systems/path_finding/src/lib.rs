#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic grid path finding for NPCs.
//!
//! [`PathFinder`] runs an A* search with unit step cost over a 4- or
//! 8-connected grid. It holds no state between calls: the blocked predicate
//! is evaluated afresh on every search so occupant changes are picked up
//! immediately. [`Navigator`] layers per-NPC re-planning on top.

mod navigator;

use std::{cmp::Reverse, collections::BinaryHeap};

use gridcast_core::{CellCoord, Direction, NpcId, OutOfBoundsQuery, Path};
use gridcast_world::LevelMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use navigator::{Navigator, ReplanReason};

/// Neighbourhood used when expanding cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Cardinal steps only; distances follow the Manhattan metric.
    Four,
    /// Cardinal and diagonal steps; distances follow the Chebyshev metric.
    #[default]
    Eight,
}

impl Connectivity {
    /// Directions expanded from every cell, in fixed order.
    #[must_use]
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Self::Four => &Direction::CARDINAL,
            Self::Eight => &Direction::ALL,
        }
    }

    /// Grid distance between two cells under this connectivity.
    ///
    /// Used as the A* heuristic; it is admissible and consistent for unit
    /// step cost.
    #[must_use]
    pub fn distance(self, from: CellCoord, to: CellCoord) -> u32 {
        match self {
            Self::Four => from.manhattan_distance(to),
            Self::Eight => from.chebyshev_distance(to),
        }
    }
}

/// Errors reported for malformed path requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The start or goal cell lies outside the grid.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsQuery),
}

/// Stateless shortest-path solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathFinder {
    connectivity: Connectivity,
}

impl PathFinder {
    /// Creates a solver for the provided connectivity.
    #[must_use]
    pub const fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// Connectivity the solver expands.
    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Computes a shortest path from `start` to `goal` on a grid of
    /// `bounds = (columns, rows)` cells.
    ///
    /// Returns `Ok(Some(path))` with an empty path when `start == goal` and
    /// `Ok(None)` when the goal is blocked or unreachable. The start cell is
    /// never tested against `is_blocked`. Diagonal steps may not cut past a
    /// blocked cardinal neighbour. Among equal-cost candidates the one
    /// discovered first wins, with neighbours discovered in the fixed order
    /// of [`Connectivity::directions`], so identical inputs always produce
    /// the same path.
    pub fn find_path<F>(
        &self,
        bounds: (u32, u32),
        start: CellCoord,
        goal: CellCoord,
        mut is_blocked: F,
    ) -> Result<Option<Path>, PathError>
    where
        F: FnMut(CellCoord) -> bool,
    {
        let (columns, rows) = bounds;
        let start_index = index(columns, rows, start)?;
        let goal_index = index(columns, rows, goal)?;

        if start == goal {
            return Ok(Some(Path::empty()));
        }
        if is_blocked(goal) {
            return Ok(None);
        }

        let cell_count = columns as usize * rows as usize;
        let mut best_cost = vec![u32::MAX; cell_count];
        let mut parent: Vec<Option<usize>> = vec![None; cell_count];
        let mut closed = vec![false; cell_count];
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0_u64;

        best_cost[start_index] = 0;
        let heuristic = self.connectivity.distance(start, goal);
        frontier.push(Reverse(FrontierEntry {
            estimate: heuristic,
            heuristic,
            sequence,
            cell: start,
        }));

        while let Some(Reverse(entry)) = frontier.pop() {
            let current = cell_index(columns, entry.cell);
            if closed[current] {
                continue;
            }
            closed[current] = true;

            if current == goal_index {
                return Ok(Some(reconstruct(columns, &parent, start_index, goal_index)));
            }

            let cost = best_cost[current].saturating_add(1);
            for &direction in self.connectivity.directions() {
                let Some(neighbor) = entry.cell.neighbor(direction, columns, rows) else {
                    continue;
                };
                let neighbor_index = cell_index(columns, neighbor);
                if closed[neighbor_index] || cost >= best_cost[neighbor_index] {
                    continue;
                }
                if is_blocked(neighbor) {
                    continue;
                }
                if cuts_corner(entry.cell, direction, columns, rows, &mut is_blocked) {
                    continue;
                }

                best_cost[neighbor_index] = cost;
                parent[neighbor_index] = Some(current);
                sequence += 1;
                let heuristic = self.connectivity.distance(neighbor, goal);
                frontier.push(Reverse(FrontierEntry {
                    estimate: cost.saturating_add(heuristic),
                    heuristic,
                    sequence,
                    cell: neighbor,
                }));
            }
        }

        Ok(None)
    }

    /// Computes a path for an NPC through `level`, treating walls and every
    /// other NPC's cell as blocked.
    pub fn find_level_path(
        &self,
        level: &LevelMap,
        requester: Option<NpcId>,
        start: CellCoord,
        goal: CellCoord,
    ) -> Result<Option<Path>, PathError> {
        self.find_path(
            level.dimensions(),
            start,
            goal,
            level_predicate(level, requester),
        )
    }
}

/// Blocked predicate over a level: walls plus occupants other than
/// `requester`.
pub fn level_predicate(
    level: &LevelMap,
    requester: Option<NpcId>,
) -> impl Fn(CellCoord) -> bool + '_ {
    move |cell| level.is_blocked(cell, requester)
}

/// Frontier entry ordered by estimated total cost, then by remaining
/// distance, then by discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    estimate: u32,
    heuristic: u32,
    sequence: u64,
    cell: CellCoord,
}

fn cuts_corner<F>(
    from: CellCoord,
    direction: Direction,
    columns: u32,
    rows: u32,
    is_blocked: &mut F,
) -> bool
where
    F: FnMut(CellCoord) -> bool,
{
    let Some((first, second)) = direction.components() else {
        return false;
    };
    [first, second].into_iter().any(|component| {
        from.neighbor(component, columns, rows)
            .map_or(true, |cell| is_blocked(cell))
    })
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Result<usize, OutOfBoundsQuery> {
    if cell.column() < columns && cell.row() < rows {
        Ok(cell_index(columns, cell))
    } else {
        Err(OutOfBoundsQuery {
            cell,
            columns,
            rows,
        })
    }
}

fn cell_index(columns: u32, cell: CellCoord) -> usize {
    cell.row() as usize * columns as usize + cell.column() as usize
}

fn reconstruct(columns: u32, parent: &[Option<usize>], start: usize, goal: usize) -> Path {
    let width = columns as usize;
    let mut waypoints = Vec::new();
    let mut current = goal;
    while current != start {
        waypoints.push(CellCoord::new(
            (current % width) as u32,
            (current / width) as u32,
        ));
        match parent[current] {
            Some(previous) => current = previous,
            None => break,
        }
    }
    waypoints.reverse();
    Path::new(waypoints)
}
