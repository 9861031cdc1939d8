use std::collections::VecDeque;

use gridcast_core::{CellCoord, NpcId};
use gridcast_world::LevelMap;
use tracing::debug;

use crate::{PathError, PathFinder};

/// Why a [`Navigator`] last computed a fresh path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplanReason {
    /// No waypoints were cached.
    Exhausted,
    /// The requested goal differs from the cached one.
    GoalChanged,
    /// The NPC is no longer on the cell the next waypoint was planned from.
    LeftPath,
    /// The next waypoint is now a wall or held by another NPC.
    Blocked,
}

/// Per-NPC path state consumed one waypoint at a time.
///
/// The navigator caches the last planned path and hands out its next cell on
/// every call to [`Navigator::next_waypoint`], asking the [`PathFinder`] for a
/// new path only when the cached one is stale.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    goal: Option<CellCoord>,
    waypoints: VecDeque<CellCoord>,
    anchor: Option<CellCoord>,
    last_replan: Option<ReplanReason>,
}

impl Navigator {
    /// Creates a navigator with no cached path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell the NPC standing on `current` should head to next.
    ///
    /// A waypoint equal to `current` counts as reached and is consumed.
    /// Returns `None` when the NPC already stands on `goal` or no path
    /// exists; the NPC idles in that case and the next call plans again.
    pub fn next_waypoint(
        &mut self,
        finder: &PathFinder,
        level: &LevelMap,
        npc: NpcId,
        current: CellCoord,
        goal: CellCoord,
    ) -> Result<Option<CellCoord>, PathError> {
        if current == goal {
            self.invalidate();
            self.goal = Some(goal);
            return Ok(None);
        }

        if self.waypoints.front() == Some(&current) {
            let _ = self.advance();
        }

        let Some(reason) = self.stale_reason(level, npc, current, goal) else {
            return Ok(self.waypoints.front().copied());
        };

        let path = finder.find_level_path(level, Some(npc), current, goal)?;
        self.last_replan = Some(reason);
        self.goal = Some(goal);
        match path {
            Some(path) => {
                debug!(
                    npc = npc.get(),
                    ?reason,
                    steps = path.len(),
                    first = ?path.first(),
                    "planned path"
                );
                self.waypoints = path.into_vec().into();
                self.anchor = Some(current);
            }
            None => {
                debug!(npc = npc.get(), ?reason, "no path to goal");
                self.waypoints.clear();
                self.anchor = None;
            }
        }

        Ok(self.waypoints.front().copied())
    }

    /// Pops the next waypoint once the NPC has reached it.
    pub fn advance(&mut self) -> Option<CellCoord> {
        let reached = self.waypoints.pop_front()?;
        self.anchor = Some(reached);
        Some(reached)
    }

    /// Drops the cached path so the next request plans from scratch.
    pub fn invalidate(&mut self) {
        self.goal = None;
        self.waypoints.clear();
        self.anchor = None;
    }

    /// Goal of the cached path, if any.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.goal
    }

    /// Waypoints still to be visited, nearest first.
    pub fn remaining(&self) -> impl ExactSizeIterator<Item = CellCoord> + '_ {
        self.waypoints.iter().copied()
    }

    /// Reason for the most recent re-plan.
    #[must_use]
    pub fn last_replan(&self) -> Option<ReplanReason> {
        self.last_replan
    }

    fn stale_reason(
        &self,
        level: &LevelMap,
        npc: NpcId,
        current: CellCoord,
        goal: CellCoord,
    ) -> Option<ReplanReason> {
        let Some(&next) = self.waypoints.front() else {
            return Some(ReplanReason::Exhausted);
        };
        if self.goal != Some(goal) {
            Some(ReplanReason::GoalChanged)
        } else if self.anchor != Some(current) {
            Some(ReplanReason::LeftPath)
        } else if level.is_blocked(next, Some(npc)) {
            Some(ReplanReason::Blocked)
        } else {
            None
        }
    }
}
