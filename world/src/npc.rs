//! Non-player agents tracked by the engine.

use glam::Vec2;
use gridcast_core::{CellCoord, NpcId};

/// Live record of a single NPC as reported by the NPC registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Npc {
    id: NpcId,
    position: Vec2,
    is_alive: bool,
    kind: String,
}

impl Npc {
    /// Creates a living NPC at `position`.
    #[must_use]
    pub fn new(id: NpcId, position: Vec2, kind: impl Into<String>) -> Self {
        Self {
            id,
            position,
            is_alive: true,
            kind: kind.into(),
        }
    }

    /// Identifier assigned to the NPC.
    #[must_use]
    pub const fn id(&self) -> NpcId {
        self.id
    }

    /// Continuous position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Cell the NPC stands on, by truncation of its position.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::from_position(self.position)
    }

    /// Liveness flag consulted by the occupant refresh.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Kind of NPC, as named by the level.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Moves the NPC to `position`.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Clears the liveness flag. The NPC is pruned on the next refresh.
    pub fn kill(&mut self) {
        self.is_alive = false;
    }
}
