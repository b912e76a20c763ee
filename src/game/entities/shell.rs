//! Shell entity.

use serde::{Deserialize, Serialize};

use crate::game::types::{Direction, Position};

/// A shell in flight. It lives both on the grid and in the world's active list
/// until an explosion or a head-on crossing removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub pos: Position,
    pub direction: Direction,
    pub is_active: bool,
}

impl Shell {
    pub fn new(pos: Position, direction: Direction) -> Self {
        Self { pos, direction, is_active: true }
    }
}
