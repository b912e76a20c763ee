//! Game entities module.
//!
//! This module organizes the four kinds of grid occupants (tanks, shells, walls,
//! mines) and the handle type cells store to refer to them.

pub mod tank;
pub mod shell;
pub mod wall;

pub use tank::*;
pub use shell::*;
pub use wall::*;

use serde::{Deserialize, Serialize};

use crate::game::types::{MineId, ShellId, TankId, WallId};

/// Occupant kind tag. Ordering is the rendering priority (lowest wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OccupantKind {
    Tank,
    Shell,
    Wall,
    Mine,
}

/// Handle to an occupant living in one of the world arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Tank(TankId),
    Shell(ShellId),
    Wall(WallId),
    Mine(MineId),
}

impl Occupant {
    pub fn kind(self) -> OccupantKind {
        match self {
            Occupant::Tank(_) => OccupantKind::Tank,
            Occupant::Shell(_) => OccupantKind::Shell,
            Occupant::Wall(_) => OccupantKind::Wall,
            Occupant::Mine(_) => OccupantKind::Mine,
        }
    }
}
