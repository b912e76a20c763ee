//! Static obstacles: walls and mines.

use serde::{Deserialize, Serialize};

use crate::config::game::WALL_DURABILITY;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wall {
    pub damage: u8,
}

impl Wall {
    /// Take one hit. Returns true once the wall is down.
    pub fn weaken(&mut self) -> bool {
        if self.damage < WALL_DURABILITY {
            self.damage += 1;
        }
        self.is_destroyed()
    }

    pub fn is_destroyed(&self) -> bool {
        is_wall_destroyed(self.damage as usize)
    }
}

/// Wall durability rule, shared with agents that only know hit counts.
pub fn is_wall_destroyed(hits: usize) -> bool {
    hits >= WALL_DURABILITY as usize
}

/// Single-use mine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mine {
    pub is_consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_falls_on_second_hit() {
        let mut wall = Wall::default();
        assert!(!wall.weaken());
        assert!(wall.weaken());
        assert!(wall.weaken());
        assert_eq!(wall.damage, WALL_DURABILITY);
    }
}
