//! Tank entity.
//!
//! Every counter on a tank (cooldown, ammo, backward wait) is mutated only by the
//! world; agents keep their own private model.

use serde::{Deserialize, Serialize};

use crate::config::game::SHELL_RELOAD_TICKS;
use crate::game::types::{Action, Direction, PlayerId, Position};

/// Progress of a delayed backward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackwardState {
    Idle,
    /// Armed; the move fires when the counter reaches zero.
    Waiting(u8),
    /// Just moved backward; another MoveBackward request moves immediately.
    Backing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub owner: PlayerId,
    /// Index of the tank within its owner's roster, in load order.
    pub index: usize,
    pub pos: Position,
    pub direction: Direction,
    pub ammo: usize,
    pub cooldown: usize,
    pub backward: BackwardState,
    pub is_alive: bool,
    pub last_action: Option<Action>,
}

impl Tank {
    pub fn new(owner: PlayerId, index: usize, pos: Position, ammo: usize) -> Self {
        Self {
            owner,
            index,
            pos,
            direction: Direction::seed_for(owner),
            ammo,
            cooldown: 0,
            backward: BackwardState::Idle,
            is_alive: true,
            last_action: None,
        }
    }

    pub fn can_shoot(&self) -> bool {
        self.cooldown == 0 && self.ammo > 0
    }

    pub fn is_waiting_backward(&self) -> bool {
        matches!(self.backward, BackwardState::Waiting(_))
    }

    pub(crate) fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Spend one shell and start reloading. Caller checks `can_shoot` first.
    pub(crate) fn fire(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
        self.cooldown = SHELL_RELOAD_TICKS;
    }

    pub(crate) fn kill(&mut self) {
        self.is_alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tank_faces_seed_heading() {
        assert_eq!(Tank::new(1, 0, Position::new(0, 0), 3).direction, Direction::L);
        assert_eq!(Tank::new(2, 0, Position::new(0, 0), 3).direction, Direction::R);
    }

    #[test]
    fn test_fire_consumes_ammo_and_sets_cooldown() {
        let mut tank = Tank::new(1, 0, Position::new(0, 0), 1);
        assert!(tank.can_shoot());
        tank.fire();
        assert_eq!(tank.ammo, 0);
        assert_eq!(tank.cooldown, SHELL_RELOAD_TICKS);
        assert!(!tank.can_shoot());
        for _ in 0..10 {
            tank.tick_cooldown();
        }
        assert_eq!(tank.cooldown, 0);
        assert!(!tank.can_shoot());
    }
}
