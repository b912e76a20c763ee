//! Tank action execution.
//!
//! This module applies one requested action to one tank, including the delayed
//! backward move. Collisions are not resolved here; moved tanks only mark their
//! destination cell as touched.

use log::debug;

use crate::config::game::BACKWARD_DELAY_TICKS;
use crate::game::entities::{BackwardState, Occupant, OccupantKind};
use crate::game::state::WorldState;
use crate::game::systems::combat::fire_shell;
use crate::game::types::{Action, Direction, TankId};

/// Apply `action` to tank `id`. Returns whether the action was honored.
///
/// Invalid actions are not applied, but the cooldown and the backward counter
/// still advance.
pub fn execute_tank_action(state: &mut WorldState, id: TankId, action: Action) -> bool {
    let Some(tank) = state.tank_mut(id) else {
        return false;
    };
    if !tank.is_alive {
        return false;
    }
    tank.tick_cooldown();
    tank.last_action = Some(action);

    match tank.backward {
        BackwardState::Waiting(remaining) => {
            if action == Action::MoveForward {
                tank.backward = BackwardState::Idle;
                return true;
            }
            let remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                tank.backward = BackwardState::Waiting(remaining);
                return false;
            }
            tank.backward = BackwardState::Idle;
            let heading = tank.direction.opposite();
            let moved = move_tank(state, id, heading);
            if moved {
                set_backward(state, id, BackwardState::Backing);
            }
            return moved;
        }
        BackwardState::Backing => {
            if action == Action::MoveBackward {
                let heading = tank.direction.opposite();
                let moved = move_tank(state, id, heading);
                if !moved {
                    set_backward(state, id, BackwardState::Idle);
                }
                return moved;
            }
            tank.backward = BackwardState::Idle;
        }
        BackwardState::Idle => {}
    }

    match action {
        Action::MoveForward => {
            let heading = tank.direction;
            move_tank(state, id, heading)
        }
        Action::MoveBackward => {
            tank.backward = BackwardState::Waiting(BACKWARD_DELAY_TICKS);
            true
        }
        Action::RotateLeft45 | Action::RotateLeft90 | Action::RotateRight45 | Action::RotateRight90 => {
            if let Some(offset) = action.rotation_offset() {
                tank.direction = tank.direction.rotated(offset);
            }
            true
        }
        Action::Shoot => fire_shell(state, id),
        Action::GetBattleInfo | Action::DoNothing => true,
    }
}

fn set_backward(state: &mut WorldState, id: TankId, backward: BackwardState) {
    if let Some(tank) = state.tank_mut(id) {
        tank.backward = backward;
    }
}

/// Move a tank one cell along `heading`. Walls block the move.
pub fn move_tank(state: &mut WorldState, id: TankId, heading: Direction) -> bool {
    let (width, height) = (state.width(), state.height());
    let Some(tank) = state.tank(id) else {
        return false;
    };
    let from = tank.pos;
    let to = from.step(heading, width, height);
    if state.grid.cell(to).has(OccupantKind::Wall) {
        debug!("[Movement] Tank {} blocked by wall at {}", id.0, to);
        return false;
    }

    state.grid.cell_mut(from).remove(Occupant::Tank(id));
    state.grid.cell_mut(to).add(Occupant::Tank(id));
    if let Some(tank) = state.tank_mut(id) {
        tank.pos = to;
    }
    state.touched.insert(to);
    state.moved_from.push((id, from));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::GameMap;
    use crate::game::types::Position;

    fn open_field() -> WorldState {
        // Player 2 faces right, player 1 faces left.
        let map = GameMap::parse("t\nMaxSteps=50\nNumShells=2\nRows=3\nCols=6\n      \n 2  1 \n   #  \n").unwrap();
        WorldState::new(&map)
    }

    #[test]
    fn test_forward_then_backward_returns_home() {
        let mut state = open_field();
        let id = TankId(0);
        let home = state.tanks[0].pos;
        assert!(execute_tank_action(&mut state, id, Action::MoveForward));
        assert_eq!(state.tanks[0].pos, Position::new(2, 1));

        assert!(execute_tank_action(&mut state, id, Action::MoveBackward));
        assert_eq!(state.tanks[0].pos, Position::new(2, 1));
        assert!(!execute_tank_action(&mut state, id, Action::DoNothing));
        assert_eq!(state.tanks[0].pos, Position::new(2, 1));
        assert!(execute_tank_action(&mut state, id, Action::DoNothing));
        assert_eq!(state.tanks[0].pos, home);
        assert_eq!(state.tanks[0].backward, BackwardState::Backing);
    }

    #[test]
    fn test_forward_cancels_pending_backward() {
        let mut state = open_field();
        let id = TankId(0);
        assert!(execute_tank_action(&mut state, id, Action::MoveBackward));
        assert!(execute_tank_action(&mut state, id, Action::MoveForward));
        assert_eq!(state.tanks[0].pos, Position::new(1, 1));
        assert_eq!(state.tanks[0].backward, BackwardState::Idle);
    }

    #[test]
    fn test_rotation_ignored_while_waiting() {
        let mut state = open_field();
        let id = TankId(0);
        assert!(execute_tank_action(&mut state, id, Action::MoveBackward));
        assert!(!execute_tank_action(&mut state, id, Action::RotateLeft90));
        assert_eq!(state.tanks[0].direction, Direction::R);
    }

    #[test]
    fn test_backing_moves_immediately_until_other_action() {
        let mut state = open_field();
        let id = TankId(0);
        execute_tank_action(&mut state, id, Action::MoveBackward);
        execute_tank_action(&mut state, id, Action::DoNothing);
        assert!(execute_tank_action(&mut state, id, Action::DoNothing));
        assert_eq!(state.tanks[0].pos, Position::new(0, 1));
        assert!(execute_tank_action(&mut state, id, Action::MoveBackward));
        assert_eq!(state.tanks[0].pos, Position::new(5, 1));
        assert!(execute_tank_action(&mut state, id, Action::RotateRight90));
        assert_eq!(state.tanks[0].backward, BackwardState::Idle);
        assert_eq!(state.tanks[0].direction, Direction::D);
    }

    #[test]
    fn test_wall_blocks_forward() {
        let mut state = open_field();
        let id = TankId(1);
        assert!(execute_tank_action(&mut state, id, Action::RotateLeft90));
        assert_eq!(state.tanks[1].direction, Direction::D);
        assert!(execute_tank_action(&mut state, id, Action::RotateRight45));
        assert_eq!(state.tanks[1].direction, Direction::DL);
        assert!(!execute_tank_action(&mut state, id, Action::MoveForward));
        assert_eq!(state.tanks[1].pos, Position::new(4, 1));
    }

    #[test]
    fn test_dead_or_unknown_tank_is_rejected() {
        let mut state = open_field();
        assert!(!execute_tank_action(&mut state, TankId(9), Action::DoNothing));
        state.tanks[0].kill();
        assert!(!execute_tank_action(&mut state, TankId(0), Action::DoNothing));
    }
}
