//! Character rendering of the world.
//!
//! One character per cell, highest-priority occupant wins: tank (owner digit),
//! shell, wall, mine, then empty.

use crate::game::entities::{Occupant, OccupantKind};
use crate::game::grid::map::{EMPTY_CHAR, MINE_CHAR, WALL_CHAR};
use crate::game::observation::SHELL_CHAR;
use crate::game::state::WorldState;
use crate::game::types::Position;

pub fn cell_char(state: &WorldState, pos: Position) -> char {
    let cell = state.grid.cell(pos);
    match cell.top_kind() {
        Some(OccupantKind::Tank) => match cell.of_kind(OccupantKind::Tank).first() {
            Some(Occupant::Tank(id)) => state
                .tank(*id)
                .and_then(|t| char::from_digit(t.owner as u32, 10))
                .unwrap_or(EMPTY_CHAR),
            _ => EMPTY_CHAR,
        },
        Some(OccupantKind::Shell) => SHELL_CHAR,
        Some(OccupantKind::Wall) => WALL_CHAR,
        Some(OccupantKind::Mine) => MINE_CHAR,
        None => EMPTY_CHAR,
    }
}

pub fn render_tiles(state: &WorldState) -> Vec<Vec<char>> {
    (0..state.height())
        .map(|y| (0..state.width()).map(|x| cell_char(state, Position::new(x, y))).collect())
        .collect()
}

pub fn render_board(state: &WorldState) -> Vec<String> {
    render_tiles(state).into_iter().map(|row| row.into_iter().collect()).collect()
}
