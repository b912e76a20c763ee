//! Collision resolution.
//!
//! Runs over the cells touched since the previous pass. Tank swaps are settled
//! first, then each touched cell either explodes, crushes colliding tanks, or
//! stays as it is.

use std::mem;

use log::debug;

use crate::game::entities::{Occupant, OccupantKind};
use crate::game::grid::Cell;
use crate::game::state::WorldState;
use crate::game::types::Position;

pub fn resolve_collisions(state: &mut WorldState) {
    resolve_tank_swaps(state);
    let touched = mem::take(&mut state.touched);
    for pos in touched {
        resolve_cell(state, pos);
    }
}

/// Two tanks that traded cells in the same half-step destroy each other.
pub fn resolve_tank_swaps(state: &mut WorldState) {
    let moved = mem::take(&mut state.moved_from);
    for (i, &(a, from_a)) in moved.iter().enumerate() {
        for &(b, from_b) in &moved[i + 1..] {
            let (Some(tank_a), Some(tank_b)) = (state.tank(a), state.tank(b)) else {
                continue;
            };
            if !tank_a.is_alive || !tank_b.is_alive {
                continue;
            }
            let (pos_a, pos_b) = (tank_a.pos, tank_b.pos);
            if pos_a == from_b && pos_b == from_a {
                debug!("[Collisions] Tanks {} and {} swapped cells and collided", a.0, b.0);
                for (id, pos) in [(a, pos_a), (b, pos_b)] {
                    state.grid.cell_mut(pos).remove(Occupant::Tank(id));
                    if let Some(tank) = state.tank_mut(id) {
                        tank.kill();
                    }
                }
            }
        }
    }
}

/// A lone shell+mine pair may share a cell, and so may a wall and a mine.
/// Anything else alongside a shell or a mine sets it off.
pub fn should_explode(cell: &Cell) -> bool {
    let count = cell.count();
    match (cell.has(OccupantKind::Shell), cell.has(OccupantKind::Mine)) {
        (true, false) => count > 1,
        (false, true) => {
            count > cell.of_kind(OccupantKind::Mine).len() + cell.of_kind(OccupantKind::Wall).len()
        }
        (true, true) => count > 2,
        (false, false) => false,
    }
}

fn resolve_cell(state: &mut WorldState, pos: Position) {
    if should_explode(state.grid.cell(pos)) {
        explode(state, pos);
    } else if state.grid.cell(pos).of_kind(OccupantKind::Tank).len() > 1 {
        debug!("[Collisions] Tank pile-up at {pos}");
        for occupant in state.grid.cell_mut(pos).take_kind(OccupantKind::Tank) {
            if let Occupant::Tank(id) = occupant {
                if let Some(tank) = state.tank_mut(id) {
                    tank.kill();
                }
            }
        }
    }
}

fn explode(state: &mut WorldState, pos: Position) {
    debug!("[Collisions] Explosion at {pos}");
    let occupants: Vec<Occupant> = state.grid.cell(pos).occupants().collect();
    for occupant in occupants {
        let removed = match occupant {
            Occupant::Wall(id) => state.walls[id.0].weaken(),
            Occupant::Tank(id) => {
                state.tanks[id.0].kill();
                true
            }
            Occupant::Shell(id) => {
                state.shells[id.0].is_active = false;
                state.active_shells.retain(|&s| s != id);
                true
            }
            Occupant::Mine(id) => {
                state.mines[id.0].is_consumed = true;
                true
            }
        };
        if removed {
            state.grid.cell_mut(pos).remove(occupant);
        }
    }
}
