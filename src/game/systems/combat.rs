//! Shooting and shell flight.

use std::collections::BTreeSet;

use log::debug;

use crate::game::entities::{Occupant, Shell};
use crate::game::state::WorldState;
use crate::game::types::{Position, ShellId, TankId};

/// Fire from tank `id` into the cell ahead of it, if the tank is loaded.
pub fn fire_shell(state: &mut WorldState, id: TankId) -> bool {
    let (width, height) = (state.width(), state.height());
    let Some(tank) = state.tank_mut(id) else {
        return false;
    };
    if !tank.can_shoot() {
        return false;
    }
    tank.fire();
    let spawn = tank.pos.step(tank.direction, width, height);
    let shell = Shell::new(spawn, tank.direction);
    let shell_id = state.spawn_shell(shell);
    debug!("[Combat] Tank {} fired shell {} at {}", id.0, shell_id.0, spawn);
    true
}

/// Move every active shell one cell. Shells whose steps exactly swap cells
/// annihilate in flight and never reach either endpoint.
pub fn advance_shells(state: &mut WorldState) {
    let (width, height) = (state.width(), state.height());
    let moves: Vec<(ShellId, Position, Position)> = state
        .active_shells
        .iter()
        .map(|&id| {
            let shell = &state.shells[id.0];
            (id, shell.pos, shell.pos.step(shell.direction, width, height))
        })
        .collect();

    let mut crossed = BTreeSet::new();
    for (i, &(a, from_a, to_a)) in moves.iter().enumerate() {
        for &(b, from_b, to_b) in &moves[i + 1..] {
            if to_a == from_b && to_b == from_a {
                crossed.insert(a);
                crossed.insert(b);
            }
        }
    }

    for &(id, from, to) in &moves {
        state.grid.cell_mut(from).remove(Occupant::Shell(id));
        let shell = &mut state.shells[id.0];
        if crossed.contains(&id) {
            shell.is_active = false;
            continue;
        }
        shell.pos = to;
        state.grid.cell_mut(to).add(Occupant::Shell(id));
        state.touched.insert(to);
    }

    if !crossed.is_empty() {
        debug!("[Combat] {} shells annihilated in flight", crossed.len());
        state.active_shells.retain(|id| !crossed.contains(id));
    }
}
