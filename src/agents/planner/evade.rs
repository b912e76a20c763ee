//! Shell threat detection and evasion.

use crate::agents::planner::Scene;
use crate::game::types::{Action, Direction, Position};

/// Closest shell that may be flying at `pos`, with the heading it would need.
///
/// Scans outward along all eight lines up to the lookahead; a wall closes a line.
/// A shell counts unless its belief rules out the heading toward `pos`.
pub fn incoming_shell(scene: &Scene<'_>, pos: Position) -> Option<(Position, Direction)> {
    let mut open: Vec<Direction> = Direction::ALL.to_vec();
    for steps in 1..=scene.lookahead {
        let mut still_open = Vec::with_capacity(open.len());
        for dir in open {
            let cell = pos.step_back(dir, steps, scene.width, scene.height);
            if scene.board.is_wall(cell) {
                continue;
            }
            let may_hit = scene
                .headings
                .get(&cell)
                .is_none_or(|headings| headings.contains(&dir));
            if scene.board.has_shell(cell) && may_hit {
                return Some((cell, dir));
            }
            still_open.push(dir);
        }
        open = still_open;
    }
    None
}

pub fn is_threatened(scene: &Scene<'_>, pos: Position) -> bool {
    incoming_shell(scene, pos).is_some()
}

/// Evasive action for a tank at `pos` facing `heading`, or `None` if no shell threatens it.
pub fn evade_action(scene: &Scene<'_>, pos: Position, heading: Direction) -> Option<Action> {
    let (_, threat) = incoming_shell(scene, pos)?;
    let safe_ahead = |dir: Direction| {
        let next = pos.step(dir, scene.width, scene.height);
        scene.board.is_empty(next) && !is_threatened(scene, next)
    };

    if !heading.is_colinear(threat) && safe_ahead(heading) {
        return Some(Action::MoveForward);
    }
    for action in [
        Action::RotateLeft90,
        Action::RotateRight90,
        Action::RotateLeft45,
        Action::RotateRight45,
    ] {
        let Some(offset) = action.rotation_offset() else {
            continue;
        };
        let dir = heading.rotated(offset);
        if !dir.is_colinear(threat) && safe_ahead(dir) {
            return Some(action);
        }
    }
    Some(Action::RotateRight90)
}
