//! Breadth-first lookahead over the planner's private model of its own tank.
//!
//! The model follows the world's rules: every action ticks the cooldown, firing
//! reloads for `SHELL_RELOAD_TICKS`, and a wall falls after its second hit. Walls
//! shot during the search are tracked in a per-state overlay.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::agents::planner::Scene;
use crate::agents::planner::evade::is_threatened;
use crate::config::game::SHELL_RELOAD_TICKS;
use crate::game::observation::SELF_CHAR;
use crate::game::types::{Action, Direction, Position};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BfsState {
    pub pos: Position,
    pub heading: Direction,
    pub ammo: usize,
    pub cooldown: usize,
    /// Hits on walls fired within this search, sorted by position.
    pub overlay: Vec<(Position, u8)>,
}

/// Hits recorded for `pos` in a sorted wall overlay.
pub fn overlay_hits(overlay: &[(Position, u8)], pos: Position) -> usize {
    overlay
        .binary_search_by_key(&pos, |&(p, _)| p)
        .map(|i| overlay[i].1 as usize)
        .unwrap_or(0)
}

impl BfsState {
    pub fn overlay_hits(&self, pos: Position) -> usize {
        overlay_hits(&self.overlay, pos)
    }

    fn ticked(&self) -> Self {
        let mut next = self.clone();
        next.cooldown = next.cooldown.saturating_sub(1);
        next
    }

    fn with_wall_hit(&self, wall: Position) -> Self {
        let mut next = self.clone();
        match next.overlay.binary_search_by_key(&wall, |&(p, _)| p) {
            Ok(i) => next.overlay[i].1 += 1,
            Err(i) => next.overlay.insert(i, (wall, 1)),
        }
        next.ammo -= 1;
        next.cooldown = SHELL_RELOAD_TICKS;
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub plan: VecDeque<Action>,
    pub target: Position,
}

/// First opponent along `heading`, if nothing blocks the shot. Own tanks block;
/// mines and shells do not. The searcher's own starting cell reads as empty.
pub fn line_of_sight(scene: &Scene<'_>, from: Position, heading: Direction, overlay: &[(Position, u8)]) -> Option<Position> {
    let mut current = from.step(heading, scene.width, scene.height);
    for _ in 0..scene.width.max(scene.height) {
        if current == from {
            return None;
        }
        if scene.board.is_wall(current) && !scene.wall_destroyed(current, overlay) {
            return None;
        }
        if scene.board.at(current) != SELF_CHAR {
            if let Some(owner) = scene.board.tank_owner(current) {
                return (owner != scene.owner).then_some(current);
            }
        }
        current = current.step(heading, scene.width, scene.height);
    }
    None
}

fn successors(scene: &Scene<'_>, current: &BfsState) -> Vec<(BfsState, Action)> {
    let mut next = Vec::with_capacity(7);
    next.push((current.ticked(), Action::GetBattleInfo));

    let ahead = current.pos.step(current.heading, scene.width, scene.height);
    if scene.is_passable(ahead, &current.overlay) && !is_threatened(scene, ahead) && !scene.reserved.contains(&ahead) {
        let mut moved = current.ticked();
        moved.pos = ahead;
        next.push((moved, Action::MoveForward));
    }

    for action in Action::ROTATIONS {
        if let Some(offset) = action.rotation_offset() {
            let mut rotated = current.ticked();
            rotated.heading = current.heading.rotated(offset);
            next.push((rotated, action));
        }
    }

    // The last shell is kept for the opponent.
    let standing_wall = scene.board.is_wall(ahead) && !scene.wall_destroyed(ahead, &current.overlay);
    if current.ammo > 1 && current.cooldown == 0 && standing_wall {
        next.push((current.with_wall_hit(ahead), Action::Shoot));
    }
    next
}

/// Shortest action sequence that ends loaded with a clear shot at an opponent.
///
/// Among goal states of the first successful layer, the one closest to its
/// target along the firing line wins. Gives up past `iteration_limit` expanded states.
pub fn find_plan(scene: &Scene<'_>, start: BfsState, iteration_limit: usize) -> Option<SearchOutcome> {
    let mut queue = VecDeque::from([start.clone()]);
    let mut visited = HashSet::from([start]);
    let mut parent: HashMap<BfsState, (BfsState, Action)> = HashMap::new();
    let mut goals: Vec<(BfsState, Position)> = Vec::new();
    let mut iterations = 0usize;

    while !queue.is_empty() && goals.is_empty() {
        for _ in 0..queue.len() {
            let Some(current) = queue.pop_front() else {
                break;
            };
            iterations += 1;
            if iterations > iteration_limit {
                debug!("[Planner] Search aborted after {iteration_limit} iterations");
                return None;
            }

            if current.cooldown == 0 && current.ammo > 0 {
                if let Some(target) = line_of_sight(scene, current.pos, current.heading, &current.overlay) {
                    goals.push((current, target));
                    continue;
                }
            }

            for (state, action) in successors(scene, &current) {
                if visited.insert(state.clone()) {
                    parent.insert(state.clone(), (current.clone(), action));
                    queue.push_back(state);
                }
            }
        }
    }

    let (width, height) = (scene.width, scene.height);
    let (best, target) = goals.into_iter().min_by_key(|(state, target)| {
        state
            .pos
            .distance_along(*target, state.heading, width, height)
            .unwrap_or(usize::MAX)
    })?;

    let mut plan = VecDeque::new();
    let mut cursor = best;
    while let Some((previous, action)) = parent.get(&cursor) {
        plan.push_front(*action);
        cursor = previous.clone();
    }
    if plan.is_empty() {
        return None;
    }
    Some(SearchOutcome { plan, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::planner::tests::SceneFixture;

    fn start(pos: Position, heading: Direction, ammo: usize) -> BfsState {
        BfsState { pos, heading, ammo, cooldown: 0, overlay: Vec::new() }
    }

    #[test]
    fn test_line_of_sight_rules() {
        let fixture = SceneFixture::new(&["%2 # 1"], 2);
        let scene = fixture.scene();
        // Teammate in the way.
        assert_eq!(line_of_sight(&scene, Position::new(0, 0), Direction::R, &[]), None);
        // Wall in the way, unless it is known destroyed.
        assert_eq!(line_of_sight(&scene, Position::new(2, 0), Direction::R, &[]), None);
        assert_eq!(
            line_of_sight(&scene, Position::new(2, 0), Direction::R, &[(Position::new(3, 0), 2)]),
            Some(Position::new(5, 0))
        );
        let damaged = SceneFixture::new(&["%2 # 1"], 2).with_wall_damage(Position::new(3, 0), 1);
        assert_eq!(
            line_of_sight(&damaged.scene(), Position::new(2, 0), Direction::R, &[(Position::new(3, 0), 1)]),
            Some(Position::new(5, 0))
        );
        // Wraps around to the opponent from the other side.
        assert_eq!(line_of_sight(&scene, Position::new(4, 0), Direction::R, &[]), Some(Position::new(5, 0)));
        assert_eq!(line_of_sight(&scene, Position::new(0, 0), Direction::L, &[]), Some(Position::new(5, 0)));
    }

    #[test]
    fn test_overlay_stays_sorted() {
        let state = start(Position::new(0, 0), Direction::R, 5)
            .with_wall_hit(Position::new(4, 1))
            .with_wall_hit(Position::new(1, 1))
            .with_wall_hit(Position::new(4, 1));
        assert_eq!(state.overlay, vec![(Position::new(1, 1), 1), (Position::new(4, 1), 2)]);
        assert_eq!(state.overlay_hits(Position::new(4, 1)), 2);
        assert_eq!(state.ammo, 2);
    }

    #[test]
    fn test_shortest_plan_to_firing_position() {
        let board = ["#######", "#%    #", "#     #", "#     #", "#    1#", "#     #", "#######"];
        let fixture = SceneFixture::new(&board, 2);
        let outcome = find_plan(&fixture.scene(), start(Position::new(1, 1), Direction::R, 3), 10_000).unwrap();
        assert_eq!(outcome.plan, VecDeque::from([Action::MoveForward, Action::RotateRight45]));
        assert_eq!(outcome.target, Position::new(5, 4));
    }

    #[test]
    fn test_plan_shoots_through_wall_keeping_last_shell() {
        let board = ["#####", "#%#1#", "#####"];
        let fixture = SceneFixture::new(&board, 2);
        let outcome = find_plan(&fixture.scene(), start(Position::new(1, 1), Direction::R, 3), 100_000).unwrap();
        assert_eq!(outcome.target, Position::new(3, 1));
        assert_eq!(outcome.plan.front(), Some(&Action::Shoot));
        assert_eq!(outcome.plan.iter().filter(|&&a| a == Action::Shoot).count(), 2);
        assert_eq!(outcome.plan.len(), 10);

        // With two shells the wall cannot be cleared without spending the last one.
        assert!(find_plan(&fixture.scene(), start(Position::new(1, 1), Direction::R, 2), 100_000).is_none());
    }

    #[test]
    fn test_iteration_limit_aborts() {
        let board = ["#######", "#%    #", "#     #", "#     #", "#    1#", "#     #", "#######"];
        let fixture = SceneFixture::new(&board, 2);
        assert!(find_plan(&fixture.scene(), start(Position::new(1, 1), Direction::R, 3), 0).is_none());
    }

    #[test]
    fn test_reserved_cells_are_avoided() {
        let board = ["#######", "#%    #", "#     #", "#     #", "#    1#", "#     #", "#######"];
        let fixture = SceneFixture::new(&board, 2).with_reserved(Position::new(2, 1));
        let outcome = find_plan(&fixture.scene(), start(Position::new(1, 1), Direction::R, 3), 10_000).unwrap();
        assert_ne!(outcome.plan.front(), Some(&Action::MoveForward));
    }
}
