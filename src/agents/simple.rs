//! Reactive tank: dodges incoming shells, fires at an opponent in its sights,
//! and otherwise keeps watching. No search, no plans.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::agents::belief::HeadingBelief;
use crate::agents::knowledge::KnownBoard;
use crate::agents::planner::Scene;
use crate::agents::planner::evade::evade_action;
use crate::agents::planner::search::line_of_sight;
use crate::agents::{BattleInfo, TankAgent};
use crate::config::game::SHELL_RELOAD_TICKS;
use crate::game::types::{Action, Direction, PlayerId, Position};

pub struct SimpleTank {
    player: PlayerId,
    tank_index: usize,
    /// Last board seen; consumed by the decision it feeds.
    board: Option<KnownBoard>,
    headings: HeadingBelief,
    wall_damage: BTreeMap<Position, usize>,
    no_reservations: BTreeSet<Position>,
    heading: Direction,
    ammo: Option<usize>,
    cooldown: usize,
}

impl SimpleTank {
    pub fn new(player: PlayerId, tank_index: usize) -> Self {
        Self {
            player,
            tank_index,
            board: None,
            headings: HeadingBelief::new(),
            wall_damage: BTreeMap::new(),
            no_reservations: BTreeSet::new(),
            heading: Direction::seed_for(player),
            ammo: None,
            cooldown: 0,
        }
    }

    fn decide(&mut self) -> Action {
        let Some(board) = self.board.take() else {
            return Action::GetBattleInfo;
        };
        let Some(pos) = board.self_position() else {
            return Action::GetBattleInfo;
        };
        let scene = Scene {
            board: &board,
            headings: &self.headings,
            wall_damage: &self.wall_damage,
            reserved: &self.no_reservations,
            owner: self.player,
            width: board.width,
            height: board.height,
            // Any shell on the same line counts, however far.
            lookahead: board.width.max(board.height),
        };

        if let Some(action) = evade_action(&scene, pos, self.heading) {
            debug!("[SimpleTank] Player {} tank {} evading with {action}", self.player, self.tank_index);
            return action;
        }
        let loaded = self.cooldown == 0 && self.ammo.is_some_and(|ammo| ammo > 0);
        if loaded && line_of_sight(&scene, pos, self.heading, &[]).is_some() {
            return Action::Shoot;
        }
        Action::GetBattleInfo
    }

    fn apply_own_action(&mut self, action: Action) {
        self.cooldown = self.cooldown.saturating_sub(1);
        match action {
            Action::Shoot => {
                if let Some(ammo) = self.ammo.as_mut().filter(|ammo| **ammo > 0) {
                    *ammo -= 1;
                    self.cooldown = SHELL_RELOAD_TICKS;
                }
            }
            _ => {
                if let Some(offset) = action.rotation_offset() {
                    self.heading = self.heading.rotated(offset);
                }
            }
        }
    }
}

impl TankAgent for SimpleTank {
    fn next_action(&mut self) -> Action {
        let action = self.decide();
        self.apply_own_action(action);
        action
    }

    fn update_battle_info(&mut self, info: &mut BattleInfo) {
        let match_info = info.match_info;
        self.board = Some(KnownBoard::from_view(&info.view, match_info.width, match_info.height, self.player));
        self.ammo.get_or_insert(match_info.num_shells);
        self.headings = info.shell_headings.clone();
        self.wall_damage = info.ledger.wall_damage.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Ledger, MatchInfo};
    use crate::game::observation::SatelliteView;

    fn battle_info(rows: &[&str]) -> BattleInfo {
        let view = SatelliteView::from_lines(rows);
        BattleInfo {
            match_info: MatchInfo { width: view.width(), height: view.height(), max_steps: 50, num_shells: 2 },
            view,
            shell_headings: HeadingBelief::new(),
            ledger: Ledger::default(),
        }
    }

    const DUEL: [&str; 3] = ["#######", "#%  1 #", "#######"];

    #[test]
    fn test_shoots_in_sight_then_watches_while_reloading() {
        let mut tank = SimpleTank::new(2, 0);
        assert_eq!(tank.next_action(), Action::GetBattleInfo);
        tank.update_battle_info(&mut battle_info(&DUEL));
        assert_eq!(tank.next_action(), Action::Shoot);
        // Board consumed by the shot.
        assert_eq!(tank.next_action(), Action::GetBattleInfo);
        tank.update_battle_info(&mut battle_info(&DUEL));
        assert_eq!(tank.next_action(), Action::GetBattleInfo);
        assert_eq!(tank.ammo, Some(1));
    }

    #[test]
    fn test_dodges_before_shooting() {
        let mut tank = SimpleTank::new(2, 0);
        let threatened = ["#######", "# % * #", "#     #", "#    1#", "#     #", "#     #", "#######"];
        let mut info = battle_info(&threatened);
        info.shell_headings.insert(Position::new(4, 1), BTreeSet::from([Direction::L]));
        tank.update_battle_info(&mut info);
        assert_eq!(tank.next_action(), Action::RotateRight90);
        assert_eq!(tank.heading, Direction::D);
    }

    #[test]
    fn test_no_opponent_in_sight_keeps_watching() {
        let mut tank = SimpleTank::new(1, 0);
        tank.update_battle_info(&mut battle_info(&["#####", "#  %#", "#2  #", "#####"]));
        assert_eq!(tank.next_action(), Action::GetBattleInfo);
        assert_eq!(tank.ammo, Some(2));
    }
}
