//! Search-based tank planner.
//!
//! Per call the planner evades an incoming shell if it has to, fires if an
//! opponent is in its sights, and otherwise follows (or computes) a cached plan
//! to the nearest firing position. It asks for battle info on its first call and
//! at least once every `observation_interval` calls.

pub mod evade;
pub mod search;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use crate::agents::belief::HeadingBelief;
use crate::agents::knowledge::KnownBoard;
use crate::agents::{BattleInfo, MatchInfo, TankAgent};
use crate::config::GameSettings;
use crate::config::game::SHELL_RELOAD_TICKS;
use crate::game::entities::is_wall_destroyed;
use crate::game::grid::map::EMPTY_CHAR;
use crate::game::observation::SELF_CHAR;
use crate::game::types::{Action, Direction, PlayerId, Position};

use self::evade::evade_action;
use self::search::{BfsState, find_plan, line_of_sight, overlay_hits};

/// Read-only view of what the planner knows, shared by evasion and search.
pub struct Scene<'a> {
    pub board: &'a KnownBoard,
    pub headings: &'a HeadingBelief,
    pub wall_damage: &'a BTreeMap<Position, usize>,
    /// Cells committed to by teammates.
    pub reserved: &'a BTreeSet<Position>,
    pub owner: PlayerId,
    pub width: usize,
    pub height: usize,
    pub lookahead: usize,
}

impl Scene<'_> {
    pub fn wall_destroyed(&self, pos: Position, overlay: &[(Position, u8)]) -> bool {
        let known = self.wall_damage.get(&pos).copied().unwrap_or(0);
        is_wall_destroyed(known + overlay_hits(overlay, pos))
    }

    /// Free to drive into: empty, the searcher's own start cell, or a fallen wall.
    pub fn is_passable(&self, pos: Position, overlay: &[(Position, u8)]) -> bool {
        match self.board.at(pos) {
            EMPTY_CHAR | SELF_CHAR => true,
            _ => self.board.is_wall(pos) && self.wall_destroyed(pos, overlay),
        }
    }
}

/// The planner's private copy of its own tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankModel {
    pub pos: Position,
    pub heading: Direction,
    pub ammo: usize,
    pub cooldown: usize,
}

pub struct Planner {
    player: PlayerId,
    tank_index: usize,
    settings: GameSettings,
    info: Option<MatchInfo>,
    board: Option<KnownBoard>,
    model: Option<TankModel>,
    headings: HeadingBelief,
    reserved_by_others: BTreeSet<Position>,
    /// Side-wide wall damage plus this tank's own unreported shots.
    wall_damage: BTreeMap<Position, usize>,
    /// Shots at walls not yet handed to the side's ledger.
    local_hits: BTreeMap<Position, usize>,
    plan: VecDeque<Action>,
    /// Cell the plan ends up firing at, and who stood there when it was planned.
    target: Option<(Position, PlayerId)>,
    calls_until_observation: usize,
}

impl Planner {
    pub fn new(player: PlayerId, tank_index: usize, settings: &GameSettings) -> Self {
        Self {
            player,
            tank_index,
            settings: *settings,
            info: None,
            board: None,
            model: None,
            headings: HeadingBelief::new(),
            reserved_by_others: BTreeSet::new(),
            wall_damage: BTreeMap::new(),
            local_hits: BTreeMap::new(),
            plan: VecDeque::new(),
            target: None,
            calls_until_observation: 0,
        }
    }

    pub fn model(&self) -> Option<&TankModel> {
        self.model.as_ref()
    }

    pub fn plan(&self) -> &VecDeque<Action> {
        &self.plan
    }

    fn drop_plan(&mut self) {
        self.plan.clear();
        self.target = None;
    }

    fn scene(&self) -> Option<Scene<'_>> {
        let info = self.info?;
        Some(Scene {
            board: self.board.as_ref()?,
            headings: &self.headings,
            wall_damage: &self.wall_damage,
            reserved: &self.reserved_by_others,
            owner: self.player,
            width: info.width,
            height: info.height,
            lookahead: self.settings.shell_threat_lookahead,
        })
    }

    fn decide(&mut self) -> Action {
        let Some(model) = self.model else {
            return Action::GetBattleInfo;
        };
        let Some((evasion, in_sight)) = self.scene().map(|scene| {
            (
                evade_action(&scene, model.pos, model.heading),
                line_of_sight(&scene, model.pos, model.heading, &[]).is_some(),
            )
        }) else {
            return Action::GetBattleInfo;
        };

        if let Some(action) = evasion {
            debug!(
                "[Planner] Player {} tank {} evading with {action}",
                self.player, self.tank_index
            );
            self.drop_plan();
            return action;
        }

        if in_sight {
            return if model.cooldown == 0 && model.ammo > 0 {
                Action::Shoot
            } else {
                Action::GetBattleInfo
            };
        }

        if let Some(action) = self.plan.pop_front() {
            return action;
        }
        if model.ammo == 0 {
            return Action::GetBattleInfo;
        }

        let start = BfsState {
            pos: model.pos,
            heading: model.heading,
            ammo: model.ammo,
            cooldown: model.cooldown,
            overlay: Vec::new(),
        };
        let limit = self.settings.bfs_iteration_limit;
        let outcome = self.scene().and_then(|scene| find_plan(&scene, start, limit));
        match outcome {
            Some(outcome) => {
                debug!(
                    "[Planner] Player {} tank {} planned {} actions toward {}",
                    self.player,
                    self.tank_index,
                    outcome.plan.len(),
                    outcome.target
                );
                let owner = self.board.as_ref().and_then(|board| board.tank_owner(outcome.target));
                self.plan = outcome.plan;
                self.target = owner.map(|owner| (outcome.target, owner));
                self.plan.pop_front().unwrap_or(Action::GetBattleInfo)
            }
            None => {
                debug!("[Planner] Player {} tank {} found no plan, observing", self.player, self.tank_index);
                Action::GetBattleInfo
            }
        }
    }

    /// Advance the private model the way the world will execute `action`.
    fn apply_own_action(&mut self, action: Action) {
        let Some(info) = self.info else {
            return;
        };
        let Some(model) = self.model.as_mut() else {
            return;
        };
        model.cooldown = model.cooldown.saturating_sub(1);
        let ahead = model.pos.step(model.heading, info.width, info.height);

        match action {
            Action::MoveForward => {
                let from = model.pos;
                let blocked = self.board.as_ref().is_some_and(|board| {
                    board.is_wall(ahead)
                        && !is_wall_destroyed(self.wall_damage.get(&ahead).copied().unwrap_or(0))
                });
                if !blocked {
                    model.pos = ahead;
                    if let Some(board) = self.board.as_mut() {
                        board.move_self(from, ahead);
                    }
                }
            }
            Action::Shoot => {
                if model.cooldown == 0 && model.ammo > 0 {
                    model.ammo -= 1;
                    model.cooldown = SHELL_RELOAD_TICKS;
                    let known = self.wall_damage.get(&ahead).copied().unwrap_or(0);
                    if self.board.as_ref().is_some_and(|board| board.is_wall(ahead)) && !is_wall_destroyed(known) {
                        *self.local_hits.entry(ahead).or_insert(0) += 1;
                        *self.wall_damage.entry(ahead).or_insert(0) += 1;
                    }
                }
            }
            _ => {
                if let Some(offset) = action.rotation_offset() {
                    model.heading = model.heading.rotated(offset);
                }
            }
        }
    }

    /// Cells the cached plan drives through, plus the firing lane up to the target.
    fn reservation(&self, with_lane: bool) -> BTreeSet<Position> {
        let mut cells = BTreeSet::new();
        let (Some(model), Some(info)) = (self.model, self.info) else {
            return cells;
        };
        if self.plan.is_empty() {
            return cells;
        }

        let (mut pos, mut heading) = (model.pos, model.heading);
        for &action in &self.plan {
            if action == Action::MoveForward {
                pos = pos.step(heading, info.width, info.height);
                cells.insert(pos);
            } else if let Some(offset) = action.rotation_offset() {
                heading = heading.rotated(offset);
            }
        }

        if let (true, Some((target, _))) = (with_lane, self.target) {
            let mut lane = pos.step(heading, info.width, info.height);
            for _ in 0..info.width * info.height {
                if lane == target {
                    break;
                }
                cells.insert(lane);
                lane = lane.step(heading, info.width, info.height);
            }
        }
        cells
    }
}

impl TankAgent for Planner {
    fn next_action(&mut self) -> Action {
        let interval = self.settings.observation_interval.max(1);
        let action = if self.calls_until_observation == 0 {
            Action::GetBattleInfo
        } else {
            self.calls_until_observation -= 1;
            self.decide()
        };
        if action == Action::GetBattleInfo {
            self.calls_until_observation = interval - 1;
        }
        self.apply_own_action(action);
        action
    }

    fn update_battle_info(&mut self, info: &mut BattleInfo) {
        let match_info = info.match_info;
        let board = KnownBoard::from_view(&info.view, match_info.width, match_info.height, self.player);
        match (self.model.as_mut(), board.self_position()) {
            (Some(model), Some(pos)) => model.pos = pos,
            (None, Some(pos)) => {
                self.model = Some(TankModel {
                    pos,
                    heading: Direction::seed_for(self.player),
                    ammo: match_info.num_shells,
                    cooldown: 0,
                });
            }
            _ => {}
        }
        self.board = Some(board);
        self.info = Some(match_info);
        self.headings = info.shell_headings.clone();

        self.reserved_by_others = info.ledger.reserved_by_others(self.tank_index);
        if !self.reservation(false).is_disjoint(&self.reserved_by_others) {
            debug!("[Planner] Player {} tank {} plan crosses a teammate's path", self.player, self.tank_index);
            self.drop_plan();
        }

        let target_gone = self
            .target
            .zip(self.board.as_ref())
            .is_some_and(|((target, owner), board)| board.tank_owner(target) != Some(owner));
        if target_gone {
            debug!("[Planner] Player {} tank {} target moved", self.player, self.tank_index);
            self.drop_plan();
        }

        info.ledger.add_wall_hits(&self.local_hits);
        self.local_hits.clear();
        if info.ledger.wall_damage != self.wall_damage {
            self.drop_plan();
        }
        self.wall_damage = info.ledger.wall_damage.clone();

        info.ledger.reservations.insert(self.tank_index, self.reservation(true));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agents::Ledger;
    use crate::game::observation::SatelliteView;

    pub(crate) struct SceneFixture {
        board: KnownBoard,
        headings: HeadingBelief,
        wall_damage: BTreeMap<Position, usize>,
        reserved: BTreeSet<Position>,
        owner: PlayerId,
    }

    impl SceneFixture {
        pub(crate) fn new(rows: &[&str], owner: PlayerId) -> Self {
            let view = SatelliteView::from_lines(rows);
            let board = KnownBoard::from_view(&view, view.width(), view.height(), owner);
            Self {
                board,
                headings: HeadingBelief::new(),
                wall_damage: BTreeMap::new(),
                reserved: BTreeSet::new(),
                owner,
            }
        }

        pub(crate) fn with_heading(mut self, shell: Position, headings: &[Direction]) -> Self {
            self.headings.insert(shell, headings.iter().copied().collect());
            self
        }

        pub(crate) fn with_wall_damage(mut self, wall: Position, hits: usize) -> Self {
            self.wall_damage.insert(wall, hits);
            self
        }

        pub(crate) fn with_reserved(mut self, cell: Position) -> Self {
            self.reserved.insert(cell);
            self
        }

        pub(crate) fn scene(&self) -> Scene<'_> {
            Scene {
                board: &self.board,
                headings: &self.headings,
                wall_damage: &self.wall_damage,
                reserved: &self.reserved,
                owner: self.owner,
                width: self.board.width,
                height: self.board.height,
                lookahead: GameSettings::default().shell_threat_lookahead,
            }
        }
    }

    fn battle_info(rows: &[&str], ledger: Ledger) -> BattleInfo {
        let view = SatelliteView::from_lines(rows);
        BattleInfo {
            match_info: MatchInfo { width: view.width(), height: view.height(), max_steps: 100, num_shells: 3 },
            view,
            shell_headings: HeadingBelief::new(),
            ledger,
        }
    }

    const DUEL: [&str; 3] = ["#######", "#%  1 #", "#######"];
    const OPEN: [&str; 7] = ["#######", "#%    #", "#     #", "#    1#", "#     #", "#     #", "#######"];
    const OPEN_AFTER_STEP: [&str; 7] = ["#######", "# %   #", "#     #", "#    1#", "#     #", "#     #", "#######"];

    #[test]
    fn test_first_call_observes_then_interval_forces_observation() {
        let settings = GameSettings { observation_interval: 3, ..GameSettings::default() };
        let mut planner = Planner::new(2, 0, &settings);
        assert_eq!(planner.next_action(), Action::GetBattleInfo);
        // No view yet: every decision falls back to observing.
        assert_eq!(planner.next_action(), Action::GetBattleInfo);

        let mut info = battle_info(&["#######", "#%   ##", "#######"], Ledger::default());
        planner.update_battle_info(&mut info);
        let actions: Vec<Action> = (0..6).map(|_| planner.next_action()).collect();
        let observations = actions.iter().filter(|&&a| a == Action::GetBattleInfo).count();
        assert!(observations >= 2, "{actions:?}");
    }

    #[test]
    fn test_engages_opponent_in_sight() {
        let mut planner = Planner::new(2, 0, &GameSettings::default());
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&DUEL, Ledger::default()));
        assert_eq!(planner.next_action(), Action::Shoot);
        let model = planner.model().copied().unwrap();
        assert_eq!((model.ammo, model.cooldown), (2, SHELL_RELOAD_TICKS));
        // Still in sight but reloading.
        assert_eq!(planner.next_action(), Action::GetBattleInfo);
    }

    #[test]
    fn test_plan_is_cached_and_reserved() {
        let settings = GameSettings { observation_interval: 10, ..GameSettings::default() };
        let mut planner = Planner::new(2, 0, &settings);
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        assert_eq!(planner.next_action(), Action::MoveForward);
        assert_eq!(planner.plan(), &VecDeque::from([Action::MoveForward, Action::RotateRight45]));
        assert_eq!(planner.model().map(|m| m.pos), Some(Position::new(2, 1)));

        let mut info = battle_info(&OPEN_AFTER_STEP, Ledger::default());
        planner.update_battle_info(&mut info);
        assert_eq!(
            info.ledger.reservations[&0],
            BTreeSet::from([Position::new(3, 1), Position::new(4, 2)])
        );
        assert_eq!(planner.next_action(), Action::MoveForward);
        assert_eq!(planner.next_action(), Action::RotateRight45);
        assert_eq!(planner.next_action(), Action::Shoot);
    }

    #[test]
    fn test_plan_dropped_when_teammate_reserves_its_path() {
        let mut planner = Planner::new(2, 0, &GameSettings::default());
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        planner.next_action();

        let mut ledger = Ledger::default();
        ledger.reservations.insert(1, BTreeSet::from([Position::new(3, 1)]));
        let mut info = battle_info(&OPEN_AFTER_STEP, ledger);
        planner.update_battle_info(&mut info);
        assert!(planner.plan().is_empty());
        assert!(info.ledger.reservations[&0].is_empty());
    }

    #[test]
    fn test_plan_dropped_when_target_moves_or_walls_change() {
        let mut planner = Planner::new(2, 0, &GameSettings::default());
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        planner.next_action();
        let moved = ["#######", "# %   #", "#     #", "#     #", "#    1#", "#     #", "#######"];
        planner.update_battle_info(&mut battle_info(&moved, Ledger::default()));
        assert!(planner.plan().is_empty());

        let mut planner = Planner::new(2, 0, &GameSettings::default());
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        planner.next_action();
        let mut ledger = Ledger::default();
        ledger.wall_damage.insert(Position::new(0, 3), 1);
        planner.update_battle_info(&mut battle_info(&OPEN_AFTER_STEP, ledger));
        assert!(planner.plan().is_empty());
    }

    #[test]
    fn test_wall_shot_reaches_ledger_at_next_observation() {
        let settings = GameSettings::default();
        let mut planner = Planner::new(2, 0, &settings);
        planner.next_action();
        let walled = ["#####", "#%#1#", "#####"];
        planner.update_battle_info(&mut battle_info(&walled, Ledger::default()));
        assert_eq!(planner.next_action(), Action::Shoot);

        let mut info = battle_info(&walled, Ledger::default());
        planner.update_battle_info(&mut info);
        assert_eq!(info.ledger.wall_damage.get(&Position::new(2, 1)), Some(&1));
    }

    #[test]
    fn test_exhausted_search_falls_back_to_observing() {
        let settings = GameSettings { observation_interval: 10, bfs_iteration_limit: 0, ..GameSettings::default() };
        let mut planner = Planner::new(2, 0, &settings);
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        assert_eq!(planner.next_action(), Action::GetBattleInfo);
        assert!(planner.plan().is_empty());
    }

    #[test]
    fn test_evading_discards_cached_plan() {
        let settings = GameSettings { observation_interval: 10, ..GameSettings::default() };
        let mut planner = Planner::new(2, 0, &settings);
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        assert_eq!(planner.next_action(), Action::MoveForward);

        // A shell two cells ahead flying back at the tank.
        let threatened = ["#######", "# % * #", "#     #", "#    1#", "#     #", "#     #", "#######"];
        let mut info = battle_info(&threatened, Ledger::default());
        info.shell_headings.insert(Position::new(4, 1), BTreeSet::from([Direction::L]));
        planner.update_battle_info(&mut info);
        assert_eq!(planner.plan().len(), 2);

        assert_eq!(planner.next_action(), Action::RotateRight90);
        assert!(planner.plan().is_empty());
    }

    #[test]
    fn test_plan_dropped_when_another_player_takes_target_cell() {
        let settings = GameSettings { observation_interval: 10, ..GameSettings::default() };
        let mut planner = Planner::new(2, 0, &settings);
        planner.next_action();
        planner.update_battle_info(&mut battle_info(&OPEN, Ledger::default()));
        planner.next_action();
        assert!(!planner.plan().is_empty());

        let swapped = ["#######", "# %   #", "#     #", "#    3#", "#     #", "#     #", "#######"];
        planner.update_battle_info(&mut battle_info(&swapped, Ledger::default()));
        assert!(planner.plan().is_empty());
    }

    #[test]
    fn test_shot_through_fallen_wall_is_not_counted() {
        let mut planner = Planner::new(2, 0, &GameSettings::default());
        planner.next_action();
        let walled = ["#####", "#%#1#", "#####"];
        let mut ledger = Ledger::default();
        ledger.wall_damage.insert(Position::new(2, 1), 2);
        planner.update_battle_info(&mut battle_info(&walled, ledger.clone()));
        assert_eq!(planner.next_action(), Action::Shoot);

        let mut info = battle_info(&walled, ledger);
        planner.update_battle_info(&mut info);
        assert_eq!(info.ledger.wall_damage.get(&Position::new(2, 1)), Some(&2));
    }
}
