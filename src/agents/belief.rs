//! Shell-heading belief and the side's coordination ledger.
//!
//! Snapshots only show where shells are, not where they are going. Each new
//! observation is reconciled against the previous one: a heading stays plausible
//! for a shell if walking it back `2t` cells (t = half-rounds elapsed, unknown but
//! bounded by the observation interval) crosses no wall and lands on a shell the
//! previous belief allowed to travel that way.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::agents::knowledge::KnownBoard;
use crate::agents::{BattleInfo, Ledger, MatchInfo, Player, TankAgent};
use crate::config::GameSettings;
use crate::game::observation::SatelliteView;
use crate::game::types::{Direction, PlayerId, Position};

pub type HeadingBelief = BTreeMap<Position, BTreeSet<Direction>>;

fn all_headings() -> BTreeSet<Direction> {
    Direction::ALL.into_iter().collect()
}

pub struct BeliefTracker {
    player: PlayerId,
    info: MatchInfo,
    interval: usize,
    near_wall_distance: usize,
    board: Option<KnownBoard>,
    headings: HeadingBelief,
    /// Elapsed half-round counts that explained the last observation.
    possible_elapsed: BTreeSet<usize>,
    /// (shell position, wall position) hits already counted in the ledger.
    reported_hits: BTreeSet<(Position, Position)>,
    ledger: Ledger,
}

impl BeliefTracker {
    pub fn new(player: PlayerId, info: MatchInfo, settings: &GameSettings) -> Self {
        Self {
            player,
            info,
            interval: settings.observation_interval,
            near_wall_distance: settings.shell_near_wall_distance,
            board: None,
            headings: HeadingBelief::new(),
            possible_elapsed: BTreeSet::new(),
            reported_hits: BTreeSet::new(),
            ledger: Ledger::default(),
        }
    }

    pub fn headings(&self) -> &HeadingBelief {
        &self.headings
    }

    pub fn possible_elapsed(&self) -> &BTreeSet<usize> {
        &self.possible_elapsed
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Reconcile a new view and update the ledger's inferred wall hits.
    pub fn observe(&mut self, view: &SatelliteView) {
        let board = KnownBoard::from_view(view, self.info.width, self.info.height, self.player);
        let previous = self.board.replace(board);
        self.reconcile(previous.as_ref());
        self.infer_wall_hits();
    }

    fn reconcile(&mut self, previous: Option<&KnownBoard>) {
        let Some(current) = self.board.as_ref() else {
            return;
        };
        let prior = std::mem::take(&mut self.headings);
        let shells: Vec<Position> = current.shells().collect();
        self.possible_elapsed.clear();

        let Some(previous) = previous else {
            self.headings = shells.iter().map(|&pos| (pos, all_headings())).collect();
            self.possible_elapsed = (0..=self.interval).collect();
            return;
        };

        for tolerance in 0..=shells.len() {
            let mut accumulated = HeadingBelief::new();
            let mut explained = BTreeSet::new();
            for elapsed in 0..=self.interval {
                let (candidates, unexplained) =
                    self.explain(previous, &prior, &shells, elapsed);
                if unexplained > tolerance {
                    continue;
                }
                explained.insert(elapsed);
                for (pos, headings) in candidates {
                    let headings = if headings.is_empty() { all_headings() } else { headings };
                    accumulated.entry(pos).or_default().extend(headings);
                }
            }
            if !explained.is_empty() {
                debug!(
                    "[BeliefTracker] Player {} explained {} shells with tolerance {tolerance}",
                    self.player,
                    shells.len()
                );
                self.headings = accumulated;
                self.possible_elapsed = explained;
                return;
            }
        }

        self.headings = shells.iter().map(|&pos| (pos, all_headings())).collect();
    }

    /// Plausible headings per shell for one elapsed count, plus how many shells
    /// had none.
    fn explain(
        &self,
        previous: &KnownBoard,
        prior: &HeadingBelief,
        shells: &[Position],
        elapsed: usize,
    ) -> (HeadingBelief, usize) {
        let (width, height) = (self.info.width, self.info.height);
        let steps = 2 * elapsed;
        let mut candidates = HeadingBelief::new();
        let mut unexplained = 0;

        for &pos in shells {
            let headings: BTreeSet<Direction> = Direction::ALL
                .into_iter()
                .filter(|&dir| {
                    let blocked = (1..=steps).any(|k| previous.is_wall(pos.step_back(dir, k, width, height)));
                    if blocked {
                        return false;
                    }
                    let origin = pos.step_back(dir, steps, width, height);
                    previous.has_shell(origin) && prior.get(&origin).is_none_or(|allowed| allowed.contains(&dir))
                })
                .collect();
            if headings.is_empty() {
                unexplained += 1;
            }
            candidates.insert(pos, headings);
        }
        (candidates, unexplained)
    }

    /// Count wall hits that are certain to happen: a shell with a single heading
    /// that reaches a wall within a few cells with nothing able to stop it.
    fn infer_wall_hits(&mut self) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let (width, height) = (self.info.width, self.info.height);

        for (&shell, headings) in &self.headings {
            let mut iter = headings.iter();
            let (Some(&heading), None) = (iter.next(), iter.next()) else {
                continue;
            };
            let Some(wall) = self.wall_ahead(board, shell, heading) else {
                continue;
            };

            let already_reported = self.possible_elapsed.iter().find_map(|&elapsed| {
                let earlier = shell.step_back(heading, 2 * elapsed, width, height);
                self.reported_hits.contains(&(earlier, wall)).then_some(earlier)
            });
            match already_reported {
                Some(earlier) => {
                    self.reported_hits.remove(&(earlier, wall));
                }
                None => {
                    debug!("[BeliefTracker] Player {} expects shell at {shell} to hit wall at {wall}", self.player);
                    *self.ledger.wall_damage.entry(wall).or_insert(0) += 1;
                }
            }
            self.reported_hits.insert((shell, wall));
        }

        self.reported_hits.retain(|(shell, _)| board.has_shell(*shell));
    }

    fn wall_ahead(&self, board: &KnownBoard, shell: Position, heading: Direction) -> Option<Position> {
        let (width, height) = (self.info.width, self.info.height);
        let mut pos = shell;
        for _ in 0..self.near_wall_distance {
            pos = pos.step(heading, width, height);
            if board.is_wall(pos) {
                return Some(pos);
            }
            if board.tank_owner(pos).is_some() {
                return None;
            }
            let oncoming = self
                .headings
                .get(&pos)
                .is_some_and(|headings| headings.contains(&heading.opposite()));
            if board.has_shell(pos) && oncoming {
                return None;
            }
        }
        None
    }
}

impl Player for BeliefTracker {
    fn update_tank_with_battle_info(&mut self, tank: &mut dyn TankAgent, view: &SatelliteView) {
        self.observe(view);
        let mut info = BattleInfo {
            view: view.clone(),
            match_info: self.info,
            shell_headings: self.headings.clone(),
            ledger: self.ledger.clone(),
        };
        tank.update_battle_info(&mut info);
        self.ledger = info.ledger;
    }
}
