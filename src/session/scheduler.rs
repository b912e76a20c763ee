//! Game session: owns the engine and every agent of one game, and drives the
//! half-step loop until a terminal condition holds.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::agents::{BattleInfo, Lineup, MatchInfo, Player, TankAgent};
use crate::config::GameSettings;
use crate::game::engine::WorldEngine;
use crate::game::grid::GameMap;
use crate::game::observation::SatelliteView;
use crate::game::types::{Action, PlayerId, TankId};
use crate::session::result::GameResult;
use crate::session::round_log::RoundLog;
use crate::session::turn_resolution::{check_game_over, resolve_shell_step, resolve_tank_step};

/// One game in progress.
pub struct GameSession {
    pub game_id: Uuid,
    pub(crate) engine: Box<dyn WorldEngine>,
    pub(crate) players: BTreeMap<PlayerId, Box<dyn Player>>,
    pub(crate) tanks: BTreeMap<TankId, Box<dyn TankAgent>>,
    /// Tank ids in load order; the order actions are requested and applied in.
    pub(crate) order: Vec<TankId>,
    pub(crate) settings: GameSettings,
    pub(crate) max_steps: usize,
    /// Rounds left once nobody can shoot any more; `None` until armed.
    pub(crate) countdown: Option<usize>,
    pub(crate) rounds: usize,
    pub(crate) log: RoundLog,
}

impl GameSession {
    /// Load `map` into `engine` and build the agents of every side.
    pub fn new(mut engine: Box<dyn WorldEngine>, map: &GameMap, lineup: &Lineup, settings: GameSettings) -> Self {
        engine.load(map);
        let match_info = MatchInfo {
            width: map.cols,
            height: map.rows,
            max_steps: map.max_steps,
            num_shells: map.num_shells,
        };

        let mut players: BTreeMap<PlayerId, Box<dyn Player>> = BTreeMap::new();
        for player in engine.players() {
            let agent: Box<dyn Player> = match lineup.factory_for(player) {
                Some(factory) => factory.create_player(player, match_info, &settings),
                None => {
                    warn!("[GameSession] No agent factory for player {player}, it will stay idle");
                    Box::new(IdlePlayer)
                }
            };
            players.insert(player, agent);
        }

        let order = engine.tank_order();
        let mut tanks: BTreeMap<TankId, Box<dyn TankAgent>> = BTreeMap::new();
        for &id in &order {
            let Some(tank) = engine.tank(id) else { continue };
            let agent: Box<dyn TankAgent> = match lineup.factory_for(tank.owner) {
                Some(factory) => factory.create_tank(tank.owner, tank.index, &settings),
                None => Box::new(IdleTank),
            };
            tanks.insert(id, agent);
        }

        let game_id = Uuid::new_v4();
        info!(
            "[GameSession] Game {game_id} on engine {} with {} players and {} tanks",
            engine.name(),
            players.len(),
            order.len()
        );

        Self {
            game_id,
            engine,
            players,
            tanks,
            order,
            settings,
            max_steps: map.max_steps,
            countdown: None,
            rounds: 0,
            log: RoundLog::default(),
        }
    }

    pub fn with_game_id(mut self, game_id: Uuid) -> Self {
        self.game_id = game_id;
        self
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn engine(&self) -> &dyn WorldEngine {
        self.engine.as_ref()
    }

    pub fn round_log(&self) -> &RoundLog {
        &self.log
    }

    /// Play one full round. Returns the result once the game is over.
    pub fn play_round(&mut self) -> Option<GameResult> {
        let records = resolve_tank_step(self);
        let records = resolve_shell_step(self, records);
        self.rounds += 1;
        self.log.push_round(records);
        check_game_over(self)
    }

    /// Play until a terminal condition holds.
    pub fn run(mut self) -> GameResult {
        loop {
            if let Some(result) = self.play_round() {
                info!("[GameSession] Game {} over after {} rounds: {}", self.game_id, result.rounds, result.summary());
                return result;
            }
        }
    }

    /// Ask `id`'s agent for its next action. Dead or unknown tanks are skipped.
    pub(crate) fn request_action(&mut self, id: TankId) -> Option<Action> {
        let alive = self.engine.tank(id).is_some_and(|t| t.is_alive);
        if !alive {
            return None;
        }
        let action = self.tanks.get_mut(&id).map_or(Action::DoNothing, |agent| agent.next_action());
        debug!("[GameSession] Tank {} requests {action}", id.0);
        Some(action)
    }

    /// Hand `id` its observation through its side's player.
    pub(crate) fn deliver_battle_info(&mut self, id: TankId) {
        let Some(owner) = self.engine.tank(id).map(|t| t.owner) else { return };
        let Some(view) = self.engine.view_for(id) else { return };
        let (Some(player), Some(agent)) = (self.players.get_mut(&owner), self.tanks.get_mut(&id)) else {
            return;
        };
        player.update_tank_with_battle_info(agent.as_mut(), &view);
    }
}

/// Side with no agent factory: never observes anything useful.
struct IdlePlayer;

impl Player for IdlePlayer {
    fn update_tank_with_battle_info(&mut self, _tank: &mut dyn TankAgent, _view: &SatelliteView) {}
}

struct IdleTank;

impl TankAgent for IdleTank {
    fn next_action(&mut self) -> Action {
        Action::DoNothing
    }

    fn update_battle_info(&mut self, _info: &mut BattleInfo) {}
}

/// Play one game of `map` on `engine` to completion.
pub fn run_game(engine: Box<dyn WorldEngine>, map: &GameMap, lineup: &Lineup, settings: GameSettings) -> GameResult {
    GameSession::new(engine, map, lineup, settings).run()
}

/// Load a map file and play it. A map that fails to load yields an empty result.
pub fn run_game_from_file(
    engine: Box<dyn WorldEngine>,
    path: &Path,
    lineup: &Lineup,
    settings: GameSettings,
) -> GameResult {
    match GameMap::load(path) {
        Ok(map) => run_game(engine, &map, lineup, settings),
        Err(e) => {
            error!("[GameSession] Refusing to start, map {} failed to load: {e}", path.display());
            GameResult::empty(Uuid::new_v4())
        }
    }
}
