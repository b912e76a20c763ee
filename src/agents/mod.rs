//! Agent capability traits and the built-in planner agents.
//!
//! A side is driven by one [`Player`] and one [`TankAgent`] per tank. The world
//! asks tank agents for actions; when a tank requests battle info, its player
//! turns the raw satellite view into a [`BattleInfo`] and hands it over.

pub mod belief;
pub mod knowledge;
pub mod planner;
pub mod simple;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::GameSettings;
use crate::game::observation::SatelliteView;
use crate::game::types::{Action, Direction, PlayerId, Position};

pub use belief::BeliefTracker;
pub use knowledge::KnownBoard;
pub use planner::Planner;
pub use simple::SimpleTank;

/// Map facts every agent learns at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub width: usize,
    pub height: usize,
    pub max_steps: usize,
    pub num_shells: usize,
}

/// Knowledge shared between the tanks of one side. Only exchanged at
/// observation boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Known hits per wall, cumulative.
    pub wall_damage: BTreeMap<Position, usize>,
    /// Cells each tank (by roster index) has committed to.
    pub reservations: BTreeMap<usize, BTreeSet<Position>>,
}

impl Ledger {
    pub fn add_wall_hits(&mut self, hits: &BTreeMap<Position, usize>) {
        for (&pos, &count) in hits {
            *self.wall_damage.entry(pos).or_insert(0) += count;
        }
    }

    /// Union of every reservation except `tank_index`'s own.
    pub fn reserved_by_others(&self, tank_index: usize) -> BTreeSet<Position> {
        self.reservations
            .iter()
            .filter(|&(&index, _)| index != tank_index)
            .flat_map(|(_, cells)| cells.iter().copied())
            .collect()
    }
}

/// Everything a tank agent receives on an observation.
#[derive(Debug, Clone)]
pub struct BattleInfo {
    pub view: SatelliteView,
    pub match_info: MatchInfo,
    /// Plausible headings of each visible shell.
    pub shell_headings: BTreeMap<Position, BTreeSet<Direction>>,
    pub ledger: Ledger,
}

pub trait TankAgent {
    fn next_action(&mut self) -> Action;
    fn update_battle_info(&mut self, info: &mut BattleInfo);
}

pub trait Player {
    fn update_tank_with_battle_info(&mut self, tank: &mut dyn TankAgent, view: &SatelliteView);
}

/// Builds the agents of one side. Shared across worker threads, so it must be
/// `Send + Sync`; the agents it builds stay on the thread that runs the game.
pub trait AgentFactory: Send + Sync {
    fn name(&self) -> &str;
    fn create_player(&self, player: PlayerId, info: MatchInfo, settings: &GameSettings) -> Box<dyn Player>;
    fn create_tank(&self, player: PlayerId, tank_index: usize, settings: &GameSettings) -> Box<dyn TankAgent>;
}

/// Factories per side, assigned round-robin by player id.
#[derive(Clone)]
pub struct Lineup {
    factories: Vec<Arc<dyn AgentFactory>>,
}

impl Lineup {
    pub fn new(factories: Vec<Arc<dyn AgentFactory>>) -> Self {
        Self { factories }
    }

    pub fn uniform(factory: Arc<dyn AgentFactory>) -> Self {
        Self::new(vec![factory])
    }

    pub fn factory_for(&self, player: PlayerId) -> Option<&Arc<dyn AgentFactory>> {
        if self.factories.is_empty() {
            return None;
        }
        let index = (player as usize).saturating_sub(1) % self.factories.len();
        self.factories.get(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.iter().map(|f| f.name().to_string()).collect()
    }
}

/// The built-in side: a belief-tracking player with search-based tank planners.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlannerFactory;

impl AgentFactory for PlannerFactory {
    fn name(&self) -> &str {
        "planner"
    }

    fn create_player(&self, player: PlayerId, info: MatchInfo, settings: &GameSettings) -> Box<dyn Player> {
        Box::new(BeliefTracker::new(player, info, settings))
    }

    fn create_tank(&self, player: PlayerId, tank_index: usize, settings: &GameSettings) -> Box<dyn TankAgent> {
        Box::new(Planner::new(player, tank_index, settings))
    }
}

/// Belief-tracking player with reactive tanks: dodge, shoot on sight, watch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleFactory;

impl AgentFactory for SimpleFactory {
    fn name(&self) -> &str {
        "simple"
    }

    fn create_player(&self, player: PlayerId, info: MatchInfo, settings: &GameSettings) -> Box<dyn Player> {
        Box::new(BeliefTracker::new(player, info, settings))
    }

    fn create_tank(&self, player: PlayerId, tank_index: usize, _settings: &GameSettings) -> Box<dyn TankAgent> {
        Box::new(SimpleTank::new(player, tank_index))
    }
}

/// Built-in factory registered under `name`.
pub fn factory_by_name(name: &str) -> Option<Arc<dyn AgentFactory>> {
    match name {
        "planner" => Some(Arc::new(PlannerFactory)),
        "simple" => Some(Arc::new(SimpleFactory)),
        _ => None,
    }
}
