//! Comparative runner: the same map and lineup on several engines, games run
//! in parallel on blocking workers, outcomes grouped by equality.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, info};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::agents::Lineup;
use crate::config::GameSettings;
use crate::game::engine::WorldEngine;
use crate::game::grid::GameMap;
use crate::game::types::PlayerId;
use crate::session::result::{GameEndReason, GameResult};
use crate::session::scheduler::run_game;

pub type EngineFactory = Arc<dyn Fn() -> Box<dyn WorldEngine> + Send + Sync>;

#[derive(Clone)]
pub struct NamedEngine {
    pub name: String,
    pub factory: EngineFactory,
}

impl NamedEngine {
    pub fn new(name: impl Into<String>, factory: EngineFactory) -> Self {
        Self { name: name.into(), factory }
    }
}

/// Engines that agreed on one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeGroup {
    pub engines: Vec<String>,
    pub winner: PlayerId,
    pub reason: GameEndReason,
    pub rounds: usize,
    pub summary: String,
    pub final_board: Vec<String>,
}

type OutcomeKey = (PlayerId, GameEndReason, usize, Vec<String>);

pub async fn compare_engines(
    map: GameMap,
    engines: Vec<NamedEngine>,
    lineup: Lineup,
    settings: GameSettings,
) -> Vec<OutcomeGroup> {
    let map = Arc::new(map);
    let mut games = JoinSet::new();
    for engine in engines {
        let map = Arc::clone(&map);
        let lineup = lineup.clone();
        games.spawn_blocking(move || {
            let result = run_game((engine.factory)(), &map, &lineup, settings);
            (engine.name, result)
        });
    }

    let mut outcomes: Vec<(String, GameResult)> = Vec::new();
    while let Some(joined) = games.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!("[Compare] Game worker failed: {e}"),
        }
    }
    info!("[Compare] {} games finished", outcomes.len());
    group_outcomes(outcomes)
}

/// Largest group first; ties broken by the first engine name.
fn group_outcomes(outcomes: Vec<(String, GameResult)>) -> Vec<OutcomeGroup> {
    let mut grouped: BTreeMap<OutcomeKey, (Vec<String>, String)> = BTreeMap::new();
    for (name, result) in outcomes {
        let key = (result.winner, result.reason, result.rounds, result.final_board.clone());
        let entry = grouped.entry(key).or_insert_with(|| (Vec::new(), result.summary()));
        entry.0.push(name);
    }

    let mut groups: Vec<OutcomeGroup> = grouped
        .into_iter()
        .map(|((winner, reason, rounds, final_board), (mut engines, summary))| {
            engines.sort();
            OutcomeGroup { engines, winner, reason, rounds, summary, final_board }
        })
        .collect();
    groups.sort_by(|a, b| b.engines.len().cmp(&a.engines.len()).then_with(|| a.engines.cmp(&b.engines)));
    groups
}
