//! Final game results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::types::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    /// At most one player has tanks left.
    AllTanksDead,
    /// Nobody could shoot for `rounds` rounds.
    ZeroShells { rounds: usize },
    MaxSteps { max_steps: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: Uuid,
    /// Winning player, `0` for a tie.
    pub winner: PlayerId,
    pub reason: GameEndReason,
    pub rounds: usize,
    pub remaining_tanks: BTreeMap<PlayerId, usize>,
    pub final_board: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub round_log: Vec<String>,
}

impl GameResult {
    /// Result of a game that never started.
    pub fn empty(game_id: Uuid) -> Self {
        Self {
            game_id,
            winner: 0,
            reason: GameEndReason::AllTanksDead,
            rounds: 0,
            remaining_tanks: BTreeMap::new(),
            final_board: Vec::new(),
            round_log: Vec::new(),
        }
    }

    pub fn is_tie(&self) -> bool {
        self.winner == 0
    }

    pub fn summary(&self) -> String {
        match self.reason {
            GameEndReason::AllTanksDead if !self.is_tie() => {
                let alive = self.remaining_tanks.get(&self.winner).copied().unwrap_or(0);
                format!("Player {} won with {alive} tanks still alive", self.winner)
            }
            GameEndReason::AllTanksDead => "Tie, all players have zero tanks".to_string(),
            GameEndReason::ZeroShells { rounds } => {
                format!("Tie, both players have zero shells for {rounds} steps")
            }
            GameEndReason::MaxSteps { max_steps } => {
                let counts: Vec<String> = self
                    .remaining_tanks
                    .iter()
                    .map(|(player, count)| format!("player {player} has {count} tanks"))
                    .collect();
                format!("Tie, reached max steps = {max_steps}, {}", counts.join(", "))
            }
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for row in &self.final_board {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
