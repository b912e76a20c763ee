//! Game sessions: the half-step scheduler, results, and batch comparison.

pub mod comparison;
pub mod result;
pub mod round_log;
pub mod scheduler;
pub mod turn_resolution;

pub use comparison::{NamedEngine, OutcomeGroup, compare_engines};
pub use result::{GameEndReason, GameResult};
pub use round_log::{RoundLog, TankRecord};
pub use scheduler::{GameSession, run_game, run_game_from_file};
