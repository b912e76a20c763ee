//! Runtime settings.
//!
//! Every field defaults to the matching constant in `config::game` or
//! `config::planner`; a JSON file may override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::game::ZERO_SHELLS_COUNTDOWN;
use crate::config::planner::{
    BFS_ITERATION_LIMIT, OBSERVATION_INTERVAL, SHELL_NEAR_WALL_DISTANCE, SHELL_THREAT_LOOKAHEAD,
};
use crate::error::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Rounds to keep playing once every living tank is out of ammo.
    pub zero_shells_countdown: usize,
    /// Max planner calls between two observation requests; also the widest
    /// elapsed-time window the belief tracker considers.
    pub observation_interval: usize,
    pub shell_threat_lookahead: usize,
    pub bfs_iteration_limit: usize,
    pub shell_near_wall_distance: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            zero_shells_countdown: ZERO_SHELLS_COUNTDOWN,
            observation_interval: OBSERVATION_INTERVAL,
            shell_threat_lookahead: SHELL_THREAT_LOOKAHEAD,
            bfs_iteration_limit: BFS_ITERATION_LIMIT,
            shell_near_wall_distance: SHELL_NEAR_WALL_DISTANCE,
        }
    }
}

impl GameSettings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let mut settings: GameSettings = serde_json::from_str(text)?;
        // An interval of zero would never let the planner observe.
        settings.observation_interval = settings.observation_interval.max(1);
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = GameSettings::from_json(r#"{ "zero_shells_countdown": 3 }"#).unwrap();
        assert_eq!(settings.zero_shells_countdown, 3);
        assert_eq!(settings.bfs_iteration_limit, BFS_ITERATION_LIMIT);
        assert_eq!(settings.observation_interval, OBSERVATION_INTERVAL);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let settings = GameSettings::from_json(r#"{ "observation_interval": 0 }"#).unwrap();
        assert_eq!(settings.observation_interval, 1);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            GameSettings::from_json("{ nope"),
            Err(SettingsError::Json(_))
        ));
    }
}
