//! Seeded random map generation.
//!
//! Maps are bordered by walls, sprinkled with interior walls and mines, and seeded
//! with tanks on free interior cells. The same seed always yields the same map.

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::game::grid::map::{EMPTY_CHAR, GameMap, MINE_CHAR, WALL_CHAR};
use crate::game::types::PlayerId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapGeneratorConfig {
    pub rows: usize,
    pub cols: usize,
    pub players: PlayerId,
    pub tanks_per_player: usize,
    /// Probability that an interior cell becomes a wall.
    pub wall_density: f64,
    pub mine_density: f64,
    pub max_steps: usize,
    pub num_shells: usize,
}

impl Default for MapGeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 16,
            players: 2,
            tanks_per_player: 2,
            wall_density: 0.12,
            mine_density: 0.03,
            max_steps: 400,
            num_shells: 12,
        }
    }
}

/// Generate a map and validate it through the regular parser.
pub fn generate_map(config: &MapGeneratorConfig, seed: u64) -> Result<GameMap, MapError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (rows, cols) = (config.rows, config.cols);
    let mut tiles = vec![vec![EMPTY_CHAR; cols]; rows];

    for (y, row) in tiles.iter_mut().enumerate() {
        for (x, tile) in row.iter_mut().enumerate() {
            let border = y == 0 || x == 0 || y + 1 == rows || x + 1 == cols;
            if border {
                *tile = WALL_CHAR;
            } else if rng.random_bool(config.wall_density.clamp(0.0, 1.0)) {
                *tile = WALL_CHAR;
            } else if rng.random_bool(config.mine_density.clamp(0.0, 1.0)) {
                *tile = MINE_CHAR;
            }
        }
    }

    for player in 1..=config.players.min(9) {
        let digit = char::from(b'0' + player);
        for _ in 0..config.tanks_per_player {
            let free = tiles
                .iter()
                .enumerate()
                .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, ch)| (x, y, *ch)))
                .filter(|&(_, _, ch)| ch == EMPTY_CHAR)
                .map(|(x, y, _)| (x, y));
            match free.choose(&mut rng) {
                Some((x, y)) => tiles[y][x] = digit,
                None => break,
            }
        }
    }

    let mut text = format!(
        "generated map (seed {seed})\nMaxSteps={}\nNumShells={}\nRows={rows}\nCols={cols}\n",
        config.max_steps, config.num_shells
    );
    for row in &tiles {
        text.extend(row.iter());
        text.push('\n');
    }
    GameMap::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        let config = MapGeneratorConfig::default();
        let a = generate_map(&config, 7).unwrap();
        let b = generate_map(&config, 7).unwrap();
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_generated_map_is_bordered_and_populated() {
        let config = MapGeneratorConfig { players: 3, tanks_per_player: 2, ..Default::default() };
        let map = generate_map(&config, 42).unwrap();
        assert_eq!((map.rows, map.cols), (config.rows, config.cols));
        assert!(map.tiles[0].iter().all(|&c| c == WALL_CHAR));
        assert!(map.tiles.iter().all(|row| row[0] == WALL_CHAR && row[config.cols - 1] == WALL_CHAR));
        assert_eq!(map.tank_seeds().len(), 6);
        assert_eq!(map.player_ids().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_too_small_map_fails_validation() {
        let config = MapGeneratorConfig { rows: 2, cols: 2, ..Default::default() };
        assert!(matches!(generate_map(&config, 1), Err(MapError::InsufficientPlayers { .. })));
    }
}
