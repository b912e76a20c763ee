//! Map text format.
//!
//! ```text
//! <free-text description>
//! MaxSteps=<n>
//! NumShells=<n>
//! Rows=<n>
//! Cols=<n>
//! <Rows lines of Cols characters>
//! ```
//!
//! `#` wall, `@` mine, `1`-`9` a tank of that player, `.` or space empty.
//! Layout defects (ragged rows, missing rows, unknown characters) are repaired
//! and recorded as warnings; metadata defects abort the load.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::game::MIN_PLAYERS;
use crate::error::MapError;
use crate::game::types::{PlayerId, Position};

pub const WALL_CHAR: char = '#';
pub const MINE_CHAR: char = '@';
pub const EMPTY_CHAR: char = ' ';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    pub description: String,
    pub max_steps: usize,
    pub num_shells: usize,
    pub rows: usize,
    pub cols: usize,
    /// `rows` rows of `cols` normalized characters (`#`, `@`, digit or space).
    pub tiles: Vec<Vec<char>>,
    pub warnings: Vec<String>,
}

impl GameMap {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut lines = text.lines();
        let description = lines.next().unwrap_or_default().trim_end().to_string();

        let max_steps = parse_metadata(lines.next(), "MaxSteps")?;
        let num_shells = parse_metadata(lines.next(), "NumShells")?;
        let rows = parse_metadata(lines.next(), "Rows")?;
        let cols = parse_metadata(lines.next(), "Cols")?;
        if rows == 0 || cols == 0 {
            return Err(MapError::ZeroDimension { rows, cols });
        }

        let mut warnings = Vec::new();
        let mut tiles = Vec::with_capacity(rows);
        for y in 0..rows {
            let line = match lines.next() {
                Some(line) => line.trim_end_matches('\r'),
                None => {
                    warnings.push(format!("row {y} is missing, filling it with empty cells"));
                    ""
                }
            };
            let width = line.chars().count();
            if width != cols && !line.is_empty() {
                warnings.push(format!(
                    "row {y} has width {width}, expected {cols}; filling missing cells and ignoring extra ones"
                ));
            }

            let mut row: Vec<char> = Vec::with_capacity(cols);
            for (x, ch) in line.chars().take(cols).enumerate() {
                row.push(match ch {
                    WALL_CHAR | MINE_CHAR | '1'..='9' => ch,
                    '.' | ' ' => EMPTY_CHAR,
                    other => {
                        warnings.push(format!("invalid character {other:?} at ({x}, {y}), treating as empty"));
                        EMPTY_CHAR
                    }
                });
            }
            row.resize(cols, EMPTY_CHAR);
            tiles.push(row);
        }

        for warning in &warnings {
            warn!("[MapLoader] {warning}");
        }

        let map = GameMap { description, max_steps, num_shells, rows, cols, tiles, warnings };
        let found = map.player_ids().len();
        if found < MIN_PLAYERS {
            return Err(MapError::InsufficientPlayers { found, required: MIN_PLAYERS });
        }
        Ok(map)
    }

    /// Player ids that own at least one tank, ascending.
    pub fn player_ids(&self) -> BTreeSet<PlayerId> {
        self.tiles
            .iter()
            .flatten()
            .filter_map(|ch| ch.to_digit(10))
            .map(|d| d as PlayerId)
            .collect()
    }

    /// Tank seeds in load order (row-major), as `(player, position)`.
    pub fn tank_seeds(&self) -> Vec<(PlayerId, Position)> {
        let mut seeds = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, ch) in row.iter().enumerate() {
                if let Some(d) = ch.to_digit(10) {
                    seeds.push((d as PlayerId, Position::new(x, y)));
                }
            }
        }
        seeds
    }

    /// Serialize back into the text format; empty cells are written as spaces.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{}\nMaxSteps={}\nNumShells={}\nRows={}\nCols={}\n",
            self.description, self.max_steps, self.num_shells, self.rows, self.cols
        );
        for row in &self.tiles {
            text.extend(row.iter());
            text.push('\n');
        }
        text
    }
}

fn parse_metadata(line: Option<&str>, key: &'static str) -> Result<usize, MapError> {
    let line = line.ok_or(MapError::MissingMetadata { key })?;
    let (name, value) = line.split_once('=').ok_or(MapError::MissingMetadata { key })?;
    if name.trim() != key {
        return Err(MapError::MissingMetadata { key });
    }
    let value = value.trim();
    value.parse().map_err(|_| MapError::InvalidMetadata { key, value: value.to_string() })
}
