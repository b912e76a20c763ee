//! Satellite views handed to agents.
//!
//! A view is a frozen character grid plus the cell of the tank that asked for it.
//! Codes: `#` wall, `@` mine, `*` shell, `1`-`9` tank of that player, `%` the
//! viewer's own cell, `&` out of bounds, space empty.

use serde::{Deserialize, Serialize};

use crate::game::types::Position;

pub const SHELL_CHAR: char = '*';
pub const SELF_CHAR: char = '%';
pub const OUT_OF_BOUNDS_CHAR: char = '&';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteView {
    rows: Vec<Vec<char>>,
    width: usize,
    viewer: Option<Position>,
}

impl SatelliteView {
    /// Wrap an arbitrary character grid. Ragged rows read as empty past their end.
    pub fn from_rows(rows: Vec<Vec<char>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width, viewer: None }
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self::from_rows(lines.iter().map(|l| l.as_ref().chars().collect()).collect())
    }

    pub fn with_viewer(mut self, viewer: Position) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn viewer(&self) -> Option<Position> {
        self.viewer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn object_at(&self, x: usize, y: usize) -> char {
        if x >= self.width || y >= self.rows.len() {
            return OUT_OF_BOUNDS_CHAR;
        }
        if self.viewer == Some(Position::new(x, y)) {
            return SELF_CHAR;
        }
        self.rows[y].get(x).copied().unwrap_or(' ')
    }

    pub fn at(&self, pos: Position) -> char {
        self.object_at(pos.x, pos.y)
    }

    /// First `%` cell, scanning row by row.
    pub fn find_self(&self) -> Option<Position> {
        (0..self.height())
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .find(|&pos| self.at(pos) == SELF_CHAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_bounds() {
        let view = SatelliteView::from_lines(&["#*@", "1 2", "#"]).with_viewer(Position::new(2, 1));
        assert_eq!((view.width(), view.height()), (3, 3));
        assert_eq!(view.object_at(1, 0), '*');
        assert_eq!(view.object_at(2, 1), '%');
        assert_eq!(view.object_at(0, 1), '1');
        assert_eq!(view.object_at(2, 2), ' ');
        assert_eq!(view.object_at(3, 0), '&');
        assert_eq!(view.object_at(0, 3), '&');
        assert_eq!(view.find_self(), Some(Position::new(2, 1)));
    }

    #[test]
    fn test_injected_grid_may_carry_percent() {
        let view = SatelliteView::from_lines(&["  ", " %"]);
        assert_eq!(view.viewer(), None);
        assert_eq!(view.find_self(), Some(Position::new(1, 1)));
    }
}
