//! An agent's reconstruction of the board from a satellite view.

use crate::game::grid::map::{EMPTY_CHAR, MINE_CHAR, WALL_CHAR};
use crate::game::observation::{SELF_CHAR, SHELL_CHAR, SatelliteView};
use crate::game::types::{PlayerId, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownBoard {
    pub width: usize,
    pub height: usize,
    pub owner: PlayerId,
    tiles: Vec<Vec<char>>,
}

impl KnownBoard {
    /// Read a `width` x `height` board out of `view`. Out-of-bounds reads become empty.
    pub fn from_view(view: &SatelliteView, width: usize, height: usize, owner: PlayerId) -> Self {
        let tiles = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| match view.object_at(x, y) {
                        WALL_CHAR => WALL_CHAR,
                        MINE_CHAR => MINE_CHAR,
                        SHELL_CHAR => SHELL_CHAR,
                        SELF_CHAR => SELF_CHAR,
                        ch if ch.is_ascii_digit() && ch != '0' => ch,
                        _ => EMPTY_CHAR,
                    })
                    .collect()
            })
            .collect();
        Self { width, height, owner, tiles }
    }

    pub fn at(&self, pos: Position) -> char {
        self.tiles
            .get(pos.y % self.height.max(1))
            .and_then(|row| row.get(pos.x % self.width.max(1)))
            .copied()
            .unwrap_or(EMPTY_CHAR)
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.at(pos) == WALL_CHAR
    }

    pub fn has_shell(&self, pos: Position) -> bool {
        self.at(pos) == SHELL_CHAR
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.at(pos) == EMPTY_CHAR
    }

    /// Owner of the tank seen at `pos`; the agent's own cell counts as its own player.
    pub fn tank_owner(&self, pos: Position) -> Option<PlayerId> {
        match self.at(pos) {
            SELF_CHAR => Some(self.owner),
            ch => ch.to_digit(10).filter(|&d| d > 0).map(|d| d as PlayerId),
        }
    }

    pub fn is_opponent(&self, pos: Position) -> bool {
        self.tank_owner(pos).is_some_and(|owner| owner != self.owner)
    }

    pub fn self_position(&self) -> Option<Position> {
        self.positions().find(|&pos| self.at(pos) == SELF_CHAR)
    }

    pub fn shells(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|&pos| self.has_shell(pos))
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Move the agent's own marker after a forward step it just took.
    pub fn move_self(&mut self, from: Position, to: Position) {
        if self.at(from) == SELF_CHAR {
            self.set(from, EMPTY_CHAR);
        }
        self.set(to, SELF_CHAR);
    }

    fn set(&mut self, pos: Position, ch: char) {
        if let Some(tile) = self.tiles.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            *tile = ch;
        }
    }
}
