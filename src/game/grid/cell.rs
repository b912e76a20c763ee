//! Cell storage for the world grid.
//!
//! A cell keeps handles, not entities: the entities themselves live in the world
//! arenas. Several occupants may share a cell until collisions are resolved.

use std::collections::BTreeMap;

use crate::game::entities::{Occupant, OccupantKind};
use crate::game::types::Position;

#[derive(Debug, Clone)]
pub struct Cell {
    pub pos: Position,
    occupants: BTreeMap<OccupantKind, Vec<Occupant>>,
}

impl Cell {
    pub fn new(pos: Position) -> Self {
        Self { pos, occupants: BTreeMap::new() }
    }

    pub fn add(&mut self, occupant: Occupant) {
        self.occupants.entry(occupant.kind()).or_default().push(occupant);
    }

    /// Remove one occupant handle. Returns false if it was not here.
    pub fn remove(&mut self, occupant: Occupant) -> bool {
        let kind = occupant.kind();
        let Some(list) = self.occupants.get_mut(&kind) else {
            return false;
        };
        let Some(index) = list.iter().position(|o| *o == occupant) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.occupants.remove(&kind);
        }
        true
    }

    pub fn has(&self, kind: OccupantKind) -> bool {
        self.occupants.contains_key(&kind)
    }

    pub fn of_kind(&self, kind: OccupantKind) -> &[Occupant] {
        self.occupants.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self) -> usize {
        self.occupants.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Highest-priority occupant kind present (tank, then shell, wall, mine).
    pub fn top_kind(&self) -> Option<OccupantKind> {
        self.occupants.keys().next().copied()
    }

    pub fn occupants(&self) -> impl Iterator<Item = Occupant> + '_ {
        self.occupants.values().flatten().copied()
    }

    /// Drop every handle of `kind`, returning them.
    pub fn take_kind(&mut self, kind: OccupantKind) -> Vec<Occupant> {
        self.occupants.remove(&kind).unwrap_or_default()
    }
}

/// Row-major toroidal grid.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(Position::new(x, y))))
            .collect();
        Self { width, height, cells }
    }

    fn index(&self, pos: Position) -> usize {
        (pos.y % self.height) * self.width + (pos.x % self.width)
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.index(pos)]
    }

    pub fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let index = self.index(pos);
        &mut self.cells[index]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}
