//! Authoritative world state.
//!
//! Entities live in arenas indexed by their typed ids; the grid and the rosters
//! only hold handles. Nothing is ever removed from an arena: destroyed tanks are
//! marked dead and destroyed shells leave the active list.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::game::engine::WorldEngine;
use crate::game::entities::{Mine, Occupant, Shell, Tank, Wall};
use crate::game::grid::{GameMap, Grid};
use crate::game::grid::map::{EMPTY_CHAR, MINE_CHAR, WALL_CHAR};
use crate::game::observation::SatelliteView;
use crate::game::systems::{advance_shells, execute_tank_action, render_board, render_tiles, resolve_collisions};
use crate::game::types::{Action, MineId, PlayerId, Position, ShellId, TankId, WallId};

#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub grid: Grid,
    pub tanks: Vec<Tank>,
    pub shells: Vec<Shell>,
    pub walls: Vec<Wall>,
    pub mines: Vec<Mine>,
    /// Shells still in flight, in firing order.
    pub active_shells: Vec<ShellId>,
    /// Per-player tank ids in load order.
    pub rosters: BTreeMap<PlayerId, Vec<TankId>>,
    pub max_steps: usize,
    pub num_shells: usize,
    /// Cells that gained an occupant since the last collision pass.
    pub(crate) touched: BTreeSet<Position>,
    /// Tanks that moved since the last collision pass, with their origin cell.
    pub(crate) moved_from: Vec<(TankId, Position)>,
    /// Grid as of the end of the last shells-only step; observations read it.
    snapshot: Vec<Vec<char>>,
    /// Where each tank stood when the snapshot was taken, by tank id.
    snapshot_positions: Vec<Position>,
}

impl WorldState {
    pub fn new(map: &GameMap) -> Self {
        let mut state = WorldState {
            grid: Grid::new(map.cols, map.rows),
            tanks: Vec::new(),
            shells: Vec::new(),
            walls: Vec::new(),
            mines: Vec::new(),
            active_shells: Vec::new(),
            rosters: BTreeMap::new(),
            max_steps: map.max_steps,
            num_shells: map.num_shells,
            touched: BTreeSet::new(),
            moved_from: Vec::new(),
            snapshot: Vec::new(),
            snapshot_positions: Vec::new(),
        };

        for (y, row) in map.tiles.iter().enumerate() {
            for (x, &ch) in row.iter().enumerate() {
                let pos = Position::new(x, y);
                match ch {
                    WALL_CHAR => state.spawn_wall(pos),
                    MINE_CHAR => state.spawn_mine(pos),
                    _ => {
                        if let Some(digit) = ch.to_digit(10) {
                            state.spawn_tank(digit as PlayerId, pos);
                        }
                    }
                }
            }
        }

        state.take_snapshot();
        debug!(
            "[WorldState] Loaded {}x{} map with {} tanks, {} walls, {} mines",
            map.cols,
            map.rows,
            state.tanks.len(),
            state.walls.len(),
            state.mines.len()
        );
        state
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    fn spawn_wall(&mut self, pos: Position) {
        let id = WallId(self.walls.len());
        self.walls.push(Wall::default());
        self.grid.cell_mut(pos).add(Occupant::Wall(id));
    }

    fn spawn_mine(&mut self, pos: Position) {
        let id = MineId(self.mines.len());
        self.mines.push(Mine::default());
        self.grid.cell_mut(pos).add(Occupant::Mine(id));
    }

    fn spawn_tank(&mut self, owner: PlayerId, pos: Position) {
        let id = TankId(self.tanks.len());
        let roster = self.rosters.entry(owner).or_default();
        self.tanks.push(Tank::new(owner, roster.len(), pos, self.num_shells));
        roster.push(id);
        self.grid.cell_mut(pos).add(Occupant::Tank(id));
    }

    /// Put a new shell in flight at `pos`.
    pub(crate) fn spawn_shell(&mut self, shell: Shell) -> ShellId {
        let id = ShellId(self.shells.len());
        let pos = shell.pos;
        self.shells.push(shell);
        self.active_shells.push(id);
        self.grid.cell_mut(pos).add(Occupant::Shell(id));
        self.touched.insert(pos);
        id
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks.get(id.0)
    }

    pub(crate) fn tank_mut(&mut self, id: TankId) -> Option<&mut Tank> {
        self.tanks.get_mut(id.0)
    }

    pub fn snapshot(&self) -> &[Vec<char>] {
        &self.snapshot
    }

    fn take_snapshot(&mut self) {
        self.snapshot = render_tiles(self);
        self.snapshot_positions = self.tanks.iter().map(|t| t.pos).collect();
    }
}

impl WorldEngine for WorldState {
    fn name(&self) -> &str {
        "WorldState"
    }

    fn load(&mut self, map: &GameMap) {
        *self = WorldState::new(map);
    }

    fn tank_order(&self) -> Vec<TankId> {
        (0..self.tanks.len()).map(TankId).collect()
    }

    fn tank(&self, id: TankId) -> Option<&Tank> {
        WorldState::tank(self, id)
    }

    fn players(&self) -> Vec<PlayerId> {
        self.rosters.keys().copied().collect()
    }

    fn execute_action(&mut self, id: TankId, action: Action) -> bool {
        execute_tank_action(self, id, action)
    }

    fn end_tank_actions(&mut self) {
        resolve_collisions(self);
        advance_shells(self);
        resolve_collisions(self);
    }

    fn shells_step(&mut self) {
        advance_shells(self);
        resolve_collisions(self);
        self.take_snapshot();
    }

    /// The viewer is marked where it stands now. If it moved since the snapshot
    /// (a backward move completing on this request), its old cell is blanked.
    fn view_for(&self, id: TankId) -> Option<SatelliteView> {
        let tank = self.tank(id).filter(|t| t.is_alive)?;
        let mut rows = self.snapshot.clone();
        let seen = self.snapshot_positions.get(id.0).copied().filter(|&pos| pos != tank.pos);
        if let Some(seen) = seen {
            let own = char::from_digit(tank.owner as u32, 10);
            if let Some(cell) = rows.get_mut(seen.y).and_then(|row| row.get_mut(seen.x)) {
                if Some(*cell) == own {
                    *cell = EMPTY_CHAR;
                }
            }
        }
        Some(SatelliteView::from_rows(rows).with_viewer(tank.pos))
    }

    fn shells_in_flight(&self) -> usize {
        self.active_shells.len()
    }

    fn board(&self) -> Vec<String> {
        render_board(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::OccupantKind;

    fn duel() -> GameMap {
        GameMap::parse("t\nMaxSteps=20\nNumShells=3\nRows=3\nCols=5\n#####\n1@#.2\n#####\n").unwrap()
    }

    #[test]
    fn test_load_builds_arenas_and_rosters() {
        let state = WorldState::new(&duel());
        assert_eq!(state.tanks.len(), 2);
        assert_eq!(state.walls.len(), 11);
        assert_eq!(state.mines.len(), 1);
        assert_eq!(state.rosters[&1], vec![TankId(0)]);
        assert_eq!(state.rosters[&2], vec![TankId(1)]);
        assert_eq!(state.tanks[0].ammo, 3);
        assert!(state.grid.cell(Position::new(1, 1)).has(OccupantKind::Mine));
        assert_eq!(state.snapshot()[1].iter().collect::<String>(), "1@# 2");
    }

    #[test]
    fn test_view_marks_viewer_cell() {
        let state = WorldState::new(&duel());
        let view = state.view_for(TankId(1)).unwrap();
        assert_eq!(view.object_at(4, 1), '%');
        assert_eq!(view.object_at(0, 1), '1');
        assert_eq!(view.object_at(5, 1), '&');
    }

    #[test]
    fn test_view_after_backward_move_has_no_stale_self() {
        let map = GameMap::parse("t\nMaxSteps=20\nNumShells=3\nRows=3\nCols=7\n#######\n#  2 1#\n#######\n").unwrap();
        let mut state = WorldState::new(&map);
        let id = TankId(0);
        assert!(state.execute_action(id, Action::MoveBackward));
        assert!(!state.execute_action(id, Action::DoNothing));
        // The wait elapses on this request and the tank backs into (2, 1).
        assert!(state.execute_action(id, Action::GetBattleInfo));
        assert_eq!(state.tanks[0].pos, Position::new(2, 1));

        let view = state.view_for(id).unwrap();
        assert_eq!(view.find_self(), Some(Position::new(2, 1)));
        assert_eq!(view.object_at(3, 1), ' ');
        assert_eq!(view.object_at(5, 1), '1');
    }
}
