//! Capability interface of a world engine.
//!
//! The turn scheduler only talks to the world through this trait, so alternative
//! engines can be dropped into the comparative runner.

use crate::game::entities::Tank;
use crate::game::grid::GameMap;
use crate::game::observation::SatelliteView;
use crate::game::types::{Action, PlayerId, TankId};

pub trait WorldEngine {
    fn name(&self) -> &str;

    /// Replace the whole world with a freshly loaded map.
    fn load(&mut self, map: &GameMap);

    /// Every tank id in load order, dead or alive.
    fn tank_order(&self) -> Vec<TankId>;

    fn tank(&self, id: TankId) -> Option<&Tank>;

    /// Players that started with at least one tank, ascending.
    fn players(&self) -> Vec<PlayerId>;

    /// Apply one action to one tank. Dead or unknown tanks yield `false`.
    fn execute_action(&mut self, id: TankId, action: Action) -> bool;

    /// Close the tank half of a round: resolve, advance shells once, resolve again.
    fn end_tank_actions(&mut self);

    /// The shells-only half-step; also refreshes the observation snapshot.
    fn shells_step(&mut self);

    /// Observation for a living tank, from the last snapshot.
    fn view_for(&self, id: TankId) -> Option<SatelliteView>;

    fn shells_in_flight(&self) -> usize;

    /// Current board, one string per row, in observation codes.
    fn board(&self) -> Vec<String>;

    fn alive_tanks(&self, player: PlayerId) -> usize {
        self.tank_order()
            .into_iter()
            .filter_map(|id| self.tank(id))
            .filter(|t| t.owner == player && t.is_alive)
            .count()
    }

    fn ammo_of_living_tanks(&self) -> usize {
        self.tank_order()
            .into_iter()
            .filter_map(|id| self.tank(id))
            .filter(|t| t.is_alive)
            .map(|t| t.ammo)
            .sum()
    }
}
