pub mod engine;
pub mod entities;
pub mod grid;
pub mod observation;
pub mod state;
pub mod systems;
pub mod types;

pub use engine::WorldEngine;
pub use observation::SatelliteView;
pub use state::WorldState;
