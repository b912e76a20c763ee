pub mod collisions;
pub mod combat;
pub mod movement;
pub mod render;

pub use collisions::*;
pub use combat::*;
pub use movement::*;
pub use render::*;
