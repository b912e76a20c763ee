//! Toroidal grid storage, map loading and map generation.

pub mod cell;
pub mod generator;
pub mod map;

pub use cell::*;
pub use generator::*;
pub use map::*;
