//! Turn-based tank battle simulation on a toroidal grid.
//!
//! `game` holds the authoritative world, `agents` the belief-tracking players
//! and search planners, and `session` the half-step scheduler that plays them
//! against each other.

pub mod agents;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
