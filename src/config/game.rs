/// World rule constants.
///
/// This module defines the gameplay parameters shared by the authoritative
/// world and by any agent that re-simulates it for lookahead.
pub const SHELL_RELOAD_TICKS: usize = 4; // Cooldown set by a successful shot.

/// Number of requests a backward move waits before the tank actually moves.
pub const BACKWARD_DELAY_TICKS: u8 = 2;

/// Hits needed to bring a wall down.
pub const WALL_DURABILITY: u8 = 2;

/// Rounds played after every living tank ran out of ammo before the game is declared a tie.
pub const ZERO_SHELLS_COUNTDOWN: usize = 40;

/// Highest player id a map may seed (`1`-`9`).
pub const MAX_PLAYER_ID: u8 = 9;

/// Minimum number of distinct players a map must seed to start a game.
pub const MIN_PLAYERS: usize = 2;
