/// Planner tuning constants.
///
/// Defaults for the search-based tank agent and its team belief tracker.
pub const OBSERVATION_INTERVAL: usize = 4; // Max calls between two observation requests.

/// How far (in cells) a shell is considered a threat to a tank.
pub const SHELL_THREAT_LOOKAHEAD: usize = 8;

/// Hard ceiling on states expanded by one planning search.
pub const BFS_ITERATION_LIMIT: usize = 50_000;

/// Distance at which a shell with a known heading is assumed to hit the wall ahead of it.
pub const SHELL_NEAR_WALL_DISTANCE: usize = 2;
