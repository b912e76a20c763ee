/// Main configuration module.
///
/// Re-exports submodules for world rules and planner tuning, and the runtime
/// `GameSettings` that gathers them (optionally overridden from a JSON file).
pub mod game;
pub mod planner;
pub mod settings;

pub use settings::GameSettings;
