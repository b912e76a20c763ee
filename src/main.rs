//! Command-line entry point.
//!
//! Loads (or generates) a map, plays it with the agents named by `--agents`, and
//! prints the result. `--compare` replays the same game on several engine
//! instances in parallel and groups the outcomes.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use tank_arena::agents::{Lineup, factory_by_name};
use tank_arena::config::GameSettings;
use tank_arena::game::WorldState;
use tank_arena::game::engine::WorldEngine;
use tank_arena::game::grid::{GameMap, MapGeneratorConfig, generate_map};
use tank_arena::session::comparison::EngineFactory;
use tank_arena::session::{NamedEngine, compare_engines, run_game};

#[derive(Debug, Parser)]
#[command(name = "tank-arena", about = "Play a tank battle between agent sides")]
struct Args {
    /// Map file to play.
    map: Option<PathBuf>,

    /// JSON file overriding the default settings.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Generate a random map instead of loading one.
    #[arg(long)]
    generate: bool,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the generated map to this file.
    #[arg(long)]
    save_map: Option<PathBuf>,

    /// Play the game on this many engine instances in parallel and group the outcomes.
    #[arg(long)]
    compare: Option<usize>,

    /// Print one line per round with every tank's action.
    #[arg(long)]
    round_log: bool,

    /// Agents per player, assigned round-robin by player id (`planner`, `simple`).
    #[arg(long, value_delimiter = ',', default_value = "planner")]
    agents: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => GameSettings::load(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => GameSettings::default(),
    };

    let map = if args.generate {
        let map = generate_map(&MapGeneratorConfig::default(), args.seed)
            .with_context(|| format!("generating map with seed {}", args.seed))?;
        if let Some(path) = &args.save_map {
            fs::write(path, map.to_text()).with_context(|| format!("writing map to {}", path.display()))?;
        }
        map
    } else {
        let Some(path) = &args.map else {
            bail!("no map given: pass a map file or --generate");
        };
        GameMap::load(path).with_context(|| format!("loading map {}", path.display()))?
    };
    info!("[Main] Playing \"{}\" ({}x{})", map.description, map.cols, map.rows);

    let factories = args
        .agents
        .iter()
        .map(|name| factory_by_name(name).with_context(|| format!("unknown agent {name:?}")))
        .collect::<Result<Vec<_>>>()?;
    let lineup = Lineup::new(factories);

    if let Some(count) = args.compare {
        let factory: EngineFactory = Arc::new(|| Box::new(WorldState::default()) as Box<dyn WorldEngine>);
        let engines = (1..=count.max(1))
            .map(|i| NamedEngine::new(format!("WorldState#{i}"), Arc::clone(&factory)))
            .collect();
        let groups = compare_engines(map, engines, lineup, settings).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&groups)?);
        } else {
            for group in &groups {
                println!("{} -> {}", group.engines.join(", "), group.summary);
                for row in &group.final_board {
                    println!("{row}");
                }
            }
        }
        return Ok(());
    }

    let result = run_game(Box::new(WorldState::default()), &map, &lineup, settings);
    if args.round_log {
        for line in &result.round_log {
            println!("{line}");
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{result}");
    }
    Ok(())
}
