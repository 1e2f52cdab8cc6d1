//! skidash headless runner.
//!
//! Plays a level without a window: a fixed autopilot steers the skier, frames
//! are rendered into a [`DrawList`] and HUD statistics are logged once per
//! simulated second.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 2400 --seed 7
//! RUST_LOG=debug cargo run -- --ticks 100
//! ```

use clap::Parser;
use std::path::PathBuf;

use skidash::game::Level;
use skidash::renderer::DrawList;
use skidash::resources::gameconfig::GameConfig;
use skidash::resources::input::{InputState, RawInput};
use skidash::resources::worldtime::FixedStep;

/// Headless downhill skiing simulation
#[derive(Parser)]
#[command(version, about = "Runs a skidash level headless with an autopilot.")]
struct Cli {
    /// Configuration file (INI).
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Random seed; overrides the configuration file.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated display frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

/// Keys held on a given tick. Every 120 ticks: push downhill, turn left,
/// jump, push again, turn right.
fn autopilot(tick: u64) -> RawInput {
    let phase = tick % 120;
    RawInput {
        up: false,
        down: phase < 50 || (70..100).contains(&phase),
        left: (50..58).contains(&phase),
        right: (100..108).contains(&phase),
        jump: phase == 60,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config.clone());
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            log::error!("{e}");
            std::process::exit(1);
        }
        return;
    }
    if let Err(e) = config.load_from_file() {
        log::warn!("{e}; using defaults");
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut level = match Level::new(&config) {
        Ok(level) => level,
        Err(e) => {
            log::error!("Failed to set up level: {e}");
            std::process::exit(1);
        }
    };

    let mut clock = FixedStep::new(config.tick_rate, config.max_frame_delta());
    let frame_delta = 1.0 / cli.fps.max(1) as f32;
    let mut input = InputState::default();
    let mut frame = DrawList::default();
    let mut tick: u64 = 0;

    while tick < cli.ticks {
        for _ in 0..clock.advance(frame_delta) {
            input.update(autopilot(tick));
            level.input(&input);
            if let Err(e) = level.update(clock.step()) {
                log::error!("Simulation stopped at tick {tick}: {e}");
                std::process::exit(1);
            }
            tick += 1;

            if tick % config.tick_rate as u64 == 0 {
                let stats = level.stats();
                log::info!(
                    "{} | {} m | {} km/h | score {}",
                    stats.time_text(),
                    stats.distance_m,
                    stats.speed_kmh,
                    stats.score
                );
            }
        }

        frame.clear();
        level.render(&mut frame, clock.lerp());
    }

    let stats = level.stats();
    log::info!(
        "Finished after {tick} ticks: {} m in {}, score {}, {}",
        stats.distance_m,
        stats.time_text(),
        stats.score,
        if level.player().is_some() { "still skiing" } else { "eaten by the yeti" }
    );
    log::info!("Last frame had {} draw commands", frame.len());
}
