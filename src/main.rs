//! Hellkick headless runner
//!
//! Plays a match with the demo driver on the player side and prints the
//! result, optionally with the final snapshot as JSON. Frames arrive at a
//! fixed rate and are fed through the same accumulator loop a windowed front
//! end would use.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hellkick::LogSink;
use hellkick::consts::{MAX_SUBSTEPS, SIM_DT};
use hellkick::sim::{GameState, TickInput, tick};
use hellkick::{Level, LevelConfig};

#[derive(Parser, Debug)]
#[command(about = "Run a headless Hellkick match and print the final state", version)]
struct Args {
    /// Level preset (1 or 2)
    #[arg(long, default_value = "1")]
    level: String,
    /// Level config JSON; overrides --level
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Stop after this much simulated time even if the match is still on
    #[arg(long, default_value_t = 300.0)]
    seconds: f32,
    /// Render frame time in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,
    /// Print the final match snapshot as JSON
    #[arg(long)]
    snapshot: bool,
    /// Log a progress line every N simulated seconds
    #[arg(long)]
    snapshot_every: Option<f32>,
    #[arg(long)]
    mute: bool,
}

/// Runner holding match state and the frame accumulator
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
    sink: LogSink,
}

impl Game {
    fn new(state: GameState, mute: bool) -> Self {
        let mut sink = LogSink::new();
        sink.set_muted(mute);
        Self {
            state,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
            sink,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT, &mut self.sink);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }
}

fn load_config(args: &Args) -> Result<LevelConfig, String> {
    if let Some(path) = &args.config {
        return LevelConfig::from_file(path).map_err(|e| e.to_string());
    }
    Level::from_str(&args.level)
        .map(|level| level.config())
        .ok_or_else(|| format!("unknown level '{}'", args.level))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Hellkick (headless) starting...");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let state = match GameState::new(config, args.seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("invalid level: {}", e);
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut game = Game::new(state, args.mute);
    let frame_dt = (args.frame_ms / 1000.0).max(1e-4);
    let every = args.snapshot_every.map_or(f32::INFINITY, |secs| secs.max(SIM_DT));
    let mut next_snapshot = every;

    while !game.state.arena.is_finished() && game.state.time < args.seconds {
        game.update(frame_dt);
        if game.state.time >= next_snapshot {
            let snapshot = game.state.snapshot();
            log::info!(
                "t={:.1}s score {}-{} remaining {:.1}s ball ({:.0}, {:.0})",
                snapshot.time,
                snapshot.score.player,
                snapshot.score.opponent,
                snapshot.remaining,
                snapshot.ball.pos.x,
                snapshot.ball.pos.y
            );
            next_snapshot += every;
        }
    }

    let snapshot = game.state.snapshot();
    println!(
        "{:?} {}-{} after {:.1}s ({} ticks)",
        snapshot.phase, snapshot.score.player, snapshot.score.opponent, snapshot.time, snapshot.tick
    );
    if args.snapshot {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
