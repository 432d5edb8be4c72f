//! # Burrow Main Entry Point
//!
//! Builds or resumes a game and runs it in the terminal, one typed command per
//! line. With `--script` the commands come from a file instead of stdin.

use burrow::{
    run_frame, AsciiRenderer, AudioController, BurrowError, BurrowResult, FrameStatus, FrameView,
    GameConfig, GameState, InputSource, LineInput, LoggingAudio, Renderer, Session,
};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

/// Command line arguments for Burrow.
#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Dig and fight through the floors beneath your home")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding the default configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Save file; resumed from when it exists
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{err}");
        eprintln!("burrow: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> BurrowResult<()> {
    initialize_logging(&args.log_level)?;
    info!("Starting Burrow v{}", burrow::VERSION);

    let mut game_state = start_game(args)?;
    let mut session = Session::new(args.save.clone());
    let mut renderer = AsciiRenderer::new(io::stdout());
    let mut audio = LoggingAudio::default();

    match &args.script {
        Some(path) => {
            info!("Running script {}", path.display());
            let mut input = LineInput::new(BufReader::new(File::open(path)?));
            run_loop(&mut game_state, &mut session, &mut input, &mut renderer, &mut audio)?;
        }
        None => {
            let mut input = LineInput::new(io::stdin().lock());
            run_loop(&mut game_state, &mut session, &mut input, &mut renderer, &mut audio)?;
        }
    }

    info!(
        "Game ended after {} turns, deepest floor {}",
        game_state.turn_number, game_state.statistics.max_depth_reached
    );
    Ok(())
}

/// Initializes env_logger with the requested level.
fn initialize_logging(log_level: &str) -> BurrowResult<()> {
    let level: LevelFilter = log_level
        .parse()
        .map_err(|_| BurrowError::InvalidAction(format!("unknown log level '{log_level}'")))?;
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
    Ok(())
}

/// Resumes the save file if there is one, otherwise starts a new game.
fn start_game(args: &Args) -> BurrowResult<GameState> {
    if let Some(path) = args.save.as_ref().filter(|path| path.exists()) {
        info!("Resuming from {}", path.display());
        return GameState::load_from_file(path);
    }

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("New game with seed {seed}");
    GameState::with_config(config, seed)
}

/// Draws the opening frame, then runs frames until input runs out or the
/// player quits.
fn run_loop(
    game_state: &mut GameState,
    session: &mut Session,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    audio: &mut dyn AudioController,
) -> BurrowResult<()> {
    let messages = game_state.drain_messages();
    renderer.render(&FrameView::capture(game_state, messages, None)?)?;
    loop {
        match run_frame(game_state, session, input, renderer, audio)? {
            FrameStatus::Continue => {}
            FrameStatus::Idle | FrameStatus::Quit => return Ok(()),
        }
    }
}
