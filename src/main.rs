/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::level::load_level_defs;
use sim::ports::InputPort;
use sim::session::Session;
use sim::step::{FixedStep, SIM_STEP};
use ui::assets::{Catalog, TerminalLoader};
use ui::input::TerminalInput;
use ui::renderer::Renderer;
use ui::sound::{SoundBoard, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const LOG_FILE: &str = "ninjarun.log";

fn main() -> ExitCode {
    let log_path = init_tracing();
    let config = GameConfig::load();
    info!(levels_dir = %config.levels_dir.display(), seed = config.level_seed, "starting");

    let levels = match load_level_defs(&config.levels_dir) {
        Ok(levels) => levels,
        Err(e) => {
            error!(error = %e, "could not load levels");
            eprintln!("Could not load levels: {e}");
            return ExitCode::FAILURE;
        }
    };

    let catalog = Catalog::new();
    let mut loader = TerminalLoader::new(&catalog);
    let mut session = match Session::new(levels, config.tuning, config.level_seed, &mut loader) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "could not start session");
            eprintln!("Could not start: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new(&catalog);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut input = TerminalInput::new(&config.gamepad);
    if let Err(e) = input.enable_release_events() {
        warn!(error = %e, "could not query keyboard enhancement");
    }
    let mut audio = SoundBoard::new(&catalog, SoundEngine::new());

    let result = game_loop(&mut session, &mut renderer, &mut input, &mut loader, &mut audio, &config);

    if let Err(e) = input.restore() {
        warn!(error = %e, "could not restore keyboard mode");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    let score = session.level().score;
    session.shutdown(&mut loader);
    debug!(live = loader.live_count(), "assets released");

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
        if let Some(path) = log_path {
            eprintln!("See {} for details.", path.display());
        }
        return ExitCode::FAILURE;
    }

    info!(score, "exiting");
    println!();
    println!("Thanks for playing Ninja Run!");
    println!("Final Score: {score}");
    ExitCode::SUCCESS
}

/// Log to a file in the temp directory; the terminal belongs to the
/// renderer. Filter with `RUST_LOG`, default `info`.
fn init_tracing() -> Option<PathBuf> {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled, cannot create {}: {e}", path.display());
            return None;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Some(path)
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    input: &mut TerminalInput,
    loader: &mut TerminalLoader,
    audio: &mut SoundBoard,
    config: &GameConfig,
) -> std::io::Result<()> {
    let frame_interval = Duration::from_millis(config.frame_ms);
    let mut clock = FixedStep::default();
    let mut last_poll = Instant::now();
    let mut last_draw = Instant::now();
    let mut sim_since_draw = Duration::ZERO;

    loop {
        let meta = input.poll();
        if meta.quit {
            info!("quit requested");
            break;
        }
        if meta.toggle_mute {
            let muted = audio.toggle_mute();
            info!(muted, "sound toggled");
        }

        let now = Instant::now();
        for _ in 0..clock.advance(now - last_poll) {
            let snapshot = input.snapshot();
            if let Err(e) = session.tick(SIM_STEP, &snapshot, loader, audio) {
                // The session keeps the current level running
                warn!(error = %e, "level switch failed");
            }
            sim_since_draw += SIM_STEP;
        }
        last_poll = now;

        if now - last_draw >= frame_interval {
            last_draw = now;
            renderer.begin_frame(config.tuning.view.viewport_width, session.level().grid.height())?;
            session.draw(std::mem::take(&mut sim_since_draw), renderer);
            renderer.draw_hud(&session.hud());
            renderer.present()?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
