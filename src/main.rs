use std::fs::File;
use std::io::{stdout, BufWriter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use crossterm::terminal;

use grid_platformer::compute::init_state;
use grid_platformer::config::GameConfig;
use grid_platformer::display::TerminalSink;
use grid_platformer::error::GameError;
use grid_platformer::game_loop::{run, Exit, Session};
use grid_platformer::input::{spawn_input_thread, Action, KeyboardInput, PollTiming};
use grid_platformer::level::Level;
use grid_platformer::terminal::TerminalGuard;

/// Path to a log file; logging stays off without it because stderr shares
/// the game's terminal.
const LOG_ENV_VAR: &str = "GRID_PLATFORMER_LOG";

fn init_logging() {
    let Ok(path) = std::env::var(LOG_ENV_VAR) else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("cannot open log file {}: {}", path, e),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    init_logging();
    let config = GameConfig::from_env();
    log::info!("starting with {:?}", config);

    terminal::enable_raw_mode()?;
    let mut term = TerminalGuard::new(BufWriter::new(stdout()));
    term.setup()?;

    let (tx, rx) = mpsc::channel::<Action>();
    let stop = Arc::new(AtomicBool::new(false));
    let input = spawn_input_thread(
        KeyboardInput::new(config.key_hold_window),
        tx,
        Arc::clone(&stop),
        PollTiming {
            interval: config.input_poll,
            debounce: config.input_debounce,
        },
    );

    let mut session = Session::new(init_state(&Level::default(), config.rules));
    let mut sink = TerminalSink::new(term.writer());
    let result = run(&mut session, &rx, &mut sink, config.tick);

    stop.store(true, Ordering::Release);
    if input.join().is_err() {
        log::warn!("input thread panicked");
    }

    term.restore();

    match result? {
        Exit::Quit => println!("Thanks for playing!"),
        Exit::GameOver => {
            log::info!("final score {}", session.state.player.coins_collected);
            println!("Game Over! See you again later!");
        }
    }
    Ok(())
}
