/// Simulation loop driver.
///
/// Owns the game state for the whole run.  Each tick it drains queued
/// intents, advances the simulation, draws the result and hands it to the
/// display sink, then sleeps for the rest of the tick period.

use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use crate::compute::{move_player_left, move_player_right, player_jump, player_shoot, quit, tick};
use crate::display::{draw_frame, mark_bricks_painted, DisplaySink};
use crate::entities::{Coords, GameState, GameStatus};
use crate::error::GameError;
use crate::input::Action;

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Quit,
    GameOver,
}

/// Apply one queued intent to the state.
pub fn apply_action(state: &GameState, action: Action) -> GameState {
    match action {
        Action::Left => move_player_left(state),
        Action::Right => move_player_right(state),
        Action::Jump => player_jump(state),
        Action::Shoot => player_shoot(state),
        Action::Quit => quit(state),
    }
}

/// Everything a running game carries between ticks.
pub struct Session {
    pub state: GameState,
    /// Where the player was last drawn.
    player_drawn: Option<Coords>,
}

impl Session {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            player_drawn: None,
        }
    }

    /// One full tick without the trailing sleep.  Returns `Some` once the
    /// game has ended; a game-over tick is not rendered.
    pub fn step<S: DisplaySink>(
        &mut self,
        intents: &Receiver<Action>,
        sink: &mut S,
    ) -> Result<Option<Exit>, GameError> {
        for action in intents.try_iter() {
            self.state = apply_action(&self.state, action);
            if self.state.status == GameStatus::Quit {
                log::info!("quit requested on frame {}", self.state.frame);
                return Ok(Some(Exit::Quit));
            }
        }

        self.state = tick(&self.state);
        if self.state.status == GameStatus::GameOver {
            return Ok(Some(Exit::GameOver));
        }

        let buffer = draw_frame(&self.state, self.player_drawn)?;
        sink.submit(&buffer)?;
        mark_bricks_painted(&mut self.state);
        self.player_drawn = Some(self.state.player.pos);
        Ok(None)
    }
}

/// Run ticks every `period` until the player quits or the game ends.
pub fn run<S: DisplaySink>(
    session: &mut Session,
    intents: &Receiver<Action>,
    sink: &mut S,
    period: Duration,
) -> Result<Exit, GameError> {
    loop {
        let tick_start = Instant::now();

        if let Some(exit) = session.step(intents, sink)? {
            return Ok(exit);
        }

        let elapsed = tick_start.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }
}
