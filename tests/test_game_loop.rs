use std::sync::mpsc;
use std::time::Duration;

use grid_platformer::compute::init_state;
use grid_platformer::config::Rules;
use grid_platformer::display::{DisplayBuffer, DisplaySink};
use grid_platformer::entities::*;
use grid_platformer::error::GameError;
use grid_platformer::game_loop::*;
use grid_platformer::input::Action;
use grid_platformer::level::Level;

/// Keeps every submitted buffer.
#[derive(Default)]
struct Recorder {
    frames: Vec<DisplayBuffer>,
}

impl DisplaySink for Recorder {
    fn submit(&mut self, buffer: &DisplayBuffer) -> Result<(), GameError> {
        self.frames.push(buffer.clone());
        Ok(())
    }
}

fn rules() -> Rules {
    Rules {
        fire_cooldown_ticks: 2,
        fireball_lifetime_ticks: None,
    }
}

fn session_with(edit: impl FnOnce(&mut Level)) -> Session {
    let mut level = Level::empty(40, 10, Coords::new(10, 9));
    edit(&mut level);
    Session::new(init_state(&level, rules()))
}

#[test]
fn apply_action_maps_every_intent() {
    let mut state = init_state(&Level::empty(40, 10, Coords::new(10, 9)), rules());
    state.player.grounded = true;
    state.player.power = PowerState::Fire;

    assert_eq!(apply_action(&state, Action::Left).player.pos.x, 9);
    assert_eq!(apply_action(&state, Action::Right).player.pos.x, 11);
    assert_eq!(apply_action(&state, Action::Jump).player.velocity_y, -3);
    assert_eq!(apply_action(&state, Action::Shoot).fireballs.len(), 1);
    assert_eq!(apply_action(&state, Action::Quit).status, GameStatus::Quit);
}

#[test]
fn intents_are_drained_before_the_tick() {
    let mut session = session_with(|_| {});
    let mut sink = Recorder::default();
    let (tx, rx) = mpsc::channel();
    tx.send(Action::Right).unwrap();
    tx.send(Action::Right).unwrap();

    let exit = session.step(&rx, &mut sink).unwrap();

    assert_eq!(exit, None);
    assert_eq!(session.state.player.pos, Coords::new(12, 9));
    assert_eq!(session.state.frame, 1);
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(
        sink.frames[0].get(Coords::new(12, 9)).map(|c| c.glyph()),
        Some('P')
    );
}

#[test]
fn second_frame_blanks_where_the_player_was_drawn() {
    let mut session = session_with(|_| {});
    let mut sink = Recorder::default();
    let (tx, rx) = mpsc::channel();

    session.step(&rx, &mut sink).unwrap();
    tx.send(Action::Left).unwrap();
    session.step(&rx, &mut sink).unwrap();

    let second = &sink.frames[1];
    assert_eq!(second.get(Coords::new(10, 9)).map(|c| c.glyph()), Some(' '));
    assert_eq!(second.get(Coords::new(9, 9)).map(|c| c.glyph()), Some('P'));
}

#[test]
fn quit_stops_before_ticking() {
    let mut session = session_with(|_| {});
    let mut sink = Recorder::default();
    let (tx, rx) = mpsc::channel();
    tx.send(Action::Quit).unwrap();
    tx.send(Action::Right).unwrap();

    let exit = run(&mut session, &rx, &mut sink, Duration::ZERO).unwrap();

    assert_eq!(exit, Exit::Quit);
    assert_eq!(session.state.frame, 0);
    assert_eq!(session.state.player.pos.x, 10);
    assert!(sink.frames.is_empty());
}

#[test]
fn enemy_walks_into_player_and_game_ends() {
    let mut session = session_with(|l| l.enemies.push(Coords::new(12, 9)));
    let mut sink = Recorder::default();
    let (_tx, rx) = mpsc::channel();

    let exit = run(&mut session, &rx, &mut sink, Duration::ZERO).unwrap();

    assert_eq!(exit, Exit::GameOver);
    assert_eq!(session.state.status, GameStatus::GameOver);
    assert_eq!(session.state.player.power, PowerState::Dead);
    // Contact on tick 3, game over raised by tick 4, which is not drawn.
    assert_eq!(session.state.frame, 4);
    assert_eq!(sink.frames.len(), 3);
}

#[test]
fn stomping_the_enemy_keeps_the_game_going() {
    let mut session = session_with(|l| l.enemies.push(Coords::new(10, 9)));
    session.state.player.pos = Coords::new(10, 7);
    let mut sink = Recorder::default();
    let (_tx, rx) = mpsc::channel();

    // Falls from row 7 to row 8, which is the enemy's secondary cell.
    let exit = session.step(&rx, &mut sink).unwrap();

    assert_eq!(exit, None);
    assert!(session.state.enemies[0].flags.killed);
    assert_eq!(session.state.player.power, PowerState::Normal);
    assert_eq!(session.state.player.velocity_y, -3);
}

#[test]
fn bad_cell_is_fatal() {
    let mut session = session_with(|l| l.coins.push(Coords::new(-3, 4)));
    let mut sink = Recorder::default();
    let (_tx, rx) = mpsc::channel();

    let err = session.step(&rx, &mut sink).unwrap_err();

    assert!(matches!(err, GameError::Display(_)));
    assert!(sink.frames.is_empty());
}

#[test]
fn spent_fireball_leaves_nothing_behind() {
    let mut session = session_with(|l| l.coins.push(Coords::new(13, 9)));
    session.state.player.power = PowerState::Fire;
    let mut sink = Recorder::default();
    let (tx, rx) = mpsc::channel();

    // Spawned at 11, moves to 12 on the first tick.
    tx.send(Action::Shoot).unwrap();
    session.step(&rx, &mut sink).unwrap();
    assert_eq!(sink.frames[0].get(Coords::new(12, 9)).map(|c| c.glyph()), Some('>'));

    // Reaches the coin at 13 and is dropped on the same tick.
    session.step(&rx, &mut sink).unwrap();
    assert!(session.state.fireballs.is_empty());
    assert_eq!(session.state.player.coins_collected, 1);

    let second = &sink.frames[1];
    assert_eq!(second.get(Coords::new(12, 9)).map(|c| c.glyph()), Some(' '));
    assert_eq!(second.get(Coords::new(13, 9)).map(|c| c.glyph()), Some(' '));
    assert!(second.iter_sorted().iter().all(|(_, c)| c.glyph() != '>'));
}
