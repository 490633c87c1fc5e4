/// Input layer.
///
/// The simulation never reads a device.  An input thread samples an
/// `InputSource` on its own cadence and publishes discrete `Action`s on a
/// channel; the game loop drains that channel once per tick and is the only
/// owner of the game state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    Shoot,
    Quit,
}

impl Action {
    /// Sampling order used by the input loop.
    pub const ALL: [Action; 5] = [
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Shoot,
        Action::Quit,
    ];
}

/// "Is this action active right now?"
pub trait InputSource {
    fn poll(&mut self, action: Action) -> bool;
}

#[derive(Clone, Copy, Debug)]
pub struct PollTiming {
    /// Pause between full sampling passes.
    pub interval: Duration,
    /// Pause after each published action.
    pub debounce: Duration,
}

/// Sample `source` until `stop` is raised or the receiver hangs up.
///
/// A `Quit` is published and also raises `stop`, so the thread winds down
/// on its own once the player asks to leave.
pub fn poll_loop<S: InputSource>(
    source: &mut S,
    tx: &Sender<Action>,
    stop: &AtomicBool,
    timing: PollTiming,
) {
    while !stop.load(Ordering::Acquire) {
        for action in Action::ALL {
            if !source.poll(action) {
                continue;
            }
            if tx.send(action).is_err() {
                log::debug!("intent receiver dropped, input loop exiting");
                return;
            }
            if action == Action::Quit {
                stop.store(true, Ordering::Release);
                return;
            }
            thread::sleep(timing.debounce);
        }
        thread::sleep(timing.interval);
    }
}

/// Run `poll_loop` on its own thread.  Join the handle after raising `stop`.
pub fn spawn_input_thread<S>(
    mut source: S,
    tx: Sender<Action>,
    stop: Arc<AtomicBool>,
    timing: PollTiming,
) -> JoinHandle<()>
where
    S: InputSource + Send + 'static,
{
    thread::spawn(move || poll_loop(&mut source, &tx, &stop, timing))
}

// ── Keyboard source ───────────────────────────────────────────────────────────

/// Reads crossterm key events and reports an action as active while one of
/// its keys is held.
///
/// Terminals with keyboard enhancement send release events and keys drop out
/// immediately.  Classic terminals only repeat presses, so a key also expires
/// once it has been silent for `hold_window`.
pub struct KeyboardInput {
    last_seen: HashMap<KeyCode, Instant>,
    hold_window: Duration,
    quit_requested: bool,
}

impl KeyboardInput {
    pub fn new(hold_window: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            hold_window,
            quit_requested: false,
        }
    }

    fn drain_events(&mut self) {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    log::warn!("polling terminal events failed: {}", e);
                    return;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => self.record(key, Instant::now()),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("reading terminal event failed: {}", e);
                    return;
                }
            }
        }
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.quit_requested = true;
                }
                self.last_seen.insert(key.code, now);
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&key.code);
            }
        }
    }

    fn is_held(&self, key: &KeyCode, now: Instant) -> bool {
        self.last_seen
            .get(key)
            .map(|&last| now.saturating_duration_since(last) <= self.hold_window)
            .unwrap_or(false)
    }

    fn held(&self, action: Action, now: Instant) -> bool {
        if action == Action::Quit && self.quit_requested {
            return true;
        }
        keys_for(action).iter().any(|key| self.is_held(key, now))
    }
}

fn keys_for(action: Action) -> &'static [KeyCode] {
    match action {
        Action::Left => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Action::Right => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Action::Jump => &[KeyCode::Up, KeyCode::Char(' '), KeyCode::Char('w'), KeyCode::Char('W')],
        Action::Shoot => &[KeyCode::Char('f'), KeyCode::Char('F')],
        Action::Quit => &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')],
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self, action: Action) -> bool {
        self.drain_events();
        self.held(action, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::mpsc;

    /// Replays one set of active actions per sampling pass, then asks to quit.
    struct Scripted {
        passes: VecDeque<Vec<Action>>,
        current: Vec<Action>,
        polls: usize,
    }

    impl Scripted {
        fn new(passes: Vec<Vec<Action>>) -> Self {
            Self {
                passes: passes.into(),
                current: Vec::new(),
                polls: 0,
            }
        }
    }

    impl InputSource for Scripted {
        fn poll(&mut self, action: Action) -> bool {
            if self.polls % Action::ALL.len() == 0 {
                self.current = self.passes.pop_front().unwrap_or_else(|| vec![Action::Quit]);
            }
            self.polls += 1;
            self.current.contains(&action)
        }
    }

    fn fast() -> PollTiming {
        PollTiming {
            interval: Duration::from_millis(1),
            debounce: Duration::ZERO,
        }
    }

    #[test]
    fn publishes_actions_in_order_and_stops_on_quit() {
        let (tx, rx) = mpsc::channel();
        let stop = AtomicBool::new(false);
        let mut source = Scripted::new(vec![
            vec![Action::Right, Action::Jump],
            vec![],
            vec![Action::Shoot],
        ]);

        poll_loop(&mut source, &tx, &stop, fast());

        let got: Vec<Action> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![Action::Right, Action::Jump, Action::Shoot, Action::Quit]
        );
        assert!(stop.load(Ordering::Acquire));
    }

    #[test]
    fn exits_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let stop = AtomicBool::new(false);
        let mut source = Scripted::new(vec![vec![Action::Left]]);

        poll_loop(&mut source, &tx, &stop, fast());

        assert!(!stop.load(Ordering::Acquire));
    }

    #[test]
    fn raised_stop_flag_ends_thread() {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let source = Scripted::new(vec![vec![]; 10_000]);
        let handle = spawn_input_thread(source, tx, Arc::clone(&stop), fast());

        stop.store(true, Ordering::Release);
        handle.join().expect("input thread panicked");
        assert!(rx.try_iter().all(|a| a != Action::Quit));
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn key_is_held_within_window_and_released_on_release() {
        let mut kb = KeyboardInput::new(Duration::from_millis(150));
        let t0 = Instant::now();
        kb.record(press(KeyCode::Char('a')), t0);

        assert!(kb.held(Action::Left, t0 + Duration::from_millis(100)));
        assert!(!kb.held(Action::Left, t0 + Duration::from_millis(200)));
        assert!(!kb.held(Action::Right, t0));

        kb.record(
            KeyEvent::new_with_kind(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release),
            t0,
        );
        assert!(!kb.held(Action::Left, t0));
    }

    #[test]
    fn ctrl_c_requests_quit() {
        let mut kb = KeyboardInput::new(Duration::from_millis(150));
        let t0 = Instant::now();
        kb.record(
            KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press),
            t0,
        );
        assert!(kb.held(Action::Quit, t0 + Duration::from_secs(5)));
    }
}
