/// Timing and rule configuration.
///
/// Mirrors the named-constant style of the rest of the crate; `GameConfig`
/// bundles them so the loop driver and input thread can be tuned in tests.

use std::time::Duration;

/// Fixed simulation period (≈10 ticks per second).
pub const TICK: Duration = Duration::from_millis(100);

/// How often the input thread samples every action.
pub const INPUT_POLL: Duration = Duration::from_millis(50);

/// Pause after publishing an action, so one press does not become a burst.
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(25);

/// A key counts as held if its last press/repeat arrived within this window.
/// Covers terminals that never emit release events.
pub const KEY_HOLD_WINDOW: Duration = Duration::from_millis(150);

/// Ticks between two fireballs.
pub const FIRE_COOLDOWN_TICKS: u32 = 2;

/// Fireballs burn out after this long even if they hit nothing.
pub const FIREBALL_LIFETIME: Duration = Duration::from_secs(3);

/// Overrides the tick period in milliseconds.
pub const TICK_ENV_VAR: &str = "GRID_PLATFORMER_TICK_MS";

/// Per-game rules carried inside the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    pub fire_cooldown_ticks: u32,
    /// `None` disables lifetime expiry; fireballs then live until they hit
    /// something or leave the ground span.
    pub fireball_lifetime_ticks: Option<u64>,
}

impl Rules {
    pub fn for_tick(tick: Duration) -> Self {
        let tick_ms = tick.as_millis().max(1);
        Self {
            fire_cooldown_ticks: FIRE_COOLDOWN_TICKS,
            fireball_lifetime_ticks: Some((FIREBALL_LIFETIME.as_millis() / tick_ms) as u64),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::for_tick(TICK)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub tick: Duration,
    pub input_poll: Duration,
    pub input_debounce: Duration,
    pub key_hold_window: Duration,
    pub rules: Rules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick: TICK,
            input_poll: INPUT_POLL,
            input_debounce: INPUT_DEBOUNCE,
            key_hold_window: KEY_HOLD_WINDOW,
            rules: Rules::default(),
        }
    }
}

impl GameConfig {
    /// Defaults, with the tick period optionally taken from the environment.
    pub fn from_env() -> Self {
        match std::env::var(TICK_ENV_VAR) {
            Ok(raw) => Self::with_tick_override(&raw),
            Err(_) => Self::default(),
        }
    }

    fn with_tick_override(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => {
                let tick = Duration::from_millis(ms);
                Self {
                    tick,
                    rules: Rules::for_tick(tick),
                    ..Self::default()
                }
            }
            _ => {
                log::warn!("ignoring {}={:?}: expected a positive integer", TICK_ENV_VAR, raw);
                Self::default()
            }
        }
    }
}
