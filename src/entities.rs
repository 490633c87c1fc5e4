/// All game entity types — plain data plus the constructors that derive
/// positions.  Behaviour lives in `compute`, drawing in `display`.

use crate::config::Rules;

// ── Grid coordinates ─────────────────────────────────────────────────────────

/// A grid cell.  x grows to the right, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The cell directly above (used for stomps and under-side hits).
    pub const fn above(self) -> Self {
        self.offset(0, -1)
    }

    pub const fn left(self) -> Self {
        self.offset(-1, 0)
    }

    pub const fn right(self) -> Self {
        self.offset(1, 0)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// +1 for right, -1 for left.
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Player upgrade level; doubles as health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PowerState {
    Dead,
    Normal,
    Super,
    Fire,
}

impl PowerState {
    pub fn level(self) -> i8 {
        match self {
            PowerState::Dead => -1,
            PowerState::Normal => 0,
            PowerState::Super => 1,
            PowerState::Fire => 2,
        }
    }

    /// One step up, saturating at `Fire`.
    pub fn promote(self) -> Self {
        match self {
            PowerState::Dead => PowerState::Normal,
            PowerState::Normal => PowerState::Super,
            PowerState::Super | PowerState::Fire => PowerState::Fire,
        }
    }

    /// One step down, saturating at `Dead`.
    pub fn demote(self) -> Self {
        match self {
            PowerState::Fire => PowerState::Super,
            PowerState::Super => PowerState::Normal,
            PowerState::Normal | PowerState::Dead => PowerState::Dead,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectibleKind {
    Coin,
    Powerup,
    Brick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
    Quit,
}

// ── Terrain ──────────────────────────────────────────────────────────────────

/// An immovable horizontal run of solid cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ground {
    pub width: i32,
    pub anchor: Coords,
}

impl Ground {
    pub fn new(width: i32, anchor: Coords) -> Self {
        Self {
            width: width.max(0),
            anchor,
        }
    }

    /// Every occupied cell, left to right.
    pub fn collision_coords(&self) -> Vec<Coords> {
        (0..self.width).map(|dx| self.anchor.offset(dx, 0)).collect()
    }
}

// ── Soft-deletion flags ──────────────────────────────────────────────────────

/// Entities are never removed from their collection; these flags retire them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityFlags {
    pub hidden: bool,
    pub broken: bool,
    /// Set once the renderer has blanked a broken brick.
    pub updated: bool,
    pub killed: bool,
}

// ── Coins, powerup blocks, bricks ────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub pos: Coords,
    pub secondary_pos: Coords,
    pub flags: EntityFlags,
}

impl Collectible {
    pub fn new(kind: CollectibleKind, pos: Coords) -> Self {
        Self {
            kind,
            pos,
            secondary_pos: pos.above(),
            flags: EntityFlags::default(),
        }
    }

    pub fn coin(pos: Coords) -> Self {
        Self::new(CollectibleKind::Coin, pos)
    }

    pub fn powerup(pos: Coords) -> Self {
        Self::new(CollectibleKind::Powerup, pos)
    }

    pub fn brick(pos: Coords) -> Self {
        Self::new(CollectibleKind::Brick, pos)
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub pos: Coords,
    pub secondary_pos: Coords,
    /// Cells immediately left and right, in that order.
    pub flanks: [Coords; 2],
    /// Where the enemy stood before its last step (for trail clearing).
    pub previous_pos: Coords,
    pub flags: EntityFlags,
}

impl Enemy {
    pub fn new(pos: Coords) -> Self {
        Self {
            pos,
            secondary_pos: pos.above(),
            flanks: [pos.left(), pos.right()],
            previous_pos: pos,
            flags: EntityFlags::default(),
        }
    }
}

// ── Projectile ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fireball {
    pub pos: Coords,
    pub old_pos: Option<Coords>,
    /// +1 travels right, -1 travels left.
    pub direction: i32,
    /// Frame the fireball was shot on, when lifetime expiry is enabled.
    pub spawned_frame: Option<u64>,
}

impl Fireball {
    pub fn new(pos: Coords, direction: i32, spawned_frame: Option<u64>) -> Self {
        Self {
            pos,
            old_pos: None,
            direction,
            spawned_frame,
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Coords,
    pub velocity_y: i32,
    pub grounded: bool,
    pub facing: Facing,
    pub power: PowerState,
    /// Ticks left before the next fireball may be shot.
    pub fire_cooldown: u32,
    pub coins_collected: u32,
}

impl Player {
    pub fn new(pos: Coords) -> Self {
        Self {
            pos,
            velocity_y: 0,
            grounded: false,
            facing: Facing::Right,
            power: PowerState::Normal,
            fire_cooldown: 0,
            coins_collected: 0,
        }
    }
}

// ── Collision lookup ─────────────────────────────────────────────────────────

/// Block positions captured once when the level is built.  Indices line up
/// with `GameState::powerups` / `GameState::bricks`.
///
/// Never re-synced: only flags change after placement.  Anything that moves
/// a powerup or brick later must rebuild this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionCache {
    pub ground: Vec<Coords>,
    pub powerups: Vec<Coords>,
    pub bricks: Vec<Coords>,
}

// ── Master game state ────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can return a
/// new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub ground: Ground,
    pub coins: Vec<Collectible>,
    pub powerups: Vec<Collectible>,
    pub bricks: Vec<Collectible>,
    pub enemies: Vec<Enemy>,
    /// The only collection that grows and shrinks during play.
    pub fireballs: Vec<Fireball>,
    pub cache: CollisionCache,
    pub rules: Rules,
    pub status: GameStatus,
    pub frame: u64,
    /// Cells emptied this tick by removed fireballs and killed enemies.
    pub vacated: Vec<Coords>,
    /// Cell of the most recently drawn fireball, for the HUD.
    pub last_fireball: Option<Coords>,
}
