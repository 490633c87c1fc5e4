/// Game logic.
///
/// The public transitions (`init_state`, the input-driven moves and `tick`)
/// take an immutable `GameState` and return a brand-new one.  The per-entity
/// steps they are built from mutate a working copy in place and are public
/// so each rule can be exercised on its own.

use crate::config::Rules;
use crate::entities::{
    Collectible, CollisionCache, Coords, Enemy, Facing, Fireball, GameState, GameStatus, Ground,
    Player, PowerState,
};
use crate::level::Level;

/// Upward velocity given by a jump or a stomp.
pub const JUMP_VELOCITY: i32 = -3;

/// How far an enemy shoves a powered-up player.
pub const KNOCKBACK: i32 = 4;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial game state from a level layout.
pub fn init_state(level: &Level, rules: Rules) -> GameState {
    let ground = Ground::new(level.ground_width, level.ground_anchor);
    let coins: Vec<Collectible> = level.coins.iter().map(|&p| Collectible::coin(p)).collect();
    let powerups: Vec<Collectible> = level.powerups.iter().map(|&p| Collectible::powerup(p)).collect();
    let bricks: Vec<Collectible> = level.bricks.iter().map(|&p| Collectible::brick(p)).collect();
    let enemies: Vec<Enemy> = level.enemies.iter().map(|&p| Enemy::new(p)).collect();

    let cache = CollisionCache {
        ground: ground.collision_coords(),
        powerups: powerups.iter().map(|p| p.pos).collect(),
        bricks: bricks.iter().map(|b| b.pos).collect(),
    };

    GameState {
        player: Player::new(level.player_start),
        ground,
        coins,
        powerups,
        bricks,
        enemies,
        fireballs: Vec::new(),
        cache,
        rules,
        status: GameStatus::Playing,
        frame: 0,
        vacated: Vec::new(),
        last_fireball: None,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn move_player_left(state: &GameState) -> GameState {
    let mut next = state.clone();
    move_by(&mut next.player, -1);
    next
}

pub fn move_player_right(state: &GameState) -> GameState {
    let mut next = state.clone();
    move_by(&mut next.player, 1);
    next
}

pub fn player_jump(state: &GameState) -> GameState {
    let mut next = state.clone();
    jump(&mut next.player);
    next
}

/// Shoot a fireball if the player is fire-capable and off cooldown.
pub fn player_shoot(state: &GameState) -> GameState {
    let mut next = state.clone();
    shoot(&mut next);
    next
}

pub fn quit(state: &GameState) -> GameState {
    GameState {
        status: GameStatus::Quit,
        ..state.clone()
    }
}

// ── Player motion ────────────────────────────────────────────────────────────

/// Accelerate downward by one, never past a fall speed of 1.
pub fn apply_gravity(player: &mut Player) {
    if !player.grounded && player.velocity_y < 1 {
        player.velocity_y += 1;
    }
}

/// Only works from the ground, so there is no double jump.
pub fn jump(player: &mut Player) {
    if player.grounded {
        player.velocity_y = JUMP_VELOCITY;
        player.grounded = false;
    }
}

/// Shift horizontally.  There is a wall at x = 0 and none on the right.
pub fn move_by(player: &mut Player, dx: i32) {
    if dx < 0 {
        player.facing = Facing::Left;
    } else if dx > 0 {
        player.facing = Facing::Right;
    }
    player.pos = Coords::new((player.pos.x + dx).max(0), player.pos.y);
}

pub fn shoot(state: &mut GameState) {
    let player = &mut state.player;
    if player.power != PowerState::Fire || player.fire_cooldown > 0 {
        return;
    }
    let direction = player.facing.sign();
    let spawned_frame = state.rules.fireball_lifetime_ticks.map(|_| state.frame);
    let fireball = Fireball::new(player.pos.offset(direction, 0), direction, spawned_frame);
    log::debug!("fireball spawned at {:?} heading {}", fireball.pos, direction);
    state.fireballs.push(fireball);
    player.fire_cooldown = state.rules.fire_cooldown_ticks;
}

// ── Vertical collision ───────────────────────────────────────────────────────

/// Move the player by its vertical velocity, resolving powerup, brick and
/// ground contact in that priority order.  Only the first matching category
/// is evaluated.
///
/// A dead player ends the game here, before anything else is touched.
pub fn update_position(state: &mut GameState) -> GameStatus {
    let GameState {
        player,
        ground,
        powerups,
        bricks,
        cache,
        ..
    } = state;

    if player.power == PowerState::Dead {
        return GameStatus::GameOver;
    }

    let target = Coords::new(player.pos.x, player.pos.y + player.velocity_y);
    let mut next_y = target.y;

    if cache.powerups.contains(&target) {
        for (id, _) in cache.powerups.iter().enumerate().filter(|(_, c)| **c == target) {
            next_y = player.pos.y + 1;
            player.velocity_y = 0;
            let Some(powerup) = powerups.get_mut(id) else { continue };
            if !powerup.flags.hidden && player.power < PowerState::Fire {
                player.power = player.power.promote();
                log::debug!("powerup at {:?} raised power to {:?}", powerup.pos, player.power);
            }
            powerup.flags.hidden = true;
        }
    } else if cache.bricks.contains(&target) {
        for (id, _) in cache.bricks.iter().enumerate().filter(|(_, c)| **c == target) {
            let Some(brick) = bricks.get_mut(id) else { continue };
            if !brick.flags.broken {
                next_y = player.pos.y + 1;
                player.velocity_y = 0;
            }
            if player.power >= PowerState::Super {
                if !brick.flags.broken {
                    log::debug!("brick at {:?} broken", brick.pos);
                }
                brick.flags.hidden = true;
                brick.flags.broken = true;
            }
        }
    } else if cache.ground.contains(&target) {
        next_y = ground.anchor.y - 1;
        player.velocity_y = 0;
        player.grounded = true;
    } else {
        player.grounded = false;
    }

    player.pos = Coords::new(player.pos.x, next_y);
    GameStatus::Playing
}

// ── Pickups and enemy contact ────────────────────────────────────────────────

pub fn coin_check(state: &mut GameState) {
    let player = &mut state.player;
    for coin in state.coins.iter_mut() {
        if coin.pos == player.pos && !coin.flags.hidden {
            coin.flags.hidden = true;
            player.coins_collected += 1;
        }
    }
}

/// Stomp and side contact are independent checks: both may fire in one pass
/// (against different enemies), and neither suppresses the other.
pub fn enemy_check(state: &mut GameState) {
    let player = &mut state.player;
    for enemy in state.enemies.iter_mut() {
        if player.pos == enemy.secondary_pos && !enemy.flags.killed {
            enemy.flags.killed = true;
            enemy.flags.hidden = true;
            player.velocity_y = JUMP_VELOCITY;
            player.grounded = false;
            state.vacated.push(enemy.pos);
            log::debug!("enemy at {:?} stomped", enemy.pos);
        }

        if player.pos == enemy.pos && !enemy.flags.killed {
            if player.power > PowerState::Normal {
                let x = (player.pos.x - KNOCKBACK * player.facing.sign()).max(0);
                player.pos = Coords::new(x, player.pos.y);
            }
            player.power = player.power.demote();
            log::debug!("enemy contact at {:?}, power now {:?}", enemy.pos, player.power);
        }
    }
}

// ── Enemy AI ─────────────────────────────────────────────────────────────────

/// Step one cell toward the player along x.  Enemies never fall or jump.
pub fn move_towards_player(enemy: &mut Enemy, player_pos: Coords) {
    if enemy.flags.killed {
        return;
    }
    let dx = (player_pos.x - enemy.pos.x).signum();
    enemy.previous_pos = enemy.pos;
    enemy.pos = enemy.pos.offset(dx, 0);
    enemy.secondary_pos = enemy.pos.above();
    enemy.flanks = [enemy.pos.left(), enemy.pos.right()];
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Advance one cell.  Returns `true` when the fireball has left the ground
/// span `[0, ground_width)`.
pub fn next_pos(fireball: &mut Fireball, ground_width: i32) -> bool {
    fireball.old_pos = Some(fireball.pos);
    fireball.pos = fireball.pos.offset(fireball.direction, 0);
    fireball.pos.x < 0 || fireball.pos.x >= ground_width
}

fn expired(fireball: &Fireball, frame: u64, lifetime: Option<u64>) -> bool {
    match (lifetime, fireball.spawned_frame) {
        (Some(lifetime), Some(spawned)) => frame.saturating_sub(spawned) >= lifetime,
        _ => false,
    }
}

fn capture_coin(fireball: &Fireball, state: &mut GameState) -> bool {
    let Some(coin) = state
        .coins
        .iter_mut()
        .find(|c| c.pos == fireball.pos && !c.flags.hidden)
    else {
        return false;
    };
    coin.flags.hidden = true;
    state.player.coins_collected += 1;
    true
}

/// Body hit first, then flanks; the first unkilled match dies.
fn strike_enemy(fireball: &Fireball, state: &mut GameState) -> bool {
    let index = state
        .enemies
        .iter()
        .position(|e| !e.flags.killed && e.pos == fireball.pos)
        .or_else(|| {
            state
                .enemies
                .iter()
                .position(|e| !e.flags.killed && e.flanks.contains(&fireball.pos))
        });
    let Some(index) = index else {
        return false;
    };

    let enemy = &mut state.enemies[index];
    enemy.flags.killed = true;
    enemy.flags.hidden = true;
    state.vacated.push(enemy.pos);
    state.vacated.push(enemy.flanks[0]);
    log::debug!("fireball killed enemy at {:?}", enemy.pos);
    true
}

/// Advance every fireball and retire the ones that left the ground span,
/// burned out, captured a coin or struck an enemy.
pub fn update_fireballs(state: &mut GameState) {
    let ground_width = state.ground.width;
    let frame = state.frame;
    let lifetime = state.rules.fireball_lifetime_ticks;

    let mut active = Vec::with_capacity(state.fireballs.len());
    for mut fireball in std::mem::take(&mut state.fireballs) {
        let out_of_bounds = next_pos(&mut fireball, ground_width);
        let spent = out_of_bounds
            || expired(&fireball, frame, lifetime)
            || capture_coin(&fireball, state)
            || strike_enemy(&fireball, state);

        if spent {
            if let Some(old) = fireball.old_pos {
                state.vacated.push(old);
            }
            log::debug!("fireball removed at {:?}", fireball.pos);
        } else {
            state.last_fireball = Some(fireball.pos);
            active.push(fireball);
        }
    }
    state.fireballs = active;
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance the simulation by one tick.
///
/// Order: coin pickup, gravity, vertical collision (may end the game),
/// fireballs, enemy contact, enemy AI.  A state that is no longer `Playing`
/// is returned unchanged.
pub fn tick(state: &GameState) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    let mut next = state.clone();
    next.frame += 1;
    next.vacated.clear();
    next.player.fire_cooldown = next.player.fire_cooldown.saturating_sub(1);

    coin_check(&mut next);
    apply_gravity(&mut next.player);

    if update_position(&mut next) == GameStatus::GameOver {
        log::info!("game over on frame {}", next.frame);
        next.status = GameStatus::GameOver;
        return next;
    }

    update_fireballs(&mut next);
    enemy_check(&mut next);

    let target = next.player.pos;
    for enemy in next.enemies.iter_mut() {
        move_towards_player(enemy, target);
    }

    next
}
