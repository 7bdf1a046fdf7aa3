/// Spawner: interval- and chance-based creation of enemies, pickups and
/// boss minions.  All randomness comes through the injected `Rng`.

use rand::Rng;
use tracing::trace;

use crate::entities::{
    Enemy, GameSession, Heading, Pickup, BOOSTER_SIZE, BOOSTER_SPEED, CANVAS_W, ENEMY_SIZE,
    LIFE_PICKUP_SIZE, LIFE_PICKUP_SPEED,
};
use crate::levels::level_config;

/// Per-tick chance of a shield booster appearing.
pub const BOOSTER_CHANCE: f64 = 0.005;
/// Per-tick chance of an extra-life heart appearing.
pub const LIFE_PICKUP_CHANCE: f64 = 0.0008;
/// Boss minions may exceed the level's enemy cap by this many.
pub const MINION_OVERFLOW: usize = 2;

fn random_enemy(x: f32, y: f32, speed: f32, rng: &mut impl Rng) -> Enemy {
    Enemy {
        x,
        y,
        size: ENEMY_SIZE,
        speed,
        zigzag: rng.gen::<f32>() * 1.5 + 0.8,
        heading: if rng.gen_bool(0.5) { Heading::Right } else { Heading::Left },
    }
}

/// Regular enemy at the top edge, gated by the level's concurrency cap and
/// spawn interval.
pub fn spawn_enemy(s: &mut GameSession, rng: &mut impl Rng) -> bool {
    let cfg = level_config(s.level);
    let interval_ok = s.frame.saturating_sub(s.last_enemy_spawn_frame) >= cfg.spawn_interval_frames;
    if s.enemies.len() >= cfg.max_enemies || !interval_ok {
        return false;
    }
    s.last_enemy_spawn_frame = s.frame;
    let x = rng.gen::<f32>() * (CANVAS_W - ENEMY_SIZE);
    s.enemies.push(random_enemy(x, 0.0, cfg.enemy_speed, rng));
    trace!(frame = s.frame, x, "enemy spawned");
    true
}

pub fn spawn_booster(s: &mut GameSession, rng: &mut impl Rng) -> bool {
    if !rng.gen_bool(BOOSTER_CHANCE) {
        return false;
    }
    s.boosters.push(Pickup {
        x: rng.gen::<f32>() * (CANVAS_W - BOOSTER_SIZE),
        y: 0.0,
        size: BOOSTER_SIZE,
        speed: BOOSTER_SPEED,
    });
    true
}

/// Extra-life heart.  Never spawns while paused or while the player is
/// waiting to respawn; the draw is skipped entirely in those cases.
pub fn spawn_life_pickup(s: &mut GameSession, rng: &mut impl Rng) -> bool {
    if s.paused || !s.player.alive {
        return false;
    }
    if !rng.gen_bool(LIFE_PICKUP_CHANCE) {
        return false;
    }
    s.life_pickups.push(Pickup {
        x: rng.gen::<f32>() * (CANVAS_W - LIFE_PICKUP_SIZE),
        y: 0.0,
        size: LIFE_PICKUP_SIZE,
        speed: LIFE_PICKUP_SPEED,
    });
    true
}

/// Enemy dropped from under an active boss on its own interval.
pub fn spawn_minion(s: &mut GameSession, rng: &mut impl Rng) -> bool {
    let cfg = level_config(s.level);
    if !s.boss.is_active() || s.enemies.len() >= cfg.max_enemies + MINION_OVERFLOW {
        return false;
    }
    if s.frame.saturating_sub(s.last_minion_spawn_frame) < cfg.minion_interval_frames {
        return false;
    }
    s.last_minion_spawn_frame = s.frame;

    let pad = 10.0;
    let spawn_w = (s.boss.size - 20.0).max(20.0);
    let x = s.boss.x() + pad + rng.gen::<f32>() * (spawn_w - 20.0);
    let y = s.boss.y() + s.boss.size;
    s.enemies.push(random_enemy(x, y, cfg.enemy_speed, rng));
    trace!(frame = s.frame, x, y, "boss minion spawned");
    true
}
