/// Update step: held-input movement, the fire gate, and per-tick motion of
/// every moving entity.

use std::time::Duration;

use crate::audio::SoundEffect;
use crate::entities::{
    Bullet, GameEvent, GameSession, HeldInput, BULLET_SIZE, BULLET_SPEED, CANVAS_H, CANVAS_W,
};

/// Player displacement per tick while a direction is held.
pub const MOVE_PER_TICK: f32 = 5.0;
/// Wall-clock gap required between two shots.
pub const FIRE_COOLDOWN: Duration = Duration::from_millis(180);
pub const MAX_BULLETS: usize = 48;

const EXPLOSION_GROWTH: f32 = 2.0;
const EXPLOSION_FADE: f32 = 0.05;

/// Move the player by the held directions, clamped to the playfield.
/// A dead (respawning) player does not move.
pub fn apply_movement(s: &mut GameSession, input: &HeldInput) {
    let p = &mut s.player;
    if !p.alive {
        return;
    }
    if input.left {
        p.x = (p.x - MOVE_PER_TICK).max(0.0);
    }
    if input.right {
        p.x = (p.x + MOVE_PER_TICK).min(CANVAS_W - p.size);
    }
    if input.up {
        p.y = (p.y - MOVE_PER_TICK).max(0.0);
    }
    if input.down {
        p.y = (p.y + MOVE_PER_TICK).min(CANVAS_H - p.size);
    }
}

/// Fire from the player's nose if the cooldown has elapsed at `now`.
/// A shielded player fires three bullets side by side.
///
/// `now` must come from a monotonic clock; the gate is independent of the
/// frame rate.
pub fn try_fire(s: &mut GameSession, now: Duration) -> bool {
    if !s.player.alive || s.bullets.len() >= MAX_BULLETS {
        return false;
    }
    if let Some(last) = s.last_shot_at {
        if now.saturating_sub(last) < FIRE_COOLDOWN {
            return false;
        }
    }
    s.last_shot_at = Some(now);

    let p = &s.player;
    if p.power_up {
        for offset in [0.0, 10.0, 20.0] {
            s.bullets.push(Bullet { x: p.x + offset, y: p.y, speed: BULLET_SPEED });
        }
        s.events.push(GameEvent::Sound(SoundEffect::ShootTriple));
    } else {
        s.bullets.push(Bullet {
            x: p.x + p.size / 2.0 - BULLET_SIZE / 2.0,
            y: p.y,
            speed: BULLET_SPEED,
        });
        s.events.push(GameEvent::Sound(SoundEffect::Shoot));
    }
    true
}

/// Advance bullets, enemies, pickups and explosions by one tick and drop
/// whatever has left the playfield or faded out.
pub fn advance_entities(s: &mut GameSession) {
    for b in &mut s.bullets {
        b.y -= b.speed;
    }
    s.bullets.retain(|b| b.y > 0.0);

    for e in &mut s.enemies {
        e.y += e.speed;
        e.x += e.zigzag * e.heading.sign();
        if e.x <= 0.0 || e.x >= CANVAS_W - e.size {
            e.heading = e.heading.reversed();
        }
    }
    s.enemies.retain(|e| e.y < CANVAS_H);

    for p in s.boosters.iter_mut().chain(s.life_pickups.iter_mut()) {
        p.y += p.speed;
    }
    s.boosters.retain(|p| p.y < CANVAS_H);
    s.life_pickups.retain(|p| p.y < CANVAS_H);

    for ex in &mut s.explosions {
        ex.radius += EXPLOSION_GROWTH;
        ex.alpha -= EXPLOSION_FADE;
    }
    s.explosions.retain(|ex| ex.alpha > 0.0);
}
