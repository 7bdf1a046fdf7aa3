/// Collision & scoring.  Pairs are tested in a fixed order every tick:
/// bullet x enemy, bullet x boss, player x enemy, player x booster,
/// player x life pickup.

use std::time::Duration;

use tracing::info;

use crate::audio::SoundEffect;
use crate::entities::{DelayedAction, Explosion, GameEvent, GameSession, GameStatus};

use super::boss;
use super::timers::{self, RESPAWN_DELAY};

pub const SCORE_ENEMY: u32 = 10;
pub const MAX_EXPLOSIONS: usize = 16;

/// Run the whole collision pass for one tick.
pub fn resolve(s: &mut GameSession, now: Duration) {
    bullets_vs_enemies(s);
    bullets_vs_boss(s, now);
    player_vs_enemies(s, now);
    player_vs_boosters(s);
    player_vs_life_pickups(s);
}

/// Add an explosion unless the cap is reached.  Existing explosions are
/// never evicted.
pub fn spawn_explosion(s: &mut GameSession, x: f32, y: f32) -> bool {
    if s.explosions.len() >= MAX_EXPLOSIONS {
        return false;
    }
    s.explosions.push(Explosion { x, y, radius: 5.0, alpha: 1.0 });
    s.events.push(GameEvent::Sound(SoundEffect::Explosion));
    true
}

/// Each bullet destroys at most one enemy and each enemy is destroyed at
/// most once.  Bullets are paired with enemies by maximum matching, so the
/// number of kills does not depend on the order of either list.
pub fn bullets_vs_enemies(s: &mut GameSession) {
    let overlaps: Vec<Vec<usize>> = s
        .bullets
        .iter()
        .map(|bullet| {
            let hb = bullet.bounds();
            s.enemies
                .iter()
                .enumerate()
                .filter(|(_, enemy)| hb.intersects(&enemy.bounds()))
                .map(|(ei, _)| ei)
                .collect()
        })
        .collect();

    let mut claimed_by: Vec<Option<usize>> = vec![None; s.enemies.len()];
    for bi in 0..overlaps.len() {
        let mut visited = vec![false; s.enemies.len()];
        claim_enemy(bi, &overlaps, &mut visited, &mut claimed_by);
    }

    let killed_enemies: Vec<bool> = claimed_by.iter().map(Option::is_some).collect();
    let mut used_bullets = vec![false; s.bullets.len()];
    for bi in claimed_by.iter().flatten() {
        used_bullets[*bi] = true;
    }

    let kills: Vec<(f32, f32)> = s
        .enemies
        .iter()
        .zip(&killed_enemies)
        .filter(|(_, &dead)| dead)
        .map(|(e, _)| e.bounds().center())
        .collect();
    if kills.is_empty() {
        return;
    }

    let mut bi = 0;
    s.bullets.retain(|_| {
        let keep = !used_bullets[bi];
        bi += 1;
        keep
    });
    let mut ei = 0;
    s.enemies.retain(|_| {
        let keep = !killed_enemies[ei];
        ei += 1;
        keep
    });

    s.score += SCORE_ENEMY * kills.len() as u32;
    for (x, y) in kills {
        spawn_explosion(s, x, y);
    }
}

/// Augmenting-path step: give bullet `bi` an enemy, re-seating earlier
/// bullets onto other enemies they overlap when needed.
fn claim_enemy(
    bi: usize,
    overlaps: &[Vec<usize>],
    visited: &mut [bool],
    claimed_by: &mut [Option<usize>],
) -> bool {
    for &ei in &overlaps[bi] {
        if visited[ei] {
            continue;
        }
        visited[ei] = true;
        let free = match claimed_by[ei] {
            None => true,
            Some(other) => claim_enemy(other, overlaps, visited, claimed_by),
        };
        if free {
            claimed_by[ei] = Some(bi);
            return true;
        }
    }
    false
}

/// Every bullet overlapping an active boss is consumed and deals one point
/// of damage.  Bullets after the killing blow pass through.
pub fn bullets_vs_boss(s: &mut GameSession, now: Duration) {
    if !s.boss.is_active() {
        return;
    }
    let hit_box = s.boss.bounds();
    let mut remaining = Vec::with_capacity(s.bullets.len());
    let mut impacts = Vec::new();

    for bullet in std::mem::take(&mut s.bullets) {
        if impacts.len() < s.boss.health.max(0) as usize && bullet.bounds().intersects(&hit_box) {
            impacts.push((bullet.x, bullet.y));
        } else {
            remaining.push(bullet);
        }
    }
    s.bullets = remaining;

    for (x, y) in impacts {
        spawn_explosion(s, x, y);
        boss::take_hit(s, now);
    }
}

/// At most one life-affecting hit per tick.  Every enemy touching the
/// player is removed; the first one in spawn order is the one that counts.
pub fn player_vs_enemies(s: &mut GameSession, now: Duration) {
    if !s.player.alive {
        return;
    }
    let pb = s.player.bounds();
    let mut rammed = Vec::new();
    s.enemies.retain(|e| {
        let b = e.bounds();
        if b.intersects(&pb) {
            rammed.push(b.center());
            false
        } else {
            true
        }
    });
    if rammed.is_empty() {
        return;
    }
    for (x, y) in rammed {
        spawn_explosion(s, x, y);
    }
    hit_player(s, now);
}

fn hit_player(s: &mut GameSession, now: Duration) {
    s.events.push(GameEvent::Sound(SoundEffect::PlayerHit));
    if s.player.power_up {
        s.player.power_up = false;
        return;
    }

    s.lives = s.lives.saturating_sub(1);
    s.player.alive = false;
    if s.lives == 0 {
        s.status = GameStatus::GameOver;
        s.events.push(GameEvent::MusicStopped);
        s.events.push(GameEvent::Sound(SoundEffect::GameOver));
        let report = s.progress_report(false);
        s.events.push(GameEvent::GameOver(report));
        info!(level = s.level, score = s.score, "game over");
    } else {
        timers::schedule(s, now, RESPAWN_DELAY, DelayedAction::RespawnPlayer);
    }
}

pub fn player_vs_boosters(s: &mut GameSession) {
    if !s.player.alive {
        return;
    }
    let pb = s.player.bounds();
    let before = s.boosters.len();
    s.boosters.retain(|b| !b.bounds().intersects(&pb));
    if s.boosters.len() < before {
        s.player.power_up = true;
        s.events.push(GameEvent::Sound(SoundEffect::PowerUp));
    }
}

pub fn player_vs_life_pickups(s: &mut GameSession) {
    if !s.player.alive {
        return;
    }
    let pb = s.player.bounds();
    let before = s.life_pickups.len();
    s.life_pickups.retain(|lp| !lp.bounds().intersects(&pb));
    let collected = before - s.life_pickups.len();
    for _ in 0..collected {
        s.lives += 1;
        s.events.push(GameEvent::Sound(SoundEffect::ExtraLife));
    }
}
