/// Boss encounter: Dormant -> Active -> Defeated, once per level attempt.

use std::time::Duration;

use tracing::{debug, info};

use crate::audio::SoundEffect;
use crate::entities::{
    Boss, BossPhase, DelayedAction, GameEvent, GameSession, BOSS_BASE_SIZE, BOSS_MIN_SIZE,
};
use crate::levels::level_config;

use super::timers::{self, LEVEL_COMPLETE_DELAY};

pub const SCORE_BOSS: u32 = 100;

/// Dormant boss for the session's current level.
pub fn dormant_for_level(level: u8) -> Boss {
    Boss::dormant(level_config(level).boss_health)
}

/// Bring the boss in once the level timer reaches the threshold.  Only a
/// dormant boss can activate, so a defeated one never returns.
pub fn check_activation(s: &mut GameSession) -> bool {
    let cfg = level_config(s.level);
    if s.boss.phase != BossPhase::Dormant
        || s.level_elapsed < Duration::from_secs(cfg.boss_time_secs)
    {
        return false;
    }
    s.boss = Boss { phase: BossPhase::Active, ..dormant_for_level(s.level) };
    s.last_minion_spawn_frame = s.frame;
    s.events.push(GameEvent::BossSpawned { health: s.boss.health });
    debug!(level = s.level, health = s.boss.health, "boss active");
    true
}

/// Shrink the boss with its remaining health, keeping it centred.
pub fn refresh_size(boss: &mut Boss) {
    if !boss.is_active() {
        return;
    }
    boss.size = (boss.health_fraction() * BOSS_BASE_SIZE).max(BOSS_MIN_SIZE);
}

/// One bullet connected.  Returns true if this hit defeated the boss.
pub fn take_hit(s: &mut GameSession, now: Duration) -> bool {
    if !s.boss.is_active() {
        return false;
    }
    s.boss.health -= 1;
    if s.boss.health > 0 {
        s.events.push(GameEvent::Sound(SoundEffect::BossHit));
        return false;
    }

    s.boss.phase = BossPhase::Defeated;
    s.score += SCORE_BOSS;
    s.events.push(GameEvent::BossDefeated);
    s.events.push(GameEvent::MusicStopped);
    s.events.push(GameEvent::Sound(SoundEffect::BossDeath));
    timers::schedule(s, now, LEVEL_COMPLETE_DELAY, DelayedAction::CompleteLevel);
    info!(level = s.level, score = s.score, "boss defeated");
    true
}
