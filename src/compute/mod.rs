/// Pure game-logic entry points.
///
/// Every public function here takes an immutable reference to the current
/// `GameSession` (plus input, timing and, where needed, an RNG handle) and
/// returns a brand-new `GameSession`.  The subsystem modules work in place
/// on that fresh copy.  Side effects are limited to the injected RNG; sound,
/// music and persistence requests are emitted as `GameEvent`s.

pub mod boss;
pub mod collision;
pub mod physics;
pub mod spawn;
pub mod timers;

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::entities::{
    FrameTime, GameSession, GameStatus, HeldInput, Player, LIVES_START,
};
use crate::levels::clamp_level;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial session for `level` (clamped to `1..=5`).
pub fn new_session(level: u8) -> GameSession {
    let level = clamp_level(level);
    GameSession {
        player: Player::at_spawn(),
        bullets: Vec::new(),
        enemies: Vec::new(),
        boosters: Vec::new(),
        life_pickups: Vec::new(),
        boss: boss::dormant_for_level(level),
        explosions: Vec::new(),
        score: 0,
        lives: LIVES_START,
        level,
        status: GameStatus::Playing,
        paused: false,
        frame: 0,
        last_enemy_spawn_frame: 0,
        last_minion_spawn_frame: 0,
        level_elapsed: Duration::ZERO,
        last_shot_at: None,
        attempt: 0,
        timers: Vec::new(),
        events: Vec::new(),
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame:
/// movement & fire, spawner, boss activation, minions, motion, collisions.
///
/// A paused session, or one showing an end-of-level / game-over overlay,
/// is returned unchanged.
pub fn tick(
    state: &GameSession,
    input: &HeldInput,
    time: FrameTime,
    rng: &mut impl Rng,
) -> GameSession {
    if !state.is_running() {
        return state.clone();
    }
    let mut next = state.clone();
    next.frame += 1;
    next.level_elapsed += time.dt;

    physics::apply_movement(&mut next, input);
    if input.fire {
        physics::try_fire(&mut next, time.now);
    }

    spawn::spawn_enemy(&mut next, rng);
    spawn::spawn_booster(&mut next, rng);
    spawn::spawn_life_pickup(&mut next, rng);

    boss::check_activation(&mut next);
    spawn::spawn_minion(&mut next, rng);
    boss::refresh_size(&mut next.boss);

    physics::advance_entities(&mut next);
    collision::resolve(&mut next, time.now);

    next
}

/// Fire any delayed callbacks that are due at `now`.  Runs regardless of
/// pause, like any wall-clock timer.
pub fn run_timers(state: &GameSession, now: Duration) -> GameSession {
    if state.timers.iter().all(|t| t.due > now) {
        return state.clone();
    }
    let mut next = state.clone();
    timers::fire_due(&mut next, now);
    next
}

// ── Session transitions ──────────────────────────────────────────────────────

/// Pause or resume.  Only meaningful while playing.
pub fn toggle_pause(state: &GameSession) -> GameSession {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    GameSession {
        paused: !state.paused,
        ..state.clone()
    }
}

/// "Play again": same level, score and lives back to their starting values.
/// Timers from the previous attempt stay queued but can no longer fire.
pub fn restart_level(state: &GameSession) -> GameSession {
    let mut next = new_session(state.level);
    next.attempt = state.attempt + 1;
    next.timers = state.timers.clone();
    debug!(level = next.level, attempt = next.attempt, "level restarted");
    next
}

/// Move on after a cleared level.  Score, lives, pickups and the frame
/// counter carry over; the boss, enemies, bullets, explosions and the level
/// timer start fresh.  Does nothing unless the level was just cleared.
pub fn start_next_level(state: &GameSession) -> GameSession {
    let GameStatus::LevelCleared { next_level } = state.status else {
        return state.clone();
    };
    let mut next = state.clone();
    next.level = clamp_level(next_level);
    next.status = GameStatus::Playing;
    next.paused = false;
    next.attempt = state.attempt + 1;
    next.bullets.clear();
    next.enemies.clear();
    next.explosions.clear();
    next.boss = boss::dormant_for_level(next.level);
    next.last_minion_spawn_frame = 0;
    next.last_enemy_spawn_frame = next.frame;
    next.level_elapsed = Duration::ZERO;
    // A respawn pending from the previous level was invalidated above.
    if !next.player.alive {
        next.player = Player::at_spawn();
    }
    debug!(level = next.level, attempt = next.attempt, "next level");
    next
}
