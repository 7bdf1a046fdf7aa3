/// All game entity types: pure data, no logic beyond geometry helpers.
///
/// Positions live in a fixed 600 x 400 logical playfield.  The terminal
/// front-end scales them to whatever size the window happens to be.

use std::time::Duration;

use crate::audio::SoundEffect;
use crate::profile::ProgressReport;

// ── Playfield & entity constants ─────────────────────────────────────────────

pub const CANVAS_W: f32 = 600.0;
pub const CANVAS_H: f32 = 400.0;

pub const PLAYER_SIZE: f32 = 20.0;
pub const BULLET_SIZE: f32 = 5.0;
pub const BULLET_SPEED: f32 = 7.0;
pub const ENEMY_SIZE: f32 = 20.0;
pub const BOOSTER_SIZE: f32 = 15.0;
pub const BOOSTER_SPEED: f32 = 2.0;
pub const LIFE_PICKUP_SIZE: f32 = 18.0;
pub const LIFE_PICKUP_SPEED: f32 = 1.8;

pub const BOSS_BASE_SIZE: f32 = 80.0;
pub const BOSS_MIN_SIZE: f32 = 16.0;
pub const BOSS_CENTER_X: f32 = CANVAS_W / 2.0;
pub const BOSS_CENTER_Y: f32 = 30.0 + BOSS_BASE_SIZE / 2.0;

pub const LIVES_START: u32 = 3;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Axis-aligned square hit box: top-left corner plus edge length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Bounds {
    /// Strict overlap test: touching edges do not collide.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.size
            && self.x + self.size > other.x
            && self.y < other.y + other.size
            && self.y + self.size > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }
}

// ── Player & projectiles ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alive: bool,
    /// Shield + triple shot.  Absorbs exactly one hit.
    pub power_up: bool,
}

impl Player {
    /// Fresh player parked at the bottom-centre spawn point.
    pub fn at_spawn() -> Self {
        Player {
            x: CANVAS_W / 2.0 - PLAYER_SIZE / 2.0,
            y: CANVAS_H - PLAYER_SIZE - 10.0,
            size: PLAYER_SIZE,
            alive: true,
            power_up: false,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, size: self.size }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl Bullet {
    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, size: BULLET_SIZE }
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Horizontal drift direction of a zig-zagging enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    pub fn sign(self) -> f32 {
        match self {
            Heading::Left => -1.0,
            Heading::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Heading {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    /// Horizontal distance covered per tick.
    pub zigzag: f32,
    pub heading: Heading,
}

impl Enemy {
    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, size: self.size }
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    /// Not yet spawned this level.
    Dormant,
    /// On screen, takes hits and spawns minions.
    Active,
    /// Health ran out.  Terminal for the level.
    Defeated,
}

/// The level boss.  Its hit box is derived from a fixed centre and a size
/// that shrinks with the remaining health fraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub center_x: f32,
    pub center_y: f32,
    pub size: f32,
    pub health: i32,
    pub max_health: i32,
    pub phase: BossPhase,
}

impl Boss {
    pub fn dormant(max_health: i32) -> Self {
        Boss {
            center_x: BOSS_CENTER_X,
            center_y: BOSS_CENTER_Y,
            size: BOSS_BASE_SIZE,
            health: max_health,
            max_health,
            phase: BossPhase::Dormant,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == BossPhase::Active
    }

    pub fn x(&self) -> f32 {
        self.center_x - self.size / 2.0
    }

    pub fn y(&self) -> f32 {
        self.center_y - self.size / 2.0
    }

    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x(), y: self.y(), size: self.size }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }
}

// ── Pickups & effects ────────────────────────────────────────────────────────

/// A falling collectible: shield booster or extra-life heart.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
}

impl Pickup {
    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, size: self.size }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
}

// ── Input snapshot ───────────────────────────────────────────────────────────

/// Held-key flags supplied by the input collaborator once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

/// Monotonic timing for one frame.  `now` is measured from an arbitrary
/// fixed origin (program start); `dt` is the time since the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTime {
    pub now: Duration,
    pub dt: Duration,
}

// ── Scheduled work & emitted events ──────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedAction {
    RespawnPlayer,
    CompleteLevel,
}

/// A delayed callback, tagged with the attempt it was scheduled in.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub due: Duration,
    pub attempt: u64,
    pub action: DelayedAction,
}

/// Things that happened during a tick, for the audio, persistence and
/// rendering collaborators.  Drained by the caller every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    MusicStopped,
    BossSpawned { health: i32 },
    BossDefeated,
    PlayerRespawned,
    LevelCleared(ProgressReport),
    GameOver(ProgressReport),
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    /// Boss beaten below the last level; waiting for "next level".
    LevelCleared { next_level: u8 },
    /// Final boss beaten.
    Won,
    GameOver,
}

/// The entire state of one play session.  Cloneable so pure update
/// functions can return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub boosters: Vec<Pickup>,
    pub life_pickups: Vec<Pickup>,
    pub boss: Boss,
    pub explosions: Vec<Explosion>,
    pub score: u32,
    pub lives: u32,
    /// 1-based level number.
    pub level: u8,
    pub status: GameStatus,
    /// User pause.  Overlay statuses freeze the tick on their own.
    pub paused: bool,
    pub frame: u64,
    pub last_enemy_spawn_frame: u64,
    pub last_minion_spawn_frame: u64,
    /// Game time spent ticking in this level; drives the boss timer.
    pub level_elapsed: Duration,
    pub last_shot_at: Option<Duration>,
    /// Bumped on every restart / level change so stale timers can be dropped.
    pub attempt: u64,
    pub timers: Vec<ScheduledEvent>,
    pub events: Vec<GameEvent>,
}

impl GameSession {
    /// True when the simulation should advance this frame.
    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Playing && !self.paused
    }

    pub fn progress_report(&self, level_cleared: bool) -> ProgressReport {
        ProgressReport {
            score: self.score,
            level_cleared,
            level: self.level,
        }
    }
}
