/// Per-level difficulty table and briefing copy.  Five levels, each
/// strictly harder than the last.

pub const MAX_LEVEL: u8 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    /// Seconds of level time before the boss appears.
    pub boss_time_secs: u64,
    pub boss_health: i32,
    pub enemy_speed: f32,
    /// Minimum frames between regular enemy spawns.
    pub spawn_interval_frames: u64,
    pub max_enemies: usize,
    /// Minimum frames between boss-minion spawns.
    pub minion_interval_frames: u64,
}

static LEVELS: [LevelConfig; MAX_LEVEL as usize] = [
    LevelConfig {
        boss_time_secs: 30,
        boss_health: 30,
        enemy_speed: 2.0,
        spawn_interval_frames: 42,
        max_enemies: 6,
        minion_interval_frames: 100,
    },
    LevelConfig {
        boss_time_secs: 22,
        boss_health: 50,
        enemy_speed: 2.5,
        spawn_interval_frames: 30,
        max_enemies: 8,
        minion_interval_frames: 65,
    },
    LevelConfig {
        boss_time_secs: 18,
        boss_health: 70,
        enemy_speed: 3.0,
        spawn_interval_frames: 22,
        max_enemies: 10,
        minion_interval_frames: 50,
    },
    LevelConfig {
        boss_time_secs: 15,
        boss_health: 90,
        enemy_speed: 3.4,
        spawn_interval_frames: 16,
        max_enemies: 12,
        minion_interval_frames: 42,
    },
    LevelConfig {
        boss_time_secs: 12,
        boss_health: 120,
        enemy_speed: 3.8,
        spawn_interval_frames: 12,
        max_enemies: 14,
        minion_interval_frames: 36,
    },
];

/// Tuning for `level`.  Out-of-range levels fall back to level 1.
pub fn level_config(level: u8) -> &'static LevelConfig {
    match level {
        1..=MAX_LEVEL => &LEVELS[level as usize - 1],
        _ => &LEVELS[0],
    }
}

/// Clamp an arbitrary level number into `1..=MAX_LEVEL`.
pub fn clamp_level(level: u8) -> u8 {
    level.clamp(1, MAX_LEVEL)
}

/// Briefing shown on the menu before a level starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelIntro {
    pub title: &'static str,
    pub description: &'static str,
    pub hint: &'static str,
}

static INTROS: [LevelIntro; MAX_LEVEL as usize] = [
    LevelIntro {
        title: "Level 1 · Deep Space Patrol",
        description: "Sweep the outer rim and destroy enemy drones before they reach the colony perimeter.",
        hint: "Stay mobile and grab power-ups early to thin out heavy waves.",
    },
    LevelIntro {
        title: "Level 2 · Dusk Skies",
        description: "Defend the city at sunset as enemy squadrons dive through the clouds.",
        hint: "Watch for diagonal attack patterns and don't get pinned at the edges.",
    },
    LevelIntro {
        title: "Level 3 · Milky Way Rift",
        description: "Navigate a dense field of debris while intercepting fast-moving fighters.",
        hint: "Use short bursts of movement between gaps instead of long, risky dashes.",
    },
    LevelIntro {
        title: "Level 4 · Cyber Dimension",
        description: "Enter the digital frontier and erase corrupted AIs swarming the data stream.",
        hint: "Focus fire on the boss once it shrinks; its minions never stop coming.",
    },
    LevelIntro {
        title: "Level 5 · The Void",
        description: "Face the final onslaught in deep space where there is nowhere left to fall back.",
        hint: "Survival matters more than score. Avoid damage and wait for safe openings.",
    },
];

pub fn level_intro(level: u8) -> &'static LevelIntro {
    &INTROS[clamp_level(level) as usize - 1]
}
