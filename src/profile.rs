/// Local player profiles, progress recording and the leaderboard.
///
/// Profiles live in a single JSON file keyed by display name.  A missing
/// or unreadable file is treated as "no profiles yet".  Remote progress
/// sync is only an interface here (`ProgressSync`); every call to it is a
/// single best-effort attempt.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::levels::{clamp_level, MAX_LEVEL};

pub const LEADERBOARD_DEFAULT_LIMIT: usize = 10;
pub const LEADERBOARD_MAX_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default = "first_level")]
    pub highest_unlocked_level: u8,
    #[serde(default)]
    pub best_score: u32,
}

fn first_level() -> u8 {
    1
}

impl Default for Profile {
    fn default() -> Self {
        Profile { highest_unlocked_level: 1, best_score: 0 }
    }
}

/// End-of-level or game-over summary sent to the persistence service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub score: u32,
    pub level_cleared: bool,
    pub level: u8,
}

impl Profile {
    /// Fold a report into this profile: best score only ever rises, and
    /// clearing a level below the last unlocks the next one.
    pub fn apply_report(&mut self, report: &ProgressReport) {
        let level = clamp_level(report.level);
        if report.score > self.best_score {
            self.best_score = report.score;
        }
        if report.level_cleared && level < MAX_LEVEL {
            self.highest_unlocked_level = self.highest_unlocked_level.max(level + 1);
        }
        self.highest_unlocked_level = clamp_level(self.highest_unlocked_level);
    }

    pub fn is_unlocked(&self, level: u8) -> bool {
        level >= 1 && level <= self.highest_unlocked_level
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub best_score: u32,
    pub highest_unlocked_level: u8,
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    /// Read the store at `path`.  Never fails: missing or malformed data
    /// yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profiles = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, Profile>>(&raw) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring malformed profile store");
                    BTreeMap::new()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no profile store yet");
                BTreeMap::new()
            }
        };
        ProfileStore { path, profiles }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.profiles)?;
        fs::write(&self.path, raw).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Register a new profile and persist the store.  Returns the stored
    /// (trimmed) name.
    pub fn create_profile(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyProfileName);
        }
        if self.profiles.keys().any(|k| k.eq_ignore_ascii_case(name)) {
            return Err(Error::ProfileExists { name: name.to_string() });
        }
        self.profiles.insert(name.to_string(), Profile::default());
        self.save()?;
        info!(profile = name, "profile created");
        Ok(name.to_string())
    }

    /// Apply a report to `name` and write the store.  A failed write is
    /// logged; the in-memory profile is still updated.
    pub fn record(&mut self, name: &str, report: &ProgressReport) -> Result<Profile> {
        let profile = self
            .profiles
            .get_mut(name)
            .ok_or_else(|| Error::UnknownProfile { name: name.to_string() })?;
        profile.apply_report(report);
        let updated = profile.clone();
        if let Err(err) = self.save() {
            warn!(error = %err, "failed to persist progress");
        }
        Ok(updated)
    }

    /// Top `limit` profiles with a non-zero best score, highest first.
    /// `limit` is clamped to `1..=100`; `None` means 10.
    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let limit = limit
            .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
            .clamp(1, LEADERBOARD_MAX_LIMIT);
        let mut rows: Vec<LeaderboardEntry> = self
            .profiles
            .iter()
            .filter(|(_, p)| p.best_score > 0)
            .map(|(name, p)| LeaderboardEntry {
                display_name: name.clone(),
                best_score: p.best_score,
                highest_unlocked_level: p.highest_unlocked_level,
            })
            .collect();
        // Stable sort keeps name order among equal scores.
        rows.sort_by(|a, b| b.best_score.cmp(&a.best_score));
        rows.truncate(limit);
        rows
    }
}

// ── Remote sync ──────────────────────────────────────────────────────────────

/// The remote persistence service.  Single attempt, no retries.
pub trait ProgressSync {
    fn send(&self, report: &ProgressReport) -> Result<()>;
}

/// Send `report` and swallow any failure.
pub fn send_best_effort(sync: &dyn ProgressSync, report: &ProgressReport) {
    if let Err(err) = sync.send(report) {
        debug!(error = %err, "progress sync failed; keeping local result");
    }
}

/// Send `report` on a background thread after `delay`.  The handle lets the
/// caller wait for it before exiting.
pub fn send_later<S>(sync: S, report: ProgressReport, delay: Duration) -> JoinHandle<()>
where
    S: ProgressSync + Send + 'static,
{
    thread::spawn(move || {
        thread::sleep(delay);
        send_best_effort(&sync, &report);
    })
}

/// Appends each report as one JSON line to an outbox file that an uploader
/// drains towards the remote service.
#[derive(Clone, Debug)]
pub struct OutboxSync {
    path: PathBuf,
}

impl OutboxSync {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OutboxSync { path: path.into() }
    }
}

impl ProgressSync for OutboxSync {
    fn send(&self, report: &ProgressReport) -> Result<()> {
        let line = serde_json::to_string(report)?;
        let io_err = |source| Error::Io { path: self.path.clone(), source };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{line}").map_err(io_err)
    }
}

// ── Callsigns ────────────────────────────────────────────────────────────────

const CALLSIGN_PREFIXES: [&str; 10] = [
    "Neon", "Cyber", "Shadow", "Quantum", "Nova", "Pixel", "Turbo", "Void", "Laser", "Hyper",
];
const CALLSIGN_SUFFIXES: [&str; 10] = [
    "Blaze", "Rider", "Striker", "Phantom", "Viper", "Rift", "Falcon", "Specter", "Bolt", "Knight",
];

/// Random default profile name such as `NovaFalcon417`.
pub fn generate_callsign(rng: &mut impl Rng) -> String {
    let prefix = CALLSIGN_PREFIXES.choose(rng).copied().unwrap_or("Neon");
    let suffix = CALLSIGN_SUFFIXES.choose(rng).copied().unwrap_or("Blaze");
    let number: u32 = rng.gen_range(100..1000);
    format!("{prefix}{suffix}{number}")
}
