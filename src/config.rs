use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_FRAME_MS: u64 = 16;
const MIN_FRAME_MS: u64 = 5;
const MAX_FRAME_MS: u64 = 100;

pub const PROFILE_PATH_VAR: &str = "CYBER_STRIKE_PROFILE_PATH";
pub const LOG_PATH_VAR: &str = "CYBER_STRIKE_LOG_PATH";
pub const FRAME_MS_VAR: &str = "CYBER_STRIKE_FRAME_MS";
pub const SYNC_OUTBOX_VAR: &str = "CYBER_STRIKE_SYNC_OUTBOX";

/// Runtime settings resolved from the environment.  Command-line flags are
/// layered on top by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub log_path: PathBuf,
    /// Target frame period of the main loop.
    pub frame: Duration,
    /// When set, progress reports are also queued here for remote upload.
    pub sync_outbox: Option<PathBuf>,
}

impl Settings {
    /// Install the log subscriber (at `log_path_from_env()`) before calling
    /// this, so fallback warnings reach the log.
    pub fn from_env() -> Self {
        let frame_ms = read_env_u64(FRAME_MS_VAR, DEFAULT_FRAME_MS);
        let frame_ms = if (MIN_FRAME_MS..=MAX_FRAME_MS).contains(&frame_ms) {
            frame_ms
        } else {
            tracing::warn!(
                "{} ({}) outside {}..={}. Falling back to {}.",
                FRAME_MS_VAR,
                frame_ms,
                MIN_FRAME_MS,
                MAX_FRAME_MS,
                DEFAULT_FRAME_MS
            );
            DEFAULT_FRAME_MS
        };

        Self {
            profile_path: read_env_path(PROFILE_PATH_VAR)
                .unwrap_or_else(|| home_dir().join(".cyber_strike_profiles.json")),
            log_path: log_path_from_env(),
            frame: Duration::from_millis(frame_ms),
            sync_outbox: read_env_path(SYNC_OUTBOX_VAR),
        }
    }
}

/// Log file location.  Resolved on its own, without warnings, because it is
/// needed before logging exists.
pub fn log_path_from_env() -> PathBuf {
    read_env_path(LOG_PATH_VAR).unwrap_or_else(|| home_dir().join(".cyber_strike.log"))
}

fn home_dir() -> PathBuf {
    env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

fn read_env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

pub(crate) fn read_env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid {}='{}'. Falling back to {}.", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
