/// Sound-effect cues, rate limiting and per-level music selection.
///
/// The simulation only emits `SoundEffect` values; the `AudioDirector`
/// decides which of them actually reach the output device.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::time::Duration;

use tracing::{debug, warn};

use crate::levels::clamp_level;

/// Global cap on effect triggers in any rolling one-second window.
pub const MAX_SOUNDS_PER_SECOND: usize = 12;
const WINDOW: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Shoot,
    ShootTriple,
    Explosion,
    BossHit,
    BossDeath,
    PlayerHit,
    PowerUp,
    ExtraLife,
    LevelComplete,
    GameOver,
}

impl SoundEffect {
    /// Cue name as understood by the audio collaborator.
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::ShootTriple => "shootTriple",
            SoundEffect::Explosion => "explosion",
            SoundEffect::BossHit => "bossHit",
            SoundEffect::BossDeath => "bossDeath",
            SoundEffect::PlayerHit => "playerHit",
            SoundEffect::PowerUp => "powerUp",
            SoundEffect::ExtraLife => "extraLife",
            SoundEffect::LevelComplete => "levelComplete",
            SoundEffect::GameOver => "gameOver",
        }
    }

    /// Minimum gap between two triggers of the same cue, if any.
    fn min_interval(self) -> Option<Duration> {
        match self {
            SoundEffect::Shoot | SoundEffect::ShootTriple | SoundEffect::Explosion => {
                Some(Duration::from_millis(120))
            }
            SoundEffect::BossHit => Some(Duration::from_millis(100)),
            _ => None,
        }
    }

    /// Shoot cues share one throttle slot.
    fn throttle_key(self) -> SoundEffect {
        match self {
            SoundEffect::ShootTriple => SoundEffect::Shoot,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusicTrack {
    DeepSpacePatrol,
    DuskSkies,
    MilkyWayRift,
    CyberDimension,
    TheVoid,
}

impl MusicTrack {
    pub fn for_level(level: u8) -> MusicTrack {
        match clamp_level(level) {
            1 => MusicTrack::DeepSpacePatrol,
            2 => MusicTrack::DuskSkies,
            3 => MusicTrack::MilkyWayRift,
            4 => MusicTrack::CyberDimension,
            _ => MusicTrack::TheVoid,
        }
    }
}

/// Output device for effects and music.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect) -> io::Result<()>;
    fn set_music(&mut self, track: Option<MusicTrack>) -> io::Result<()>;
}

// ── Limiter ──────────────────────────────────────────────────────────────────

/// Per-cue throttles plus the global rolling-window cap.
#[derive(Debug, Default)]
pub struct SoundLimiter {
    recent: VecDeque<Duration>,
    last_by_cue: HashMap<SoundEffect, Duration>,
}

impl SoundLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and records the trigger) if `effect` may play at `now`.
    pub fn admit(&mut self, effect: SoundEffect, now: Duration) -> bool {
        while let Some(&oldest) = self.recent.front() {
            if now.saturating_sub(oldest) >= WINDOW {
                self.recent.pop_front();
            } else {
                break;
            }
        }
        if self.recent.len() >= MAX_SOUNDS_PER_SECOND {
            return false;
        }

        let key = effect.throttle_key();
        if let (Some(gap), Some(&last)) = (effect.min_interval(), self.last_by_cue.get(&key)) {
            if now.saturating_sub(last) < gap {
                return false;
            }
        }

        self.last_by_cue.insert(key, now);
        self.recent.push_back(now);
        true
    }
}

// ── Director ─────────────────────────────────────────────────────────────────

pub struct AudioDirector<S: AudioSink> {
    sink: S,
    limiter: SoundLimiter,
    muted: bool,
    /// Effects whose sink call failed once; they stay silent afterwards.
    disabled: HashSet<SoundEffect>,
    music: Option<MusicTrack>,
}

impl<S: AudioSink> AudioDirector<S> {
    pub fn new(sink: S, muted: bool) -> Self {
        AudioDirector {
            sink,
            limiter: SoundLimiter::new(),
            muted,
            disabled: HashSet::new(),
            music: None,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn current_music(&self) -> Option<MusicTrack> {
        self.music
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns true if the effect was handed to the sink.
    pub fn trigger(&mut self, effect: SoundEffect, now: Duration) -> bool {
        if self.muted || self.disabled.contains(&effect) {
            return false;
        }
        if !self.limiter.admit(effect, now) {
            return false;
        }
        match self.sink.play(effect) {
            Ok(()) => true,
            Err(err) => {
                warn!(cue = effect.name(), error = %err, "disabling sound effect");
                self.disabled.insert(effect);
                false
            }
        }
    }

    pub fn play_level_music(&mut self, level: u8) {
        let track = MusicTrack::for_level(level);
        self.music = Some(track);
        if !self.muted {
            self.send_music(Some(track));
        }
    }

    pub fn stop_music(&mut self) {
        self.music = None;
        self.send_music(None);
    }

    /// Flips mute and returns the new state.  Unmuting resumes the
    /// current track.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if self.muted {
            self.send_music(None);
        } else {
            self.send_music(self.music);
        }
        self.muted
    }

    fn send_music(&mut self, track: Option<MusicTrack>) {
        if let Err(err) = self.sink.set_music(track) {
            debug!(error = %err, "music change ignored");
        }
    }
}
