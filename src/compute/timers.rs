/// Delayed callbacks (respawn, level completion).
///
/// Every event remembers the attempt it was scheduled in.  Restarting or
/// changing level bumps `GameSession::attempt`, so anything scheduled
/// before that is dropped unexecuted when it comes due.

use std::time::Duration;

use tracing::{debug, info};

use crate::audio::SoundEffect;
use crate::entities::{DelayedAction, GameEvent, GameSession, GameStatus, Player, ScheduledEvent};
use crate::levels::MAX_LEVEL;

pub const RESPAWN_DELAY: Duration = Duration::from_millis(800);
pub const LEVEL_COMPLETE_DELAY: Duration = Duration::from_millis(380);

pub fn schedule(s: &mut GameSession, now: Duration, delay: Duration, action: DelayedAction) {
    s.timers.push(ScheduledEvent { due: now + delay, attempt: s.attempt, action });
}

/// Run every event due at `now`, in due order.  Returns how many ran.
pub fn fire_due(s: &mut GameSession, now: Duration) -> usize {
    let (mut due, pending): (Vec<ScheduledEvent>, Vec<ScheduledEvent>) =
        std::mem::take(&mut s.timers).into_iter().partition(|t| t.due <= now);
    s.timers = pending;
    due.sort_by_key(|t| t.due);

    let mut ran = 0;
    for event in due {
        if event.attempt != s.attempt {
            debug!(action = ?event.action, scheduled_in = event.attempt, current = s.attempt, "dropping stale timer");
            continue;
        }
        match event.action {
            DelayedAction::RespawnPlayer => respawn(s),
            DelayedAction::CompleteLevel => complete_level(s),
        }
        ran += 1;
    }
    ran
}

fn respawn(s: &mut GameSession) {
    if s.status != GameStatus::Playing {
        return;
    }
    s.player = Player::at_spawn();
    s.events.push(GameEvent::PlayerRespawned);
}

fn complete_level(s: &mut GameSession) {
    if s.status != GameStatus::Playing {
        return;
    }
    s.status = if s.level < MAX_LEVEL {
        GameStatus::LevelCleared { next_level: s.level + 1 }
    } else {
        GameStatus::Won
    };
    s.events.push(GameEvent::Sound(SoundEffect::LevelComplete));
    let report = s.progress_report(true);
    s.events.push(GameEvent::LevelCleared(report));
    info!(level = s.level, score = s.score, status = ?s.status, "level complete");
}
