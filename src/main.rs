mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use cyber_strike::audio::{AudioDirector, AudioSink, MusicTrack, SoundEffect};
use cyber_strike::compute::{new_session, restart_level, run_timers, start_next_level, tick, toggle_pause};
use cyber_strike::config::{self, Settings};
use cyber_strike::entities::{FrameTime, GameEvent, GameStatus, HeldInput};
use cyber_strike::levels::{level_intro, MAX_LEVEL};
use cyber_strike::profile::{
    generate_callsign, send_later, OutboxSync, Profile, ProfileStore, ProgressReport,
};
use cyber_strike::Error;

use display::{theme_for, Viewport};

/// Longest simulated step after a stall (e.g. the window was suspended).
const MAX_FRAME_DT: Duration = Duration::from_millis(250);
/// Delay before a progress report is handed to the remote outbox.
const SYNC_DELAY: Duration = Duration::from_millis(500);

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 5 frames at 60 FPS
/// (≈83 ms) is refreshed before it expires on most setups.
const HOLD_WINDOW: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "cyber_strike", about = "Five-level arcade shooter for the terminal")]
struct Args {
    /// Start this level straight away (must be unlocked for the profile).
    #[arg(long)]
    level: Option<u8>,
    /// Profile name; created on first use.
    #[arg(long)]
    profile: Option<String>,
    /// Seed the RNG for reproducible spawns.
    #[arg(long)]
    seed: Option<u64>,
    /// Start with sound muted.
    #[arg(long)]
    mute: bool,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Audio output ──────────────────────────────────────────────────────────────

/// Terminal "speaker": rings the bell for the cues that matter and logs the
/// rest.  Music is only tracked in the log.
struct TerminalBell {
    out: Stdout,
}

impl AudioSink for TerminalBell {
    fn play(&mut self, effect: SoundEffect) -> std::io::Result<()> {
        match effect {
            SoundEffect::PlayerHit
            | SoundEffect::BossDeath
            | SoundEffect::LevelComplete
            | SoundEffect::GameOver
            | SoundEffect::ExtraLife => {
                self.out.write_all(b"\x07")?;
                self.out.flush()
            }
            other => {
                debug!(cue = other.name(), "sound");
                Ok(())
            }
        }
    }

    fn set_music(&mut self, track: Option<MusicTrack>) -> std::io::Result<()> {
        debug!(?track, "music");
        Ok(())
    }
}

// ── Shared run state ──────────────────────────────────────────────────────────

struct RunContext {
    settings: Settings,
    rng: StdRng,
    audio: AudioDirector<TerminalBell>,
    store: ProfileStore,
    profile: Option<String>,
    sync: Option<OutboxSync>,
    pending_sync: Vec<JoinHandle<()>>,
    origin: Instant,
    /// One-line message for the menu (profile errors and the like).
    status_line: Option<String>,
}

impl RunContext {
    fn current_profile(&self) -> Profile {
        self.profile
            .as_deref()
            .and_then(|name| self.store.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn record_progress(&mut self, report: ProgressReport) {
        if let Some(name) = self.profile.clone() {
            match self.store.record(&name, &report) {
                Ok(p) => info!(
                    profile = %name,
                    best = p.best_score,
                    unlocked = p.highest_unlocked_level,
                    "progress recorded"
                ),
                Err(err) => warn!(error = %err, "could not record progress"),
            }
        }
        if let Some(sync) = self.sync.clone() {
            self.pending_sync.retain(|h| !h.is_finished());
            self.pending_sync.push(send_later(sync, report, SYNC_DELAY));
        }
    }

    /// Wait for queued progress syncs so a quick exit does not lose them.
    fn flush_sync(&mut self) {
        let pending = std::mem::take(&mut self.pending_sync);
        if !pending.is_empty() {
            info!(count = pending.len(), "waiting for progress sync");
        }
        for handle in pending {
            if handle.join().is_err() {
                warn!("progress sync thread panicked");
            }
        }
    }
}

/// Pick (or create) the profile to play under.  Failures leave the game
/// playable without a profile and surface a message on the menu.
fn select_profile(ctx: &mut RunContext, requested: Option<String>) {
    let name = requested
        .or_else(|| ctx.store.names().next().map(str::to_string))
        .unwrap_or_else(|| generate_callsign(&mut ctx.rng));

    if ctx.store.get(name.trim()).is_some() {
        ctx.profile = Some(name.trim().to_string());
        return;
    }
    match ctx.store.create_profile(&name) {
        Ok(created) => ctx.profile = Some(created),
        Err(Error::ProfileExists { name }) => {
            ctx.profile = ctx
                .store
                .names()
                .find(|n| n.eq_ignore_ascii_case(&name))
                .map(str::to_string);
        }
        Err(err) => {
            warn!(error = %err, "playing without a profile");
            ctx.status_line = Some(format!("Profile unavailable: {err}"));
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(u8),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    ctx: &mut RunContext,
) -> std::io::Result<MenuResult> {
    let profile = ctx.current_profile();
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;
    let left = cx.saturating_sub(22);

    let title = "★  CYBER  STRIKE  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(9),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let who = match &ctx.profile {
        Some(name) => format!("Pilot: {}   Best Score: {}", name, profile.best_score),
        None => "Pilot: guest".to_string(),
    };
    out.queue(cursor::MoveTo(cx.saturating_sub(who.chars().count() as u16 / 2), cy.saturating_sub(8)))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&who))?;

    if let Some(msg) = &ctx.status_line {
        out.queue(cursor::MoveTo(cx.saturating_sub(msg.chars().count() as u16 / 2), cy.saturating_sub(7)))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(msg))?;
    }

    out.queue(cursor::MoveTo(left, cy.saturating_sub(5)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select level:"))?;

    for level in 1..=MAX_LEVEL {
        let row = cy.saturating_sub(4) + level as u16 - 1;
        let unlocked = profile.is_unlocked(level);
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", level)))?;
        out.queue(style::SetForegroundColor(if unlocked {
            theme_for(level).accent
        } else {
            Color::DarkGrey
        }))?;
        out.queue(Print(level_intro(level).title))?;
        if !unlocked {
            out.queue(Print("  (locked)"))?;
        }
    }

    let board = ctx.store.leaderboard(Some(5));
    out.queue(cursor::MoveTo(left, cy + 2))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Leaderboard:"))?;
    if board.is_empty() {
        out.queue(cursor::MoveTo(left, cy + 3))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print("  no scores yet"))?;
    }
    for (i, row) in board.iter().enumerate() {
        out.queue(cursor::MoveTo(left, cy + 3 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(
            "  {}. {:<18} {:>7}  L{}",
            i + 1,
            row.display_name,
            row.best_score,
            row.highest_unlocked_level
        )))?;
    }

    out.queue(cursor::MoveTo(left, cy + 9))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("1-5 : Start level   M : Mute   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let ev = match rx.recv() {
            Ok(ev) => ev,
            Err(_) => return Ok(MenuResult::Quit), // input thread gone
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = ev {
            match code {
                KeyCode::Char(c @ '1'..='5') => {
                    let level = c as u8 - b'0';
                    if profile.is_unlocked(level) {
                        return Ok(MenuResult::Start(level));
                    }
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    ctx.audio.toggle_mute();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(MenuResult::Quit);
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum OverlayAction {
    NextLevel,
    Restart,
}

/// Keys accepted on the end-of-level and game-over overlays.  Space is the
/// fire key and auto-repeats while held, so it never dismisses an overlay.
fn overlay_action(status: &GameStatus, code: KeyCode) -> Option<OverlayAction> {
    match (status, code) {
        (GameStatus::Playing, _) => None,
        (_, KeyCode::Char('r') | KeyCode::Char('R')) => Some(OverlayAction::Restart),
        (GameStatus::LevelCleared { .. }, KeyCode::Enter) => Some(OverlayAction::NextLevel),
        (GameStatus::Won | GameStatus::GameOver, KeyCode::Enter) => Some(OverlayAction::Restart),
        _ => None,
    }
}

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame the keys that are still
/// "fresh" become the held-input snapshot handed to the simulation, so
/// Space + arrows can be held together.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    ctx: &mut RunContext,
    level: u8,
) -> std::io::Result<bool> {
    let mut session = new_session(level);
    ctx.audio.play_level_music(session.level);

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last_now = ctx.origin.elapsed();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            ctx.audio.stop_music();
                            return Ok(false);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            session = toggle_pause(&session);
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => {
                            ctx.audio.toggle_mute();
                        }
                        other => match overlay_action(&session.status, other) {
                            Some(OverlayAction::NextLevel) => {
                                session = start_next_level(&session);
                                ctx.audio.play_level_music(session.level);
                            }
                            Some(OverlayAction::Restart) => {
                                session = restart_level(&session);
                                ctx.audio.play_level_music(session.level);
                            }
                            None => {}
                        },
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = HeldInput {
            left: any_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
            right: any_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
            up: any_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame),
            down: any_held(&key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame),
            fire: is_held(&key_frame, &KeyCode::Char(' '), frame),
        };

        let now = ctx.origin.elapsed();
        let time = FrameTime { now, dt: now.saturating_sub(last_now).min(MAX_FRAME_DT) };
        last_now = now;

        // A failing frame must not take the game down: keep the last good state.
        let rng = &mut ctx.rng;
        match panic::catch_unwind(AssertUnwindSafe(|| tick(&session, &input, time, rng))) {
            Ok(next) => session = next,
            Err(_) => error!(frame, "tick panicked; keeping previous state"),
        }
        session = run_timers(&session, now);

        for ev in std::mem::take(&mut session.events) {
            match ev {
                GameEvent::Sound(effect) => {
                    ctx.audio.trigger(effect, now);
                }
                GameEvent::MusicStopped => ctx.audio.stop_music(),
                GameEvent::BossSpawned { health } => debug!(health, "boss incoming"),
                GameEvent::BossDefeated | GameEvent::PlayerRespawned => {}
                GameEvent::LevelCleared(report) | GameEvent::GameOver(report) => {
                    ctx.record_progress(report);
                }
            }
        }

        let (width, height) = terminal::size()?;
        display::render(out, Viewport { width, height }, &session, ctx.audio.is_muted())?;

        let elapsed = frame_start.elapsed();
        if elapsed < ctx.settings.frame {
            thread::sleep(ctx.settings.frame - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Log to a file: the terminal belongs to the game while it runs.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    panic::set_hook(Box::new(|info| error!(%info, "panic")));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Err(err) = init_logging(&config::log_path_from_env()) {
        eprintln!("logging disabled: {err:#}");
    }
    let settings = Settings::from_env();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut ctx = RunContext {
        store: ProfileStore::load(&settings.profile_path),
        sync: settings.sync_outbox.clone().map(OutboxSync::new),
        audio: AudioDirector::new(TerminalBell { out: stdout() }, args.mute),
        settings,
        rng,
        profile: None,
        pending_sync: Vec::new(),
        origin: Instant::now(),
        status_line: None,
    };
    select_profile(&mut ctx, args.profile.clone());
    info!(profile = ?ctx.profile, "starting");

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &mut ctx, args.level);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    ctx.flush_sync();
    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    ctx: &mut RunContext,
    start_level: Option<u8>,
) -> std::io::Result<()> {
    if let Some(level) = start_level {
        let unlocked = ctx.current_profile().highest_unlocked_level;
        let level = if level >= 1 && level <= unlocked {
            level
        } else {
            warn!(requested = level, unlocked, "level locked; starting at highest unlocked");
            unlocked
        };
        if game_loop(out, rx, ctx, level)? {
            return Ok(());
        }
    }

    loop {
        match show_menu(out, rx, ctx)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => {
                if game_loop(out, rx, ctx, level)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
