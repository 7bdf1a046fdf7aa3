/// Rendering layer: all terminal I/O for the play screen lives here.
///
/// Each function receives a mutable writer, the terminal viewport and an
/// immutable view of the session.  No game logic is performed; this module
/// only translates the 600 x 400 playfield into terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use cyber_strike::entities::{
    Boss, Enemy, Explosion, GameSession, GameStatus, Pickup, CANVAS_H, CANVAS_W,
};
use cyber_strike::levels::{clamp_level, level_intro, MAX_LEVEL};

// ── Level themes ──────────────────────────────────────────────────────────────

/// Per-level palette and sprite set.
pub struct LevelTheme {
    pub border: Color,
    pub accent: Color,
    pub enemy: Color,
    pub enemy_glyph: &'static str,
    pub bullet: Color,
    pub boss: Color,
    pub boss_fill: &'static str,
    pub explosion: Color,
}

static THEMES: [LevelTheme; MAX_LEVEL as usize] = [
    // Deep Space Patrol
    LevelTheme {
        border: Color::DarkBlue,
        accent: Color::Yellow,
        enemy: Color::Green,
        enemy_glyph: "«▼»",
        bullet: Color::Cyan,
        boss: Color::Magenta,
        boss_fill: "▓",
        explosion: Color::DarkYellow,
    },
    // Dusk Skies
    LevelTheme {
        border: Color::DarkRed,
        accent: Color::DarkYellow,
        enemy: Color::Red,
        enemy_glyph: "<◆>",
        bullet: Color::Yellow,
        boss: Color::DarkMagenta,
        boss_fill: "▒",
        explosion: Color::Blue,
    },
    // Milky Way Rift
    LevelTheme {
        border: Color::DarkMagenta,
        accent: Color::Magenta,
        enemy: Color::Magenta,
        enemy_glyph: "(◎)",
        bullet: Color::White,
        boss: Color::Red,
        boss_fill: "▓",
        explosion: Color::Magenta,
    },
    // Cyber Dimension
    LevelTheme {
        border: Color::DarkCyan,
        accent: Color::Cyan,
        enemy: Color::Green,
        enemy_glyph: "[¤]",
        bullet: Color::Green,
        boss: Color::Cyan,
        boss_fill: "█",
        explosion: Color::Cyan,
    },
    // The Void
    LevelTheme {
        border: Color::DarkGrey,
        accent: Color::Blue,
        enemy: Color::DarkRed,
        enemy_glyph: "{✦}",
        bullet: Color::Blue,
        boss: Color::DarkMagenta,
        boss_fill: "▓",
        explosion: Color::White,
    },
];

pub fn theme_for(level: u8) -> &'static LevelTheme {
    &THEMES[clamp_level(level) as usize - 1]
}

const C_PLAYER: Color = Color::White;
const C_SHIELD: Color = Color::Cyan;
const C_BOOSTER: Color = Color::Blue;
const C_LIFE: Color = Color::Magenta;
const C_HUD_LIVES: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Terminal size.  Row 0 is the HUD, row 1 and row `height - 2` are the
/// border bars, the last row carries the key hints.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    fn inner_w(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn inner_h(&self) -> f32 {
        self.height.saturating_sub(4).max(1) as f32
    }

    /// Playfield x → terminal column.
    fn col(&self, x: f32) -> u16 {
        let c = (x / CANVAS_W * self.inner_w()).floor().max(0.0) as u16;
        1 + c.min(self.width.saturating_sub(3))
    }

    /// Playfield y → terminal row.
    fn row(&self, y: f32) -> u16 {
        let r = (y / CANVAS_H * self.inner_h()).floor().max(0.0) as u16;
        2 + r.min(self.height.saturating_sub(5))
    }

    /// Playfield length → number of cells, at least one.
    fn cells_w(&self, len: f32) -> u16 {
        ((len / CANVAS_W * self.inner_w()).round() as u16).max(1)
    }

    fn cells_h(&self, len: f32) -> u16 {
        ((len / CANVAS_H * self.inner_h()).round() as u16).max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    view: Viewport,
    state: &GameSession,
    muted: bool,
) -> std::io::Result<()> {
    let theme = theme_for(state.level);
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view, theme)?;
    draw_hud(out, view, state, theme, muted)?;

    if state.boss.is_active() {
        draw_boss(out, view, &state.boss, theme)?;
    }
    for enemy in &state.enemies {
        draw_enemy(out, view, enemy, theme)?;
    }
    for booster in &state.boosters {
        draw_pickup(out, view, booster, "◆", C_BOOSTER)?;
    }
    for heart in &state.life_pickups {
        draw_pickup(out, view, heart, "♥", C_LIFE)?;
    }
    out.queue(style::SetForegroundColor(theme.bullet))?;
    for bullet in &state.bullets {
        out.queue(cursor::MoveTo(view.col(bullet.x), view.row(bullet.y)))?;
        out.queue(Print("║"))?;
    }
    for explosion in &state.explosions {
        draw_explosion(out, view, explosion, theme)?;
    }

    if state.player.alive {
        draw_player(out, view, state)?;
    }
    draw_controls_hint(out, view)?;

    match state.status {
        GameStatus::Playing if state.paused => {
            draw_overlay(out, view, &[("PAUSED", Color::White)], "P - Resume  Q - Menu")?
        }
        GameStatus::Playing => {}
        GameStatus::LevelCleared { next_level } => {
            let title = format!("LEVEL {} · PLAY NEXT", next_level);
            let score = format!("Score: {:>6}", state.score);
            draw_overlay(
                out,
                view,
                &[(title.as_str(), theme.accent), (score.as_str(), Color::Yellow)],
                "ENTER - Next Level  R - Replay  Q - Menu",
            )?
        }
        GameStatus::Won => {
            let score = format!("Final Score: {:>6}", state.score);
            draw_overlay(
                out,
                view,
                &[("YOU WIN!", Color::Green), (score.as_str(), Color::Yellow)],
                "R - Play Again  Q - Menu",
            )?
        }
        GameStatus::GameOver => {
            let score = format!("Final Score: {:>6}", state.score);
            draw_overlay(
                out,
                view,
                &[("GAME  OVER", Color::Red), (score.as_str(), Color::Yellow)],
                "R - Play Again  Q - Menu",
            )?
        }
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport, theme: &LevelTheme) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(theme.border))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    view: Viewport,
    state: &GameSession,
    theme: &LevelTheme,
    muted: bool,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(format!("Score:{:>6}", state.score)))?;

    // Level title, or the boss health bar once the boss is out
    let centre = if state.boss.is_active() {
        boss_bar(&state.boss, 20)
    } else {
        level_intro(state.level).title.to_string()
    };
    let cx = (view.width / 2).saturating_sub(centre.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(cx, 0))?;
    out.queue(style::SetForegroundColor(if state.boss.is_active() {
        theme.boss
    } else {
        theme.accent
    }))?;
    out.queue(Print(&centre))?;

    let shield_tag = if state.player.power_up { "[SHIELD] " } else { "" };
    let mute_tag = if muted { "[MUTE] " } else { "" };
    let lives_str = format!("Lives:{}", "♥".repeat(state.lives.min(9) as usize));
    let right_len = shield_tag.chars().count() + mute_tag.len() + lives_str.chars().count();
    let rx = view.width.saturating_sub(right_len as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_SHIELD))?;
    out.queue(Print(shield_tag))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(mute_tag))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

fn boss_bar(boss: &Boss, cells: usize) -> String {
    let filled = (boss.health_fraction() * cells as f32).ceil() as usize;
    format!(
        "BOSS [{}{}]",
        "■".repeat(filled.min(cells)),
        "·".repeat(cells.saturating_sub(filled))
    )
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, view: Viewport, state: &GameSession) -> std::io::Result<()> {
    //   ▲       ← row y      (tip)
    //  /█\      ← row y+1    (fuselage + wings)
    let p = &state.player;
    let colour = if p.power_up { C_SHIELD } else { C_PLAYER };
    let cx = view.col(p.x + p.size / 2.0);
    let top = view.row(p.y);
    out.queue(style::SetForegroundColor(colour))?;

    out.queue(cursor::MoveTo(cx, top))?;
    out.queue(Print("▲"))?;

    let wing_y = top + 1;
    if wing_y < view.height.saturating_sub(2) {
        out.queue(cursor::MoveTo(cx.saturating_sub(1).max(1), wing_y))?;
        out.queue(Print("/█\\"))?;
    }

    Ok(())
}

fn draw_enemy<W: Write>(
    out: &mut W,
    view: Viewport,
    enemy: &Enemy,
    theme: &LevelTheme,
) -> std::io::Result<()> {
    let (cx, cy) = enemy.bounds().center();
    let col = view.col(cx).saturating_sub(1).max(1);
    out.queue(style::SetForegroundColor(theme.enemy))?;
    out.queue(cursor::MoveTo(col, view.row(cy)))?;
    out.queue(Print(theme.enemy_glyph))?;
    Ok(())
}

fn draw_boss<W: Write>(
    out: &mut W,
    view: Viewport,
    boss: &Boss,
    theme: &LevelTheme,
) -> std::io::Result<()> {
    let left = view.col(boss.x());
    let top = view.row(boss.y());
    let w = view.cells_w(boss.size) as usize;
    let h = view.cells_h(boss.size);
    out.queue(style::SetForegroundColor(theme.boss))?;
    for r in 0..h {
        out.queue(cursor::MoveTo(left, top + r))?;
        out.queue(Print(theme.boss_fill.repeat(w)))?;
    }
    Ok(())
}

fn draw_pickup<W: Write>(
    out: &mut W,
    view: Viewport,
    pickup: &Pickup,
    glyph: &str,
    colour: Color,
) -> std::io::Result<()> {
    let (cx, cy) = pickup.bounds().center();
    out.queue(cursor::MoveTo(view.col(cx), view.row(cy)))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_explosion<W: Write>(
    out: &mut W,
    view: Viewport,
    explosion: &Explosion,
    theme: &LevelTheme,
) -> std::io::Result<()> {
    let glyph = if explosion.alpha > 0.6 {
        "✶"
    } else if explosion.alpha > 0.3 {
        "*"
    } else {
        "·"
    };
    out.queue(style::SetForegroundColor(theme.explosion))?;
    out.queue(cursor::MoveTo(view.col(explosion.x), view.row(explosion.y)))?;
    out.queue(Print(glyph))?;

    // Outer ring once it has grown past a cell
    let reach = view.cells_w(explosion.radius);
    if reach > 1 {
        let cx = view.col(explosion.x);
        let cy = view.row(explosion.y);
        out.queue(cursor::MoveTo(cx.saturating_sub(reach).max(1), cy))?;
        out.queue(Print("·"))?;
        out.queue(cursor::MoveTo((cx + reach).min(view.width.saturating_sub(2)), cy))?;
        out.queue(Print("·"))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←↑↓→ / WASD : Move   SPACE : Shoot   P : Pause   M : Mute   Q : Menu",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    view: Viewport,
    lines: &[(&str, Color)],
    hint: &str,
) -> std::io::Result<()> {
    let inner = lines
        .iter()
        .map(|(l, _)| l.chars().count())
        .chain(std::iter::once(hint.chars().count()))
        .max()
        .unwrap_or(0)
        + 4;
    let cx = view.width / 2;
    let total_rows = lines.len() as u16 + 3;
    let start_row = (view.height / 2).saturating_sub(total_rows / 2);
    let left = cx.saturating_sub(inner as u16 / 2 + 1);

    let frame_colour = lines.first().map(|(_, c)| *c).unwrap_or(Color::White);
    out.queue(style::SetForegroundColor(frame_colour))?;
    out.queue(cursor::MoveTo(left, start_row))?;
    out.queue(Print(format!("╔{}╗", "═".repeat(inner))))?;
    for i in 0..=lines.len() as u16 {
        out.queue(cursor::MoveTo(left, start_row + 1 + i))?;
        out.queue(Print(format!("║{}║", " ".repeat(inner))))?;
    }
    out.queue(cursor::MoveTo(left, start_row + 2 + lines.len() as u16))?;
    out.queue(Print(format!("╚{}╝", "═".repeat(inner))))?;

    for (i, (msg, colour)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(*colour))?;
        out.queue(Print(*msg))?;
    }

    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row + 1 + lines.len() as u16))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}
