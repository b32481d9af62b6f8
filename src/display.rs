//! Rendering layer: all terminal I/O lives here.
//!
//! The simulation core draws through the [`DrawSink`] contract; this
//! module implements it by mapping world pixels onto terminal cells
//! and painting one small glyph per sprite. No game logic is performed
//! here; state is only translated into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use log::trace;

use space_raiders::entity::{Tint, Vec2};
use space_raiders::interface::{AudioSink, ContentSource, DrawSink, Sound, VisualHandle};
use space_raiders::player::PlayerState;
use space_raiders::sim::Simulation;
use space_raiders::{GameError, World};

// ── Sprite table ──────────────────────────────────────────────────────────────

/// Visual catalogue: the pixel dimensions the simulation sees, plus the
/// glyph art and colour this renderer paints. Sheet heights are
/// `frame height x frame count`.
struct SpriteDef {
    name: &'static str,
    width: u32,
    height: u32,
    art: &'static str,
    color: Color,
}

const SPRITES: &[SpriteDef] = &[
    SpriteDef { name: "player", width: 128, height: 128, art: "/▲\\", color: Color::White },
    SpriteDef { name: "burner", width: 64, height: 640, art: "∴", color: Color::DarkYellow },
    SpriteDef { name: "shield", width: 144, height: 144, art: "(   )", color: Color::Cyan },
    SpriteDef { name: "missile", width: 32, height: 320, art: "║", color: Color::Cyan },
    SpriteDef { name: "missile-explode", width: 64, height: 576, art: "✶", color: Color::Yellow },
    SpriteDef { name: "explosion", width: 128, height: 896, art: "✹", color: Color::Red },
    SpriteDef { name: "enemies/explosion1", width: 128, height: 1024, art: "✺", color: Color::Red },
    SpriteDef { name: "enemies/explosion2", width: 128, height: 1024, art: "✸", color: Color::Yellow },
    SpriteDef { name: "enemies/explosion3", width: 128, height: 1024, art: "✷", color: Color::DarkRed },
    SpriteDef { name: "enemies/ship1", width: 128, height: 96, art: "«▼»", color: Color::Green },
    SpriteDef { name: "enemies/ship2", width: 128, height: 96, art: "(◎)", color: Color::Magenta },
    SpriteDef { name: "enemies/ship3", width: 128, height: 96, art: "[Ω]", color: Color::Red },
    SpriteDef { name: "enemies/exhaust1", width: 32, height: 128, art: "˚", color: Color::DarkGrey },
    SpriteDef { name: "enemies/exhaust2", width: 32, height: 128, art: "˚", color: Color::DarkGrey },
    SpriteDef { name: "enemies/exhaust3", width: 32, height: 128, art: "˚", color: Color::DarkGrey },
    SpriteDef { name: "enemies/shot", width: 16, height: 16, art: "↓", color: Color::Magenta },
    SpriteDef { name: "powerups/rapid", width: 64, height: 64, art: "!", color: Color::Cyan },
    SpriteDef { name: "powerups/boost", width: 64, height: 64, art: "»", color: Color::Green },
    SpriteDef { name: "powerups/shield", width: 64, height: 64, art: "◈", color: Color::Yellow },
    SpriteDef { name: "asteroid1", width: 96, height: 96, art: "◍", color: Color::DarkGrey },
    SpriteDef { name: "asteroid2", width: 80, height: 80, art: "◆", color: Color::DarkGrey },
    SpriteDef { name: "asteroid3", width: 64, height: 64, art: "●", color: Color::DarkGrey },
    SpriteDef { name: "star", width: 1, height: 1, art: "·", color: Color::Grey },
];

/// Content source backed by the sprite table; the handle id is the
/// table index.
pub struct TermContent;

impl ContentSource for TermContent {
    fn load_visual(&mut self, name: &str) -> Result<VisualHandle, GameError> {
        SPRITES
            .iter()
            .position(|sprite| sprite.name == name)
            .map(|index| VisualHandle {
                id: index as u32,
                width: SPRITES[index].width,
                height: SPRITES[index].height,
            })
            .ok_or_else(|| GameError::MissingVisual(name.to_string()))
    }
}

/// Fire-and-forget audio, traced instead of played.
pub struct TermAudio;

impl AudioSink for TermAudio {
    fn play(&mut self, sound: Sound) {
        trace!("audio: {sound:?}");
    }
}

// ── Draw sink ─────────────────────────────────────────────────────────────────

struct TermSink<'a, W: Write> {
    out: &'a mut W,
    world: World,
    cols: u16,
    rows: u16,
    error: Option<std::io::Error>,
}

impl<W: Write> TermSink<'_, W> {
    fn queue_sprite(&mut self, visual: VisualHandle, position: Vec2, tint: Tint) -> std::io::Result<()> {
        let sprite = &SPRITES[visual.id as usize];

        // World pixels to cells: row 0 is the HUD, the last row the
        // controls hint, everything between is the play area.
        let play_rows = f32::from(self.rows.saturating_sub(2));
        let col = (position.x / self.world.width * f32::from(self.cols)) as i32;
        let row = 1 + (position.y / self.world.height * play_rows) as i32;
        if row < 1 || row >= i32::from(self.rows) - 1 {
            return Ok(());
        }

        let start = col - sprite.art.chars().count() as i32 / 2;
        if start < 0 || start >= i32::from(self.cols) {
            return Ok(());
        }

        let color = if tint == Tint::WHITE {
            sprite.color
        } else {
            Color::Rgb {
                r: tint.r,
                g: tint.g,
                b: tint.b,
            }
        };
        self.out.queue(cursor::MoveTo(start as u16, row as u16))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(sprite.art))?;
        Ok(())
    }
}

impl<W: Write> DrawSink for TermSink<'_, W> {
    fn submit(
        &mut self,
        visual: VisualHandle,
        position: Vec2,
        _frame: usize,
        tint: Tint,
        _angle: f32,
        _origin: Vec2,
        _scale: f32,
    ) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.queue_sprite(visual, position, tint) {
            self.error = Some(err);
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, sim: &Simulation, world: World) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let mut sink = TermSink {
        out: &mut *out,
        world,
        cols,
        rows,
        error: None,
    };
    sim.submit(&mut sink);
    if let Some(err) = sink.error {
        return Err(err);
    }

    draw_hud(out, sim, cols)?;
    draw_controls_hint(out, rows)?;
    if sim.is_over() {
        draw_game_over(out, sim, cols, rows)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, sim: &Simulation, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(format!("Level: {}", sim.level())))?;

    out.queue(cursor::MoveTo(14, 0))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(format!("Score: {:>6}", sim.score())))?;

    let mut right = format!("Ships: {}", "▲".repeat(sim.lives() as usize));
    if sim.player().is_shield_active() {
        right = format!("[SHIELD] {right}");
    }
    if sim.player().state() == PlayerState::Respawn {
        right = format!("[RESPAWN] {right}");
    }
    if sim.is_paused() {
        right = format!("[PAUSED] {right}");
    }
    let rx = cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(Color::Magenta))?;
    out.queue(Print(&right))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    sim: &Simulation,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let lines = [
        "╔════════════════════╗".to_string(),
        "║     GAME  OVER     ║".to_string(),
        "╚════════════════════╝".to_string(),
        format!("Final Score: {:>6}", sim.score()),
        "R - Play Again  Q - Quit".to_string(),
    ];
    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, msg) in lines.iter().enumerate() {
        let color = match i {
            0..=2 => Color::Red,
            3 => Color::Yellow,
            _ => Color::White,
        };
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}
