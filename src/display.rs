/// Rendering layer.
///
/// Entities are drawn into a sparse `DisplayBuffer` (cell → glyph), which is
/// then handed to a `DisplaySink`.  The buffer only holds what changed or
/// must be re-asserted this tick, so every vacated cell is written as an
/// explicit blank.  `TerminalSink` is the only code here that touches a
/// terminal.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    QueueableCommand,
};

use crate::entities::{
    Collectible, CollectibleKind, Coords, Enemy, Facing, Fireball, GameState, Ground, Player,
    PowerState,
};
use crate::error::{DisplayError, GameError};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_GROUND_FG: Color = Color::Rgb { r: 97, g: 49, b: 0 };
const C_GROUND_BG: Color = Color::Rgb { r: 222, g: 73, b: 4 };
const C_BLOCK_BG: Color = Color::Rgb { r: 255, g: 197, b: 39 };
const C_SPENT_BLOCK_BG: Color = Color::Rgb { r: 255, g: 123, b: 31 };
const C_BRICK_FG: Color = Color::Rgb { r: 222, g: 75, b: 3 };
const C_BRICK_BG: Color = Color::Rgb { r: 28, g: 28, b: 28 };
const C_COIN: Color = Color::Rgb { r: 255, g: 197, b: 38 };
const C_ENEMY: Color = Color::Rgb { r: 255, g: 0, b: 0 };
const C_FIREBALL: Color = Color::Rgb { r: 255, g: 165, b: 0 };
const C_PLAYER_NORMAL: Color = Color::Yellow;
const C_PLAYER_SUPER: Color = Color::Green;
const C_PLAYER_FIRE: Color = Color::Rgb { r: 255, g: 0, b: 0 };

// ── Cells ─────────────────────────────────────────────────────────────────────

/// One grid cell: a single printable glyph plus optional styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    glyph: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
}

impl Cell {
    /// Rejects control characters; they would corrupt the terminal.
    pub fn new(glyph: char) -> Result<Self, DisplayError> {
        if glyph.is_control() {
            return Err(DisplayError::NonPrintable(glyph));
        }
        Ok(Self {
            glyph,
            fg: None,
            bg: None,
            bold: false,
            italic: false,
        })
    }

    pub const fn blank() -> Self {
        Self {
            glyph: ' ',
            fg: None,
            bg: None,
            bold: false,
            italic: false,
        }
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    pub fn fg(self, color: Color) -> Self {
        Self { fg: Some(color), ..self }
    }

    pub fn bg(self, color: Color) -> Self {
        Self { bg: Some(color), ..self }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self { italic: true, ..self }
    }
}

// ── Display buffer ────────────────────────────────────────────────────────────

/// Sparse cell → glyph map for one tick.  Later writes overwrite earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayBuffer {
    cells: HashMap<Coords, Cell>,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails fast on a cell the terminal cannot address.
    pub fn put(&mut self, at: Coords, cell: Cell) -> Result<(), DisplayError> {
        screen_position(at)?;
        self.cells.insert(at, cell);
        Ok(())
    }

    /// Write `text` one glyph per cell, starting at `at` and moving right.
    pub fn put_text(&mut self, at: Coords, text: &str) -> Result<(), DisplayError> {
        for (i, ch) in text.chars().enumerate() {
            self.put(at.offset(i as i32, 0), Cell::new(ch)?)?;
        }
        Ok(())
    }

    pub fn clear_cell(&mut self, at: Coords) -> Result<(), DisplayError> {
        self.put(at, Cell::blank())
    }

    pub fn get(&self, at: Coords) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in row-major order, so a sink paints top to bottom.
    pub fn iter_sorted(&self) -> Vec<(Coords, Cell)> {
        let mut cells: Vec<(Coords, Cell)> = self.cells.iter().map(|(&c, &v)| (c, v)).collect();
        cells.sort_by_key(|(c, _)| (c.y, c.x));
        cells
    }
}

/// Terminal column/row for a grid cell.
pub fn screen_position(at: Coords) -> Result<(u16, u16), DisplayError> {
    match (u16::try_from(at.x), u16::try_from(at.y)) {
        (Ok(col), Ok(row)) => Ok((col, row)),
        _ => Err(DisplayError::OffGrid { x: at.x, y: at.y }),
    }
}

fn on_grid(at: Coords) -> bool {
    screen_position(at).is_ok()
}

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Receives one sparse buffer per tick.
pub trait DisplaySink {
    fn submit(&mut self, buffer: &DisplayBuffer) -> Result<(), GameError>;
}

/// Paints buffers onto a terminal with queued crossterm commands.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn submit(&mut self, buffer: &DisplayBuffer) -> Result<(), GameError> {
        for (at, cell) in buffer.iter_sorted() {
            let (col, row) = screen_position(at)?;
            self.out.queue(cursor::MoveTo(col, row))?;
            if let Some(fg) = cell.fg {
                self.out.queue(style::SetForegroundColor(fg))?;
            }
            if let Some(bg) = cell.bg {
                self.out.queue(style::SetBackgroundColor(bg))?;
            }
            if cell.bold {
                self.out.queue(style::SetAttribute(Attribute::Bold))?;
            }
            if cell.italic {
                self.out.queue(style::SetAttribute(Attribute::Italic))?;
            }
            self.out.queue(Print(cell.glyph))?;
            self.out.queue(style::SetAttribute(Attribute::Reset))?;
            self.out.queue(style::ResetColor)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

// ── Per-entity drawing ────────────────────────────────────────────────────────

/// Anything that knows how to put itself into a display buffer.
pub trait Draw {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError>;
}

impl Draw for Ground {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError> {
        let tile = Cell::new('▒')?.fg(C_GROUND_FG).bg(C_GROUND_BG);
        for at in self.collision_coords() {
            buffer.put(at, tile)?;
        }
        Ok(())
    }
}

impl Draw for Collectible {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError> {
        let cell = match (self.kind, self.flags.hidden) {
            (CollectibleKind::Coin, false) => Cell::new('$')?.fg(C_COIN),
            (CollectibleKind::Coin, true) => Cell::blank(),
            (CollectibleKind::Powerup, false) => {
                Cell::new('?')?.fg(Color::White).bg(C_BLOCK_BG)
            }
            (CollectibleKind::Powerup, true) => Cell::blank().bg(C_SPENT_BLOCK_BG),
            (CollectibleKind::Brick, false) => Cell::new('▒')?.fg(C_BRICK_FG).bg(C_BRICK_BG),
            // A broken brick is blanked once, then left alone.
            (CollectibleKind::Brick, true) if self.flags.updated => return Ok(()),
            (CollectibleKind::Brick, true) => Cell::blank(),
        };
        buffer.put(self.pos, cell)
    }
}

impl Draw for Enemy {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError> {
        if self.previous_pos != self.pos && on_grid(self.previous_pos) {
            buffer.clear_cell(self.previous_pos)?;
        }
        if !on_grid(self.pos) {
            return Ok(());
        }
        if self.flags.hidden || self.flags.killed {
            buffer.clear_cell(self.pos)
        } else {
            buffer.put(self.pos, Cell::new('M')?.fg(C_ENEMY))
        }
    }
}

impl Draw for Fireball {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError> {
        if let Some(old) = self.old_pos.filter(|&old| old != self.pos && on_grid(old)) {
            buffer.clear_cell(old)?;
        }
        if !on_grid(self.pos) {
            return Ok(());
        }
        let glyph = if self.direction > 0 { '>' } else { '<' };
        buffer.put(self.pos, Cell::new(glyph)?.fg(C_FIREBALL))
    }
}

impl Draw for Player {
    fn draw(&self, buffer: &mut DisplayBuffer) -> Result<(), DisplayError> {
        if !on_grid(self.pos) {
            return Ok(());
        }
        let cell = match self.power {
            PowerState::Normal => Cell::new('P')?.fg(C_PLAYER_NORMAL),
            PowerState::Super => Cell::new('S')?.fg(C_PLAYER_SUPER).bold().italic(),
            PowerState::Fire => Cell::new('F')?.fg(C_PLAYER_FIRE),
            PowerState::Dead => Cell::new('P')?,
        };
        buffer.put(self.pos, cell)
    }
}

// ── HUD (rows 0-2) ────────────────────────────────────────────────────────────

fn draw_hud(buffer: &mut DisplayBuffer, state: &GameState) -> Result<(), DisplayError> {
    let player = &state.player;
    // Left column is padded so a shrinking number never leaves a stale digit.
    buffer.put_text(Coords::new(0, 0), &format!("{:<4}", player.coins_collected))?;
    buffer.put_text(Coords::new(0, 1), &format!("{:<4}", player.power.level()))?;
    let facing = match player.facing {
        Facing::Left => "Left ",
        Facing::Right => "Right",
    };
    buffer.put_text(Coords::new(0, 2), facing)?;
    buffer.put_text(
        Coords::new(5, 0),
        &format!("X Position: {}, Line: {}    ", player.pos.x, player.pos.y),
    )?;
    if let Some(last) = state.last_fireball {
        buffer.put_text(
            Coords::new(5, 1),
            &format!("Last fireball position: {}, {}    ", last.x, last.y),
        )?;
    }
    Ok(())
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Draw one tick into a fresh buffer.
///
/// `player_previous` is where the player was last drawn; it is blanked if the
/// player has since moved.  Blanks go in first so live entities win.
pub fn draw_frame(
    state: &GameState,
    player_previous: Option<Coords>,
) -> Result<DisplayBuffer, DisplayError> {
    let mut buffer = DisplayBuffer::new();

    for &at in state.vacated.iter().filter(|&&at| on_grid(at)) {
        buffer.clear_cell(at)?;
    }
    if let Some(prev) = player_previous.filter(|&p| p != state.player.pos && on_grid(p)) {
        buffer.clear_cell(prev)?;
    }

    state.ground.draw(&mut buffer)?;
    for item in state.coins.iter().chain(&state.powerups).chain(&state.bricks) {
        item.draw(&mut buffer)?;
    }
    for enemy in &state.enemies {
        enemy.draw(&mut buffer)?;
    }
    for fireball in &state.fireballs {
        fireball.draw(&mut buffer)?;
    }
    state.player.draw(&mut buffer)?;
    draw_hud(&mut buffer, state)?;

    Ok(buffer)
}

/// Record that blanked bricks have been painted, so they are not re-sent.
pub fn mark_bricks_painted(state: &mut GameState) {
    for brick in state.bricks.iter_mut().filter(|b| b.flags.hidden) {
        brick.flags.updated = true;
    }
}
