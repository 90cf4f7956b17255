/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (a grid of Cells)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// The renderer is a pure consumer: it reads the world snapshot and
/// never mutates it. Each game tile occupies two terminal columns.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Archetype, Facing, GateColor, HeroState};
use crate::domain::tile::{Pos, Tile};
use crate::sim::world::{BeamAxis, Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// frame matches the cleared screen exactly.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 28 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position gets diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies one column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn put_str_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Palette ──

const WALL_FG: Color = Color::Rgb { r: 120, g: 120, b: 150 };
const FLOOR_FG: Color = Color::Rgb { r: 60, g: 60, b: 80 };
const GOAL_FG: Color = Color::Rgb { r: 120, g: 220, b: 120 };
const BLOCK_FG: Color = Color::Rgb { r: 200, g: 160, b: 90 };
const BEAM_FG: Color = Color::Rgb { r: 90, g: 140, b: 255 };
const DIM_FG: Color = Color::DarkGrey;
const TEXT_FG: Color = Color::Grey;
const TITLE_FG: Color = Color::Yellow;

fn gate_color(color: GateColor) -> Color {
    match color {
        GateColor::Yellow => Color::Rgb { r: 247, g: 226, b: 107 },
        GateColor::Purple => Color::Rgb { r: 160, g: 90, b: 230 },
    }
}

fn hero_color(archetype: Archetype) -> Color {
    match archetype {
        Archetype::Warrior => Color::Rgb { r: 235, g: 100, b: 90 },
        Archetype::Thief => Color::Rgb { r: 110, g: 210, b: 130 },
        Archetype::Wizard => Color::Rgb { r: 110, g: 160, b: 250 },
    }
}

fn hero_letter(archetype: Archetype) -> char {
    match archetype {
        Archetype::Warrior => 'W',
        Archetype::Thief => 'T',
        Archetype::Wizard => 'Z',
    }
}

// ── Renderer ──

/// Each game cell maps to two terminal columns: (gx*2, gx*2+1).
const CELL_W: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All),
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            cursor::Show,
            terminal::LeaveAlternateScreen,
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);

        let size_changed = tw != self.term_w || th != self.term_h;
        let phase_changed = self.last_phase != Some(world.phase);
        self.term_w = tw;
        self.term_h = th;
        self.last_phase = Some(world.phase);

        self.front.resize(tw, th);
        self.back.resize(tw, th);
        if size_changed || phase_changed {
            self.back.invalidate();
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All),
            )?;
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.draw_title(world),
            Phase::LevelSelect => self.draw_level_select(world),
            Phase::Playing | Phase::LevelClear => self.draw_game(world),
            Phase::GameComplete => self.draw_game_complete(),
        }

        self.flush_diff()
    }

    // ── Screens ──

    fn draw_title(&mut self, world: &WorldState) {
        let mid = self.term_h / 2;
        let f = &mut self.front;
        f.put_str_centered(mid.saturating_sub(4), "G A T E C R A S H E R S", TITLE_FG, Cell::BASE_BG);
        f.put_str_centered(
            mid.saturating_sub(2),
            "warrior pushes  ·  thief pulls  ·  wizard swaps",
            TEXT_FG,
            Cell::BASE_BG,
        );
        f.put_str_centered(mid + 1, "[Enter] Start", TEXT_FG, Cell::BASE_BG);
        f.put_str_centered(mid + 2, "[L] Select chamber", TEXT_FG, Cell::BASE_BG);
        f.put_str_centered(mid + 3, "[Q] Quit", TEXT_FG, Cell::BASE_BG);
        if !world.level_names.is_empty() {
            let line = format!("{} chambers loaded", world.level_names.len());
            f.put_str_centered(mid + 5, &line, DIM_FG, Cell::BASE_BG);
        }
    }

    fn draw_level_select(&mut self, world: &WorldState) {
        let f = &mut self.front;
        f.put_str_centered(1, "SELECT CHAMBER", TITLE_FG, Cell::BASE_BG);

        let visible = self.term_h.saturating_sub(5).max(1);
        let top = world.select_scroll;
        for (row, idx) in (top..world.level_names.len()).take(visible).enumerate() {
            let marker = if idx == world.select_cursor { "> " } else { "  " };
            let line = format!("{}{}", marker, world.level_names[idx]);
            let fg = if idx == world.select_cursor { TITLE_FG } else { TEXT_FG };
            let x = self.term_w.saturating_sub(30) / 2;
            self.front.put_str(x, 3 + row, &line, fg, Cell::BASE_BG);
        }

        let hint_row = self.term_h.saturating_sub(1);
        self.front
            .put_str_centered(hint_row, "[Enter] Play   [Esc] Back", DIM_FG, Cell::BASE_BG);
    }

    fn draw_game_complete(&mut self) {
        let mid = self.term_h / 2;
        let f = &mut self.front;
        f.put_str_centered(mid.saturating_sub(1), "ALL CHAMBERS CLEARED", TITLE_FG, Cell::BASE_BG);
        f.put_str_centered(mid + 1, "[Enter] Back to title", TEXT_FG, Cell::BASE_BG);
    }

    // ── Game board ──

    fn draw_game(&mut self, world: &WorldState) {
        let cols = world.tilemap.cols();
        let rows = world.tilemap.rows();
        let origin_x = self.term_w.saturating_sub(cols * CELL_W) / 2;
        let origin_y = (self.term_h.saturating_sub(rows) / 2).max(2);

        self.draw_hud(world);
        self.draw_tiles(world, origin_x, origin_y);
        self.draw_goals(world, origin_x, origin_y);
        self.draw_gates(world, origin_x, origin_y);
        self.draw_switches(world, origin_x, origin_y);
        self.draw_beam(world, origin_x, origin_y);
        self.draw_blocks(world, origin_x, origin_y);
        self.draw_heroes(world, origin_x, origin_y);

        if world.phase == Phase::LevelClear {
            self.draw_box(&["Chamber cleared!"]);
        } else if let Some(message) = &world.popup {
            self.draw_box(&[message, "", "Press X to continue"]);
        }
    }

    fn draw_hud(&mut self, world: &WorldState) {
        let left = format!(
            " Chamber {}/{}  {}",
            world.current_level + 1,
            world.total_levels.max(1),
            world.level_name,
        );
        self.front.put_str(0, 0, &left, TEXT_FG, Cell::BASE_BG);

        let help = "[Z] Undo  [X] Switch  [R] Reset  [Esc] Chambers ";
        let x = self.term_w.saturating_sub(help.chars().count());
        self.front.put_str(x, 0, help, DIM_FG, Cell::BASE_BG);
    }

    fn cell_origin(&self, origin_x: usize, origin_y: usize, pos: Pos) -> (usize, usize) {
        (origin_x + pos.x * CELL_W, origin_y + pos.y)
    }

    fn draw_tiles(&mut self, world: &WorldState, ox: usize, oy: usize) {
        for y in 0..world.tilemap.rows() {
            for x in 0..world.tilemap.cols() {
                let pos = Pos::new(x, y);
                let (cx, cy) = self.cell_origin(ox, oy, pos);
                match world.tilemap.tile_at(pos) {
                    Tile::Wall => self.front.put_str(cx, cy, "██", WALL_FG, Cell::BASE_BG),
                    Tile::Floor => self.front.put_str(cx, cy, "· ", FLOOR_FG, Cell::BASE_BG),
                    Tile::Empty => {}
                }
            }
        }
    }

    fn draw_goals(&mut self, world: &WorldState, ox: usize, oy: usize) {
        for &goal in &world.goals {
            let (cx, cy) = self.cell_origin(ox, oy, goal);
            self.front.put_str(cx, cy, "◎ ", GOAL_FG, Cell::BASE_BG);
        }
    }

    fn draw_gates(&mut self, world: &WorldState, ox: usize, oy: usize) {
        let view = world.board();
        for (i, gate) in world.gates.iter().enumerate() {
            let (cx, cy) = self.cell_origin(ox, oy, gate.pos);
            let fg = gate_color(gate.color);
            if view.gate_open(i) {
                self.front.put_str(cx, cy, "░░", fg, Cell::BASE_BG);
            } else {
                self.front.put_str(cx, cy, "▓▓", fg, Cell::BASE_BG);
            }
        }
    }

    fn draw_switches(&mut self, world: &WorldState, ox: usize, oy: usize) {
        for switch in &world.switches {
            let (cx, cy) = self.cell_origin(ox, oy, switch.pos);
            self.front
                .put_str(cx, cy, "◉ ", gate_color(switch.color), Cell::BASE_BG);
        }
    }

    /// The teleport beam spans every tile between the swapped pair;
    /// the entities drawn afterwards overpaint its endpoints.
    fn draw_beam(&mut self, world: &WorldState, ox: usize, oy: usize) {
        let beam = match (&world.beam, world.beam_timer > 0) {
            (Some(beam), true) => *beam,
            _ => return,
        };
        for i in 0..=beam.len {
            let pos = match beam.axis {
                BeamAxis::Horizontal => Pos::new(beam.start.x + i, beam.start.y),
                BeamAxis::Vertical => Pos::new(beam.start.x, beam.start.y + i),
            };
            let (cx, cy) = self.cell_origin(ox, oy, pos);
            let glyph = match beam.axis {
                BeamAxis::Horizontal => "══",
                BeamAxis::Vertical => "║ ",
            };
            self.front.put_str(cx, cy, glyph, BEAM_FG, Cell::BASE_BG);
        }
    }

    fn draw_blocks(&mut self, world: &WorldState, ox: usize, oy: usize) {
        for block in &world.blocks {
            let (cx, cy) = self.cell_origin(ox, oy, block.pos);
            self.front.put_str(cx, cy, "▣ ", BLOCK_FG, Cell::BASE_BG);
        }
    }

    fn draw_heroes(&mut self, world: &WorldState, ox: usize, oy: usize) {
        for (i, hero) in world.heroes.iter().enumerate() {
            let (cx, cy) = self.cell_origin(ox, oy, hero.pos);
            let active = i == world.active_hero_index;
            let fg = if active { hero_color(hero.archetype) } else { DIM_FG };
            let face = match hero.facing {
                Facing::Left => '‹',
                Facing::Right => '›',
            };
            let mark = if hero.state == HeroState::Walking { face } else { ' ' };
            let text: String = [hero_letter(hero.archetype), mark].iter().collect();
            self.front.put_str(cx, cy, &text, fg, Cell::BASE_BG);
        }
    }

    /// Centered bordered box, used for popups and the clear banner.
    fn draw_box(&mut self, lines: &[&str]) {
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let height = lines.len() + 2;
        let x0 = self.term_w.saturating_sub(inner) / 2;
        let y0 = self.term_h.saturating_sub(height) / 2;

        let horizontal: String = "─".repeat(inner.saturating_sub(2));
        self.front
            .put_str(x0, y0, &format!("┌{horizontal}┐"), TEXT_FG, Cell::BASE_BG);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner.saturating_sub(2);
            let padded = format!("{:^pad$}", line);
            self.front
                .put_str(x0, y0 + 1 + i, &format!("│{padded}│"), TEXT_FG, Cell::BASE_BG);
        }
        self.front.put_str(
            x0,
            y0 + height - 1,
            &format!("└{horizontal}┘"),
            TEXT_FG,
            Cell::BASE_BG,
        );
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    x += 1;
                    continue;
                }

                queue!(self.writer, MoveTo(x as u16, y as u16))?;
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
                x += 1;
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}
