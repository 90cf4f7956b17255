/// WorldState: the complete snapshot of a running game.
///
/// ## Mutation discipline
///
/// The tile grid, switches and goals are fixed for the lifetime of a
/// level. `heroes`, `blocks` and `active_hero_index` are mutated only
/// by the event applier in `sim::step` (driven by the resolvers or by
/// undo). Everything under "Meta" and "Presentation" belongs to the
/// shell: the core never reads it.
///
/// Gate open-state is never stored — it is derived from switch
/// coverage at query time (`BoardView::gate_open`).

use crate::domain::entity::{Block, Gate, Hero, Switch};
use crate::domain::rules::BoardView;
use crate::domain::tile::{Pos, Tilemap};
use crate::sim::event::Turn;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    LevelSelect,
    Playing,
    LevelClear,
    GameComplete,
}

/// Transient teleport-beam descriptor, produced by the wizard
/// resolver. Presentation metadata only: the renderer draws it for a
/// cosmetic interval, the simulation never reads it back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BeamAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug)]
pub struct TeleportBeam {
    /// Tile nearest the origin (smallest x or y of the two endpoints).
    pub start: Pos,
    pub axis: BeamAxis,
    /// Length in tiles between the swapped entities.
    pub len: usize,
}

pub struct WorldState {
    // ── Level data (fixed per level) ──
    pub tilemap: Tilemap,
    pub switches: Vec<Switch>,
    pub goals: Vec<Pos>,

    // ── Simulation state ──
    pub heroes: Vec<Hero>,
    pub blocks: Vec<Block>,
    pub gates: Vec<Gate>,
    pub active_hero_index: usize,
    pub turns: Vec<Turn>,
    pub cleared: bool,

    // ── Presentation ──
    pub beam: Option<TeleportBeam>,
    /// Frames until the beam disappears. Ticked by the shell; purely
    /// cosmetic and never consulted by the simulation.
    pub beam_timer: u32,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    pub level_names: Vec<String>,
    pub select_cursor: usize,
    pub select_scroll: usize,
    pub popup: Option<String>,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            tilemap: Tilemap::new(vec![], 0),
            switches: vec![],
            goals: vec![],
            heroes: vec![],
            blocks: vec![],
            gates: vec![],
            active_hero_index: 0,
            turns: vec![],
            cleared: false,
            beam: None,
            beam_timer: 0,
            phase: Phase::Title,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            level_names: vec![],
            select_cursor: 0,
            select_scroll: 0,
            popup: None,
        }
    }

    /// Rule-query view over the current board.
    pub fn board(&self) -> BoardView<'_> {
        BoardView {
            tilemap: &self.tilemap,
            heroes: &self.heroes,
            blocks: &self.blocks,
            gates: &self.gates,
            switches: &self.switches,
        }
    }

    pub fn active_hero(&self) -> &Hero {
        &self.heroes[self.active_hero_index]
    }
}
