/// Occupancy and gate rules — pure queries over an immutable board view.
///
/// These encode "what is where" and "what is passable" without
/// performing any action.
///
/// ## Occupant priority
///
/// A tile reports at most one occupant, resolved in a fixed order:
///
/// ┌──────────────┬─────────────────────────────────────┐
/// │ Priority      │ Occupant                            │
/// ├──────────────┼─────────────────────────────────────┤
/// │ 1 (highest)   │ Block                               │
/// │ 2             │ Hero                                │
/// │ 3             │ Gate (open or closed)               │
/// │ 4             │ Wall (from the tile grid)           │
/// │ —             │ None (vacant)                       │
/// └──────────────┴─────────────────────────────────────┘
///
/// ## Gate state
///
/// A gate is OPEN iff **every** switch in its controlling set is
/// covered by a hero or a block (AND across the set; a gate with an
/// empty set is always open). Open gates never block movement.

use super::entity::{Block, Gate, Hero, Switch};
use super::tile::{Pos, Tilemap};

/// What occupies a tile, if anything.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupant {
    Block(usize),
    Hero(usize),
    Gate(usize),
    Wall,
}

/// Immutable view of the board for rule queries.
pub struct BoardView<'a> {
    pub tilemap: &'a Tilemap,
    pub heroes: &'a [Hero],
    pub blocks: &'a [Block],
    pub gates: &'a [Gate],
    pub switches: &'a [Switch],
}

impl<'a> BoardView<'a> {
    /// Occupant of `pos` per the priority table above. Switches are
    /// plates, not occupants: they never appear here.
    pub fn occupant_at(&self, pos: Pos) -> Option<Occupant> {
        if let Some(i) = self.blocks.iter().position(|b| b.pos == pos) {
            return Some(Occupant::Block(i));
        }
        if let Some(i) = self.heroes.iter().position(|h| h.pos == pos) {
            return Some(Occupant::Hero(i));
        }
        if let Some(i) = self.gates.iter().position(|g| g.pos == pos) {
            return Some(Occupant::Gate(i));
        }
        if self.tilemap.tile_at(pos).is_wall() {
            return Some(Occupant::Wall);
        }
        None
    }

    /// Is the switch tile at `pos` covered by a hero or a block?
    pub fn switch_covered(&self, pos: Pos) -> bool {
        self.heroes.iter().any(|h| h.pos == pos) || self.blocks.iter().any(|b| b.pos == pos)
    }

    /// Derived gate state: open iff every controlling switch is covered.
    pub fn gate_open(&self, gate_index: usize) -> bool {
        self.gates[gate_index]
            .switch_indices
            .iter()
            .all(|&si| self.switch_covered(self.switches[si].pos))
    }

    /// Can a hero or block come to rest on `pos`?
    /// True for a vacant tile and for an open gate, nothing else.
    pub fn can_occupy(&self, pos: Pos) -> bool {
        match self.occupant_at(pos) {
            None => true,
            Some(Occupant::Gate(g)) => self.gate_open(g),
            Some(_) => false,
        }
    }
}
