/// Entities: heroes, blocks, switches, gates — plus the player command set.
/// All movement-blocking occupancy is derived from these at query time;
/// nothing here caches "what is on which tile".

use super::tile::{Direction, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Hero archetype. Selects the movement resolver:
/// warriors push, thieves pull, wizards teleport-swap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Archetype {
    Warrior,
    Thief,
    Wizard,
}

/// Walking is presentation state: set on heroes moved by the last
/// command, cleared at the start of the next one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeroState {
    Idle,
    Walking,
}

#[derive(Clone, Debug)]
pub struct Hero {
    pub archetype: Archetype,
    pub pos: Pos,
    pub facing: Facing,
    pub state: HeroState,
}

impl Hero {
    pub fn new(archetype: Archetype, pos: Pos) -> Self {
        Hero {
            archetype,
            pos,
            facing: Facing::Right,
            state: HeroState::Idle,
        }
    }
}

/// Blocks carry no state beyond position. They are pushable (warrior),
/// pullable (thief) and teleport-swappable (wizard).
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub pos: Pos,
}

impl Block {
    pub fn new(pos: Pos) -> Self {
        Block { pos }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GateColor {
    Yellow,
    Purple,
}

/// Static pressure plate. Covered when a hero or block occupies its tile.
/// Never moves, never blocks movement.
#[derive(Clone, Copy, Debug)]
pub struct Switch {
    pub pos: Pos,
    pub color: GateColor,
}

/// Gate: blocks movement unless every controlling switch is covered.
/// Open/closed is derived on demand, never stored.
#[derive(Clone, Debug)]
pub struct Gate {
    pub pos: Pos,
    pub color: GateColor,
    pub switch_indices: Vec<usize>,
}

/// One player command. `Reset` is not here: resetting rebuilds the
/// world from level data outside the event model.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    SwitchHero,
    Undo,
}
