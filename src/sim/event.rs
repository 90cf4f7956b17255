/// Events emitted by the movement resolvers and the destroy pass.
///
/// One player command produces one Turn: the ordered events of that
/// command. Events are the only thing that mutates simulation state,
/// and the same events drive undo (reverse order, inverted semantics).
///
/// Entity references are bare indices into `heroes` / `blocks`.
/// Indices shift on removal (splice semantics), so an event is only
/// meaningful in the recording order of its own turn. Destroy events
/// therefore carry a full snapshot of the removed entity — enough to
/// resurrect it exactly on undo.

use crate::domain::entity::{Archetype, Facing};
use crate::domain::tile::Pos;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityRef {
    Hero(usize),
    Block(usize),
}

/// Snapshot of a destroyed entity, recorded at removal time.
///
/// For heroes the active-hero-index transition is part of the
/// snapshot: `active_before` is restored on undo, `active_after` is
/// what the index becomes when the removal is applied.
#[derive(Clone, Debug)]
pub enum Destroyed {
    Block {
        index: usize,
        pos: Pos,
    },
    Hero {
        index: usize,
        pos: Pos,
        archetype: Archetype,
        facing: Facing,
        active_before: usize,
        active_after: usize,
    },
}

#[derive(Clone, Debug)]
pub enum Event {
    Move {
        entity: EntityRef,
        from: Pos,
        to: Pos,
    },
    SwitchHero {
        prev: usize,
        next: usize,
    },
    Destroy(Destroyed),
}

/// Ordered events of one player command — the atomic unit of undo.
pub type Turn = Vec<Event>;
