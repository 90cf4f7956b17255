/// The command pipeline: one player command in, one Turn out.
///
/// Processing order for a Move command:
///   1. Resolve  — the active hero's archetype turns the direction
///                 into an ordered list of Move events (may be empty).
///   2. Apply    — events mutate state in recording order.
///   3. Destroy  — entities now standing on a closed gate are removed;
///                 the closed-gate set is derived once, removals are
///                 applied immediately and appended to the same Turn.
///   4. Record   — the Turn is pushed onto the log; a command that
///                 produced no events records nothing and changes
///                 nothing.
///   5. Win      — cleared = every goal tile holds a hero.
///
/// Undo pops exactly one Turn and reverse-applies its events in
/// reverse order with inverted semantics. There is no separate
/// inverse-state bookkeeping: the applier is the single source of
/// truth for both directions.

use crate::domain::entity::{Archetype, Block, Command, Facing, Hero, HeroState};
use crate::domain::rules::Occupant;
use crate::domain::tile::{Direction, Pos};
use crate::sim::event::{Destroyed, EntityRef, Event, Turn};
use crate::sim::world::{BeamAxis, TeleportBeam, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Execute one player command. Returns false for the idempotent
/// no-ops: a fully blocked move, SwitchHero with a single hero, Undo
/// on an empty log.
pub fn command(world: &mut WorldState, cmd: Command) -> bool {
    let changed = match cmd {
        Command::Move(dir) => move_command(world, dir),
        Command::SwitchHero => switch_hero_command(world),
        Command::Undo => undo_command(world),
    };
    if changed {
        world.cleared = all_goals_held(world);
    }
    changed
}

fn move_command(world: &mut WorldState, dir: Direction) -> bool {
    let (events, beam) = resolve(world, dir);
    if events.is_empty() {
        return false;
    }

    for hero in &mut world.heroes {
        hero.state = HeroState::Idle;
    }
    world.beam = None;

    let mut turn: Turn = events;
    for event in &turn {
        apply(world, event);
    }
    destroy_pass(world, &mut turn);
    world.beam = beam;
    world.turns.push(turn);
    true
}

fn switch_hero_command(world: &mut WorldState) -> bool {
    if world.heroes.len() <= 1 {
        return false;
    }
    for hero in &mut world.heroes {
        hero.state = HeroState::Idle;
    }
    world.beam = None;

    let prev = world.active_hero_index;
    let next = (prev + 1) % world.heroes.len();
    let event = Event::SwitchHero { prev, next };
    apply(world, &event);
    world.turns.push(vec![event]);
    true
}

fn undo_command(world: &mut WorldState) -> bool {
    let turn = match world.turns.pop() {
        Some(t) => t,
        None => return false,
    };
    for hero in &mut world.heroes {
        hero.state = HeroState::Idle;
    }
    world.beam = None;

    for event in turn.iter().rev() {
        revert(world, event);
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Movement resolvers — one capability, keyed by archetype
// ══════════════════════════════════════════════════════════════

fn resolve(world: &WorldState, dir: Direction) -> (Vec<Event>, Option<TeleportBeam>) {
    match world.active_hero().archetype {
        Archetype::Warrior => (resolve_push(world, dir), None),
        Archetype::Thief => (resolve_pull(world, dir), None),
        Archetype::Wizard => resolve_swap(world, dir),
    }
}

/// Warrior: walk the push chain forward from the hero.
///
/// Empty tile terminates the chain; an open gate is treated as the
/// empty terminal tile (the scan stops there and never looks past
/// it). A wall or closed gate cancels the whole move. Destinations
/// are computed against pre-move state for every chained entity.
fn resolve_push(world: &WorldState, dir: Direction) -> Vec<Event> {
    let view = world.board();
    let hero_index = world.active_hero_index;

    let mut chain = vec![EntityRef::Hero(hero_index)];
    let mut prev = world.heroes[hero_index].pos;
    let mut next = view.tilemap.neighbor(prev, dir);
    loop {
        if next == prev {
            // Clamped at the grid edge with nothing to stop on.
            chain.clear();
            break;
        }
        match view.occupant_at(next) {
            None => break,
            Some(Occupant::Gate(g)) if view.gate_open(g) => break,
            Some(Occupant::Wall) | Some(Occupant::Gate(_)) => {
                chain.clear();
                break;
            }
            Some(Occupant::Block(i)) => chain.push(EntityRef::Block(i)),
            Some(Occupant::Hero(i)) => chain.push(EntityRef::Hero(i)),
        }
        prev = next;
        next = view.tilemap.neighbor(next, dir);
    }

    chain
        .into_iter()
        .map(|entity| {
            let from = entity_pos(world, entity);
            Event::Move {
                entity,
                from,
                to: view.tilemap.neighbor(from, dir),
            }
        })
        .collect()
}

/// Thief: step into an empty/open-gate forward tile, dragging
/// whatever block or hero sits directly behind onto the vacated
/// tile. Anything else ahead makes the whole input a no-op.
fn resolve_pull(world: &WorldState, dir: Direction) -> Vec<Event> {
    let view = world.board();
    let hero_index = world.active_hero_index;
    let cur = world.heroes[hero_index].pos;

    let fwd = view.tilemap.neighbor(cur, dir);
    if fwd == cur || !view.can_occupy(fwd) {
        return vec![];
    }

    let mut events = vec![];
    let behind = view.tilemap.neighbor(cur, dir.opposite());
    if behind != cur {
        match view.occupant_at(behind) {
            Some(Occupant::Block(i)) => events.push(Event::Move {
                entity: EntityRef::Block(i),
                from: world.blocks[i].pos,
                to: cur,
            }),
            Some(Occupant::Hero(i)) => events.push(Event::Move {
                entity: EntityRef::Hero(i),
                from: world.heroes[i].pos,
                to: cur,
            }),
            _ => {}
        }
    }
    events.push(Event::Move {
        entity: EntityRef::Hero(hero_index),
        from: cur,
        to: fwd,
    });
    events
}

/// Wizard: scan forward for the first block or hero and swap
/// positions with it. Only walls and closed gates stop the scan —
/// the wizard sees past any number of open tiles. With no target in
/// sight, fall back to an ordinary step.
fn resolve_swap(world: &WorldState, dir: Direction) -> (Vec<Event>, Option<TeleportBeam>) {
    let view = world.board();
    let hero_index = world.active_hero_index;
    let cur = world.heroes[hero_index].pos;

    let mut found = None;
    let mut prev = cur;
    let mut scan = view.tilemap.neighbor(cur, dir);
    loop {
        if scan == prev {
            break;
        }
        match view.occupant_at(scan) {
            Some(Occupant::Wall) => break,
            Some(Occupant::Gate(g)) if !view.gate_open(g) => break,
            Some(Occupant::Block(i)) => {
                found = Some(EntityRef::Block(i));
                break;
            }
            Some(Occupant::Hero(i)) => {
                found = Some(EntityRef::Hero(i));
                break;
            }
            _ => {} // vacant tile or open gate: the scan passes
        }
        prev = scan;
        scan = view.tilemap.neighbor(scan, dir);
    }

    match found {
        Some(target) => {
            let target_pos = entity_pos(world, target);
            let events = vec![
                Event::Move {
                    entity: EntityRef::Hero(hero_index),
                    from: cur,
                    to: target_pos,
                },
                Event::Move {
                    entity: target,
                    from: target_pos,
                    to: cur,
                },
            ];
            (events, Some(beam_between(cur, target_pos)))
        }
        None => {
            let fwd = view.tilemap.neighbor(cur, dir);
            if fwd != cur && view.can_occupy(fwd) {
                let step = Event::Move {
                    entity: EntityRef::Hero(hero_index),
                    from: cur,
                    to: fwd,
                };
                (vec![step], None)
            } else {
                (vec![], None)
            }
        }
    }
}

fn beam_between(a: Pos, b: Pos) -> TeleportBeam {
    if a.y == b.y {
        TeleportBeam {
            start: Pos::new(a.x.min(b.x), a.y),
            axis: BeamAxis::Horizontal,
            len: a.x.abs_diff(b.x),
        }
    } else {
        TeleportBeam {
            start: Pos::new(a.x, a.y.min(b.y)),
            axis: BeamAxis::Vertical,
            len: a.y.abs_diff(b.y),
        }
    }
}

fn entity_pos(world: &WorldState, entity: EntityRef) -> Pos {
    match entity {
        EntityRef::Hero(i) => world.heroes[i].pos,
        EntityRef::Block(i) => world.blocks[i].pos,
    }
}

// ══════════════════════════════════════════════════════════════
// Destroy pass
// ══════════════════════════════════════════════════════════════

/// Remove every block or hero stranded on a closed gate.
///
/// The closed-gate set is derived once after the Move events; each
/// removal is found against current state and applied immediately,
/// so the recorded index is valid at its apply time. Removals that
/// uncover a switch do not re-derive the set (no fixpoint).
fn destroy_pass(world: &mut WorldState, turn: &mut Turn) {
    let closed: Vec<Pos> = {
        let view = world.board();
        (0..world.gates.len())
            .filter(|&g| !view.gate_open(g))
            .map(|g| world.gates[g].pos)
            .collect()
    };

    while let Some(event) = find_stranded(world, &closed) {
        apply(world, &event);
        turn.push(event);
    }
}

fn find_stranded(world: &WorldState, closed: &[Pos]) -> Option<Event> {
    for &gate_pos in closed {
        if let Some(i) = world.blocks.iter().position(|b| b.pos == gate_pos) {
            return Some(Event::Destroy(Destroyed::Block { index: i, pos: gate_pos }));
        }
        if let Some(i) = world.heroes.iter().position(|h| h.pos == gate_pos) {
            let active = world.active_hero_index;
            let active_after = if i == active {
                active.saturating_sub(1)
            } else if i < active {
                active - 1
            } else {
                active
            };
            let hero = &world.heroes[i];
            return Some(Event::Destroy(Destroyed::Hero {
                index: i,
                pos: gate_pos,
                archetype: hero.archetype,
                facing: hero.facing,
                active_before: active,
                active_after,
            }));
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Event applier — forward and inverted
// ══════════════════════════════════════════════════════════════

fn apply(world: &mut WorldState, event: &Event) {
    match event {
        Event::Move { entity, from, to } => match *entity {
            EntityRef::Hero(i) => move_hero(world, i, *from, *to),
            EntityRef::Block(i) => world.blocks[i].pos = *to,
        },
        Event::SwitchHero { next, .. } => world.active_hero_index = *next,
        Event::Destroy(destroyed) => match destroyed {
            Destroyed::Block { index, .. } => {
                world.blocks.remove(*index);
            }
            Destroyed::Hero { index, active_after, .. } => {
                world.heroes.remove(*index);
                world.active_hero_index = *active_after;
            }
        },
    }
}

/// Inverted application for undo. Move swaps from/to, SwitchHero
/// swaps prev/next, Destroy re-inserts the snapshot at the end of
/// its collection (it need not regain its original index).
fn revert(world: &mut WorldState, event: &Event) {
    match event {
        Event::Move { entity, from, to } => match *entity {
            EntityRef::Hero(i) => move_hero(world, i, *to, *from),
            EntityRef::Block(i) => world.blocks[i].pos = *from,
        },
        Event::SwitchHero { prev, .. } => world.active_hero_index = *prev,
        Event::Destroy(destroyed) => match destroyed {
            Destroyed::Block { pos, .. } => world.blocks.push(Block::new(*pos)),
            Destroyed::Hero {
                pos,
                archetype,
                facing,
                active_before,
                ..
            } => {
                world.heroes.push(Hero {
                    archetype: *archetype,
                    pos: *pos,
                    facing: *facing,
                    state: HeroState::Idle,
                });
                world.active_hero_index = *active_before;
            }
        },
    }
}

fn move_hero(world: &mut WorldState, index: usize, from: Pos, to: Pos) {
    let hero = &mut world.heroes[index];
    if to.x < from.x {
        hero.facing = Facing::Left;
    }
    if to.x > from.x {
        hero.facing = Facing::Right;
    }
    hero.pos = to;
    hero.state = HeroState::Walking;
}

// ══════════════════════════════════════════════════════════════
// Win check
// ══════════════════════════════════════════════════════════════

/// Level cleared: every goal tile holds a hero. Order-independent.
fn all_goals_held(world: &WorldState) -> bool {
    world
        .goals
        .iter()
        .all(|goal| world.heroes.iter().any(|h| h.pos == *goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{build_world, LevelDef};

    fn world(rows: &[&str]) -> WorldState {
        let def = LevelDef {
            name: "test".to_string(),
            popup: None,
            rows: rows.iter().map(|s| s.to_string()).collect(),
        };
        build_world(&def)
    }

    fn hero_pos(w: &WorldState, i: usize) -> Pos {
        w.heroes[i].pos
    }

    // ── Warrior ──

    #[test]
    fn warrior_step_into_empty_is_one_move() {
        let mut w = world(&[
            "#####",
            "#W..#",
            "#####",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(w.turns.len(), 1);
        assert_eq!(w.turns[0].len(), 1);
        assert_eq!(w.heroes[0].facing, Facing::Right);
    }

    #[test]
    fn warrior_facing_tracks_horizontal_moves_only() {
        let mut w = world(&[
            "#####",
            "#...#",
            "#.W.#",
            "#...#",
            "#####",
        ]);
        command(&mut w, Command::Move(Direction::Left));
        assert_eq!(w.heroes[0].facing, Facing::Left);
        command(&mut w, Command::Move(Direction::Up));
        assert_eq!(w.heroes[0].facing, Facing::Left); // unchanged on vertical
    }

    #[test]
    fn warrior_pushes_chain_of_two_blocks() {
        let mut w = world(&[
            "#######",
            "#WBB..#",
            "#######",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        let turn = &w.turns[0];
        assert_eq!(turn.len(), 3); // hero + two blocks, atomically
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(3, 1));
        assert_eq!(w.blocks[1].pos, Pos::new(4, 1));
    }

    #[test]
    fn warrior_chain_into_wall_cancels_whole_move() {
        let mut w = world(&[
            "######",
            "#.WB##",
            "######",
        ]);
        let before = hero_pos(&w, 0);
        assert!(!command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), before);
        assert_eq!(w.blocks[0].pos, Pos::new(3, 1));
        assert!(w.turns.is_empty()); // blocked move records no turn
    }

    #[test]
    fn warrior_pushes_other_hero() {
        let mut w = world(&[
            "######",
            "#WT..#",
            "######",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(hero_pos(&w, 1), Pos::new(3, 1));
    }

    #[test]
    fn warrior_push_stops_at_open_gate_tile() {
        // Gate with no controlling switches is always open; the chain
        // terminates on the gate tile and never looks past it.
        let mut w = world(&[
            "######",
            "#WBg.#",
            "######",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(3, 1)); // on the open gate
    }

    #[test]
    fn warrior_push_into_closed_gate_cancels() {
        let mut w = world(&[
            "#######",
            "#WBg.s#",
            "#######",
        ]);
        // Switch uncovered, gate closed.
        assert!(!command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(1, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(2, 1));
    }

    // ── Thief ──

    #[test]
    fn thief_pulls_adjacent_block() {
        let mut w = world(&[
            "######",
            "#BT..#",
            "######",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        let turn = &w.turns[0];
        assert_eq!(turn.len(), 2); // block onto the old tile, thief forward
        assert_eq!(w.blocks[0].pos, Pos::new(2, 1));
        assert_eq!(hero_pos(&w, 0), Pos::new(3, 1));
    }

    #[test]
    fn thief_ignores_distant_block() {
        let mut w = world(&[
            "########",
            "#B..T..#",
            "########",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(w.turns[0].len(), 1); // pull requires direct adjacency
        assert_eq!(w.blocks[0].pos, Pos::new(1, 1));
        assert_eq!(hero_pos(&w, 0), Pos::new(5, 1));
    }

    #[test]
    fn thief_pulls_hero() {
        let mut w = world(&[
            "######",
            "#WT..#",
            "######",
        ]);
        command(&mut w, Command::SwitchHero); // activate the thief
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1)); // warrior dragged
        assert_eq!(hero_pos(&w, 1), Pos::new(3, 1));
    }

    #[test]
    fn thief_never_pushes() {
        let mut w = world(&[
            "######",
            "#.TB.#",
            "######",
        ]);
        assert!(!command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(3, 1));
    }

    #[test]
    fn thief_steps_through_open_gate() {
        let mut w = world(&[
            "######",
            "#BTg.#",
            "######",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(3, 1)); // onto the open gate
        assert_eq!(w.blocks[0].pos, Pos::new(2, 1));
    }

    // ── Wizard ──

    #[test]
    fn wizard_swaps_with_distant_block() {
        let mut w = world(&[
            "########",
            "#Z...B.#",
            "########",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(5, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(1, 1));
        let beam = w.beam.expect("swap produces a beam");
        assert_eq!(beam.start, Pos::new(1, 1));
        assert_eq!(beam.axis, BeamAxis::Horizontal);
        assert_eq!(beam.len, 4);
    }

    #[test]
    fn wizard_swap_twice_is_involution() {
        let mut w = world(&[
            "########",
            "#Z...B.#",
            "########",
        ]);
        command(&mut w, Command::Move(Direction::Right));
        command(&mut w, Command::Move(Direction::Left));
        assert_eq!(hero_pos(&w, 0), Pos::new(1, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(5, 1));
    }

    #[test]
    fn wizard_swaps_with_hero_vertically() {
        let mut w = world(&[
            "###",
            "#Z#",
            "#.#",
            "#W#",
            "###",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Down)));
        assert_eq!(hero_pos(&w, 0), Pos::new(1, 3)); // wizard (spawned first row)
        assert_eq!(hero_pos(&w, 1), Pos::new(1, 1)); // warrior
        let beam = w.beam.expect("swap produces a beam");
        assert_eq!(beam.start, Pos::new(1, 1));
        assert_eq!(beam.axis, BeamAxis::Vertical);
        assert_eq!(beam.len, 2);
    }

    #[test]
    fn wizard_scan_blocked_by_wall_falls_back_to_step() {
        let mut w = world(&[
            "########",
            "#Z..#B.#",
            "########",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1)); // ordinary step
        assert_eq!(w.blocks[0].pos, Pos::new(5, 1));
        assert!(w.beam.is_none());
    }

    #[test]
    fn wizard_scan_passes_open_gate() {
        let mut w = world(&[
            "########",
            "#Z.g.B.#",
            "########",
        ]);
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(5, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(1, 1));
    }

    #[test]
    fn wizard_scan_stopped_by_closed_gate() {
        let mut w = world(&[
            "##########",
            "#Z.g.B..s#",
            "##########",
        ]);
        // Switch uncovered: the gate is closed, the scan stops there,
        // and the fallback step into the empty forward tile applies.
        assert!(command(&mut w, Command::Move(Direction::Right)));
        assert_eq!(hero_pos(&w, 0), Pos::new(2, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(5, 1));
    }

    #[test]
    fn wizard_fully_blocked_is_noop() {
        let mut w = world(&[
            "###",
            "#Z#",
            "###",
        ]);
        assert!(!command(&mut w, Command::Move(Direction::Right)));
        assert!(w.turns.is_empty());
    }

    // ── Gates, switches, destroy ──

    #[test]
    fn block_on_switch_opens_gate_for_passage() {
        let mut w = world(&[
            "#######",
            "#WB.s.#",
            "#...g.#",
            "#######",
        ]);
        // Push the block onto the switch: two moves right.
        command(&mut w, Command::Move(Direction::Right));
        command(&mut w, Command::Move(Direction::Right));
        assert_eq!(w.blocks[0].pos, Pos::new(4, 1));
        assert!(w.board().gate_open(0));
    }

    #[test]
    fn hero_stranded_on_closing_gate_is_destroyed() {
        let mut w = world(&[
            "########",
            "#W.s...#",
            "#..g..T#",
            "########",
        ]);
        command(&mut w, Command::Move(Direction::Right));
        command(&mut w, Command::Move(Direction::Right)); // warrior onto the switch
        assert!(w.board().gate_open(0));
        command(&mut w, Command::SwitchHero);
        for _ in 0..3 {
            command(&mut w, Command::Move(Direction::Left)); // thief onto the open gate
        }
        assert_eq!(hero_pos(&w, 1), Pos::new(3, 2));
        command(&mut w, Command::SwitchHero);
        command(&mut w, Command::Move(Direction::Left)); // off the switch: gate closes

        assert_eq!(w.heroes.len(), 1);
        assert_eq!(w.heroes[0].archetype, Archetype::Warrior);
        assert_eq!(w.active_hero_index, 0);
        let last = w.turns.last().expect("turn recorded");
        assert!(matches!(last.last(), Some(Event::Destroy(Destroyed::Hero { .. }))));
    }

    #[test]
    fn undo_resurrects_destroyed_hero_with_active_index() {
        let mut w = world(&[
            "########",
            "#W.s...#",
            "#..g..T#",
            "########",
        ]);
        command(&mut w, Command::Move(Direction::Right));
        command(&mut w, Command::Move(Direction::Right));
        command(&mut w, Command::SwitchHero);
        for _ in 0..3 {
            command(&mut w, Command::Move(Direction::Left));
        }
        command(&mut w, Command::SwitchHero);
        command(&mut w, Command::Move(Direction::Left)); // destroys the thief
        assert_eq!(w.heroes.len(), 1);

        assert!(command(&mut w, Command::Undo));
        assert_eq!(w.heroes.len(), 2);
        let thief = w
            .heroes
            .iter()
            .find(|h| h.archetype == Archetype::Thief)
            .expect("thief resurrected");
        assert_eq!(thief.pos, Pos::new(3, 2));
        assert_eq!(thief.facing, Facing::Left);
        assert_eq!(w.active_hero_index, 0);
        assert_eq!(hero_pos(&w, 0), Pos::new(3, 1)); // warrior back on the switch
        assert!(w.board().gate_open(0));
    }

    #[test]
    fn active_hero_destroying_itself_shifts_active_index_down() {
        let mut w = world(&[
            "######",
            "#W.sT#",
            "#..g.#",
            "######",
        ]);
        command(&mut w, Command::SwitchHero); // thief active
        command(&mut w, Command::Move(Direction::Left)); // thief covers the switch
        assert!(w.board().gate_open(0));
        // Stepping onto the gate uncovers the switch: the gate closes
        // under the thief in the same turn.
        command(&mut w, Command::Move(Direction::Down));

        assert_eq!(w.heroes.len(), 1);
        assert_eq!(w.active_hero_index, 0);
        match w.turns.last().and_then(|t| t.last()) {
            Some(Event::Destroy(Destroyed::Hero { active_before, active_after, .. })) => {
                assert_eq!(*active_before, 1);
                assert_eq!(*active_after, 0);
            }
            other => panic!("expected hero destroy, got {other:?}"),
        }

        assert!(command(&mut w, Command::Undo));
        assert_eq!(w.heroes.len(), 2);
        assert_eq!(w.active_hero_index, 1);
        assert_eq!(hero_pos(&w, 1), Pos::new(3, 1));
    }

    #[test]
    fn block_stranded_on_closing_gate_is_destroyed_and_undone() {
        let mut w = world(&[
            "#######",
            "#W.s..#",
            "#..g..#",
            "#######",
        ]);
        // Stage: warrior covering the switch, block resting on the
        // open gate.
        w.heroes[0].pos = Pos::new(3, 1);
        w.blocks.push(Block::new(Pos::new(3, 2)));
        assert!(w.board().gate_open(0));

        command(&mut w, Command::Move(Direction::Left)); // off the switch: gate closes
        assert!(w.blocks.is_empty());
        let last = w.turns.last().expect("turn recorded");
        assert_eq!(last.len(), 2); // warrior move + block destroy

        assert!(command(&mut w, Command::Undo));
        assert_eq!(w.blocks.len(), 1);
        assert_eq!(w.blocks[0].pos, Pos::new(3, 2));
        assert_eq!(hero_pos(&w, 0), Pos::new(3, 1));
    }

    #[test]
    fn multiple_destroys_in_one_turn_use_live_indices() {
        let mut w = world(&[
            "########",
            "#W.s...#",
            "#..g.g.#",
            "########",
        ]);
        // Both gates answer to the single yellow switch. Stage: the
        // warrior covers it, blocks rest on both open gates.
        w.heroes[0].pos = Pos::new(3, 1);
        w.blocks.push(Block::new(Pos::new(3, 2)));
        w.blocks.push(Block::new(Pos::new(5, 2)));

        command(&mut w, Command::Move(Direction::Left)); // both gates close
        assert!(w.blocks.is_empty());
        assert_eq!(w.turns.last().map(|t| t.len()), Some(3));

        assert!(command(&mut w, Command::Undo));
        let mut positions: Vec<Pos> = w.blocks.iter().map(|b| b.pos).collect();
        positions.sort_by_key(|p| (p.y, p.x));
        assert_eq!(positions, vec![Pos::new(3, 2), Pos::new(5, 2)]);
    }

    // ── Undo / turn log ──

    #[test]
    fn undo_restores_exact_pre_turn_positions() {
        let mut w = world(&[
            "#######",
            "#WBB..#",
            "#######",
        ]);
        command(&mut w, Command::Move(Direction::Right));
        assert!(command(&mut w, Command::Undo));
        assert_eq!(hero_pos(&w, 0), Pos::new(1, 1));
        assert_eq!(w.blocks[0].pos, Pos::new(2, 1));
        assert_eq!(w.blocks[1].pos, Pos::new(3, 1));
        assert!(w.turns.is_empty());
    }

    #[test]
    fn undo_with_empty_log_is_noop() {
        let mut w = world(&[
            "#####",
            "#W..#",
            "#####",
        ]);
        assert!(!command(&mut w, Command::Undo));
        assert_eq!(hero_pos(&w, 0), Pos::new(1, 1));
    }

    #[test]
    fn undo_of_switch_hero_restores_previous_index() {
        let mut w = world(&[
            "######",
            "#W.T.#",
            "######",
        ]);
        command(&mut w, Command::SwitchHero);
        assert_eq!(w.active_hero_index, 1);
        assert!(command(&mut w, Command::Undo));
        assert_eq!(w.active_hero_index, 0);
    }

    #[test]
    fn blocked_move_records_no_turn() {
        let mut w = world(&[
            "###",
            "#W#",
            "###",
        ]);
        assert!(!command(&mut w, Command::Move(Direction::Right)));
        assert!(!command(&mut w, Command::Move(Direction::Up)));
        assert!(w.turns.is_empty());
    }

    // ── SwitchHero ──

    #[test]
    fn switch_hero_cycles_in_spawn_order() {
        let mut w = world(&[
            "########",
            "#W.T.Z.#",
            "########",
        ]);
        assert_eq!(w.active_hero_index, 0);
        command(&mut w, Command::SwitchHero);
        assert_eq!(w.active_hero_index, 1);
        command(&mut w, Command::SwitchHero);
        assert_eq!(w.active_hero_index, 2);
        command(&mut w, Command::SwitchHero);
        assert_eq!(w.active_hero_index, 0);
        assert_eq!(w.turns.len(), 3);
    }

    #[test]
    fn switch_hero_with_single_hero_is_noop() {
        let mut w = world(&[
            "#####",
            "#W..#",
            "#####",
        ]);
        assert!(!command(&mut w, Command::SwitchHero));
        assert!(w.turns.is_empty());
    }

    // ── Win ──

    #[test]
    fn corridor_walk_clears_on_eighth_move() {
        let mut w = world(&[
            "#############",
            "#...........#",
            "#.W.......o.#",
            "#...........#",
            "#############",
        ]);
        for i in 1..=8 {
            assert!(command(&mut w, Command::Move(Direction::Right)));
            assert_eq!(hero_pos(&w, 0), Pos::new(2 + i, 2));
            if i < 8 {
                assert!(!w.cleared);
            }
        }
        assert_eq!(hero_pos(&w, 0), Pos::new(10, 2));
        assert!(w.cleared);
    }

    #[test]
    fn win_requires_every_goal_occupied() {
        let mut w = world(&[
            "########",
            "#.W..o.#",
            "#.T..o.#",
            "########",
        ]);
        for _ in 0..3 {
            command(&mut w, Command::Move(Direction::Right));
        }
        assert_eq!(hero_pos(&w, 0), Pos::new(5, 1));
        assert!(!w.cleared); // second goal still empty

        command(&mut w, Command::SwitchHero);
        for _ in 0..3 {
            command(&mut w, Command::Move(Direction::Right));
        }
        assert_eq!(hero_pos(&w, 1), Pos::new(5, 2));
        assert!(w.cleared);
    }
}
