/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by name)
///   2. Built-in embedded levels
///
/// ## Level format (`.txt`):
///   Line 1: `# Level Name`
///   Optional: `% popup <message shown before the level starts>`
///   Lines: map rows
///
/// ## Tile legend:
///   '#' = Wall                  '.' = Floor
///   ' ' = Void (outside play)   'o' = Goal tile
///   'W' = Warrior spawn         'T' = Thief spawn
///   'Z' = Wizard spawn          'B' = Block
///   's' = Yellow switch         'S' = Purple switch
///   'g' = Yellow gate           'G' = Purple gate
///
/// Entity glyphs imply a floor tile beneath them. Every gate is wired
/// to all switches of its color (a gate with no same-colored switch
/// has an empty controlling set and stands open). Heroes are indexed
/// in row-major scan order; the first spawn is the initially active
/// hero. Levels must wall off their interior — the simulation clamps
/// at the grid edge but does not police open borders.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::entity::{Archetype, Block, Gate, GateColor, Hero, Switch};
use crate::domain::tile::{Pos, Tile, Tilemap};
use crate::sim::world::{Phase, WorldState};

/// Runtime level data (owned strings, loaded from file or embedded).
pub struct LevelDef {
    pub name: String,
    pub popup: Option<String>,
    pub rows: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load a level into the world state, replacing the previous one.
/// An index past the end means the set is finished.
pub fn load_level(world: &mut WorldState, level_idx: usize, config: &GameConfig) {
    let levels = load_levels(config);
    if level_idx >= levels.len() {
        world.phase = Phase::GameComplete;
        return;
    }

    let mut fresh = build_world(&levels[level_idx]);
    fresh.current_level = level_idx;
    fresh.total_levels = levels.len();
    fresh.level_names = std::mem::take(&mut world.level_names);
    fresh.select_cursor = world.select_cursor;
    fresh.select_scroll = world.select_scroll;
    *world = fresh;
}

/// Names of all loadable levels, for the select screen.
pub fn level_names(config: &GameConfig) -> Vec<String> {
    load_levels(config).iter().map(|l| l.name.clone()).collect()
}

/// Build a fresh simulation state from level data: fresh entities,
/// empty turn log, first spawn active.
pub fn build_world(def: &LevelDef) -> WorldState {
    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut tiles = vec![Tile::Empty; width * height];
    let mut heroes = vec![];
    let mut blocks = vec![];
    let mut goals = vec![];
    let mut switches = vec![];
    let mut gate_spots: Vec<(Pos, GateColor)> = vec![];

    for (y, row) in def.rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let pos = Pos::new(x, y);
            let tile = &mut tiles[y * width + x];
            match ch {
                '#' => *tile = Tile::Wall,
                '.' => *tile = Tile::Floor,
                'W' => {
                    *tile = Tile::Floor;
                    heroes.push(Hero::new(Archetype::Warrior, pos));
                }
                'T' => {
                    *tile = Tile::Floor;
                    heroes.push(Hero::new(Archetype::Thief, pos));
                }
                'Z' => {
                    *tile = Tile::Floor;
                    heroes.push(Hero::new(Archetype::Wizard, pos));
                }
                'B' => {
                    *tile = Tile::Floor;
                    blocks.push(Block::new(pos));
                }
                'o' => {
                    *tile = Tile::Floor;
                    goals.push(pos);
                }
                's' => {
                    *tile = Tile::Floor;
                    switches.push(Switch { pos, color: GateColor::Yellow });
                }
                'S' => {
                    *tile = Tile::Floor;
                    switches.push(Switch { pos, color: GateColor::Purple });
                }
                'g' => {
                    *tile = Tile::Floor;
                    gate_spots.push((pos, GateColor::Yellow));
                }
                'G' => {
                    *tile = Tile::Floor;
                    gate_spots.push((pos, GateColor::Purple));
                }
                _ => {} // unknown glyphs read as void
            }
        }
    }

    let gates = gate_spots
        .into_iter()
        .map(|(pos, color)| Gate {
            pos,
            color,
            switch_indices: switches
                .iter()
                .enumerate()
                .filter(|(_, s)| s.color == color)
                .map(|(i, _)| i)
                .collect(),
        })
        .collect();

    let mut world = WorldState::new();
    world.tilemap = Tilemap::new(tiles, width);
    world.heroes = heroes;
    world.blocks = blocks;
    world.gates = gates;
    world.switches = switches;
    world.goals = goals;
    world.phase = Phase::Playing;
    world.level_name = def.name.clone();
    world.popup = def.popup.clone();
    world
}

// ══════════════════════════════════════════════════════════════
// Internal: level sources
// ══════════════════════════════════════════════════════════════

fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    if config.levels_dir.is_dir() {
        let mut found = load_from_directory(&config.levels_dir);
        if !found.is_empty() {
            found.sort_by(|a, b| a.0.cmp(&b.0));
            return found.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return results,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if let Some(def) = parse_level_file(&content) {
                    let filename = path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    results.push((filename, def));
                }
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut popup = None;
    let mut rows: Vec<String> = vec![];

    for line in content.lines() {
        if name.is_empty() && rows.is_empty() && line.starts_with('#') && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if let Some(rest) = line.strip_prefix("% popup") {
            popup = Some(rest.trim().to_string());
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.first().map_or(false, |r| r.trim().is_empty()) {
        rows.remove(0);
    }
    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let short = max_width - row.chars().count();
        row.extend(std::iter::repeat(' ').take(short));
    }

    if name.is_empty() {
        name = "Unnamed Chamber".to_string();
    }

    Some(LevelDef { name, popup, rows })
}

/// Distinguish `# Level Name` from `############` (a wall row).
/// A name line starts with `#` and contains at least one letter;
/// it is only honored before any map row has been read.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded(
            "Chamber 1 - First Steps",
            Some("Arrow keys move the hero. Stand on every marked tile."),
            &[
                "##########",
                "#........#",
                "#..W...o.#",
                "#........#",
                "##########",
            ],
        ),
        make_embedded(
            "Chamber 2 - Gatekeeper",
            Some("Blocks pushed onto a switch hold its gates open."),
            &[
                "#############",
                "#.....#.....#",
                "#.W.B.g..o..#",
                "#.....#.....#",
                "#..s..#.....#",
                "#############",
            ],
        ),
        make_embedded(
            "Chamber 3 - Light Fingers",
            Some("The thief cannot push. Walk away from a block to drag it along."),
            &[
                "############",
                "#..........#",
                "#...B.T..s.#",
                "#..........#",
                "#####g######",
                "#....o.....#",
                "############",
            ],
        ),
        make_embedded(
            "Chamber 4 - Far Sight",
            Some("The wizard trades places with the first block or hero in sight."),
            &[
                "###########",
                "#.Z...B.o.#",
                "###########",
            ],
        ),
        make_embedded(
            "Chamber 5 - Joint Operation",
            Some("Every goal tile needs a hero. Press X to switch heroes."),
            &[
                "#############",
                "#.....#.....#",
                "#.W.B.g..o..#",
                "#..s..#.....#",
                "#.T...g..o..#",
                "#############",
            ],
        ),
        make_embedded(
            "Chamber 6 - Last Rites",
            Some("Purple gates demand every purple switch at once."),
            &[
                "#############",
                "#.S......S..#",
                "#.W.....Z...#",
                "#....#G#....#",
                "#....#o#.B..#",
                "#....###....#",
                "#############",
            ],
        ),
    ]
}

fn make_embedded(name: &str, popup: Option<&str>, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        popup: popup.map(|s| s.to_string()),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}
