/// Entry point and game loop.
///
/// The loop is the only writer of simulation state, and it writes
/// exclusively through `step::command` (or by rebuilding the world
/// from level data on Reset). Cosmetic timing — the teleport-beam
/// countdown and the level-clear pause — lives out here and never
/// touches authoritative state.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::Command;
use domain::tile::Direction;
use sim::level::{self, load_level};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new();
    world.level_names = level::level_names(&config);
    world.total_levels = world.level_names.len();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gatecrashers!");
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z')];
const KEYS_SWITCH: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

const SELECT_VISIBLE: usize = 16;

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let frame = Duration::from_millis(config.timing.frame_ms);
    let clear_delay = Duration::from_millis(config.timing.clear_delay_ms);
    let mut clear_started: Option<Instant> = None;

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        match world.phase {
            Phase::Title => {
                if kb.any_pressed(KEYS_CONFIRM) {
                    load_level(world, 0, config);
                } else if kb.any_pressed(&[KeyCode::Char('l'), KeyCode::Char('L')]) {
                    world.phase = Phase::LevelSelect;
                    world.select_cursor = 0;
                    world.select_scroll = 0;
                } else if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
                    break;
                }
            }

            Phase::LevelSelect => handle_level_select(world, &kb, config),

            Phase::Playing => handle_playing(world, &kb, config),

            Phase::LevelClear => {
                // Cosmetic pause: input is ignored, state is settled.
                let started = clear_started.get_or_insert_with(Instant::now);
                if started.elapsed() >= clear_delay {
                    clear_started = None;
                    let next = world.current_level + 1;
                    load_level(world, next, config); // past the end -> GameComplete
                }
            }

            Phase::GameComplete => {
                if kb.any_pressed(KEYS_CONFIRM) || kb.any_pressed(&[KeyCode::Esc]) {
                    return_to_title(world);
                }
            }
        }

        if world.beam_timer > 0 {
            world.beam_timer -= 1;
            if world.beam_timer == 0 {
                world.beam = None;
            }
        }

        renderer.render(world)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

/// Map this frame's keys onto at most one player command and hand it
/// to the simulation. Unsupported keys never reach the core.
fn handle_playing(world: &mut WorldState, kb: &InputState, config: &GameConfig) {
    // An intro popup swallows everything until dismissed.
    if world.popup.is_some() {
        if kb.any_pressed(KEYS_SWITCH) {
            world.popup = None;
        }
        return;
    }

    if kb.any_pressed(&[KeyCode::Esc]) {
        world.phase = Phase::LevelSelect;
        world.select_cursor = world.current_level;
        world.select_scroll = world.current_level.saturating_sub(SELECT_VISIBLE / 2);
        return;
    }

    if kb.any_pressed(KEYS_RESET) {
        let idx = world.current_level;
        load_level(world, idx, config);
        return;
    }

    let cmd = if kb.any_pressed(KEYS_UNDO) {
        Some(Command::Undo)
    } else if kb.any_pressed(KEYS_SWITCH) {
        Some(Command::SwitchHero)
    } else if let Some(dir) = pressed_direction(kb) {
        Some(Command::Move(dir))
    } else {
        None
    };

    if let Some(cmd) = cmd {
        let changed = step::command(world, cmd);
        if changed && world.beam.is_some() {
            world.beam_timer = config.timing.beam_frames();
        }
        if world.cleared {
            world.phase = Phase::LevelClear;
        }
    }
}

fn handle_level_select(world: &mut WorldState, kb: &InputState, config: &GameConfig) {
    let total = world.level_names.len();
    if total == 0 {
        return_to_title(world);
        return;
    }

    if kb.any_pressed(&[KeyCode::Up]) {
        if world.select_cursor > 0 {
            world.select_cursor -= 1;
            if world.select_cursor < world.select_scroll {
                world.select_scroll = world.select_cursor;
            }
        }
    } else if kb.any_pressed(&[KeyCode::Down]) {
        if world.select_cursor + 1 < total {
            world.select_cursor += 1;
            if world.select_cursor >= world.select_scroll + SELECT_VISIBLE {
                world.select_scroll = world.select_cursor - SELECT_VISIBLE + 1;
            }
        }
    } else if kb.any_pressed(KEYS_CONFIRM) {
        let idx = world.select_cursor;
        load_level(world, idx, config);
    } else if kb.any_pressed(&[KeyCode::Esc]) {
        return_to_title(world);
    }
}

fn pressed_direction(kb: &InputState) -> Option<Direction> {
    if kb.any_pressed(KEYS_UP) {
        Some(Direction::Up)
    } else if kb.any_pressed(KEYS_DOWN) {
        Some(Direction::Down)
    } else if kb.any_pressed(KEYS_LEFT) {
        Some(Direction::Left)
    } else if kb.any_pressed(KEYS_RIGHT) {
        Some(Direction::Right)
    } else {
        None
    }
}

/// Reset to title screen, preserving the loaded level list.
fn return_to_title(world: &mut WorldState) {
    let names = std::mem::take(&mut world.level_names);
    let total = world.total_levels;
    *world = WorldState::new();
    world.level_names = names;
    world.total_levels = total;
}
