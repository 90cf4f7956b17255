/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or
/// incomplete. Everything here is shell-side: cosmetic timing and
/// the level source. The simulation core never reads configuration.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    /// Frame sleep between input polls, in milliseconds.
    pub frame_ms: u64,
    /// How long the wizard's teleport beam stays visible.
    pub beam_visible_ms: u64,
    /// Pause between clearing a level and loading the next one.
    pub clear_delay_ms: u64,
}

impl TimingConfig {
    /// Beam lifetime in frames, for the shell's cosmetic countdown.
    pub fn beam_frames(&self) -> u32 {
        (self.beam_visible_ms / self.frame_ms.max(1)).max(1) as u32
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_beam_visible")]
    beam_visible_ms: u64,
    #[serde(default = "default_clear_delay")]
    clear_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_beam_visible() -> u64 { 150 }
fn default_clear_delay() -> u64 { 500 }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame_ms(),
            beam_visible_ms: default_beam_visible(),
            clear_delay_ms: default_clear_delay(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            timing: TimingConfig {
                frame_ms: toml_cfg.timing.frame_ms,
                beam_visible_ms: toml_cfg.timing.beam_visible_ms,
                clear_delay_ms: toml_cfg.timing.clear_delay_ms,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: TomlConfig = toml::from_str("[timing]\nframe_ms = 8\n").expect("parses");
        assert_eq!(cfg.timing.frame_ms, 8);
        assert_eq!(cfg.timing.beam_visible_ms, default_beam_visible());
        assert_eq!(cfg.general.levels_dir, "levels");
    }

    #[test]
    fn beam_frames_never_zero() {
        let timing = TimingConfig {
            frame_ms: 1000,
            beam_visible_ms: 150,
            clear_delay_ms: 500,
        };
        assert_eq!(timing.beam_frames(), 1);
    }
}
