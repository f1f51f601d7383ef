use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub mod character;
pub mod dialogue;
pub mod flags;
pub mod patch;
pub mod patch_compiler;
pub mod pointer_table;
pub mod rng;
pub mod rom;
pub mod text;

pub use patch_compiler::PatchCompileError;

use character::{read_characters, CharacterStatRecord, StatMutator};
use dialogue::DialogueDatabase;
use flags::{Options, DIALOGUE_PATCHES, FIXED_LEVELS, MUTATE_STATS, SUBSTITUTIONS};
use patch::Substitution;
use patch_compiler::compile_substitutions_from_str;
use rng::SeededRandomStream;
use rom::RomImage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomiserSettings {
    pub seed: u64,
    /// Whitespace-separated flag names, added on top of the preset.
    pub flags: String,
    pub preset: Option<String>,
    pub dialogue_patch_paths: Vec<PathBuf>,
    pub substitution_paths: Vec<PathBuf>,
    pub debug: bool,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("write of {len} bytes at {address:#08X} falls outside the {store_len:#08X}-byte image")]
    OutOfRange {
        address: usize,
        len: usize,
        store_len: usize,
    },
    #[error("text line {index} would cross a second bank boundary")]
    AddressOverflow { index: usize },
    #[error("{region} text needs {size:#X} bytes but only {capacity:#X} are reserved")]
    CapacityExceeded {
        region: &'static str,
        size: usize,
        capacity: usize,
    },
    #[error("text line {found} out of sequence, expected line {expected}")]
    NonContiguousIndex { expected: usize, found: usize },
    #[error("{region} table holds {expected} lines but {found} were packed")]
    LineCountMismatch {
        region: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("cannot encode '{0}'")]
    InvalidToken(String),
    #[error("unexpected ROM size: {0:#X} bytes")]
    InvalidRomSize(usize),
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("substitution listing error: {0}")]
    PatchCompile(#[from] PatchCompileError),
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub flags: String,
    pub characters: Vec<CharacterStatRecord>,
    pub dialogue_patches: usize,
    pub dialogue_lines_changed: usize,
    pub substitutions: usize,
    pub bytes_written: usize,
    pub overlapping_writes: usize,
}

fn resolve_options(settings: &RandomiserSettings) -> Result<Options> {
    let mut options = match settings.preset.as_deref() {
        Some(name) => Options::from_preset(name)?,
        None => Options::default(),
    };
    options.add_flags(&settings.flags)?;
    Ok(options)
}

fn load_substitutions(paths: &[PathBuf]) -> Result<Vec<Substitution>> {
    let mut subs = Vec::new();
    for path in paths {
        let src = fs::read_to_string(path)?;
        let compiled = compile_substitutions_from_str(&src)?;
        info!("Loaded {} substitutions from {}", compiled.len(), path.display());
        subs.extend(compiled);
    }
    Ok(subs)
}

fn spoiler_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{}.{}", stem, suffix))
}

fn write_spoiler(settings: &RandomiserSettings, summary: &RunSummary) -> Result<()> {
    let mut log = format!("Randomiser seed: {}\n", summary.seed);
    log.push_str(&format!("flags: {}\n", summary.flags));
    log.push_str(&format!(
        "rom: {} -> {}\n",
        settings.input_path.display(),
        settings.output_path.display()
    ));
    log.push_str(&format!(
        "dialogue patches: {} ({} lines changed)\n",
        summary.dialogue_patches, summary.dialogue_lines_changed
    ));
    log.push_str(&format!(
        "substitutions: {} ({} bytes, {} overlapping)\n",
        summary.substitutions, summary.bytes_written, summary.overlapping_writes
    ));

    for record in &summary.characters {
        log.push_str(&format!(
            "{:<8} level={} run={}",
            record.name, record.level_modifier, record.run_chance
        ));
        for (stat, value) in &record.stats_mutated {
            let before = record.stats_original.get(stat).copied().unwrap_or(0);
            log.push_str(&format!(" {:?}={}->{}", stat, before, value));
        }
        log.push('\n');
    }

    fs::write(spoiler_path(&settings.output_path, "spoiler.txt"), log)?;
    fs::write(
        spoiler_path(&settings.output_path, "spoiler.json"),
        serde_json::to_string_pretty(summary)?,
    )?;
    Ok(())
}

pub fn run(settings: RandomiserSettings) -> Result<RunSummary> {
    if !settings.input_path.exists() {
        return Err(RandomiserError::Config(format!(
            "Input path does not exist: {}",
            settings.input_path.display()
        )));
    }

    let options = resolve_options(&settings)?;
    info!("Seed {} with flags [{}]", settings.seed, options);

    let mut image = RomImage::load(&settings.input_path)?;
    let mut rng = SeededRandomStream::new(settings.seed);
    let mut summary = RunSummary {
        seed: rng.seed(),
        flags: options.to_string(),
        ..RunSummary::default()
    };

    let mut substitutions: Vec<Substitution> = Vec::new();

    if options.is_active(SUBSTITUTIONS) {
        substitutions.extend(load_substitutions(&settings.substitution_paths)?);
    } else if !settings.substitution_paths.is_empty() {
        warn!("substitution listings given but the '{}' flag is off; skipping", SUBSTITUTIONS);
    }

    if options.is_active(MUTATE_STATS) {
        let mut characters = read_characters(&image.store)?;
        StatMutator::new(!options.is_active(FIXED_LEVELS)).mutate_all(&mut characters, &mut rng);
        substitutions.extend(characters.iter().map(CharacterStatRecord::to_substitution));
        info!("Mutated {} character records", characters.len());
        summary.characters = characters;
    }

    if options.is_active(DIALOGUE_PATCHES) {
        let mut db = DialogueDatabase::from_rom(&image.store)?;
        options.export_flags(&mut db.variables);
        db.variables.set_value("seed", (settings.seed & 0x7FFF_FFFF) as i64);

        summary.dialogue_patches = db.load_patch_files(&settings.dialogue_patch_paths)?;
        summary.dialogue_lines_changed = db.apply_patches();
        info!(
            "Applied {} dialogue patches to {} lines",
            summary.dialogue_patches, summary.dialogue_lines_changed
        );
        substitutions.extend(db.substitutions()?);
    } else if !settings.dialogue_patch_paths.is_empty() {
        warn!("dialogue patches given but the '{}' flag is off; skipping", DIALOGUE_PATCHES);
    }

    let report = patch::apply(&mut image.store, &substitutions)?;
    summary.substitutions = substitutions.len();
    summary.bytes_written = report.bytes_written;
    summary.overlapping_writes = report.overlaps.len();

    image.save(&settings.output_path)?;

    if settings.debug {
        write_spoiler(&settings, &summary)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Stat, CHARACTER_RECORD_SIZE, CHARACTER_TABLE};
    use crate::rom::{COPIER_HEADER_SIZE, ROM_SIZE};

    fn settings(dir: &Path, flags: &str) -> RandomiserSettings {
        RandomiserSettings {
            seed: 42,
            flags: flags.to_string(),
            preset: None,
            dialogue_patch_paths: Vec::new(),
            substitution_paths: Vec::new(),
            debug: false,
            input_path: dir.join("in.smc"),
            output_path: dir.join("out").join("out.smc"),
        }
    }

    fn blank_rom(dir: &Path, header: bool) {
        let mut data = vec![0u8; ROM_SIZE];
        for id in 0..14 {
            let base = CHARACTER_TABLE + id * CHARACTER_RECORD_SIZE;
            for stat in Stat::ALL {
                data[base + stat.offset()] = 40;
            }
        }
        if header {
            let mut with_header = vec![0u8; COPIER_HEADER_SIZE];
            with_header.extend(data);
            data = with_header;
        }
        fs::write(dir.join("in.smc"), data).unwrap();
    }

    #[test]
    fn missing_input_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(settings(dir.path(), "")).unwrap_err();
        assert!(matches!(err, RandomiserError::Config(_)));
    }

    #[test]
    fn vanilla_run_copies_rom() {
        let dir = tempfile::tempdir().unwrap();
        blank_rom(dir.path(), true);
        let summary = run(settings(dir.path(), "")).unwrap();
        assert_eq!(summary.substitutions, 0);

        let input = fs::read(dir.path().join("in.smc")).unwrap();
        let output = fs::read(dir.path().join("out").join("out.smc")).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn same_seed_same_output() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        blank_rom(a.path(), false);
        blank_rom(b.path(), false);
        run(settings(a.path(), "c")).unwrap();
        run(settings(b.path(), "c")).unwrap();

        let out_a = fs::read(a.path().join("out").join("out.smc")).unwrap();
        let out_b = fs::read(b.path().join("out").join("out.smc")).unwrap();
        assert_eq!(out_a.len(), ROM_SIZE);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn full_run_applies_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        blank_rom(dir.path(), false);
        let patches = dir.path().join("patches.txt");
        fs::write(&patches, "0: *->x\n").unwrap();
        let listing = dir.path().join("fix.asm");
        fs::write(&listing, "ORG 0x100\nEA EA 60\n").unwrap();

        let mut s = settings(dir.path(), "dialogue substitutions");
        s.preset = Some("standard".to_string());
        s.debug = true;
        s.dialogue_patch_paths = vec![patches];
        s.substitution_paths = vec![listing];

        let summary = run(s).unwrap();
        assert_eq!(summary.characters.len(), 14);
        assert_eq!(summary.dialogue_patches, 1);
        assert!(summary.bytes_written > 0);

        let out = fs::read(dir.path().join("out").join("out.smc")).unwrap();
        assert_eq!(&out[0x100..0x103], &[0xEA, 0xEA, 0x60]);
        for record in &summary.characters {
            for (&stat, &value) in &record.stats_mutated {
                let addr = CHARACTER_TABLE + record.id * CHARACTER_RECORD_SIZE + stat.offset();
                assert_eq!(out[addr], value);
            }
        }

        assert!(dir.path().join("out").join("out.spoiler.txt").exists());
        let json = fs::read_to_string(dir.path().join("out").join("out.spoiler.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["seed"], 42);
    }

    #[test]
    fn unknown_preset_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        blank_rom(dir.path(), false);
        let mut s = settings(dir.path(), "");
        s.preset = Some("mystery".to_string());
        assert!(matches!(run(s), Err(RandomiserError::UnknownPreset(_))));
    }
}
