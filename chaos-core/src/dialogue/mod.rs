//! Per-run store of decoded script text and the patches queued against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::patch::Substitution;
use crate::pointer_table::{self, TextBlockLayout, DIALOGUE_BLOCK, LOCATION_NAME_BLOCK};
use crate::rom::ByteStore;
use crate::text::TextCodec;
use crate::Result;

mod patch_spec;
mod tokens;
mod vars;

pub use patch_spec::{parse_patch_line, parse_patch_spec, PatchSpecError};
pub use tokens::{apply_patches, apply_patches_to_line, tokenize, PatchKey, PatchSet, TokenPatch};
pub use vars::Variables;

#[derive(Debug, Clone)]
pub struct DialogueDatabase {
    dialogue: BTreeMap<usize, String>,
    location_names: BTreeMap<usize, String>,
    patches: BTreeMap<usize, PatchSet>,
    pub variables: Variables,
    dialogue_codec: TextCodec,
    location_codec: TextCodec,
}

impl Default for DialogueDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueDatabase {
    pub fn new() -> Self {
        Self {
            dialogue: BTreeMap::new(),
            location_names: BTreeMap::new(),
            patches: BTreeMap::new(),
            variables: Variables::new(),
            dialogue_codec: TextCodec::dialogue(),
            location_codec: TextCodec::location(),
        }
    }

    /// Decode the dialogue and location-name blocks of the image.
    pub fn from_rom(store: &ByteStore) -> Result<Self> {
        let mut db = Self::new();
        db.dialogue = pointer_table::read_block(store, &DIALOGUE_BLOCK, &db.dialogue_codec)?;
        db.location_names =
            pointer_table::read_block(store, &LOCATION_NAME_BLOCK, &db.location_codec)?;
        debug!(
            "decoded {} dialogue lines and {} location names",
            db.dialogue.len(),
            db.location_names.len()
        );
        Ok(db)
    }

    pub fn dialogue(&self) -> &BTreeMap<usize, String> {
        &self.dialogue
    }

    pub fn location_names(&self) -> &BTreeMap<usize, String> {
        &self.location_names
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.dialogue.get(&index).map(String::as_str)
    }

    pub fn set_line(&mut self, index: usize, text: impl Into<String>) {
        self.dialogue.insert(index, text.into());
    }

    pub fn location_name(&self, index: usize) -> Option<&str> {
        self.location_names.get(&index).map(String::as_str)
    }

    pub fn set_location_name(&mut self, index: usize, text: impl Into<String>) {
        self.location_names.insert(index, text.into());
    }

    /// Queue a patch. A later patch with the same match text and occurrence on
    /// the same line replaces the earlier one.
    pub fn add_patch(&mut self, patch: TokenPatch) {
        self.patches
            .entry(patch.target_index)
            .or_default()
            .insert(patch.key(), patch);
    }

    pub fn patch_count(&self) -> usize {
        self.patches.values().map(|set| set.len()).sum()
    }

    /// Queue every patch in a patch-spec text. Returns how many were read.
    pub fn load_patch_spec(&mut self, src: &str) -> usize {
        let patches = parse_patch_spec(src);
        let count = patches.len();
        for patch in patches {
            self.add_patch(patch);
        }
        count
    }

    /// Load patch-spec files. Directories are searched recursively for
    /// `*.txt` files in file-name order.
    pub fn load_patch_files(&mut self, paths: &[PathBuf]) -> Result<usize> {
        let mut total = 0;
        for root in paths {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry?;
                let path = entry.path();
                let is_txt = path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"));
                if !entry.file_type().is_file() || !(is_txt || path == root.as_path()) {
                    continue;
                }

                let src = fs::read_to_string(path)?;
                let count = self.load_patch_spec(&src);
                info!("Loaded {} dialogue patches from {}", count, path.display());
                total += count;
            }
        }
        Ok(total)
    }

    /// Apply every queued patch to the dialogue. Returns how many lines changed.
    pub fn apply_patches(&mut self) -> usize {
        for index in self.patches.keys() {
            if !self.dialogue.contains_key(index) {
                warn!("dialogue patch targets missing line {}", index);
            }
        }
        apply_patches(&mut self.dialogue, &self.patches, &self.variables)
    }

    /// Re-encode and pack both text blocks into write directives.
    pub fn substitutions(&self) -> Result<Vec<Substitution>> {
        let mut subs = self.block_substitutions(&self.dialogue, &DIALOGUE_BLOCK, &self.dialogue_codec)?;
        subs.extend(self.block_substitutions(
            &self.location_names,
            &LOCATION_NAME_BLOCK,
            &self.location_codec,
        )?);
        Ok(subs)
    }

    fn block_substitutions(
        &self,
        lines: &BTreeMap<usize, String>,
        layout: &TextBlockLayout,
        codec: &TextCodec,
    ) -> Result<Vec<Substitution>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let packed = pointer_table::pack(lines, codec, &layout.region)?;
        debug!(
            "packed {} {} lines into {:#X} of {:#X} bytes",
            packed.line_count,
            layout.region.name,
            packed.blob.len(),
            layout.region.capacity_bytes
        );
        packed.substitutions(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use crate::rom::ROM_SIZE;

    #[test]
    fn flowers_become_control_byte() {
        let mut db = DialogueDatabase::new();
        db.set_line(5, "Hello <LOCKE>, bring FLOWERS.");
        assert_eq!(db.load_patch_spec("5: FLOWERS->$2A"), 1);
        assert_eq!(db.apply_patches(), 1);

        let patched = db.line(5).unwrap();
        assert_eq!(patched, "Hello <LOCKE>, bring $2A.");

        let codec = TextCodec::dialogue();
        let mut expected = codec.encode("Hello <LOCKE>, bring ", false).unwrap();
        expected.push(0x2A);
        expected.extend(codec.encode(".", true).unwrap());
        assert_eq!(codec.encode(patched, true).unwrap(), expected);
    }

    #[test]
    fn later_patch_with_same_key_wins() {
        let mut db = DialogueDatabase::new();
        db.set_line(1, "red red");
        db.load_patch_spec("1: red->blue\n1: RED->green");
        assert_eq!(db.patch_count(), 1);
        db.apply_patches();
        assert_eq!(db.line(1), Some("green green"));
    }

    #[test]
    fn missing_line_is_none() {
        let db = DialogueDatabase::new();
        assert_eq!(db.line(42), None);
        assert_eq!(db.location_name(0), None);
    }

    #[test]
    fn patches_use_database_variables() {
        let mut db = DialogueDatabase::new();
        db.variables.set_flag("airship", true);
        db.set_line(2, "We walk.");
        db.load_patch_spec("2: walk->{airship?fly:walk}");
        db.apply_patches();
        assert_eq!(db.line(2), Some("We fly."));
    }

    #[test]
    fn rom_roundtrip_through_substitutions() {
        let mut store = ByteStore::new(vec![0u8; ROM_SIZE]);

        let mut db = DialogueDatabase::new();
        for i in 0..DIALOGUE_BLOCK.line_count {
            db.set_line(i, format!("Line {i}<line>The end."));
        }
        for i in 0..LOCATION_NAME_BLOCK.line_count {
            db.set_location_name(i, format!("Town {i}"));
        }
        patch::apply(&mut store, &db.substitutions().unwrap()).unwrap();

        let back = DialogueDatabase::from_rom(&store).unwrap();
        assert_eq!(back.dialogue(), db.dialogue());
        assert_eq!(back.location_names(), db.location_names());
    }

    #[test]
    fn sparse_lines_refuse_to_pack() {
        let mut db = DialogueDatabase::new();
        db.set_line(0, "First.");
        db.set_line(5, "Sixth.");
        assert!(matches!(
            db.substitutions(),
            Err(crate::RandomiserError::NonContiguousIndex { expected: 1, found: 5 })
        ));
    }

    #[test]
    fn load_patch_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a.txt"), "1: a->b\n").unwrap();
        fs::write(nested.join("b.txt"), "2: c->d|e->*\n").unwrap();
        fs::write(dir.path().join("notes.md"), "3: x->y\n").unwrap();

        let mut db = DialogueDatabase::new();
        let loaded = db.load_patch_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(loaded, 3);
        assert_eq!(db.patch_count(), 3);
    }
}
