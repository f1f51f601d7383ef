use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::vars::Variables;

/// One find/replace rule for a single script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPatch {
    pub target_index: usize,
    pub match_text: String,
    /// 1-based occurrence of the token within the line; `None` matches all.
    pub occurrence: Option<usize>,
    /// `None` deletes the token and one following space.
    pub replacement: Option<String>,
}

pub type PatchKey = (String, Option<usize>);

/// Patches for one line, keyed by lowercased match text and occurrence.
pub type PatchSet = HashMap<PatchKey, TokenPatch>;

impl TokenPatch {
    pub fn key(&self) -> PatchKey {
        (self.match_text.to_lowercase(), self.occurrence)
    }
}

/// Split a line into segments whose concatenation is the line itself:
/// `<...>` controls, `$XX` escapes, alphanumeric runs, whitespace runs, and
/// every other character on its own.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let len = if first == '<' {
            rest.find('>').map_or(1, |close| close + 1)
        } else if first == '$' && is_hex_escape(rest) {
            3
        } else if first.is_alphanumeric() {
            run_len(rest, char::is_alphanumeric)
        } else if first.is_whitespace() {
            run_len(rest, char::is_whitespace)
        } else {
            first.len_utf8()
        };

        let (segment, tail) = rest.split_at(len);
        segments.push(segment);
        rest = tail;
    }

    segments
}

fn is_hex_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}

fn run_len(s: &str, pred: fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

/// Apply one line's patch set. Returns the patched line.
pub fn apply_patches_to_line(text: &str, patches: &PatchSet, vars: &Variables) -> String {
    let mut out = String::with_capacity(text.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut eat_space = false;

    for segment in tokenize(text) {
        let segment = if std::mem::take(&mut eat_space) {
            segment.strip_prefix(' ').unwrap_or(segment)
        } else {
            segment
        };
        if segment.is_empty() {
            continue;
        }

        let lower = segment.to_lowercase();
        let count = counts.entry(lower.clone()).or_insert(0);
        *count += 1;

        let patch = patches
            .get(&(lower.clone(), Some(*count)))
            .or_else(|| patches.get(&(lower, None)));

        match patch {
            Some(TokenPatch {
                replacement: Some(replacement),
                ..
            }) => out.push_str(&vars.expand(replacement)),
            Some(TokenPatch {
                replacement: None, ..
            }) => eat_space = true,
            None => out.push_str(segment),
        }
    }

    out
}

/// Apply patches to every line that has some. Returns how many lines changed.
pub fn apply_patches(
    lines: &mut BTreeMap<usize, String>,
    patches: &BTreeMap<usize, PatchSet>,
    vars: &Variables,
) -> usize {
    let mut changed = 0;
    for (index, set) in patches {
        if let Some(line) = lines.get_mut(index) {
            let patched = apply_patches_to_line(line, set, vars);
            if patched != *line {
                *line = patched;
                changed += 1;
            }
        }
    }
    changed
}
