use thiserror::Error;
use tracing::warn;

use super::tokens::TokenPatch;

/// Why a patch-spec line was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchSpecError {
    #[error("missing ':' after the line index")]
    MissingColon,

    #[error("bad line index '{0}'")]
    BadIndex(String),

    #[error("expected '<from>-><to>' but found '{0}'")]
    MalformedArrow(String),

    #[error("bad occurrence '{0}' (must be a positive integer)")]
    BadOccurrence(String),

    #[error("empty match text in '{0}'")]
    EmptyMatch(String),
}

fn parse_index(token: &str) -> Result<usize, PatchSpecError> {
    let t = token.trim();
    let res = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else {
        t.parse::<usize>()
    };
    res.map_err(|_| PatchSpecError::BadIndex(t.to_string()))
}

fn parse_pair(target_index: usize, pair: &str) -> Result<TokenPatch, PatchSpecError> {
    let (from, to) = pair
        .split_once("->")
        .ok_or_else(|| PatchSpecError::MalformedArrow(pair.to_string()))?;

    let from = from.trim();
    let (match_text, occurrence) = match from.rsplit_once('@') {
        Some((text, n)) => {
            let n = n.trim();
            let occ = n
                .parse::<usize>()
                .ok()
                .filter(|&occ| occ > 0)
                .ok_or_else(|| PatchSpecError::BadOccurrence(n.to_string()))?;
            (text.trim(), Some(occ))
        }
        None => (from, None),
    };
    if match_text.is_empty() {
        return Err(PatchSpecError::EmptyMatch(pair.to_string()));
    }

    let to = to.trim();
    let replacement = if to == "*" { None } else { Some(to.to_string()) };

    Ok(TokenPatch {
        target_index,
        match_text: match_text.to_string(),
        occurrence,
        replacement,
    })
}

/// Parse one `<index>: <from>-><to>|<from2>-><to2>...` line.
pub fn parse_patch_line(line: &str) -> Result<Vec<TokenPatch>, PatchSpecError> {
    let (index, rest) = line.split_once(':').ok_or(PatchSpecError::MissingColon)?;
    let target_index = parse_index(index)?;

    rest.split('|')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| parse_pair(target_index, pair))
        .collect()
}

/// Parse a whole patch-spec file. Blank lines and `#` comments are ignored;
/// malformed lines are logged and skipped.
pub fn parse_patch_spec(src: &str) -> Vec<TokenPatch> {
    let mut patches = Vec::new();

    for (idx, raw_line) in src.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_patch_line(line) {
            Ok(mut parsed) => patches.append(&mut parsed),
            Err(e) => warn!("skipping dialogue patch line {}: {}", idx + 1, e),
        }
    }

    patches
}
