//! Bidirectional mapping between editable script notation and the game's
//! byte encodings.
//!
//! Script notation is plain text plus `<NAME>` control codes and `$XX` hex
//! escapes for bytes without a table entry.

use std::collections::HashMap;

use crate::{RandomiserError, Result};

mod tables;

use tables::{DIALOGUE_ALIASES, DIALOGUE_TABLE, LOCATION_ALIASES, LOCATION_TABLE};

pub const TERMINATOR: u8 = 0x00;

#[derive(Debug, Clone)]
pub struct TextCodec {
    glyphs: Vec<Option<&'static str>>,
    controls: HashMap<String, u8>,
    pairs: HashMap<(char, char), u8>,
    singles: HashMap<char, u8>,
    space_runs: HashMap<usize, u8>,
}

impl TextCodec {
    /// Dialogue encoding: dual-tile pairs and named control codes.
    pub fn dialogue() -> Self {
        Self::from_table(DIALOGUE_TABLE, DIALOGUE_ALIASES)
    }

    /// Menu-font encoding used by location names.
    pub fn location() -> Self {
        Self::from_table(LOCATION_TABLE, LOCATION_ALIASES)
    }

    fn from_table(table: &[(u8, &'static str)], aliases: &[(char, u8)]) -> Self {
        let mut codec = TextCodec {
            glyphs: vec![None; 256],
            controls: HashMap::new(),
            pairs: HashMap::new(),
            singles: HashMap::new(),
            space_runs: HashMap::new(),
        };

        for &(byte, text) in table {
            codec.glyphs[byte as usize] = Some(text);

            let chars: Vec<char> = text.chars().collect();
            if text.starts_with('<') {
                codec.controls.insert(text.to_lowercase(), byte);
            } else if chars.len() >= 2 && chars.iter().all(|&c| c == ' ') {
                codec.space_runs.insert(chars.len(), byte);
            } else if chars.len() == 2 {
                codec.pairs.insert((chars[0], chars[1]), byte);
            } else if chars.len() == 1 {
                codec.singles.insert(chars[0], byte);
            }
        }

        for &(ch, byte) in aliases {
            codec.singles.entry(ch).or_insert(byte);
        }

        codec
    }

    /// Render bytes as script notation, stopping at the first terminator.
    /// Bytes without a table entry come out as `$XX`.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2);
        for &b in bytes {
            if b == TERMINATOR {
                break;
            }
            match self.glyphs[b as usize] {
                Some(text) => out.push_str(text),
                None => out.push_str(&format!("${:02X}", b)),
            }
        }
        out
    }

    /// Encode script notation. The empty string always encodes to a single
    /// terminator.
    pub fn encode(&self, text: &str, null_terminate: bool) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Ok(vec![TERMINATOR]);
        }

        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::with_capacity(chars.len() + 1);
        let mut i = 0usize;

        while i < chars.len() {
            let c = chars[i];

            if c == '<' {
                let close = chars[i..]
                    .iter()
                    .position(|&ch| ch == '>')
                    .map(|p| i + p)
                    .ok_or_else(|| {
                        RandomiserError::InvalidToken(chars[i..].iter().collect())
                    })?;
                let token: String = chars[i..=close].iter().collect();
                let byte = self
                    .controls
                    .get(&token.to_lowercase())
                    .copied()
                    .ok_or(RandomiserError::InvalidToken(token))?;
                out.push(byte);
                i = close + 1;
                continue;
            }

            // Runs of two or more spaces are never split by a pair: the exact
            // run token if there is one, otherwise one space per byte.
            if c == ' ' {
                let run = chars[i..].iter().take_while(|&&ch| ch == ' ').count();
                if run >= 2 {
                    match self.space_runs.get(&run) {
                        Some(&byte) => out.push(byte),
                        None => {
                            let space = self
                                .singles
                                .get(&' ')
                                .copied()
                                .ok_or_else(|| RandomiserError::InvalidToken(" ".repeat(run)))?;
                            out.extend(std::iter::repeat(space).take(run));
                        }
                    }
                    i += run;
                    continue;
                }
            }

            let spaces_after = chars[i + 1..].iter().take_while(|&&ch| ch == ' ').count();
            if spaces_after < 2 {
                if let Some(&next) = chars.get(i + 1) {
                    if let Some(&byte) = self.pairs.get(&(c, next)) {
                        out.push(byte);
                        i += 2;
                        continue;
                    }
                }
            }

            if c == '$' {
                let digits: String = chars[i + 1..].iter().take(2).collect();
                let valid = digits.len() == 2 && digits.chars().all(|ch| ch.is_ascii_hexdigit());
                if !valid {
                    return Err(RandomiserError::InvalidToken(format!("${}", digits)));
                }
                let byte = u8::from_str_radix(&digits, 16)
                    .map_err(|_| RandomiserError::InvalidToken(format!("${}", digits)))?;
                out.push(byte);
                i += 3;
                continue;
            }

            match self.singles.get(&c) {
                Some(&byte) => out.push(byte),
                None => return Err(RandomiserError::InvalidToken(c.to_string())),
            }
            i += 1;
        }

        if null_terminate && out.last() != Some(&TERMINATOR) {
            out.push(TERMINATOR);
        }
        Ok(out)
    }
}
