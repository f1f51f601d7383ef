use thiserror::Error;

use crate::patch::Substitution;

/// Errors that can occur while compiling a substitution listing.
#[derive(Debug, Error)]
pub enum PatchCompileError {
    #[error("bytes on line {line} appear before any ORG")]
    NoOrigin { line: usize },

    #[error("unknown directive '{directive}' on line {line}")]
    UnknownDirective { line: usize, directive: String },

    #[error("wrong argument count for {directive} on line {line}: expected {expected}, got {got}")]
    WrongArgCount {
        line: usize,
        directive: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to parse integer '{token}' on line {line}")]
    ParseInt {
        line: usize,
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("value '{token}' on line {line} is out of range for {kind}")]
    ValueOutOfRange {
        line: usize,
        token: String,
        kind: &'static str,
    },
}

fn parse_address(line: usize, token: &str) -> Result<usize, PatchCompileError> {
    let t = token.trim_end_matches([',', ':']);
    let hex = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .or_else(|| t.strip_prefix('$'))
        .unwrap_or(t);

    usize::from_str_radix(hex, 16).map_err(|e| PatchCompileError::ParseInt {
        line,
        token: t.to_string(),
        source: e,
    })
}

fn parse_int(line: usize, token: &str) -> Result<u32, PatchCompileError> {
    let t = token.trim_end_matches(',');
    let res = if let Some(hex) = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .or_else(|| t.strip_prefix('$'))
    {
        u32::from_str_radix(hex, 16)
    } else {
        t.parse::<u32>()
    };

    res.map_err(|e| PatchCompileError::ParseInt {
        line,
        token: t.to_string(),
        source: e,
    })
}

fn parse_hex_byte(line: usize, token: &str) -> Result<u8, PatchCompileError> {
    if token.len() != 2 {
        return Err(PatchCompileError::ValueOutOfRange {
            line,
            token: token.to_string(),
            kind: "hex byte (two digits)",
        });
    }
    u8::from_str_radix(token, 16).map_err(|e| PatchCompileError::ParseInt {
        line,
        token: token.to_string(),
        source: e,
    })
}

fn narrow<T: TryFrom<u32>>(
    line: usize,
    value: u32,
    kind: &'static str,
) -> Result<T, PatchCompileError> {
    T::try_from(value).map_err(|_| PatchCompileError::ValueOutOfRange {
        line,
        token: format!("{:#X}", value),
        kind,
    })
}

struct Listing {
    done: Vec<Substitution>,
    current: Option<Substitution>,
}

impl Listing {
    fn org(&mut self, address: usize) {
        if let Some(sub) = self.current.take() {
            if !sub.payload.is_empty() {
                self.done.push(sub);
            }
        }
        self.current = Some(Substitution::new(address, Vec::new()));
    }

    fn bytes(&mut self, line: usize) -> Result<&mut Vec<u8>, PatchCompileError> {
        self.current
            .as_mut()
            .map(|sub| &mut sub.payload)
            .ok_or(PatchCompileError::NoOrigin { line })
    }

    fn finish(mut self) -> Vec<Substitution> {
        self.org(0);
        self.done
    }
}

/// Compile a substitution listing into write directives.
///
/// Line format (case-insensitive directives; addresses are hex, `0x`/`$`
/// prefixes optional; counts are decimal unless prefixed):
///
/// - ORG address          starts a new substitution at a file offset
/// - address: XX XX ...   shorthand for ORG followed by bytes
/// - XX XX XX ...         raw hex bytes appended to the current substitution
/// - FILL count value     appends `count` copies of a byte
/// - WORD value           appends a little-endian 16-bit word
///
/// Blank lines and anything after `#` or `;` are ignored.
pub fn compile_substitutions_from_str(src: &str) -> Result<Vec<Substitution>, PatchCompileError> {
    let mut listing = Listing {
        done: Vec::new(),
        current: None,
    };

    for (idx, raw_line) in src.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line
            .split(['#', ';'])
            .next()
            .unwrap_or("")
            .trim();
        if line.is_empty() {
            continue;
        }

        if let Some((addr, rest)) = line.split_once(':') {
            let address = parse_address(line_no, addr.trim())?;
            listing.org(address);
            let out = listing.bytes(line_no)?;
            for tok in rest.split_whitespace() {
                out.push(parse_hex_byte(line_no, tok)?);
            }
            continue;
        }

        let mut parts = line.split_whitespace();
        let first = match parts.next() {
            Some(tok) => tok,
            None => continue,
        };
        let directive = first.to_ascii_uppercase();
        let args: Vec<&str> = parts.collect();

        match directive.as_str() {
            "ORG" => {
                if args.len() != 1 {
                    return Err(PatchCompileError::WrongArgCount {
                        line: line_no,
                        directive,
                        expected: 1,
                        got: args.len(),
                    });
                }
                listing.org(parse_address(line_no, args[0])?);
            }

            "FILL" => {
                if args.len() != 2 {
                    return Err(PatchCompileError::WrongArgCount {
                        line: line_no,
                        directive,
                        expected: 2,
                        got: args.len(),
                    });
                }
                let count: usize = narrow(line_no, parse_int(line_no, args[0])?, "fill count")?;
                let value: u8 = narrow(line_no, parse_int(line_no, args[1])?, "byte (0-255)")?;
                listing
                    .bytes(line_no)?
                    .extend(std::iter::repeat(value).take(count));
            }

            "WORD" => {
                if args.len() != 1 {
                    return Err(PatchCompileError::WrongArgCount {
                        line: line_no,
                        directive,
                        expected: 1,
                        got: args.len(),
                    });
                }
                let value: u16 = narrow(line_no, parse_int(line_no, args[0])?, "word (0-65535)")?;
                listing.bytes(line_no)?.extend_from_slice(&value.to_le_bytes());
            }

            _ if first.len() == 2 && first.chars().all(|c| c.is_ascii_hexdigit()) => {
                let out = listing.bytes(line_no)?;
                out.push(parse_hex_byte(line_no, first)?);
                for tok in args {
                    out.push(parse_hex_byte(line_no, tok)?);
                }
            }

            _ => {
                return Err(PatchCompileError::UnknownDirective {
                    line: line_no,
                    directive,
                });
            }
        }
    }

    Ok(listing.finish())
}
