use std::collections::HashMap;
use tracing::warn;

/// Named values a replacement string can refer to.
///
/// Lookups are case-insensitive; the casing of the placeholder only decides
/// the casing of the output.
#[derive(Debug, Default, Clone)]
pub struct Variables {
    strings: HashMap<String, String>,
    flags: HashMap<String, bool>,
    values: HashMap<String, i64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        self.strings.insert(name.to_lowercase(), value.into());
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_lowercase(), value);
    }

    pub fn set_value(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_lowercase(), value);
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.strings.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(&name.to_lowercase()).copied()
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.get(&name.to_lowercase()).copied()
    }

    /// Replace every `{name}`, `{name?a:b}` and `{name?o0:o1:...}` placeholder.
    ///
    /// Two options select on a flag (true picks the first); otherwise the
    /// options are indexed by a value, clamped to the last one. Unknown names
    /// are logged and left as the bare name.
    pub fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = match after.find('}') {
                Some(c) => c,
                None => {
                    out.push_str(&rest[open..]);
                    return out;
                }
            };

            let inner = &after[..close];
            let (name, options) = match inner.split_once('?') {
                Some((n, opts)) => (n, Some(opts)),
                None => (inner, None),
            };

            match self.resolve(name, options) {
                Some(value) => out.push_str(&apply_case(name, &value)),
                None => {
                    warn!("undefined dialogue variable '{}', using its name", name);
                    out.push_str(name);
                }
            }

            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }

    fn resolve(&self, name: &str, options: Option<&str>) -> Option<String> {
        let options = match options {
            None => {
                return self
                    .variable(name)
                    .map(str::to_string)
                    .or_else(|| self.value(name).map(|v| v.to_string()));
            }
            Some(opts) => opts.split(':').collect::<Vec<_>>(),
        };

        if options.len() == 2 {
            if let Some(flag) = self.flag(name) {
                let picked = if flag { options[0] } else { options[1] };
                return Some(picked.to_string());
            }
        }

        let value = self.value(name)?;
        let last = options.len() - 1;
        let index = usize::try_from(value.max(0)).map_or(last, |i| i.min(last));
        Some(options[index].to_string())
    }
}

fn apply_case(name: &str, value: &str) -> String {
    let has_letters = name.chars().any(char::is_alphabetic);
    if has_letters && !name.chars().any(char::is_lowercase) {
        return value.to_uppercase();
    }

    if name.chars().next().map_or(false, char::is_uppercase) {
        let mut chars = value.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    value.to_string()
}
