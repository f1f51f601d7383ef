use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::dialogue::Variables;
use crate::{RandomiserError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlagCategory {
    Aesthetic,
    Sprite,
    Experimental,
    GameBreaking,
    Major,
    Beta,
    Battle,
    Flag,
}

impl fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlagCategory::Aesthetic => "aesthetic",
            FlagCategory::Sprite => "sprite",
            FlagCategory::Experimental => "experimental",
            FlagCategory::GameBreaking => "gamebreaking",
            FlagCategory::Major => "major",
            FlagCategory::Beta => "beta",
            FlagCategory::Battle => "battle",
            FlagCategory::Flag => "flag",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub category: FlagCategory,
    pub description: &'static str,
}

pub const MUTATE_STATS: &str = "c";
pub const FIXED_LEVELS: &str = "fixedlevels";
pub const DIALOGUE_PATCHES: &str = "dialogue";
pub const SUBSTITUTIONS: &str = "substitutions";

pub const FLAGS: &[FlagSpec] = &[
    FlagSpec {
        name: MUTATE_STATS,
        category: FlagCategory::Major,
        description: "Randomize character stats, run chance and level modifiers.",
    },
    FlagSpec {
        name: FIXED_LEVELS,
        category: FlagCategory::Flag,
        description: "Keep vanilla level modifiers when stats are randomized.",
    },
    FlagSpec {
        name: DIALOGUE_PATCHES,
        category: FlagCategory::Aesthetic,
        description: "Apply dialogue patch files.",
    },
    FlagSpec {
        name: SUBSTITUTIONS,
        category: FlagCategory::Experimental,
        description: "Apply user substitution listings.",
    },
];

pub fn try_get_flag(name: &str) -> Option<&'static FlagSpec> {
    FLAGS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub flags: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "vanilla",
        description: "Change nothing.",
        flags: "",
    },
    Preset {
        name: "standard",
        description: "Stat mutation plus dialogue patches.",
        flags: "c dialogue",
    },
    Preset {
        name: "chaos",
        description: "Everything, including user substitutions.",
        flags: "c dialogue substitutions",
    },
];

pub fn try_get_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Active flags grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    active: BTreeMap<FlagCategory, BTreeSet<&'static str>>,
}

impl Options {
    /// Parse a whitespace-separated flag string.
    pub fn parse(flag_string: &str) -> Result<Self> {
        let mut options = Options::default();
        options.add_flags(flag_string)?;
        Ok(options)
    }

    /// Activate every flag in a whitespace-separated string on top of the
    /// current set.
    pub fn add_flags(&mut self, flag_string: &str) -> Result<()> {
        for token in flag_string.split_whitespace() {
            let spec =
                try_get_flag(token).ok_or_else(|| RandomiserError::UnknownFlag(token.to_string()))?;
            self.activate(spec);
        }
        Ok(())
    }

    pub fn from_preset(name: &str) -> Result<Self> {
        let preset =
            try_get_preset(name).ok_or_else(|| RandomiserError::UnknownPreset(name.to_string()))?;
        Self::parse(preset.flags)
    }

    pub fn activate(&mut self, spec: &'static FlagSpec) {
        self.active.entry(spec.category).or_default().insert(spec.name);
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active
            .values()
            .any(|set| set.iter().any(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Every known flag becomes a boolean dialogue flag.
    pub fn export_flags(&self, vars: &mut Variables) {
        for spec in FLAGS {
            vars.set_flag(spec.name, self.is_active(spec.name));
        }
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.active.values().flatten().copied().collect();
        f.write_str(&names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_categories() {
        let opts = Options::parse("c  DIALOGUE").unwrap();
        assert!(opts.is_active("c"));
        assert!(opts.is_active("dialogue"));
        assert!(!opts.is_active(FIXED_LEVELS));
        assert_eq!(opts.to_string(), "dialogue c");
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(matches!(
            Options::parse("c warp"),
            Err(RandomiserError::UnknownFlag(f)) if f == "warp"
        ));
    }

    #[test]
    fn preset_lookup_is_optional() {
        assert!(try_get_preset("Standard").is_some());
        assert!(try_get_preset("nonexistent").is_none());
        assert!(matches!(
            Options::from_preset("nonexistent"),
            Err(RandomiserError::UnknownPreset(_))
        ));
    }

    #[test]
    fn every_preset_parses() {
        for preset in PRESETS {
            Options::parse(preset.flags).unwrap();
        }
        assert_eq!(Options::from_preset("vanilla").unwrap(), Options::default());
    }

    #[test]
    fn preset_plus_extra_flags() {
        let mut opts = Options::from_preset("standard").unwrap();
        opts.add_flags("fixedlevels c").unwrap();
        assert!(opts.is_active(MUTATE_STATS));
        assert!(opts.is_active(DIALOGUE_PATCHES));
        assert!(opts.is_active(FIXED_LEVELS));
        assert!(!opts.is_active(SUBSTITUTIONS));
    }

    #[test]
    fn exports_dialogue_flags() {
        let opts = Options::parse("c").unwrap();
        let mut vars = Variables::new();
        opts.export_flags(&mut vars);
        assert_eq!(vars.flag("c"), Some(true));
        assert_eq!(vars.flag("dialogue"), Some(false));
    }

    #[test]
    fn display_lists_active_flags() {
        let opts = Options::parse("dialogue c").unwrap();
        assert_eq!(opts.to_string(), "dialogue c");
    }
}
