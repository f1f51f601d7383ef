//! Glyph tables for the two text encodings stored in the cartridge.
//!
//! Entries are `(byte, text)`. Text starting with `<` is a named control code,
//! text made only of spaces (two or more) is a space-run token, and any other
//! two-character text is a dual-tile pair.

pub(crate) const DIALOGUE_TABLE: &[(u8, &str)] = &[
    (0x01, "<line>"),
    (0x02, "<TERRA>"),
    (0x03, "<LOCKE>"),
    (0x04, "<CYAN>"),
    (0x05, "<SHADOW>"),
    (0x06, "<EDGAR>"),
    (0x07, "<SABIN>"),
    (0x08, "<CELES>"),
    (0x09, "<STRAGO>"),
    (0x0A, "<RELM>"),
    (0x0B, "<SETZER>"),
    (0x0C, "<MOG>"),
    (0x0D, "<GAU>"),
    (0x0E, "<GOGO>"),
    (0x0F, "<UMARO>"),
    (0x10, "<pause>"),
    (0x11, "<wait>"),
    (0x12, "<hold>"),
    (0x13, "<page>"),
    (0x15, "<choice>"),
    (0x16, "<timed>"),
    (0x19, "<gold>"),
    (0x1A, "<item>"),
    (0x1B, "<spell>"),
    (0x1E, "   "),
    (0x1F, "     "),
    (0x20, "A"),
    (0x21, "B"),
    (0x22, "C"),
    (0x23, "D"),
    (0x24, "E"),
    (0x25, "F"),
    (0x26, "G"),
    (0x27, "H"),
    (0x28, "I"),
    (0x29, "J"),
    (0x2A, "K"),
    (0x2B, "L"),
    (0x2C, "M"),
    (0x2D, "N"),
    (0x2E, "O"),
    (0x2F, "P"),
    (0x30, "Q"),
    (0x31, "R"),
    (0x32, "S"),
    (0x33, "T"),
    (0x34, "U"),
    (0x35, "V"),
    (0x36, "W"),
    (0x37, "X"),
    (0x38, "Y"),
    (0x39, "Z"),
    (0x3A, "a"),
    (0x3B, "b"),
    (0x3C, "c"),
    (0x3D, "d"),
    (0x3E, "e"),
    (0x3F, "f"),
    (0x40, "g"),
    (0x41, "h"),
    (0x42, "i"),
    (0x43, "j"),
    (0x44, "k"),
    (0x45, "l"),
    (0x46, "m"),
    (0x47, "n"),
    (0x48, "o"),
    (0x49, "p"),
    (0x4A, "q"),
    (0x4B, "r"),
    (0x4C, "s"),
    (0x4D, "t"),
    (0x4E, "u"),
    (0x4F, "v"),
    (0x50, "w"),
    (0x51, "x"),
    (0x52, "y"),
    (0x53, "z"),
    (0x54, "0"),
    (0x55, "1"),
    (0x56, "2"),
    (0x57, "3"),
    (0x58, "4"),
    (0x59, "5"),
    (0x5A, "6"),
    (0x5B, "7"),
    (0x5C, "8"),
    (0x5D, "9"),
    (0x5E, "!"),
    (0x5F, "?"),
    (0x60, "/"),
    (0x61, ":"),
    (0x62, "\""),
    (0x63, "'"),
    (0x64, "-"),
    (0x65, "."),
    (0x66, ","),
    (0x67, "…"),
    (0x68, ";"),
    (0x69, "#"),
    (0x6A, "+"),
    (0x6B, "("),
    (0x6C, ")"),
    (0x6D, "%"),
    (0x6E, "~"),
    (0x73, "="),
    (0x7F, " "),
    (0x80, "e "),
    (0x81, " t"),
    (0x82, ": "),
    (0x83, "th"),
    (0x84, "t "),
    (0x85, "he"),
    (0x86, "s "),
    (0x87, "er"),
    (0x88, " a"),
    (0x89, "re"),
    (0x8A, "in"),
    (0x8B, "ou"),
    (0x8C, "d "),
    (0x8D, " w"),
    (0x8E, " s"),
    (0x8F, "an"),
    (0x90, "o "),
    (0x91, " h"),
    (0x92, " o"),
    (0x93, "r "),
    (0x94, "n "),
    (0x95, "at"),
    (0x96, "to"),
    (0x97, " i"),
    (0x98, ", "),
    (0x99, "ve"),
    (0x9A, "ng"),
    (0x9B, "ha"),
    (0x9C, " m"),
    (0x9D, "Th"),
    (0x9E, "st"),
    (0x9F, "on"),
    (0xA0, "yo"),
    (0xA1, " b"),
    (0xA2, "me"),
    (0xA3, "y "),
    (0xA4, "en"),
    (0xA5, "it"),
    (0xA6, "ar"),
    (0xA7, "ll"),
    (0xA8, "ea"),
    (0xA9, "I "),
    (0xAA, "ed"),
    (0xAB, " f"),
    (0xAC, " y"),
    (0xAD, "hi"),
    (0xAE, "is"),
    (0xAF, "es"),
    (0xB0, "or"),
    (0xB1, "l "),
    (0xB2, " c"),
    (0xB3, "ne"),
    (0xB4, "'s"),
    (0xB5, "nd"),
    (0xB6, "le"),
    (0xB7, "se"),
    (0xB8, " I"),
    (0xB9, "a "),
    (0xBA, "te"),
    (0xBB, " l"),
    (0xBC, "pe"),
    (0xBD, "as"),
    (0xBE, "ur"),
    (0xBF, "u "),
    (0xC0, "al"),
    (0xC1, " p"),
    (0xC2, "g "),
    (0xC3, "om"),
    (0xC4, " d"),
    (0xC5, "f "),
    (0xC6, " g"),
    (0xC7, "ow"),
    (0xC8, "rs"),
    (0xC9, "be"),
    (0xCA, "ro"),
    (0xCB, "us"),
    (0xCC, "ri"),
    (0xCD, "wa"),
    (0xCE, "we"),
    (0xCF, "Wh"),
    (0xD0, "et"),
    (0xD1, " r"),
    (0xD2, "nt"),
    (0xD3, "m "),
    (0xD4, "ma"),
    (0xD5, "I'"),
    (0xD6, "li"),
    (0xD7, "ho"),
    (0xD8, "of"),
    (0xD9, "Yo"),
    (0xDA, "h "),
    (0xDB, " n"),
    (0xDC, "ee"),
    (0xDD, "de"),
    (0xDE, "so"),
    (0xDF, "gh"),
    (0xE0, "ca"),
    (0xE1, "ra"),
    (0xE2, "n'"),
    (0xE3, "ta"),
    (0xE4, "ut"),
    (0xE5, "el"),
    (0xE6, "! "),
    (0xE7, "fo"),
    (0xE8, "ti"),
    (0xE9, "We"),
    (0xEA, "lo"),
    (0xEB, "e!"),
    (0xEC, "ld"),
    (0xED, "no"),
    (0xEE, "ac"),
    (0xEF, "ce"),
    (0xF0, "k "),
    (0xF1, " u"),
    (0xF2, "oo"),
    (0xF3, "ke"),
    (0xF4, "ay"),
    (0xF5, "w "),
    (0xF6, "!!"),
    (0xF7, "ag"),
    (0xF8, "il"),
    (0xF9, "ly"),
    (0xFA, "co"),
    (0xFB, ". "),
    (0xFC, "ch"),
    (0xFD, "go"),
    (0xFE, "ge"),
    (0xFF, "e…"),
];

/// Alternate spellings accepted by the dialogue encoder. They decode back to
/// the canonical glyph.
pub(crate) const DIALOGUE_ALIASES: &[(char, u8)] = &[
    ('\u{2019}', 0x63),
    ('\u{2018}', 0x63),
    ('\u{201C}', 0x62),
    ('\u{201D}', 0x62),
];

/// Menu font used by location names.
pub(crate) const LOCATION_TABLE: &[(u8, &str)] = &[
    (0x80, "A"),
    (0x81, "B"),
    (0x82, "C"),
    (0x83, "D"),
    (0x84, "E"),
    (0x85, "F"),
    (0x86, "G"),
    (0x87, "H"),
    (0x88, "I"),
    (0x89, "J"),
    (0x8A, "K"),
    (0x8B, "L"),
    (0x8C, "M"),
    (0x8D, "N"),
    (0x8E, "O"),
    (0x8F, "P"),
    (0x90, "Q"),
    (0x91, "R"),
    (0x92, "S"),
    (0x93, "T"),
    (0x94, "U"),
    (0x95, "V"),
    (0x96, "W"),
    (0x97, "X"),
    (0x98, "Y"),
    (0x99, "Z"),
    (0x9A, "a"),
    (0x9B, "b"),
    (0x9C, "c"),
    (0x9D, "d"),
    (0x9E, "e"),
    (0x9F, "f"),
    (0xA0, "g"),
    (0xA1, "h"),
    (0xA2, "i"),
    (0xA3, "j"),
    (0xA4, "k"),
    (0xA5, "l"),
    (0xA6, "m"),
    (0xA7, "n"),
    (0xA8, "o"),
    (0xA9, "p"),
    (0xAA, "q"),
    (0xAB, "r"),
    (0xAC, "s"),
    (0xAD, "t"),
    (0xAE, "u"),
    (0xAF, "v"),
    (0xB0, "w"),
    (0xB1, "x"),
    (0xB2, "y"),
    (0xB3, "z"),
    (0xB4, "0"),
    (0xB5, "1"),
    (0xB6, "2"),
    (0xB7, "3"),
    (0xB8, "4"),
    (0xB9, "5"),
    (0xBA, "6"),
    (0xBB, "7"),
    (0xBC, "8"),
    (0xBD, "9"),
    (0xBE, "!"),
    (0xBF, "?"),
    (0xC0, "/"),
    (0xC1, ":"),
    (0xC2, "\""),
    (0xC3, "'"),
    (0xC4, "-"),
    (0xC5, "."),
    (0xC6, ","),
    (0xC7, "…"),
    (0xC8, ";"),
    (0xC9, "#"),
    (0xCA, "+"),
    (0xCB, "("),
    (0xCC, ")"),
    (0xCD, "%"),
    (0xCE, "~"),
    (0xD2, "="),
    (0xFF, " "),
];

pub(crate) const LOCATION_ALIASES: &[(char, u8)] = &[('\u{2019}', 0xC3), ('\u{2018}', 0xC3)];
